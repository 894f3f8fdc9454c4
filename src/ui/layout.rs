//! Layout components (content area, status bar)

use crate::app::App;
use crate::state::{FocusTarget, NotificationKind, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split off the bottom line for the status bar, returning the content area
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::raw(" ")];
    let hints = get_view_hints(app.view(), app.engine.is_in_flight(), app.focused());
    spans.push(Span::styled(hints, Style::default().fg(Color::Gray)));

    // Newest live notification
    if let Some(notification) = app.state.notifications.latest() {
        let color = match notification.kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
            NotificationKind::Info => Color::Cyan,
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            notification.message.as_str(),
            Style::default().fg(color),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(view: View, in_flight: bool, focus: Option<FocusTarget>) -> &'static str {
    match view {
        View::SelectType => "j/k:nav  Enter:select  q:quit",
        View::Submitted => "Enter:start over  q:quit",
        View::Step if in_flight => "Submitting…",
        View::Step => match focus {
            Some(FocusTarget::Option(_)) => "Tab:next  Space:choose  ^N:continue  ^T:verify  Esc:back",
            Some(FocusTarget::Select(_)) => "Tab:next  ←/→:choose  ^N:continue  ^T:verify  Esc:back",
            Some(FocusTarget::FilePath) => "Enter:attach  Del:remove  ^N:continue  ^T:verify  Esc:back",
            _ => "Tab:next  ^N:continue  ^T:verify  Esc:back",
        },
    }
}
