//! Button component for TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// How a button should look right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Normal,
    /// Primary action of the screen
    Highlighted,
    /// Shown but not actionable, e.g. while a submission is in flight
    Disabled,
}

/// Render a bordered button with its keyboard shortcut
pub fn render_button(frame: &mut Frame, area: Rect, label: &str, shortcut: &str, state: ButtonState) {
    let (border, text) = match state {
        ButtonState::Highlighted => (
            Style::default().fg(Color::Cyan),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        ButtonState::Normal => (Style::default().fg(Color::Gray), Style::default()),
        ButtonState::Disabled => (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let mut spans = vec![Span::styled(format!(" {label} "), text)];
    if !shortcut.is_empty() && state != ButtonState::Disabled {
        spans.push(Span::styled(
            format!("({shortcut}) "),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default().borders(Borders::ALL).border_style(border);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
