//! Flow selector view

use super::components::{render_button, ButtonState, BUTTON_HEIGHT};
use crate::app::App;
use crate::state::FormType;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Fallback summaries when the CMS copy has none
fn default_summary(form_type: FormType) -> &'static str {
    match form_type {
        FormType::StartProject => "Tell us about the project you have in mind",
        FormType::JoinTeam => "Apply for a role on the team",
        FormType::DropLine => "Ask a question or just say hello",
        FormType::None => "",
    }
}

/// Draw the list of flows
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let copy = &app.state.copy;
    let block = Block::default()
        .title(format!(" {} ", copy.get_or("selector.title", "Get in touch")))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(FormType::ALL.iter().map(|_| Constraint::Length(BUTTON_HEIGHT + 1)));
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    let intro = copy.get_or("selector.intro", "What can we help you with?");
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            intro,
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true }),
        chunks[0],
    );

    for (index, form_type) in FormType::ALL.iter().enumerate() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(BUTTON_HEIGHT), Constraint::Length(1)])
            .split(chunks[index + 1]);

        let state = if index == app.state.selector_index {
            ButtonState::Highlighted
        } else {
            ButtonState::Normal
        };
        render_button(frame, rows[0], form_type.label(), "", state);

        let summary_key = format!("{}.summary", form_type.copy_key());
        let summary = copy.get_or(&summary_key, default_summary(*form_type));
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("  {summary}"),
                Style::default().fg(Color::Gray),
            )),
            rows[1],
        );
    }
}
