//! Verification token prompt

use super::base::{render_dialog, DialogConfig};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

/// Render the prompt the verification token is pasted into
pub fn render_token_dialog(frame: &mut Frame, buffer: &str) {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let hint = vec![
        Span::styled("Enter", key),
        Span::raw(":save  "),
        Span::styled("Esc", key),
        Span::raw(":cancel"),
    ];

    render_dialog(
        frame,
        DialogConfig {
            title: "Human verification",
            accent: Color::Yellow,
            message: "Paste the token issued by the verification widget. \
                      Saving an empty token clears it.",
            input: Some(buffer),
            hint: Some(hint),
            max_width: 64,
        },
    );
}
