//! Field rendering utilities for forms

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows a single-line field occupies
pub const FIELD_HEIGHT: u16 = 3;
/// Rows a multi-line field occupies
pub const TEXTAREA_HEIGHT: u16 = 6;

/// Presentation of one input box
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: Option<&'a str>,
    pub required: bool,
    pub is_active: bool,
    pub is_multiline: bool,
    /// Visible validation message, rendered on the bottom border
    pub error: Option<&'a str>,
}

impl FieldView<'_> {
    pub fn height(&self) -> u16 {
        if self.is_multiline {
            TEXTAREA_HEIGHT
        } else {
            FIELD_HEIGHT
        }
    }
}

/// Draw a bordered input with its label, cursor and error
pub fn draw_field(frame: &mut Frame, area: Rect, field: FieldView) {
    let accent = if field.error.is_some() {
        Color::Red
    } else if field.is_active {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let text_style = if field.is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = Span::styled(
        if field.is_active { "▌" } else { "" },
        Style::default().fg(Color::Cyan),
    );

    let mut lines: Vec<Line> = if field.value.is_empty() {
        let placeholder = field.placeholder.unwrap_or("");
        vec![Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ))]
    } else if field.is_multiline {
        field
            .value
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
            .collect()
    } else {
        vec![Line::from(Span::styled(field.value.to_string(), text_style))]
    };

    if let Some(last) = lines.last_mut() {
        if field.value.is_empty() {
            last.spans.insert(0, cursor);
        } else {
            last.spans.push(cursor);
        }
    }

    let marker = if field.required { " *" } else { "" };
    let mut block = Block::default()
        .title(format!(" {}{} ", field.label, marker))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    if let Some(error) = field.error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}
