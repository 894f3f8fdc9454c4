//! Base dialog component

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
    Frame,
};

/// Columns taken by the border and horizontal padding
const CHROME_WIDTH: u16 = 6;

/// Configuration for rendering a dialog
pub struct DialogConfig<'a> {
    pub title: &'a str,
    /// Title and border color
    pub accent: Color,
    /// Body text; `\n` starts a new paragraph
    pub message: &'a str,
    /// Single-line input shown under the message, with a cursor
    pub input: Option<&'a str>,
    /// Key hints on the last row
    pub hint: Option<Vec<Span<'a>>>,
    pub max_width: u16,
}

impl Default for DialogConfig<'_> {
    fn default() -> Self {
        Self {
            title: "Dialog",
            accent: Color::White,
            message: "",
            input: None,
            hint: None,
            max_width: 60,
        }
    }
}

/// Centre a `width` x `height` box inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Render a centered dialog overlay
pub fn render_dialog(frame: &mut Frame, config: DialogConfig) {
    let area = frame.area();
    let text_width = config.max_width.saturating_sub(CHROME_WIDTH).max(1) as usize;
    let body = wrap_text(config.message, text_width);

    let accent = Style::default().fg(config.accent);
    let mut content = vec![
        Line::from(Span::styled(config.title, accent.add_modifier(Modifier::BOLD))),
        Line::default(),
    ];
    content.extend(body.into_iter().map(Line::from));
    if let Some(input) = config.input {
        content.push(Line::default());
        content.push(Line::from(vec![
            Span::styled("> ", accent),
            Span::raw(input),
            Span::styled("▌", Style::default().fg(Color::Cyan)),
        ]));
    }
    if let Some(hint) = config.hint {
        content.push(Line::default());
        content.push(Line::from(hint));
    }

    let widest = content.iter().map(Line::width).max().unwrap_or(0) as u16;
    let width = (widest + CHROME_WIDTH).min(config.max_width).min(area.width);
    let height = (content.len() as u16 + 2).max(5).min(area.height);
    let dialog_area = centered(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent)
        .padding(Padding::horizontal(2));
    frame.render_widget(Clear, dialog_area);
    frame.render_widget(
        Paragraph::new(content)
            .block(block)
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}

/// Greedy word wrap to `width` columns
///
/// Each `\n` separated paragraph yields at least one row, and a word wider
/// than `width` is split across rows.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_len = 0;
        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                let gap = usize::from(row_len > 0);
                if row_len + gap + piece.len() > width {
                    rows.push(std::mem::take(&mut row));
                    row_len = 0;
                } else if gap == 1 {
                    row.push(' ');
                    row_len += 1;
                }
                row.extend(piece);
                row_len += piece.len();
            }
        }
        rows.push(row);
    }

    rows
}
