//! Wizard step rendering

use super::field_renderer::{draw_field, FieldView, FIELD_HEIGHT};
use crate::app::App;
use crate::state::{
    FieldType, FocusTarget, StepDefinition, StepKind, OTHER_OPTION,
};
use crate::ui::components::{render_button, ButtonState, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw the current step with its navigation buttons
pub fn draw_step(frame: &mut Frame, area: Rect, app: &App) {
    let Some(step) = app.engine.current_step() else {
        return;
    };
    let form_type = app.engine.form_type();

    let block = Block::default()
        .title(format!(
            " {} · Step {} of {} ",
            form_type.label(),
            app.engine.current_step_index() + 1,
            app.engine.step_count()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Heading
            Constraint::Min(0),                // Step body
            Constraint::Length(BUTTON_HEIGHT), // Navigation
        ])
        .margin(1)
        .split(inner);

    let copy_key = format!("{}.{}", form_type.copy_key(), step.id);
    let intro = app
        .state
        .copy
        .get(&copy_key)
        .or(step.description)
        .unwrap_or("");
    draw_heading(frame, chunks[0], step.title, intro);

    match step.kind {
        StepKind::Fields(_) => draw_fields(frame, chunks[1], app, step),
        StepKind::Radio(_) | StepKind::Multiselect(_) => draw_options(frame, chunks[1], app, step),
        StepKind::File => draw_file(frame, chunks[1], app, step),
        StepKind::FreeText => draw_free_text(frame, chunks[1], app, step),
    }

    draw_navigation(frame, chunks[2], app);
}

fn draw_heading(frame: &mut Frame, area: Rect, title: &str, intro: &str) {
    let lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            intro.to_string(),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn is_focused(app: &App, target: FocusTarget) -> bool {
    app.focused() == Some(target)
}

/// Stack the given field views top to bottom
fn draw_field_stack(frame: &mut Frame, area: Rect, fields: &[FieldView]) {
    let mut constraints: Vec<Constraint> =
        fields.iter().map(|f| Constraint::Length(f.height())).collect();
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (field, chunk) in fields.iter().zip(chunks.iter()) {
        draw_field(frame, *chunk, *field);
    }
}

fn draw_fields(frame: &mut Frame, area: Rect, app: &App, step: &StepDefinition) {
    let StepKind::Fields(definitions) = step.kind else {
        return;
    };
    let answers = app.engine.answers();

    let select_values: Vec<String> = definitions
        .iter()
        .map(|def| match (def.field_type, answers.text(def.name)) {
            (FieldType::Select, "") => String::new(),
            (FieldType::Select, value) => format!("‹ {value} ›"),
            (_, value) => value.to_string(),
        })
        .collect();

    let views: Vec<FieldView> = definitions
        .iter()
        .zip(select_values.iter())
        .map(|(def, value)| {
            let target = if def.field_type == FieldType::Select {
                FocusTarget::Select(def.name)
            } else {
                FocusTarget::Input(def.name)
            };
            FieldView {
                label: def.label,
                value,
                placeholder: match def.field_type {
                    FieldType::Select => Some("←/→ to choose"),
                    _ => def.placeholder,
                },
                required: def.required,
                is_active: is_focused(app, target),
                is_multiline: def.field_type.is_multiline(),
                error: app.engine.visible_error(def.name),
            }
        })
        .collect();

    draw_field_stack(frame, area, &views);
}

fn draw_options(frame: &mut Frame, area: Rect, app: &App, step: &StepDefinition) {
    let answers = app.engine.answers();
    let chosen = answers.choices(step.id);
    let multiselect = matches!(step.kind, StepKind::Multiselect(_));

    let mut lines: Vec<Line> = step
        .options()
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let selected = chosen.contains(option);
            let marker = match (multiselect, selected) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            let focused = is_focused(app, FocusTarget::Option(index));
            let style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if selected {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            let pointer = if focused { "› " } else { "  " };
            Line::from(Span::styled(format!("{pointer}{marker} {option}"), style))
        })
        .collect();

    if let Some(error) = app.engine.visible_error(step.id) {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let show_other = step.other_answer_key.is_some() && chosen.contains(&OTHER_OPTION);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(lines.len() as u16 + 1),
            Constraint::Length(if show_other { FIELD_HEIGHT } else { 0 }),
            Constraint::Min(0),
        ])
        .split(area);
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    if let (true, Some(other_key)) = (show_other, step.other_answer_key) {
        draw_field(
            frame,
            chunks[1],
            FieldView {
                label: "Please specify",
                value: answers.text(other_key),
                required: true,
                is_active: is_focused(app, FocusTarget::Input(other_key)),
                error: app.engine.visible_error(other_key),
                ..Default::default()
            },
        );
    }
}

fn draw_file(frame: &mut Frame, area: Rect, app: &App, step: &StepDefinition) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    draw_field(
        frame,
        chunks[0],
        FieldView {
            label: "File path",
            value: &app.state.file_path_input,
            placeholder: Some("/path/to/file.pdf"),
            is_active: is_focused(app, FocusTarget::FilePath),
            ..Default::default()
        },
    );

    let attached = app
        .engine
        .answers()
        .get(step.id)
        .and_then(|value| value.as_file());
    let status = match attached {
        Some(file) => Line::from(vec![
            Span::styled("Attached: ", Style::default().fg(Color::Green)),
            Span::raw(format!(
                "{} ({} KB)",
                file.file_name,
                file.size_bytes.div_ceil(1024)
            )),
        ]),
        None => Line::from(Span::styled(
            "No file attached",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let hint = Line::from(Span::styled(
        "Enter:attach  Del:remove",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(vec![status, hint]), chunks[1]);
}

fn draw_free_text(frame: &mut Frame, area: Rect, app: &App, step: &StepDefinition) {
    let view = FieldView {
        label: "Your answer",
        value: app.engine.answers().text(step.id),
        required: step.required,
        is_active: is_focused(app, FocusTarget::Input(step.id)),
        is_multiline: true,
        error: app.engine.visible_error(step.id),
        ..Default::default()
    };
    draw_field_stack(frame, area, &[view]);
}

fn draw_navigation(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Length(22),
            Constraint::Min(0),
        ])
        .split(area);

    let in_flight = app.engine.is_in_flight();
    let back_state = if in_flight {
        ButtonState::Disabled
    } else {
        ButtonState::Normal
    };
    render_button(frame, chunks[0], "Back", "Esc", back_state);

    if in_flight {
        render_button(frame, chunks[1], "Submitting…", "", ButtonState::Disabled);
    } else if app.engine.is_last_step() {
        render_button(frame, chunks[1], "Submit", "^N", ButtonState::Highlighted);
    } else {
        render_button(frame, chunks[1], "Next", "^N", ButtonState::Highlighted);
    }

    if app.engine.is_last_step() {
        let status = if app.engine.is_verified() {
            Span::styled(" ✓ Verified", Style::default().fg(Color::Green))
        } else {
            Span::styled(
                " Not verified, press ^T to paste a token",
                Style::default().fg(Color::Yellow),
            )
        };
        let line_area = Rect {
            y: chunks[2].y + 1,
            height: 1,
            ..chunks[2]
        };
        frame.render_widget(Paragraph::new(Line::from(status)), line_area);
    }
}
