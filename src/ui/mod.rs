//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod selector;
mod submitted;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let main_area = layout::create_layout(frame.area());

    match app.view() {
        View::SelectType => selector::draw(frame, main_area, app),
        View::Step => forms::draw_step(frame, main_area, app),
        View::Submitted => submitted::draw(frame, main_area, app),
    }

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Token prompt overlays everything
    if let Some(buffer) = &app.state.token_prompt {
        components::render_token_dialog(frame, buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WizardConfig;
    use crate::services::{MockFileUploader, MockFormsApi, TokenSlot};
    use crate::state::FormType;
    use crate::submission::SubmissionPipeline;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let pipeline = SubmissionPipeline::new(
            Arc::new(MockFileUploader::new()),
            Arc::new(MockFormsApi::new()),
            Duration::from_secs(1),
            "",
        );
        App::new(&WizardConfig::default(), pipeline, Arc::new(TokenSlot::new()))
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_selector_lists_flows() {
        let screen = render(&app());
        for form_type in FormType::ALL {
            assert!(screen.contains(form_type.label()));
        }
    }

    #[test]
    fn test_every_step_renders() {
        for form_type in FormType::ALL {
            let mut app = app();
            app.engine.select_form_type(form_type);
            for (index, step) in form_type.steps().iter().enumerate() {
                let screen = render(&app);
                assert!(screen.contains(step.title), "step {index} of {form_type:?}");
                // Optional steps may be skipped without answers
                if app.engine.current_step_index() != index {
                    break;
                }
                fill_step(&mut app);
                app.engine.advance();
            }
        }
    }

    #[test]
    fn test_token_prompt_overlay() {
        let mut app = app();
        app.state.token_prompt = Some("abc".to_string());
        assert!(render(&app).contains("Human verification"));
    }

    /// Put a valid answer on every key of the current step
    fn fill_step(app: &mut App) {
        use crate::state::{FieldRule, StepKind};
        let Some(step) = app.engine.current_step() else {
            return;
        };
        match step.kind {
            StepKind::Fields(fields) => {
                for field in fields {
                    let value = match field.rule {
                        FieldRule::Email => "jane@example.com".to_string(),
                        FieldRule::Phone => "1234567890".to_string(),
                        FieldRule::PersonName => "Jane Doe".to_string(),
                        FieldRule::Agency => "Acme Studio".to_string(),
                        FieldRule::Title => "A brand new website".to_string(),
                        FieldRule::Description => "word ".repeat(30),
                        _ if !field.options.is_empty() => field.options[0].to_string(),
                        _ => "Hello".to_string(),
                    };
                    app.engine.set_text(field.name, &value);
                }
            }
            StepKind::Radio(options) => app.engine.choose(options[0]),
            StepKind::Multiselect(options) => app.engine.toggle(options[0]),
            StepKind::File => {}
            StepKind::FreeText => {
                app.engine.set_text(step.id, "Looking forward to it");
            }
        }
    }
}
