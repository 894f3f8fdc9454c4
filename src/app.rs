//! Application state and core logic

use crate::config::WizardConfig;
use crate::services::TokenSlot;
use crate::state::{
    focus_targets, AppState, AttachedFile, ContentCache, FocusTarget, FormEngine, FormType,
    NotificationKind, StepKind, StepMove, SubmitBlocked, View,
};
use crate::submission::{SubmissionError, SubmissionPipeline, SubmissionReceipt};
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type SubmissionTask = JoinHandle<Result<SubmissionReceipt, SubmissionError>>;

/// Main application struct
pub struct App {
    /// UI state around the engine
    pub state: AppState,
    /// The wizard itself
    pub engine: FormEngine,
    pipeline: SubmissionPipeline,
    verifier: Arc<TokenSlot>,
    /// Pipeline run started by the last accepted submit
    in_flight: Option<SubmissionTask>,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance
    pub fn new(config: &WizardConfig, pipeline: SubmissionPipeline, verifier: Arc<TokenSlot>) -> Self {
        let copy = ContentCache::from_entries(config.copy.clone());
        Self {
            state: AppState::new(copy, config.notification_ttl()),
            engine: FormEngine::new(verifier.clone()),
            pipeline,
            verifier,
            in_flight: None,
            quit: false,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn view(&self) -> View {
        View::of(&self.engine)
    }

    /// Focus target currently highlighted on the step view
    pub fn focused(&self) -> Option<FocusTarget> {
        let step = self.engine.current_step()?;
        let targets = focus_targets(step, self.engine.answers());
        let last = targets.len().checked_sub(1)?;
        targets.get(self.state.focus_index.min(last)).copied()
    }

    /// Periodic housekeeping, called once per frame
    pub fn tick(&mut self) {
        self.state.notifications.prune(Utc::now());
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Token prompt is modal
        if self.state.token_prompt.is_some() {
            self.handle_token_prompt_key(key);
            return Ok(());
        }

        match self.view() {
            View::SelectType => self.handle_selector_key(key),
            View::Step => self.handle_step_key(key),
            View::Submitted => self.handle_submitted_key(key),
        }
        Ok(())
    }

    /// Handle keys on the flow selector
    fn handle_selector_key(&mut self, key: KeyEvent) {
        let count = FormType::ALL.len();
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.selector_index = (self.state.selector_index + 1) % count;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.selector_index = (self.state.selector_index + count - 1) % count;
            }
            KeyCode::Enter => {
                let form_type = FormType::ALL[self.state.selector_index.min(count - 1)];
                self.engine.select_form_type(form_type);
                self.state.reset_step_ui();
            }
            _ => {}
        }
    }

    /// Handle keys on the thank-you screen
    fn handle_submitted_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Enter => {
                self.engine.restart_after_submission();
                self.state.selector_index = 0;
                self.state.reset_step_ui();
            }
            _ => {}
        }
    }

    /// Handle keys while the verification token prompt is open
    fn handle_token_prompt_key(&mut self, key: KeyEvent) {
        let Some(buffer) = self.state.token_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.token_prompt = None,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                let token = std::mem::take(buffer);
                self.state.token_prompt = None;
                self.verifier.set(&token);
                if self.engine.is_verified() {
                    self.state.notify(NotificationKind::Info, "Verification complete");
                } else {
                    self.state.notify(NotificationKind::Info, "Verification cleared");
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => buffer.push(c),
            _ => {}
        }
    }

    /// Handle keys on a wizard step
    fn handle_step_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('n') if ctrl => self.next_or_submit(),
            KeyCode::Char('t') if ctrl => {
                if !self.engine.is_in_flight() {
                    self.state.token_prompt = Some(String::new());
                }
            }
            KeyCode::Esc => self.go_back(),
            KeyCode::Tab | KeyCode::Down => self.move_focus(true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
            _ if ctrl => {}
            _ => match self.focused() {
                Some(FocusTarget::Input(answer_key)) => self.handle_input_key(answer_key, key),
                Some(FocusTarget::Select(answer_key)) => self.handle_select_key(answer_key, key),
                Some(FocusTarget::Option(index)) => self.handle_option_key(index, key),
                Some(FocusTarget::FilePath) => self.handle_file_key(key),
                None => {}
            },
        }
    }

    /// Move focus forward or backward, blurring the input being left
    fn move_focus(&mut self, forward: bool) {
        let Some(step) = self.engine.current_step() else {
            return;
        };
        let count = focus_targets(step, self.engine.answers()).len();
        if count == 0 {
            return;
        }
        if let Some(FocusTarget::Input(answer_key) | FocusTarget::Select(answer_key)) = self.focused() {
            self.engine.blur(answer_key);
        }
        let current = self.state.focus_index.min(count - 1);
        self.state.focus_index = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
    }

    fn is_multiline(&self, answer_key: &str) -> bool {
        let Some(step) = self.engine.current_step() else {
            return false;
        };
        match step.kind {
            StepKind::FreeText => answer_key == step.id,
            StepKind::Fields(_) => step
                .field(answer_key)
                .is_some_and(|f| f.field_type.is_multiline()),
            _ => false,
        }
    }

    fn handle_input_key(&mut self, answer_key: &'static str, key: KeyEvent) {
        let mut value = self.engine.answers().text(answer_key).to_string();
        match key.code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter if self.is_multiline(answer_key) => value.push('\n'),
            KeyCode::Enter => {
                self.move_focus(true);
                return;
            }
            _ => return,
        }
        self.engine.set_text(answer_key, &value);
    }

    fn handle_select_key(&mut self, answer_key: &'static str, key: KeyEvent) {
        let Some(field) = self
            .engine
            .current_step()
            .and_then(|step| step.field(answer_key))
        else {
            return;
        };
        let options = field.options;
        if options.is_empty() {
            return;
        }
        let current = self.engine.answers().text(answer_key);
        let position = options.iter().position(|o| *o == current);
        let next = match (key.code, position) {
            (KeyCode::Left, Some(i)) => (i + options.len() - 1) % options.len(),
            (KeyCode::Left, None) => options.len() - 1,
            (KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter, Some(i)) => (i + 1) % options.len(),
            (KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter, None) => 0,
            _ => return,
        };
        self.engine.set_text(answer_key, options[next]);
    }

    fn handle_option_key(&mut self, index: usize, key: KeyEvent) {
        let Some(step) = self.engine.current_step() else {
            return;
        };
        let Some(option) = step.options().get(index).copied() else {
            return;
        };
        if !matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
            return;
        }
        match step.kind {
            StepKind::Radio(_) => self.engine.choose(option),
            StepKind::Multiselect(_) => self.engine.toggle(option),
            _ => {}
        }
    }

    fn handle_file_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.state.file_path_input.push(c),
            KeyCode::Backspace => {
                self.state.file_path_input.pop();
            }
            KeyCode::Delete => {
                self.engine.detach();
                self.state.file_path_input.clear();
            }
            KeyCode::Enter => self.attach_file(),
            _ => {}
        }
    }

    fn attach_file(&mut self) {
        let path = self.state.file_path_input.trim().to_string();
        if path.is_empty() {
            return;
        }
        match AttachedFile::from_path(&path) {
            Ok(file) => {
                let name = file.file_name.clone();
                self.engine.attach(file);
                self.state.file_path_input.clear();
                self.state
                    .notify(NotificationKind::Info, format!("Attached {name}"));
            }
            Err(err) => {
                debug!(%path, error = %err, "Attachment rejected");
                self.state.notify(NotificationKind::Error, err.to_string());
            }
        }
    }

    /// Ctrl+N: advance, or submit from the final step
    fn next_or_submit(&mut self) {
        if self.engine.is_in_flight() {
            return;
        }
        if self.engine.is_last_step() {
            self.submit();
            return;
        }
        match self.engine.advance() {
            StepMove::Advanced => self.state.reset_step_ui(),
            StepMove::Blocked => {
                self.state
                    .notify(NotificationKind::Error, SubmitBlocked::Invalid.to_string());
            }
            _ => {}
        }
    }

    /// Esc: previous step, or the selector from the first step
    fn go_back(&mut self) {
        match self.engine.retreat() {
            StepMove::Retreated | StepMove::ReturnedToSelector => self.state.reset_step_ui(),
            _ => {}
        }
    }

    /// Start the pipeline on a background task if the engine allows it
    fn submit(&mut self) {
        let request = match self.engine.prepare_submission() {
            Ok(request) => request,
            Err(SubmitBlocked::MissingVerification) => {
                self.state.notify(
                    NotificationKind::Error,
                    format!("{} (Ctrl+T)", SubmitBlocked::MissingVerification),
                );
                return;
            }
            Err(blocked) => {
                self.state.notify(NotificationKind::Error, blocked.to_string());
                return;
            }
        };

        let pipeline = self.pipeline.clone();
        self.in_flight = Some(tokio::spawn(async move { pipeline.run(&request).await }));
    }

    /// Hand a finished pipeline run back to the engine
    pub async fn poll_submission(&mut self) {
        if !self.in_flight.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        let Some(task) = self.in_flight.take() else {
            return;
        };

        let outcome = task.await.unwrap_or_else(|e| {
            warn!(error = %e, "Submission task failed");
            Err(SubmissionError::Transport(e.to_string()))
        });

        match outcome {
            Ok(receipt) => {
                info!(
                    form_id = receipt.form_id,
                    attachment = receipt.attachment_url.as_deref().unwrap_or("none"),
                    submitted_at = %receipt.submitted_at,
                    "Submission receipt received"
                );
                self.engine.finish_submission(true);
                self.state.reset_step_ui();
                self.state.notify(
                    NotificationKind::Success,
                    "Thank you! Your submission has been received",
                );
            }
            Err(err) => {
                self.engine.finish_submission(false);
                self.state.notify(NotificationKind::Error, err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockFileUploader, MockFormsApi};
    use crate::state::Phase;
    use anyhow::anyhow;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with(forms: MockFormsApi) -> App {
        let pipeline = SubmissionPipeline::new(
            Arc::new(MockFileUploader::new()),
            Arc::new(forms),
            Duration::from_secs(1),
            "",
        );
        App::new(&WizardConfig::default(), pipeline, Arc::new(TokenSlot::new()))
    }

    fn idle_app() -> App {
        app_with(MockFormsApi::new())
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    async fn select(app: &mut App, form_type: FormType) {
        let index = FormType::ALL.iter().position(|t| *t == form_type).unwrap();
        for _ in 0..index {
            app.handle_key(key(KeyCode::Down)).await.unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
    }

    /// Fill the single Drop a Line step with valid answers
    async fn fill_drop_line(app: &mut App) {
        select(app, FormType::DropLine).await;
        type_text(app, "Jane Doe").await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        type_text(app, "jane@example.com").await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        type_text(app, "1234567890").await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        app.handle_key(key(KeyCode::Right)).await.unwrap();
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        type_text(app, "Hello there").await;
    }

    async fn settle(app: &mut App) {
        for _ in 0..100 {
            if !app.engine.is_in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.poll_submission().await;
        }
    }

    mod selector {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_should_quit_initially_false() {
            let app = idle_app();
            assert!(!app.should_quit());
            assert_eq!(app.view(), View::SelectType);
        }

        #[tokio::test]
        async fn test_q_quits() {
            let mut app = idle_app();
            app.handle_key(key(KeyCode::Char('q'))).await.unwrap();
            assert!(app.should_quit());
        }

        #[tokio::test]
        async fn test_selector_wraps() {
            let mut app = idle_app();
            app.handle_key(key(KeyCode::Up)).await.unwrap();
            assert_eq!(app.state.selector_index, FormType::ALL.len() - 1);
            app.handle_key(key(KeyCode::Char('j'))).await.unwrap();
            assert_eq!(app.state.selector_index, 0);
        }

        #[tokio::test]
        async fn test_enter_selects_flow() {
            let mut app = idle_app();
            select(&mut app, FormType::JoinTeam).await;
            assert_eq!(app.view(), View::Step);
            assert_eq!(app.engine.form_type(), FormType::JoinTeam);
            assert_eq!(app.focused(), Some(FocusTarget::Input("fullName")));
        }
    }

    mod step {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_typing_stores_text() {
            let mut app = idle_app();
            select(&mut app, FormType::DropLine).await;
            type_text(&mut app, "Jan").await;
            app.handle_key(key(KeyCode::Backspace)).await.unwrap();
            assert_eq!(app.engine.answers().text("fullName"), "Ja");
        }

        #[tokio::test]
        async fn test_tab_blurs_and_reveals_error() {
            let mut app = idle_app();
            select(&mut app, FormType::DropLine).await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "not-an-email").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();

            assert_eq!(
                app.engine.visible_error("email"),
                Some("Please enter a valid email address")
            );
            // Blurring an empty field does not flag it as required
            assert_eq!(app.engine.visible_error("fullName"), None);
        }

        #[tokio::test]
        async fn test_select_field_cycles() {
            let mut app = idle_app();
            select(&mut app, FormType::DropLine).await;
            for _ in 0..3 {
                app.handle_key(key(KeyCode::Tab)).await.unwrap();
            }
            assert_eq!(app.focused(), Some(FocusTarget::Select("enquiryType")));

            app.handle_key(key(KeyCode::Right)).await.unwrap();
            assert_eq!(app.engine.answers().text("enquiryType"), "General Question");
            app.handle_key(key(KeyCode::Left)).await.unwrap();
            assert_eq!(app.engine.answers().text("enquiryType"), "Careers");
        }

        #[tokio::test]
        async fn test_ctrl_n_blocked_shows_errors() {
            let mut app = idle_app();
            select(&mut app, FormType::JoinTeam).await;
            app.handle_key(ctrl('n')).await.unwrap();

            assert_eq!(app.engine.current_step_index(), 0);
            assert_eq!(app.engine.visible_error("fullName"), Some("Full Name is required"));
            let latest = app.state.notifications.latest().unwrap();
            assert_eq!(latest.kind, NotificationKind::Error);
        }

        #[tokio::test]
        async fn test_radio_option_and_other_input() {
            let mut app = idle_app();
            select(&mut app, FormType::JoinTeam).await;
            type_text(&mut app, "Jane Doe").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "jane@example.com").await;
            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            type_text(&mut app, "1234567890").await;
            app.handle_key(ctrl('n')).await.unwrap();
            assert_eq!(app.engine.current_step().unwrap().id, "role");
            assert_eq!(app.state.focus_index, 0);

            // Last option is "Other"
            let other_index = app.engine.current_step().unwrap().options().len() - 1;
            for _ in 0..other_index {
                app.handle_key(key(KeyCode::Tab)).await.unwrap();
            }
            app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
            assert_eq!(app.engine.answers().text("role"), "Other");

            app.handle_key(key(KeyCode::Tab)).await.unwrap();
            assert_eq!(app.focused(), Some(FocusTarget::Input("roleOther")));
            type_text(&mut app, "Copywriter").await;
            assert_eq!(app.engine.answers().text("roleOther"), "Copywriter");
        }

        #[tokio::test]
        async fn test_esc_from_first_step_returns_to_selector() {
            let mut app = idle_app();
            select(&mut app, FormType::DropLine).await;
            type_text(&mut app, "Jane").await;
            app.handle_key(key(KeyCode::Esc)).await.unwrap();

            assert_eq!(app.view(), View::SelectType);
            assert!(app.engine.answers().is_empty());
        }

        #[tokio::test]
        async fn test_attach_missing_file_notifies() {
            let mut app = idle_app();
            select(&mut app, FormType::JoinTeam).await;
            // Jump straight to the resume step input handling
            app.state.file_path_input = "/definitely/not/here.pdf".to_string();
            app.attach_file();
            let latest = app.state.notifications.latest().unwrap();
            assert_eq!(latest.kind, NotificationKind::Error);
            assert!(latest.message.contains("No file at"));
        }
    }

    mod token_prompt {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_prompt_sets_token() {
            let mut app = idle_app();
            select(&mut app, FormType::DropLine).await;
            app.handle_key(ctrl('t')).await.unwrap();
            assert!(app.state.token_prompt.is_some());

            type_text(&mut app, "abc").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();

            assert!(app.state.token_prompt.is_none());
            assert!(app.engine.is_verified());
            // Typing went to the prompt, not the field
            assert_eq!(app.engine.answers().text("fullName"), "");
        }

        #[tokio::test]
        async fn test_esc_cancels_prompt() {
            let mut app = idle_app();
            select(&mut app, FormType::DropLine).await;
            app.handle_key(ctrl('t')).await.unwrap();
            type_text(&mut app, "abc").await;
            app.handle_key(key(KeyCode::Esc)).await.unwrap();

            assert!(app.state.token_prompt.is_none());
            assert!(!app.engine.is_verified());
            assert_eq!(app.view(), View::Step);
        }
    }

    mod submission {
        use super::*;
        use pretty_assertions::assert_eq;

        async fn verify(app: &mut App) {
            app.handle_key(ctrl('t')).await.unwrap();
            type_text(app, "token").await;
            app.handle_key(key(KeyCode::Enter)).await.unwrap();
        }

        #[tokio::test]
        async fn test_submit_without_token_is_refused() {
            let mut forms = MockFormsApi::new();
            forms.expect_submit().never();
            let mut app = app_with(forms);
            fill_drop_line(&mut app).await;

            app.handle_key(ctrl('n')).await.unwrap();

            assert_eq!(app.engine.phase(), Phase::Editing);
            let latest = app.state.notifications.latest().unwrap();
            assert!(latest.message.contains("verification"));
        }

        #[tokio::test]
        async fn test_successful_submission() {
            let mut forms = MockFormsApi::new();
            forms.expect_submit().times(1).returning(|_, _| Ok(()));
            let mut app = app_with(forms);
            fill_drop_line(&mut app).await;
            verify(&mut app).await;

            app.handle_key(ctrl('n')).await.unwrap();
            assert!(app.engine.is_in_flight());

            // Second Ctrl+N while in flight is ignored
            app.handle_key(ctrl('n')).await.unwrap();

            settle(&mut app).await;
            assert_eq!(app.view(), View::Submitted);
            assert!(app.engine.answers().is_empty());
            let latest = app.state.notifications.latest().unwrap();
            assert_eq!(latest.kind, NotificationKind::Success);

            app.handle_key(key(KeyCode::Enter)).await.unwrap();
            assert_eq!(app.view(), View::SelectType);
        }

        #[tokio::test]
        async fn test_failed_submission_keeps_answers() {
            let mut forms = MockFormsApi::new();
            forms
                .expect_submit()
                .times(1)
                .returning(|_, _| Err(anyhow!("connection refused")));
            let mut app = app_with(forms);
            fill_drop_line(&mut app).await;
            verify(&mut app).await;

            app.handle_key(ctrl('n')).await.unwrap();
            settle(&mut app).await;

            assert_eq!(app.view(), View::Step);
            assert_eq!(app.engine.phase(), Phase::Editing);
            assert_eq!(app.engine.answers().text("fullName"), "Jane Doe");
            let latest = app.state.notifications.latest().unwrap();
            assert_eq!(latest.kind, NotificationKind::Error);
            assert!(latest.message.contains("Could not reach the server"));
        }
    }

    #[tokio::test]
    async fn test_tick_prunes_expired_notifications() {
        let mut app = idle_app();
        let long_ago = Utc::now() - chrono::Duration::seconds(60);
        app.state
            .notifications
            .push(NotificationKind::Info, "old", long_ago);
        app.tick();
        assert!(app.state.notifications.latest().is_none());
    }
}
