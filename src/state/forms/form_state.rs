//! Form engine: flow selection, step sequencing and submission gating

use super::answers::{AnswerValue, AttachedFile, FormAnswers};
use super::flows::FormType;
use super::step::{StepDefinition, StepKind};
use super::validation::{
    collect_step_errors, sanitize_input, validate_answer, validate_step, AnswerSpec,
    ValidationState,
};
use crate::services::HumanVerifier;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Editing,
    /// A submission is in flight; submit is disabled
    Submitting,
    Submitted,
}

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMove {
    Advanced,
    /// Current step failed validation; its errors are now visible
    Blocked,
    Retreated,
    ReturnedToSelector,
    /// Nothing to do from here
    Stayed,
}

/// Reasons `prepare_submission` refuses to start the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitBlocked {
    #[error("Finish the remaining steps before submitting")]
    NotOnFinalStep,
    #[error("A submission is already in progress")]
    InFlight,
    #[error("Please fix the highlighted fields")]
    Invalid,
    #[error("Please complete the verification before submitting")]
    MissingVerification,
}

/// Everything the submission pipeline needs, snapshotted at submit time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub form_type: FormType,
    pub answers: FormAnswers,
    pub verification_token: String,
    /// Stable across retries of the same session
    pub idempotency_key: Uuid,
}

/// State machine behind the wizard
///
/// Owns the answers and validation state of exactly one session. Selecting a
/// flow, restarting after a submission, or backing out of the first step all
/// start a fresh session.
pub struct FormEngine {
    form_type: FormType,
    current_step: usize,
    answers: FormAnswers,
    validation: ValidationState,
    phase: Phase,
    idempotency_key: Option<Uuid>,
    verifier: Arc<dyn HumanVerifier>,
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("form_type", &self.form_type)
            .field("current_step", &self.current_step)
            .field("answers", &self.answers.len())
            .field("phase", &self.phase)
            .field("verified", &self.verifier.is_verified())
            .finish()
    }
}

impl FormEngine {
    pub fn new(verifier: Arc<dyn HumanVerifier>) -> Self {
        Self {
            form_type: FormType::None,
            current_step: 0,
            answers: FormAnswers::new(),
            validation: ValidationState::new(),
            phase: Phase::Editing,
            idempotency_key: None,
            verifier,
        }
    }

    /// Start a fresh session of `form_type`
    pub fn select_form_type(&mut self, form_type: FormType) {
        self.reset_session();
        self.form_type = form_type;

        for step in form_type.steps() {
            if matches!(step.kind, StepKind::Multiselect(_)) {
                self.answers.set(step.id, AnswerValue::Choices(Vec::new()));
            }
        }

        info!(?form_type, steps = form_type.steps().len(), "Form type selected");
    }

    fn reset_session(&mut self) {
        self.form_type = FormType::None;
        self.current_step = 0;
        self.answers.clear();
        self.validation.clear();
        self.phase = Phase::Editing;
        self.idempotency_key = None;
        self.verifier.reset();
    }

    pub fn form_type(&self) -> FormType {
        self.form_type
    }

    pub fn steps(&self) -> &'static [StepDefinition] {
        self.form_type.steps()
    }

    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step
    }

    pub fn current_step(&self) -> Option<&'static StepDefinition> {
        self.steps().get(self.current_step)
    }

    pub fn is_last_step(&self) -> bool {
        self.step_count() > 0 && self.current_step + 1 == self.step_count()
    }

    pub fn answers(&self) -> &FormAnswers {
        &self.answers
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_verified(&self) -> bool {
        self.verifier.is_verified()
    }

    /// Error to display next to `key`, honouring the touched flags
    pub fn visible_error(&self, key: &str) -> Option<&str> {
        self.validation.visible_error(key)
    }

    fn resolve(&self, key: &str) -> Option<AnswerSpec<'static>> {
        self.steps()
            .iter()
            .find_map(|step| AnswerSpec::resolve(step, key))
    }

    /// Store typed text under `key`
    ///
    /// The value goes through input sanitisation first. Returns false when
    /// the edit was rejected and the previous value kept. Unknown keys are
    /// ignored.
    pub fn set_text(&mut self, key: &str, value: &str) -> bool {
        if self.phase != Phase::Editing {
            return false;
        }
        let Some(spec) = self.resolve(key) else {
            debug!(key, "Ignoring input for unknown answer key");
            return false;
        };

        let accepted = sanitize_input(spec.rule(), self.answers.text(key), value);
        let took_edit = accepted == value;
        self.answers.set_text(key, accepted);
        self.validation.clear_error(key);
        took_edit
    }

    /// The user left the input for `key`
    pub fn blur(&mut self, key: &str) {
        self.validation.mark_touched(key);
        self.validate_field(key, false);
    }

    /// Re-validate one key, storing and returning its message
    pub fn validate_field(&mut self, key: &str, emit_empty: bool) -> String {
        let message = match self.resolve(key) {
            Some(spec) => validate_answer(spec, &self.answers, emit_empty),
            None => String::new(),
        };
        self.validation.set_error(key, message.clone());
        message
    }

    /// Pick `option` on the current radio step
    pub fn choose(&mut self, option: &str) {
        let Some(step) = self.current_step() else {
            return;
        };
        if self.phase != Phase::Editing || !matches!(step.kind, StepKind::Radio(_)) {
            return;
        }
        if step.options().iter().any(|o| *o == option) {
            self.answers.set_text(step.id, option);
            self.validation.clear_error(step.id);
        }
    }

    /// Flip `option` on the current multiselect step
    pub fn toggle(&mut self, option: &str) {
        let Some(step) = self.current_step() else {
            return;
        };
        if self.phase != Phase::Editing || !matches!(step.kind, StepKind::Multiselect(_)) {
            return;
        }
        if step.options().iter().any(|o| *o == option) {
            self.answers.toggle_choice(step.id, option);
            self.validation.clear_error(step.id);
        }
    }

    /// Attach a file to the current file step
    pub fn attach(&mut self, file: AttachedFile) {
        let Some(step) = self.current_step() else {
            return;
        };
        if self.phase == Phase::Editing && step.kind == StepKind::File {
            info!(file = %file.file_name, size = file.size_bytes, "Attachment added");
            self.answers.set(step.id, AnswerValue::File(file));
        }
    }

    /// Remove the attachment of the current file step
    pub fn detach(&mut self) {
        let Some(step) = self.current_step() else {
            return;
        };
        if self.phase == Phase::Editing && step.kind == StepKind::File {
            self.answers.set_text(step.id, "");
        }
    }

    /// Validate the current step and touch all of its keys
    fn check_current_step(&mut self) -> bool {
        let Some(step) = self.current_step() else {
            return false;
        };
        if step.kind == StepKind::File {
            return true;
        }
        let errors = collect_step_errors(step, &self.answers);
        self.validation.apply_step_errors(errors);
        validate_step(step, &self.answers)
    }

    /// Move to the next step if the current one is valid
    pub fn advance(&mut self) -> StepMove {
        if self.phase != Phase::Editing || self.current_step + 1 >= self.step_count() {
            return StepMove::Stayed;
        }
        if !self.check_current_step() {
            debug!(step = self.current_step, "Advance blocked by validation");
            return StepMove::Blocked;
        }
        self.current_step += 1;
        debug!(step = self.current_step, "Advanced");
        StepMove::Advanced
    }

    /// Go back one step, or back to the flow selector from the first step
    pub fn retreat(&mut self) -> StepMove {
        if self.phase != Phase::Editing {
            return StepMove::Stayed;
        }
        if self.current_step > 0 {
            self.current_step -= 1;
            debug!(step = self.current_step, "Retreated");
            StepMove::Retreated
        } else if self.form_type != FormType::None {
            info!(
                form_type = ?self.form_type,
                discarded_answers = !self.answers.is_empty(),
                "Returned to form type selector"
            );
            self.reset_session();
            StepMove::ReturnedToSelector
        } else {
            StepMove::Stayed
        }
    }

    /// Check the submit preconditions and mark the session in flight
    pub fn prepare_submission(&mut self) -> Result<SubmissionRequest, SubmitBlocked> {
        if self.phase == Phase::Submitting {
            return Err(SubmitBlocked::InFlight);
        }
        if self.phase == Phase::Submitted || !self.is_last_step() {
            return Err(SubmitBlocked::NotOnFinalStep);
        }

        self.validation.show_validation = true;
        if !self.check_current_step() {
            return Err(SubmitBlocked::Invalid);
        }

        let Some(verification_token) = self.verifier.token() else {
            warn!("Submission attempted without a verification token");
            return Err(SubmitBlocked::MissingVerification);
        };

        let idempotency_key = *self.idempotency_key.get_or_insert_with(Uuid::new_v4);
        self.phase = Phase::Submitting;
        info!(form_type = ?self.form_type, %idempotency_key, "Submission started");

        Ok(SubmissionRequest {
            form_type: self.form_type,
            answers: self.answers.clone(),
            verification_token,
            idempotency_key,
        })
    }

    /// Record the outcome of the pipeline started by `prepare_submission`
    pub fn finish_submission(&mut self, succeeded: bool) {
        if self.phase != Phase::Submitting {
            warn!("finish_submission called with no submission in flight");
            return;
        }
        if succeeded {
            info!(form_type = ?self.form_type, "Submission succeeded");
            self.answers.clear();
            self.validation.clear();
            self.idempotency_key = None;
            self.verifier.reset();
            self.phase = Phase::Submitted;
        } else {
            warn!(form_type = ?self.form_type, "Submission failed; answers kept for retry");
            self.phase = Phase::Editing;
        }
    }

    /// Leave the thank-you state and return to the selector
    pub fn restart_after_submission(&mut self) {
        if self.phase == Phase::Submitted {
            self.reset_session();
        }
    }
}
