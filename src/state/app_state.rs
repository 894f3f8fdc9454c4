//! Application state definitions

use super::content_cache::ContentCache;
use super::forms::{
    FieldType, FormAnswers, FormEngine, Phase, StepDefinition, StepKind, OTHER_OPTION,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Current view in the application, derived from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    SelectType,
    Step,
    Submitted,
}

impl View {
    pub fn of(engine: &FormEngine) -> Self {
        match engine.phase() {
            Phase::Submitted => View::Submitted,
            _ if engine.current_step().is_some() => View::Step,
            _ => View::SelectType,
        }
    }
}

/// Something on the current step that can hold keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// Free text typed under an answer key
    Input(&'static str),
    /// Select field cycled with left/right
    Select(&'static str),
    /// Index into the step's options
    Option(usize),
    /// Path entry of a file step
    FilePath,
}

/// Focus targets of `step` in tab order
///
/// The "Other" input only appears once "Other" is chosen.
pub fn focus_targets(step: &StepDefinition, answers: &FormAnswers) -> Vec<FocusTarget> {
    let mut targets = match step.kind {
        StepKind::Fields(fields) => fields
            .iter()
            .map(|f| match f.field_type {
                FieldType::Select => FocusTarget::Select(f.name),
                _ => FocusTarget::Input(f.name),
            })
            .collect(),
        StepKind::Radio(options) | StepKind::Multiselect(options) => {
            (0..options.len()).map(FocusTarget::Option).collect()
        }
        StepKind::File => vec![FocusTarget::FilePath],
        StepKind::FreeText => vec![FocusTarget::Input(step.id)],
    };
    if let Some(other_key) = step.other_answer_key {
        if answers.choices(step.id).contains(&OTHER_OPTION) {
            targets.push(FocusTarget::Input(other_key));
        }
    }
    targets
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Fire-and-forget notifications that dismiss themselves
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Duration::seconds(4))
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, now: DateTime<Utc>) {
        self.items.push_back(Notification {
            kind,
            message: message.into(),
            raised_at: now,
        });
    }

    /// Drop everything older than the TTL
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.items.retain(|n| now - n.raised_at < ttl);
    }

    /// Newest notification still on screen
    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }
}

/// Main application state, everything the UI needs beyond the engine
#[derive(Debug, Default)]
pub struct AppState {
    /// Highlighted row on the flow selector
    pub selector_index: usize,
    /// Index into `focus_targets` of the current step
    pub focus_index: usize,
    /// Text typed into the file path input
    pub file_path_input: String,
    /// Token prompt buffer; `Some` while the prompt is open
    pub token_prompt: Option<String>,
    pub notifications: NotificationQueue,
    pub copy: ContentCache,
}

impl AppState {
    pub fn new(copy: ContentCache, notification_ttl: Duration) -> Self {
        Self {
            notifications: NotificationQueue::new(notification_ttl),
            copy,
            ..Default::default()
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(kind, message, Utc::now());
    }

    /// Reset per-step UI state after the step changes
    pub fn reset_step_ui(&mut self) {
        self.focus_index = 0;
        self.file_path_input.clear();
    }
}
