//! Field and step validation
//!
//! Validation is a family of pure functions over a step definition and the
//! current answers. Every call produces a message for each key it inspects,
//! with an empty string meaning "no error", so callers can overwrite their
//! error map wholesale.

use super::answers::FormAnswers;
use super::field::{FieldDefinition, FieldRule};
use super::step::{StepDefinition, StepKind, OTHER_OPTION};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

// local@domain.tld with a 2-20 letter top level domain
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,20}$").expect("EMAIL_REGEX: invalid regex pattern")
});

const NAME_MIN: usize = 2;
const NAME_MAX_EXCLUSIVE: usize = 25;
const AGENCY_MIN: usize = 5;
const AGENCY_MAX_EXCLUSIVE: usize = 25;
const PHONE_MIN: usize = 10;
const PHONE_MAX: usize = 15;
const TITLE_MIN: usize = 10;
const TITLE_MAX: usize = 50;
const DESCRIPTION_MIN: usize = 100;
const DESCRIPTION_MAX: usize = 500;

/// What an answer key refers to within a step
#[derive(Debug, Clone, Copy)]
pub enum AnswerSpec<'a> {
    Field(&'a FieldDefinition),
    Selection(&'a StepDefinition),
    Other(&'a StepDefinition),
    FreeText(&'a StepDefinition),
    File(&'a StepDefinition),
}

impl<'a> AnswerSpec<'a> {
    /// Resolve `key` against one step
    pub fn resolve(step: &'a StepDefinition, key: &str) -> Option<Self> {
        if step.other_answer_key == Some(key) {
            return Some(AnswerSpec::Other(step));
        }
        match step.kind {
            StepKind::Fields(_) => step.field(key).map(AnswerSpec::Field),
            _ if step.id != key => None,
            StepKind::Radio(_) | StepKind::Multiselect(_) => Some(AnswerSpec::Selection(step)),
            StepKind::FreeText => Some(AnswerSpec::FreeText(step)),
            StepKind::File => Some(AnswerSpec::File(step)),
        }
    }

    /// Rule applied to text typed under this key
    pub fn rule(&self) -> FieldRule {
        match self {
            AnswerSpec::Field(field) => field.rule,
            AnswerSpec::FreeText(step) => step.free_text_rule(),
            AnswerSpec::Other(_) => FieldRule::LongText,
            AnswerSpec::Selection(_) | AnswerSpec::File(_) => FieldRule::Plain,
        }
    }
}

/// Count characters that are not whitespace
pub fn non_whitespace_len(value: &str) -> usize {
    value.chars().filter(|c| !c.is_whitespace()).count()
}

/// Decide what to store when the user changes a value from `current` to `incoming`
///
/// Long text rejects double spaces and, for titles and descriptions, anything
/// past the hard cap. A rejected edit keeps `current`.
pub fn sanitize_input(rule: FieldRule, current: &str, incoming: &str) -> String {
    if rule.collapses_spaces() && incoming.contains("  ") {
        return current.to_string();
    }
    if let Some(cap) = rule.input_cap() {
        if non_whitespace_len(incoming) > cap {
            return current.to_string();
        }
    }
    incoming.to_string()
}

/// Validate a text value against a rule
///
/// The required check only fires when `emit_empty` is set. Format rules fire
/// whenever the trimmed value is non-empty.
pub fn validate_value(
    label: &str,
    rule: FieldRule,
    required: bool,
    value: &str,
    emit_empty: bool,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if required && emit_empty {
            format!("{label} is required")
        } else {
            String::new()
        };
    }

    match rule {
        FieldRule::Plain | FieldRule::LongText => String::new(),
        FieldRule::Email => {
            if EMAIL_REGEX.is_match(trimmed) {
                String::new()
            } else {
                "Please enter a valid email address".to_string()
            }
        }
        FieldRule::Phone => {
            if !trimmed.chars().all(|c| c.is_ascii_digit()) {
                "Phone number can only contain digits".to_string()
            } else if !(PHONE_MIN..=PHONE_MAX).contains(&trimmed.len()) {
                format!("Phone number must be {PHONE_MIN}-{PHONE_MAX} digits")
            } else {
                String::new()
            }
        }
        FieldRule::PersonName => {
            if !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ') {
                format!("{label} can only contain letters and spaces")
            } else if !(NAME_MIN..NAME_MAX_EXCLUSIVE).contains(&trimmed.chars().count()) {
                format!(
                    "{label} must be between {NAME_MIN} and {} characters",
                    NAME_MAX_EXCLUSIVE - 1
                )
            } else {
                String::new()
            }
        }
        FieldRule::Agency => {
            if !(AGENCY_MIN..AGENCY_MAX_EXCLUSIVE).contains(&trimmed.chars().count()) {
                format!(
                    "{label} must be between {AGENCY_MIN} and {} characters",
                    AGENCY_MAX_EXCLUSIVE - 1
                )
            } else {
                String::new()
            }
        }
        FieldRule::Title => length_message(label, non_whitespace_len(trimmed), TITLE_MIN, TITLE_MAX),
        FieldRule::Description => length_message(
            label,
            non_whitespace_len(trimmed),
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        ),
    }
}

fn length_message(label: &str, len: usize, min: usize, max: usize) -> String {
    if len < min {
        format!("{label} is too short: minimum {min} characters, spaces excluded")
    } else if len > max {
        format!("{label} is too long: maximum {max} characters, spaces excluded")
    } else {
        String::new()
    }
}

/// Validate the answer stored under one key
pub fn validate_answer(spec: AnswerSpec<'_>, answers: &FormAnswers, emit_empty: bool) -> String {
    match spec {
        AnswerSpec::Field(field) => validate_value(
            field.label,
            field.rule,
            field.required,
            answers.text(field.name),
            emit_empty,
        ),
        AnswerSpec::Selection(step) => validate_selection(step, answers, emit_empty),
        AnswerSpec::Other(step) => {
            let Some(other_key) = step.other_answer_key else {
                return String::new();
            };
            let other_chosen = answers.choices(step.id).contains(&OTHER_OPTION);
            if other_chosen && emit_empty && answers.text(other_key).trim().is_empty() {
                "Please specify your other option".to_string()
            } else {
                String::new()
            }
        }
        AnswerSpec::FreeText(step) => validate_value(
            step.title,
            step.free_text_rule(),
            step.required,
            answers.text(step.id),
            emit_empty,
        ),
        AnswerSpec::File(_) => String::new(),
    }
}

fn validate_selection(step: &StepDefinition, answers: &FormAnswers, emit_empty: bool) -> String {
    let chosen = answers.choices(step.id);
    match step.kind {
        StepKind::Radio(options) => match chosen.first() {
            Some(value) if options.iter().any(|o| o == value) => String::new(),
            Some(_) => "Please choose one of the listed options".to_string(),
            None if emit_empty => "Please select an option".to_string(),
            None => String::new(),
        },
        StepKind::Multiselect(options) => {
            if chosen.iter().any(|c| !options.iter().any(|o| o == c)) {
                "Please choose from the listed options".to_string()
            } else if chosen.is_empty() && emit_empty {
                "Please select at least one option".to_string()
            } else {
                String::new()
            }
        }
        StepKind::Fields(_) | StepKind::File | StepKind::FreeText => String::new(),
    }
}

/// Validate every key of a step as on an advance or submit attempt
pub fn collect_step_errors(
    step: &StepDefinition,
    answers: &FormAnswers,
) -> BTreeMap<&'static str, String> {
    step.answer_keys()
        .into_iter()
        .filter_map(|key| AnswerSpec::resolve(step, key).map(|spec| (key, spec)))
        .map(|(key, spec)| (key, validate_answer(spec, answers, true)))
        .collect()
}

/// Whether a step may be left forwards
pub fn validate_step(step: &StepDefinition, answers: &FormAnswers) -> bool {
    match step.kind {
        StepKind::File => true,
        _ => collect_step_errors(step, answers)
            .values()
            .all(String::is_empty),
    }
}

/// Current error messages and interaction flags of a session
#[derive(Debug, Clone, Default)]
pub struct ValidationState {
    errors: HashMap<String, String>,
    touched: HashMap<String, bool>,
    /// Set once a submit has been attempted; exposes every error
    pub show_validation: bool,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&mut self, key: &str, message: String) {
        self.errors.insert(key.to_string(), message);
    }

    /// Stored message for `key`, visible or not
    pub fn error(&self, key: &str) -> &str {
        self.errors.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn clear_error(&mut self, key: &str) {
        self.errors.insert(key.to_string(), String::new());
    }

    pub fn mark_touched(&mut self, key: &str) {
        self.touched.insert(key.to_string(), true);
    }

    pub fn is_touched(&self, key: &str) -> bool {
        self.touched.get(key).copied().unwrap_or(false)
    }

    /// The message the user should see for `key`, if any
    pub fn visible_error(&self, key: &str) -> Option<&str> {
        let message = self.error(key);
        let exposed = self.is_touched(key) || self.show_validation;
        (exposed && !message.is_empty()).then_some(message)
    }

    /// Overwrite errors for a step and touch every key in it
    pub fn apply_step_errors(&mut self, errors: BTreeMap<&'static str, String>) {
        for (key, message) in errors {
            self.mark_touched(key);
            self.set_error(key, message);
        }
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.touched.clear();
        self.show_validation = false;
    }
}
