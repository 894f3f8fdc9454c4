//! Step definitions for the wizard

use super::field::{FieldDefinition, FieldRule};

/// Literal option that unlocks the companion free-text answer
pub const OTHER_OPTION: &str = "Other";

/// Shape of a step, driving both rendering and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// A group of inputs, each stored under its own field name
    Fields(&'static [FieldDefinition]),
    /// Exactly one option
    Radio(&'static [&'static str]),
    /// One or more options
    Multiselect(&'static [&'static str]),
    /// Optional attachment
    File,
    /// Single free-text answer stored under the step id
    FreeText,
}

/// One screen of the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    /// Answer key for selection, file and free-text steps
    pub id: &'static str,
    pub title: &'static str,
    pub kind: StepKind,
    /// Answer key of the "Other" companion; `None` when "Other" is not offered
    pub other_answer_key: Option<&'static str>,
    pub required: bool,
    pub description: Option<&'static str>,
}

impl StepDefinition {
    pub const fn fields(
        id: &'static str,
        title: &'static str,
        fields: &'static [FieldDefinition],
    ) -> Self {
        Self {
            id,
            title,
            kind: StepKind::Fields(fields),
            other_answer_key: None,
            required: true,
            description: None,
        }
    }

    pub const fn radio(
        id: &'static str,
        title: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            title,
            kind: StepKind::Radio(options),
            other_answer_key: None,
            required: true,
            description: None,
        }
    }

    pub const fn multiselect(
        id: &'static str,
        title: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            title,
            kind: StepKind::Multiselect(options),
            other_answer_key: None,
            required: true,
            description: None,
        }
    }

    pub const fn file(id: &'static str, title: &'static str, description: &'static str) -> Self {
        Self {
            id,
            title,
            kind: StepKind::File,
            other_answer_key: None,
            required: false,
            description: Some(description),
        }
    }

    pub const fn free_text(id: &'static str, title: &'static str, required: bool) -> Self {
        Self {
            id,
            title,
            kind: StepKind::FreeText,
            other_answer_key: None,
            required,
            description: None,
        }
    }

    /// Offer the "Other" option, storing its text under `key`
    pub const fn with_other(mut self, key: &'static str) -> Self {
        self.other_answer_key = Some(key);
        self
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Options offered by selection steps
    pub fn options(&self) -> &'static [&'static str] {
        match self.kind {
            StepKind::Radio(options) | StepKind::Multiselect(options) => options,
            StepKind::Fields(_) | StepKind::File | StepKind::FreeText => &[],
        }
    }

    /// Rule applied to the free-text answer stored under the step id
    pub fn free_text_rule(&self) -> FieldRule {
        FieldRule::LongText
    }

    /// Every answer key this step can write, in display order
    pub fn answer_keys(&self) -> Vec<&'static str> {
        let mut keys = match self.kind {
            StepKind::Fields(fields) => fields.iter().map(|f| f.name).collect(),
            StepKind::Radio(_) | StepKind::Multiselect(_) | StepKind::File | StepKind::FreeText => {
                vec![self.id]
            }
        };
        if let Some(other) = self.other_answer_key {
            keys.push(other);
        }
        keys
    }

    /// Look up a field of a `Fields` step by answer key
    pub fn field(&self, name: &str) -> Option<&'static FieldDefinition> {
        match self.kind {
            StepKind::Fields(fields) => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }
}
