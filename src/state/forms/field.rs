//! Form field definitions

/// Input widget type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Email,
    Number,
    Textarea,
    Select,
}

impl FieldType {
    /// Multi-line inputs accept newlines from the keyboard
    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldType::Textarea)
    }
}

/// Format and length rule applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Only the required check applies
    Plain,
    Email,
    /// Digits only, 10-15 long
    Phone,
    /// Letters and spaces, 2-24 long
    PersonName,
    /// 5-24 long
    Agency,
    /// 10-50 non-whitespace characters
    Title,
    /// 100-500 non-whitespace characters
    Description,
    /// Free text with no length rule; consecutive spaces are still rejected
    LongText,
}

impl FieldRule {
    /// Rules that reject double spaces at input time
    pub fn collapses_spaces(&self) -> bool {
        matches!(
            self,
            FieldRule::Title | FieldRule::Description | FieldRule::LongText
        )
    }

    /// Hard cap on non-whitespace characters enforced while typing
    pub fn input_cap(&self) -> Option<usize> {
        match self {
            FieldRule::Title => Some(50),
            FieldRule::Description => Some(500),
            _ => None,
        }
    }
}

/// Describes a single input within a `Fields` step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Answer key
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub rule: FieldRule,
    pub required: bool,
    /// Choices for `Select` fields
    pub options: &'static [&'static str],
    pub placeholder: Option<&'static str>,
}

impl FieldDefinition {
    /// Create a required single-line text field
    pub const fn text(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Text,
            rule,
            required: true,
            options: &[],
            placeholder: None,
        }
    }

    /// Create a required email field
    pub const fn email(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Email,
            rule: FieldRule::Email,
            required: true,
            options: &[],
            placeholder: Some("you@example.com"),
        }
    }

    /// Create a required phone number field
    pub const fn phone(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Number,
            rule: FieldRule::Phone,
            required: true,
            options: &[],
            placeholder: Some("Digits only"),
        }
    }

    /// Create a required multi-line field
    pub const fn textarea(name: &'static str, label: &'static str, rule: FieldRule) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Textarea,
            rule,
            required: true,
            options: &[],
            placeholder: None,
        }
    }

    /// Create a required select field
    pub const fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            field_type: FieldType::Select,
            rule: FieldRule::Plain,
            required: true,
            options,
            placeholder: None,
        }
    }

    pub const fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}
