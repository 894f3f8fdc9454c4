//! Collected answers of a form session

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An attachment picked by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Reasons a path cannot be attached
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("No file at {0}")]
    NotFound(String),
    #[error("{0} is not a regular file")]
    NotAFile(String),
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("File is larger than {limit_mb}MB")]
    TooLarge { limit_mb: u64 },
}

/// Extensions accepted for attachments
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "png", "jpg", "jpeg"];

/// Upper bound on attachment size
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

impl AttachedFile {
    /// Inspect a path on disk and build an attachment handle for it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let metadata = std::fs::metadata(path).map_err(|_| AttachError::NotFound(display.clone()))?;
        if !metadata.is_file() {
            return Err(AttachError::NotAFile(display));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.iter().any(|e| *e == extension) {
            return Err(AttachError::UnsupportedType(display));
        }
        if metadata.len() > MAX_ATTACHMENT_BYTES {
            return Err(AttachError::TooLarge {
                limit_mb: MAX_ATTACHMENT_BYTES / (1024 * 1024),
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| display.clone());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size_bytes: metadata.len(),
        })
    }

    /// MIME type guessed from the extension
    pub fn content_type(&self) -> &'static str {
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

/// A single stored answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Choices(Vec<String>),
    File(AttachedFile),
}

impl AnswerValue {
    /// Text content; empty for choices and files
    pub fn as_text(&self) -> &str {
        match self {
            AnswerValue::Text(s) => s,
            AnswerValue::Choices(_) | AnswerValue::File(_) => "",
        }
    }

    /// Selected choices; a text answer counts as a single choice
    pub fn as_choices(&self) -> Vec<&str> {
        match self {
            AnswerValue::Choices(c) => c.iter().map(String::as_str).collect(),
            AnswerValue::Text(s) if !s.is_empty() => vec![s.as_str()],
            AnswerValue::Text(_) | AnswerValue::File(_) => Vec::new(),
        }
    }

    pub fn as_file(&self) -> Option<&AttachedFile> {
        match self {
            AnswerValue::File(f) => Some(f),
            _ => None,
        }
    }

    /// Flatten into the single string sent over the wire
    pub fn to_wire_string(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.trim().to_string(),
            AnswerValue::Choices(c) => c.join(", "),
            AnswerValue::File(f) => f.file_name.clone(),
        }
    }
}

/// Answer key to value mapping for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAnswers {
    values: BTreeMap<String, AnswerValue>,
}

impl FormAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    /// Text stored under `key`, or "" when unset
    pub fn text(&self, key: &str) -> &str {
        self.values.get(key).map(AnswerValue::as_text).unwrap_or("")
    }

    /// Choices stored under `key`, or none when unset
    pub fn choices(&self, key: &str) -> Vec<&str> {
        self.values
            .get(key)
            .map(AnswerValue::as_choices)
            .unwrap_or_default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.values.insert(key.into(), value);
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, AnswerValue::Text(value.into()));
    }

    /// Toggle `option` in the choice list under `key`, creating it if needed
    pub fn toggle_choice(&mut self, key: &str, option: &str) {
        let entry = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| AnswerValue::Choices(Vec::new()));
        if !matches!(entry, AnswerValue::Choices(_)) {
            *entry = AnswerValue::Choices(Vec::new());
        }
        if let AnswerValue::Choices(choices) = entry {
            if let Some(pos) = choices.iter().position(|c| c == option) {
                choices.remove(pos);
            } else {
                choices.push(option.to_string());
            }
        }
    }

    /// The first attachment found, if any
    pub fn attachment(&self) -> Option<(&str, &AttachedFile)> {
        self.iter().find_map(|(k, v)| v.as_file().map(|f| (k, f)))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
