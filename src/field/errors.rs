use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::types::StateValue;

/// Result type for fallible field operations outside the write path
pub type Result<T> = std::result::Result<T, GuardError>;

/// A rejected state assignment
///
/// Carries the exact `current -> proposed` pair so callers can assert on it.
/// The subject's slot is untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition on '{field}': {} -> {proposed}", display_current(.current))]
pub struct InvalidTransition {
    pub field: String,
    /// `None` when the slot was unset
    pub current: Option<StateValue>,
    pub proposed: StateValue,
}

fn display_current(current: &Option<StateValue>) -> String {
    match current {
        Some(value) => value.to_string(),
        None => "<unset>".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    Warning,
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckLevel::Warning => write!(f, "WARNING"),
            CheckLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Registration-time finding about a field's configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{level} {field}: ({id}) {message}")]
pub struct ConfigurationError {
    /// Stable identifier, e.g. `StateField.required_workflow`
    pub id: &'static str,
    pub level: CheckLevel,
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConfigurationError {
    pub fn error(id: &'static str, field: &str, message: impl Into<String>) -> Self {
        Self {
            id,
            level: CheckLevel::Error,
            field: field.to_string(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn warning(id: &'static str, field: &str, message: impl Into<String>) -> Self {
        Self {
            level: CheckLevel::Warning,
            ..Self::error(id, field, message)
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Whether this finding should abort startup under the given policy
    pub fn is_fatal(&self, warnings_as_errors: bool) -> bool {
        self.level == CheckLevel::Error || warnings_as_errors
    }
}

pub mod ids {
    pub const REQUIRED_WORKFLOW: &str = "StateField.required_workflow";
    pub const INVALID_NAME: &str = "StateField.invalid_name";
    pub const INVALID_MAX_LENGTH: &str = "StateField.invalid_max_length";
    pub const KIND_MISMATCH: &str = "StateField.kind_mismatch";
    pub const STATE_TOO_LONG: &str = "StateField.state_too_long";
    pub const DANGLING_TARGET: &str = "StateField.dangling_target";
    pub const EMPTY_WORKFLOW: &str = "StateField.empty_workflow";
    pub const DUPLICATE_FIELD: &str = "StateField.duplicate_field";
}

/// Errors raised around guards: attachment, descriptors and loading
#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("model '{model}' failed field checks ({} issue(s))", .errors.len())]
    InvalidConfiguration {
        model: String,
        errors: Vec<ConfigurationError>,
    },

    #[error("model '{model}' has no state field '{field}'")]
    UnknownField { model: String, field: String },

    #[error("record of model '{record_model}' used with model '{model}'")]
    RecordModelMismatch { model: String, record_model: String },

    #[error("unknown field path '{0}'")]
    UnknownFieldPath(String),

    #[error("unsupported descriptor format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GuardError {
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::Transition(_) => "INVALID_TRANSITION",
            GuardError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            GuardError::UnknownField { .. } => "UNKNOWN_FIELD",
            GuardError::RecordModelMismatch { .. } => "RECORD_MODEL_MISMATCH",
            GuardError::UnknownFieldPath(_) => "UNKNOWN_FIELD_PATH",
            GuardError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            GuardError::Io(_) => "IO_ERROR",
            GuardError::Json(_) => "JSON_ERROR",
            GuardError::TomlDe(_) | GuardError::TomlSer(_) => "TOML_ERROR",
        }
    }
}
