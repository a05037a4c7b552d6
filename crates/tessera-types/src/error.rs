//! Error types for UI configuration loading.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A malformed UI configuration, rejected at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read UI config '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the schema.
    #[error("failed to parse UI config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field is missing or empty.
    #[error("missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Two components share an id.
    #[error("duplicate component id '{0}'")]
    DuplicateComponentId(String),

    /// Two actions on the same component share an id.
    #[error("duplicate action id '{action}' on component '{component}'")]
    DuplicateActionId { component: String, action: String },

    /// Component type outside the closed set (strict validation only).
    #[error("unknown component type '{kind}' on component '{component}'")]
    UnknownComponentType { component: String, kind: String },

    /// Widget options do not match the component type's schema.
    #[error("invalid {kind} options on component '{component}': {message}")]
    InvalidOptions {
        component: String,
        kind: String,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }
}
