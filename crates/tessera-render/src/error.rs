//! Error types for the render crate.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure while executing an action handler.
///
/// Always surfaced to the caller; the session state is left untouched.
#[derive(Debug, Clone, Error)]
pub enum ActionDispatchError {
    /// The request could not be completed, including non-success statuses.
    #[error("Network error calling {url}: {message}")]
    Network { url: String, message: String },

    /// The response body was not a JSON object.
    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The handler is missing configuration it needs to run.
    #[error("Action '{action}' has no {field} configured")]
    MissingConfig { action: String, field: &'static str },

    /// A registered custom handler failed.
    #[error("Custom handler '{function}' failed: {message}")]
    Custom { function: String, message: String },
}

impl ActionDispatchError {
    /// Whether this is a network failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether this is a decode failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Error type for rendering-session operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No component with this id exists in the config.
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    /// The component declares no action with this id.
    #[error("Unknown action '{action}' on component '{component}'")]
    UnknownAction { component: String, action: String },

    /// The component is currently hidden and cannot be interacted with.
    #[error("Component '{0}' is not visible")]
    NotVisible(String),

    /// The action handler failed.
    #[error(transparent)]
    Dispatch(#[from] ActionDispatchError),
}

/// Why a visibility condition could not be evaluated.
///
/// Never surfaced: the evaluator logs it and treats the condition as false.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisibilityEvaluationError {
    /// `gt`/`lt` with an operand that is not a number.
    #[error("'{field}' {operator}: operands must both be numbers")]
    NonNumeric { field: String, operator: &'static str },

    /// `contains` against a value that has no string or sequence form.
    #[error("'{field}' contains: unsupported operand types")]
    UnsupportedOperand { field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_errors_convert_into_session_errors() {
        let err: SessionError = ActionDispatchError::Network {
            url: "http://localhost/x".to_string(),
            message: "HTTP 500".to_string(),
        }
        .into();
        assert!(matches!(err, SessionError::Dispatch(ref e) if e.is_network()));
        assert!(err.to_string().contains("HTTP 500"));
    }
}
