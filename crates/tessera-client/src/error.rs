//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from server, `unknown` when none was sent.
        code: String,
        /// Error message from server.
        message: String,
    },

    /// Response body parsed but has the wrong shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Gave up waiting for a workflow execution.
    #[error("Timed out waiting for execution {0}")]
    Timeout(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// The request could not be completed: transport failure, bad target,
    /// or a non-success status.
    pub fn is_network(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_decode(),
            Error::InvalidUrl(_) | Error::Api { .. } | Error::Config(_) => true,
            _ => false,
        }
    }

    /// The request completed but its body could not be understood.
    pub fn is_decode(&self) -> bool {
        match self {
            Error::Http(e) => e.is_decode(),
            Error::Json(_) | Error::Decode(_) => true,
            _ => false,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the server, in either `{code, message}` or
/// `{error}` form.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}
