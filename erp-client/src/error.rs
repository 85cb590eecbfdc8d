//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not a valid OData JSON envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// Server handed out a continuation link that was already followed
    #[error("Continuation link repeated: {0}")]
    RepeatedCursor(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Configuration error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
