//! Error types for the client crate's REST surface.

use thiserror::Error;

/// Caller-supplied arguments violated a precondition.
///
/// Raised before any network I/O happens.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub String);

/// Errors from the HTTP gateway surface.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request could not be sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The gateway answered with an unexpected status code.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Body(String),

    /// Argument validation failed before the request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for HTTP gateway operations.
pub type HttpResult<T> = Result<T, HttpError>;
