//! Unified error types for the Veld client core.
//!
//! HTTP-surface errors (`HttpError`, `ValidationError`) live in the client
//! crate next to the REST wrapper that produces them.

use thiserror::Error;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors produced while decoding a wire payload into a typed model.
///
/// A decode failure is contained inside the dispatch layer: the event is
/// logged and dropped, listeners never observe a partially-decoded object.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// A required field was absent or had the wrong shape.
    #[error("malformed {kind} payload: {reason}")]
    Malformed {
        /// The model type being decoded.
        kind: &'static str,
        /// Reason for failure.
        reason: String,
    },
}

impl DecodeError {
    /// Creates a `Malformed` error for the given model type.
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// No connection is currently open.
    #[error("not connected to the gateway")]
    NotConnected,

    /// Outbound send failed.
    #[error("failed to send frame: {0}")]
    SendFailed(String),

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::SendFailed(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
