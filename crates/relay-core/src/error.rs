//! Unified error types for the relay core.
//!
//! Transport and API errors are shared by every crate in the workspace.
//! Decode errors live next to the wire format in `relay-retweet`, and
//! configuration errors in `relay-runtime`.

use thiserror::Error;

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

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// Error reported by the underlying WebSocket stream.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Creates a connection failure error.
    pub fn connection_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by outbound messaging API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The API connection is not established.
    #[error("bot is not connected")]
    NotConnected,

    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,

    /// The API returned a non-zero retcode.
    #[error("API error ({retcode}): {message}")]
    ApiError { retcode: i64, message: String },

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
