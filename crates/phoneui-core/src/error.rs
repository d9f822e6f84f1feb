//! Error types shared by every remote call.
//!
//! A [`ServiceError`] is produced either by the remote service itself or by
//! the call machinery around it (timeouts, a closed connection, a reply that
//! does not decode). The bridge never interprets these: it forwards them to
//! the caller's callback as-is.

use thiserror::Error;

// =============================================================================
// Service Errors
// =============================================================================

/// Errors that can occur while issuing or completing a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The remote service answered with an error.
    #[error("remote error {name}: {message}")]
    Remote {
        /// Bus error name (e.g. `org.freesmartphone.GSM.CallError`).
        name: String,
        /// Human readable message supplied by the service.
        message: String,
    },

    /// No reply arrived within the configured call timeout.
    #[error("remote call timed out")]
    Timeout,

    /// The connection is not ready (not yet opened, or already closed).
    #[error("connection is not ready")]
    NotConnected,

    /// The reply could not be decoded into the expected type.
    #[error("failed to decode reply: {0}")]
    Decode(String),

    /// The call was rejected before submission.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport under the bus failed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ServiceError {
    /// Creates a remote error.
    pub fn remote(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for remote calls.
pub type ServiceResult<T> = Result<T, ServiceError>;
