//! Error types for the Sauti client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Sauti protocol client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
///
/// Location denial is deliberately absent from this taxonomy: an unavailable
/// location is a valid outcome (`None`), not an error.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SautiError {
    /// Session initialization failed. Non-fatal: the session continues in a
    /// degraded state and may recover lazily on the first message exchange.
    #[error("Session initialization failed: {0}")]
    SessionInit(String),

    /// A message could not be delivered (connection error, timeout, or a
    /// non-2xx status from the backend).
    #[error("Message delivery failed: {message}")]
    SendFailure {
        status_code: Option<u16>,
        message: String,
    },

    /// The backend payload is not a keyed structure at all. All other shape
    /// variance is absorbed by the normalizers.
    #[error("Backend response is not a JSON object: {0}")]
    InvalidResponseShape(String),

    /// A send is already in flight on this session. Sends are strictly
    /// serialized per session to preserve message ordering.
    #[error("A message send is already in flight for this session")]
    SendInProgress,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SautiError {
    /// Creates a SessionInit error
    pub fn session_init(message: impl Into<String>) -> Self {
        Self::SessionInit(message.into())
    }

    /// Creates a SendFailure error without an HTTP status.
    pub fn send_failure(message: impl Into<String>) -> Self {
        Self::SendFailure {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates a SendFailure error carrying the backend's HTTP status.
    pub fn send_failure_with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::SendFailure {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates an InvalidResponseShape error
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidResponseShape(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a SendInProgress rejection
    pub fn is_send_in_progress(&self) -> bool {
        matches!(self, Self::SendInProgress)
    }

    /// Check if this is a delivery failure
    pub fn is_send_failure(&self) -> bool {
        matches!(self, Self::SendFailure { .. })
    }

    /// Check if this is a structurally unusable payload
    pub fn is_invalid_shape(&self) -> bool {
        matches!(self, Self::InvalidResponseShape(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for SautiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SautiError {
    fn from(err: reqwest::Error) -> Self {
        Self::SendFailure {
            status_code: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SautiError>`.
pub type Result<T> = std::result::Result<T, SautiError>;
