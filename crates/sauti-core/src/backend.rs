//! Backend trait seam.
//!
//! The concrete HTTP transport lives in the client crate; core only sees
//! this trait. Both operations return the raw JSON payload so that the
//! normalizers can absorb the backend's shape drift in one place.

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Wire body of one message round-trip.
///
/// The backend contract requires every key to be present; a missing session
/// id or location serializes as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub session_id: Option<String>,
    pub patient_id: String,
    pub message: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The remote assistant backend, treated as an opaque service over HTTP.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Establishes a conversation session for a patient.
    ///
    /// # Returns
    ///
    /// The raw response payload; callers extract the session id tolerantly
    /// via [`reply::session_id_of`](crate::reply::session_id_of).
    async fn initialize(&self, patient_id: &str) -> Result<Value>;

    /// Delivers one user message and returns the raw reply payload.
    async fn send_message(&self, request: &MessageRequest) -> Result<Value>;
}
