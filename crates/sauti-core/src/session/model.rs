//! Chat session domain model.
//!
//! This module contains the core ChatSession entity that represents one
//! logical conversation thread with the assistant backend.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a chat session.
///
/// Transitions: `Uninitialized → Initializing → {Active | Degraded}`.
/// From `Degraded`, a successful message exchange that returns a session id
/// moves the session to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum SessionStatus {
    /// No initialization attempt has been made yet.
    Uninitialized,
    /// Initialization request is in flight.
    Initializing,
    /// The backend has confirmed a session id.
    Active,
    /// No confirmed session id, but the conversation may proceed; the
    /// backend is permitted to create the session lazily on first message.
    Degraded,
}

/// Represents one conversation session with the assistant backend.
///
/// The session is owned by the conversation that created it and is mutated
/// only through [`SessionManager`](super::SessionManager) lifecycle
/// transitions. It is destroyed with the conversation; no persistence is
/// implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Backend-issued session identifier. `None` until the backend confirms
    /// one; once set it is immutable for the lifetime of the session.
    pub id: Option<String>,
    /// Identifier of the patient this conversation belongs to.
    pub patient_id: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp of the last activity on this session (ISO 8601 format)
    pub last_activity_at: String,
}

impl ChatSession {
    /// Creates a fresh, uninitialized session for a patient.
    pub fn new(patient_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            patient_id: patient_id.into(),
            status: SessionStatus::Uninitialized,
            created_at: now.clone(),
            last_activity_at: now,
        }
    }

    /// Returns true if the backend has confirmed a session id.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
