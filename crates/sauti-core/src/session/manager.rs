use super::model::{ChatSession, SessionStatus};
use crate::backend::ChatBackend;
use crate::reply;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the session lifecycle.
///
/// `SessionManager` is responsible for:
/// - Establishing a session with the backend
/// - Absorbing initialization failures into the `Degraded` state
/// - Adopting a lazily created session id on a later reply (`reconcile`)
///
/// Initialization failure is not fatal: the backend is permitted to create
/// the session on the first message exchange, so a degraded session must
/// still be able to send.
pub struct SessionManager {
    backend: Arc<dyn ChatBackend>,
    /// Most recent initialization failure, kept for observability.
    last_init_failure: RwLock<Option<String>>,
}

impl SessionManager {
    /// Creates a new `SessionManager` over a backend.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            last_init_failure: RwLock::new(None),
        }
    }

    /// Establishes a conversation session for a patient.
    ///
    /// Never propagates backend failure to the caller: on a network or
    /// protocol error the returned session is in `Degraded` state with no
    /// id, and the failure is recorded for diagnostics. A 2xx payload that
    /// carries no recognizable session id is treated the same way.
    pub async fn initialize(&self, patient_id: &str) -> ChatSession {
        let mut session = ChatSession::new(patient_id);
        session.status = SessionStatus::Initializing;

        match self.backend.initialize(patient_id).await {
            Ok(raw) => match reply::session_id_of(&raw) {
                Some(id) => {
                    tracing::debug!(session_id = %id, "chat session established");
                    session.id = Some(id);
                    session.status = SessionStatus::Active;
                }
                None => {
                    self.mark_degraded(
                        &mut session,
                        "initialize response carried no session id".to_string(),
                    )
                    .await;
                }
            },
            Err(err) => {
                self.mark_degraded(&mut session, err.to_string()).await;
            }
        }

        session.last_activity_at = chrono::Utc::now().to_rfc3339();
        session
    }

    /// Folds a reply-supplied session id into the session.
    ///
    /// If the session has no id yet and the reply supplies one, the id is
    /// adopted and the session transitions to `Active`. A confirmed id is
    /// immutable for the lifetime of the session object, so a stale id from
    /// a later reply never clobbers it. Always refreshes `last_activity_at`.
    pub fn reconcile(&self, session: &mut ChatSession, new_session_id: Option<&str>) {
        if session.id.is_none()
            && let Some(id) = new_session_id
        {
            tracing::debug!(session_id = %id, "adopted lazily created session id");
            session.id = Some(id.to_string());
            session.status = SessionStatus::Active;
        }
        session.last_activity_at = chrono::Utc::now().to_rfc3339();
    }

    /// Returns the most recent initialization failure, if any.
    pub async fn last_init_failure(&self) -> Option<String> {
        self.last_init_failure.read().await.clone()
    }

    async fn mark_degraded(&self, session: &mut ChatSession, reason: String) {
        tracing::warn!(patient_id = %session.patient_id, reason = %reason,
            "session initialization failed, continuing degraded");
        *self.last_init_failure.write().await = Some(reason);
        session.status = SessionStatus::Degraded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MessageRequest;
    use crate::error::{Result, SautiError};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    // Mock backend with a scripted initialize result
    struct MockBackend {
        init_result: std::result::Result<Value, SautiError>,
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn initialize(&self, _patient_id: &str) -> Result<Value> {
            self.init_result.clone()
        }

        async fn send_message(&self, _request: &MessageRequest) -> Result<Value> {
            Ok(json!({"response": "ok"}))
        }
    }

    fn manager_with(init_result: std::result::Result<Value, SautiError>) -> SessionManager {
        SessionManager::new(Arc::new(MockBackend { init_result }))
    }

    #[tokio::test]
    async fn test_initialize_success_is_active() {
        let manager = manager_with(Ok(json!({"session_id": "s-1"})));

        let session = manager.initialize("p-1").await;

        assert_eq!(session.id, Some("s-1".to_string()));
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.patient_id, "p-1");
        assert!(manager.last_init_failure().await.is_none());
    }

    #[tokio::test]
    async fn test_initialize_accepts_camel_case_session_id() {
        let manager = manager_with(Ok(json!({"sessionId": "s-camel"})));

        let session = manager.initialize("p-1").await;

        assert_eq!(session.id, Some("s-camel".to_string()));
    }

    #[tokio::test]
    async fn test_initialize_failure_degrades_instead_of_erroring() {
        let manager = manager_with(Err(SautiError::session_init("connection refused")));

        let session = manager.initialize("p-1").await;

        assert_eq!(session.id, None);
        assert_eq!(session.status, SessionStatus::Degraded);
        let failure = manager.last_init_failure().await.unwrap();
        assert!(failure.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_initialize_without_session_id_degrades() {
        let manager = manager_with(Ok(json!({"status": "ok"})));

        let session = manager.initialize("p-1").await;

        assert_eq!(session.id, None);
        assert_eq!(session.status, SessionStatus::Degraded);
        assert!(manager.last_init_failure().await.is_some());
    }

    #[tokio::test]
    async fn test_reconcile_adopts_id_on_degraded_session() {
        let manager = manager_with(Err(SautiError::session_init("down")));
        let mut session = manager.initialize("p-1").await;

        manager.reconcile(&mut session, Some("abc123"));

        assert_eq!(session.id, Some("abc123".to_string()));
        assert_eq!(session.status, SessionStatus::Active);
    }

    #[tokio::test]
    async fn test_reconcile_never_overwrites_a_confirmed_id() {
        let manager = manager_with(Ok(json!({"session_id": "first"})));
        let mut session = manager.initialize("p-1").await;

        manager.reconcile(&mut session, Some("second"));
        manager.reconcile(&mut session, None);

        assert_eq!(session.id, Some("first".to_string()));
        assert_eq!(session.status, SessionStatus::Active);
    }
}
