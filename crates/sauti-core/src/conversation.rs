//! Conversation facade.
//!
//! Owns the session, the append-only history, and the location sample for
//! one conversation with the assistant. This is the surface a UI shell
//! talks to; auth gating, rendering, and routing stay outside.

use crate::backend::ChatBackend;
use crate::dispatcher::MessageDispatcher;
use crate::error::{Result, SautiError};
use crate::location::{LocationProvider, LocationSample};
use crate::reply::AssistantReply;
use crate::session::{ChatSession, ConversationMessage, SessionManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Greeting seeded into every new conversation.
pub const GREETING_TEXT: &str =
    "Hello! I'm your maternal health assistant. How can I help you today?";

/// Synthetic assistant message appended when a delivery fails. The user's
/// own message is never discarded; it stays in the history for retry.
pub const APOLOGY_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// One conversation with the assistant backend.
///
/// The session is created at start and destroyed with this value; nothing
/// is persisted. Location is acquired once, concurrently with session
/// initialization, and the sample (or its absence) is reused for every
/// send.
pub struct Conversation {
    dispatcher: MessageDispatcher,
    manager: Arc<SessionManager>,
    session: Mutex<ChatSession>,
    history: Vec<ConversationMessage>,
    location: Option<LocationSample>,
}

impl Conversation {
    /// Starts a conversation for a patient.
    ///
    /// Session initialization and the one-shot location acquisition run
    /// concurrently; both have settled by the time this returns, so the
    /// first send sees their results. A failed initialization yields a
    /// degraded (still usable) session rather than an error.
    pub async fn start(
        backend: Arc<dyn ChatBackend>,
        locations: Arc<dyn LocationProvider>,
        patient_id: &str,
        location_timeout: Duration,
    ) -> Self {
        let manager = Arc::new(SessionManager::new(backend.clone()));

        let (session, location) = tokio::join!(
            manager.initialize(patient_id),
            locations.acquire(location_timeout),
        );

        Self {
            dispatcher: MessageDispatcher::new(backend, manager.clone()),
            manager,
            session: Mutex::new(session),
            history: vec![ConversationMessage::assistant(GREETING_TEXT)],
            location,
        }
    }

    /// Starts a conversation for a patient who has no identifier.
    ///
    /// Each anonymous conversation gets a fresh patient id so histories
    /// never collide on the backend.
    pub async fn start_anonymous(
        backend: Arc<dyn ChatBackend>,
        locations: Arc<dyn LocationProvider>,
        location_timeout: Duration,
    ) -> Self {
        let patient_id = format!("anonymous-{}", uuid::Uuid::new_v4());
        Self::start(backend, locations, &patient_id, location_timeout).await
    }

    /// Sends one user message and appends the exchange to the history.
    ///
    /// Blank input and sends attempted while another is in flight are
    /// ignored (`Ok(None)`), appending nothing. On success the user message
    /// and one assistant message (with any hospital recommendations as
    /// attachments) are appended and the reply returned. On delivery
    /// failure the user message is retained, exactly one apology message is
    /// appended, and the error is returned for the caller's banner.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<AssistantReply>> {
        let text = text.trim();
        if text.is_empty() || self.dispatcher.is_busy() {
            return Ok(None);
        }

        self.history.push(ConversationMessage::user(text));

        match self
            .dispatcher
            .send(&self.session, text, self.location.as_ref())
            .await
        {
            Ok(assistant_reply) => {
                self.history.push(ConversationMessage::assistant_with_hospitals(
                    assistant_reply.text.clone(),
                    assistant_reply.hospitals.clone(),
                ));
                Ok(Some(assistant_reply))
            }
            Err(SautiError::SendInProgress) => {
                // Lost the admission race; withdraw the not-yet-sent message.
                self.history.pop();
                Ok(None)
            }
            Err(err) => {
                if err.is_invalid_shape() {
                    tracing::error!(error = %err, "assistant payload was structurally unusable");
                } else {
                    tracing::warn!(error = %err, "message delivery failed");
                }
                self.history.push(ConversationMessage::assistant(APOLOGY_TEXT));
                Err(err)
            }
        }
    }

    /// The conversation history, in insertion order.
    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// A snapshot of the current session state.
    pub async fn session(&self) -> ChatSession {
        self.session.lock().await.clone()
    }

    /// The cached location sample, if one was obtained at start.
    pub fn location(&self) -> Option<&LocationSample> {
        self.location.as_ref()
    }

    /// The recorded initialization failure, if the session started degraded.
    pub async fn init_failure(&self) -> Option<String> {
        self.manager.last_init_failure().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MessageRequest;
    use crate::session::{MessageRole, SessionStatus};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex as StdMutex;

    struct ScriptedBackend {
        init_result: std::result::Result<Value, SautiError>,
        send_results: StdMutex<Vec<std::result::Result<Value, SautiError>>>,
        requests: StdMutex<Vec<MessageRequest>>,
    }

    impl ScriptedBackend {
        fn new(
            init_result: std::result::Result<Value, SautiError>,
            send_results: Vec<std::result::Result<Value, SautiError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                init_result,
                send_results: StdMutex::new(send_results),
                requests: StdMutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn initialize(&self, _patient_id: &str) -> crate::error::Result<Value> {
            self.init_result.clone()
        }

        async fn send_message(&self, request: &MessageRequest) -> crate::error::Result<Value> {
            self.requests.lock().unwrap().push(request.clone());
            self.send_results.lock().unwrap().remove(0)
        }
    }

    struct FixedLocation(Option<LocationSample>);

    #[async_trait]
    impl LocationProvider for FixedLocation {
        async fn acquire(&self, _timeout: Duration) -> Option<LocationSample> {
            self.0.clone()
        }
    }

    fn no_location() -> Arc<FixedLocation> {
        Arc::new(FixedLocation(None))
    }

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_start_seeds_greeting_even_when_init_fails() {
        let backend = ScriptedBackend::new(Err(SautiError::session_init("offline")), vec![]);

        let conversation = Conversation::start(backend, no_location(), "p-1", TIMEOUT).await;

        assert_eq!(conversation.history().len(), 1);
        assert_eq!(conversation.history()[0].role, MessageRole::Assistant);
        assert_eq!(conversation.history()[0].content, GREETING_TEXT);
        assert_eq!(conversation.session().await.status, SessionStatus::Degraded);
        assert!(conversation.init_failure().await.is_some());
    }

    #[tokio::test]
    async fn test_degraded_session_recovers_on_first_send() {
        let backend = ScriptedBackend::new(
            Err(SautiError::session_init("offline")),
            vec![Ok(json!({"response": "Rest and hydrate.", "session_id": "abc123"}))],
        );

        let mut conversation =
            Conversation::start(backend, no_location(), "p-1", TIMEOUT).await;
        let reply = conversation
            .send_message("I have a headache")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply.text, "Rest and hydrate.");
        let session = conversation.session().await;
        assert_eq!(session.id, Some("abc123".to_string()));
        assert_eq!(session.status, SessionStatus::Active);

        let roles: Vec<MessageRole> = conversation.history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
    }

    #[tokio::test]
    async fn test_send_failure_keeps_user_message_and_adds_one_apology() {
        let backend = ScriptedBackend::new(
            Ok(json!({"session_id": "s-1"})),
            vec![Err(SautiError::send_failure("connection reset"))],
        );

        let mut conversation =
            Conversation::start(backend, no_location(), "p-1", TIMEOUT).await;
        let err = conversation.send_message("hello?").await.unwrap_err();

        assert!(err.is_send_failure());
        let history = conversation.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, MessageRole::User);
        assert_eq!(history[1].content, "hello?");
        assert_eq!(history[2].content, APOLOGY_TEXT);
        // Session id untouched by the failed exchange.
        assert_eq!(conversation.session().await.id, Some("s-1".to_string()));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let backend = ScriptedBackend::new(Ok(json!({"session_id": "s-1"})), vec![]);

        let mut conversation =
            Conversation::start(backend.clone(), no_location(), "p-1", TIMEOUT).await;
        let outcome = conversation.send_message("   ").await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(conversation.history().len(), 1);
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hospital_recommendations_arrive_as_attachments() {
        let backend = ScriptedBackend::new(
            Ok(json!({"session_id": "s-1"})),
            vec![Ok(json!({
                "reply": "ok",
                "hospitals": [
                    {"name": "Clinic A", "distance": 1.2},
                    {"name": "Clinic B", "vicinity": "Rd 2"},
                ],
            }))],
        );

        let mut conversation =
            Conversation::start(backend, no_location(), "p-1", TIMEOUT).await;
        conversation.send_message("find nearby hospitals").await.unwrap();

        let assistant = &conversation.history()[2];
        assert_eq!(assistant.content, "ok");
        assert_eq!(assistant.attachments.len(), 2);
        assert_eq!(assistant.attachments[0].name, "Clinic A");
        assert_eq!(assistant.attachments[0].distance_km, Some(1.2));
        assert_eq!(assistant.attachments[1].name, "Clinic B");
        assert_eq!(assistant.attachments[1].address, "Rd 2");
    }

    #[tokio::test]
    async fn test_cached_location_rides_along_on_every_send() {
        let backend = ScriptedBackend::new(
            Ok(json!({"session_id": "s-1"})),
            vec![
                Ok(json!({"response": "first"})),
                Ok(json!({"response": "second"})),
            ],
        );
        let provider = Arc::new(FixedLocation(Some(LocationSample::at(-1.2921, 36.8219))));

        let mut conversation =
            Conversation::start(backend.clone(), provider, "p-1", TIMEOUT).await;
        conversation.send_message("one").await.unwrap();
        conversation.send_message("two").await.unwrap();

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        for request in requests.iter() {
            assert_eq!(request.latitude, Some(-1.2921));
            assert_eq!(request.longitude, Some(36.8219));
        }
    }

    #[tokio::test]
    async fn test_anonymous_conversations_get_distinct_patient_ids() {
        let backend = ScriptedBackend::new(Ok(json!({"session_id": "s-1"})), vec![]);

        let a = Conversation::start_anonymous(backend.clone(), no_location(), TIMEOUT).await;
        let b = Conversation::start_anonymous(backend, no_location(), TIMEOUT).await;

        let (a, b) = (a.session().await, b.session().await);
        assert!(a.patient_id.starts_with("anonymous-"));
        assert_ne!(a.patient_id, b.patient_id);
    }
}
