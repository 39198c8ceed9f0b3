//! One message round-trip, serialized per session.

use crate::backend::{ChatBackend, MessageRequest};
use crate::error::{Result, SautiError};
use crate::location::LocationSample;
use crate::reply::{self, AssistantReply};
use crate::session::{ChatSession, SessionManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Orchestrates one round-trip: compose request, send, normalize the reply,
/// fold the result back into the session.
///
/// At most one send per session may be in flight. A second call while busy
/// is rejected with [`SautiError::SendInProgress`] instead of interleaving
/// requests, which preserves message ordering. The flag is cleared on every
/// exit path, so after a timeout or failure a new send may proceed.
pub struct MessageDispatcher {
    backend: Arc<dyn ChatBackend>,
    manager: Arc<SessionManager>,
    busy: AtomicBool,
}

impl MessageDispatcher {
    /// Creates a dispatcher over a backend and the session's manager.
    pub fn new(backend: Arc<dyn ChatBackend>, manager: Arc<SessionManager>) -> Self {
        Self {
            backend,
            manager,
            busy: AtomicBool::new(false),
        }
    }

    /// Returns true while a send is in flight on this session.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Delivers one user message.
    ///
    /// The request body carries the session id, patient id, message text,
    /// and the cached location coordinates, with explicit nulls for
    /// whatever is unknown. On success the reply is normalized and the
    /// session reconciled before the reply is returned.
    ///
    /// # Errors
    ///
    /// - [`SautiError::SendInProgress`] when a send is already in flight
    /// - [`SautiError::SendFailure`] on connection errors, timeouts, and
    ///   non-2xx statuses
    /// - [`SautiError::InvalidResponseShape`] when the payload is not a
    ///   JSON object
    pub async fn send(
        &self,
        session: &Mutex<ChatSession>,
        text: &str,
        location: Option<&LocationSample>,
    ) -> Result<AssistantReply> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SautiError::SendInProgress);
        }
        let _busy = BusyGuard(&self.busy);

        // Snapshot what the request needs; the lock is never held across
        // the backend call. Ordering is the busy flag's job.
        let request = {
            let session = session.lock().await;
            MessageRequest {
                session_id: session.id.clone(),
                patient_id: session.patient_id.clone(),
                message: text.to_string(),
                latitude: location.map(|l| l.latitude),
                longitude: location.map(|l| l.longitude),
            }
        };

        tracing::debug!(
            session_id = request.session_id.as_deref().unwrap_or("<none>"),
            "sending message"
        );

        let raw = self.backend.send_message(&request).await?;
        let assistant_reply = reply::normalize(&raw)?;

        {
            let mut session = session.lock().await;
            self.manager
                .reconcile(&mut session, assistant_reply.new_session_id.as_deref());
        }

        Ok(assistant_reply)
    }
}

/// Clears the busy flag when the send settles, on every path out.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
