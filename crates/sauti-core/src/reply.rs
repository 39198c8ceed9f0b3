//! Normalization of assistant reply payloads.
//!
//! The backend's response shape is known to drift across deployments: the
//! reply text arrives under `response` or `reply`, the session id under
//! `session_id` or `sessionId`, and recommendations under `nearby_hospitals`
//! or `hospitals`. Rather than special-casing every call site, the variants
//! are reconciled here once, with a first-present-key strategy.

use crate::error::{Result, SautiError};
use crate::hospital::{self, HospitalRecord};
use serde_json::Value;

/// Fallback reply text when the backend returns neither `response` nor
/// `reply`. The conversation always has something to show.
pub const NO_RESPONSE_TEXT: &str = "No response from assistant.";

/// The normalized result of one backend message exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    /// Reply text to display.
    pub text: String,
    /// Session id supplied by the backend, when it created or confirmed one.
    pub new_session_id: Option<String>,
    /// Normalized hospital recommendations, possibly empty.
    pub hospitals: Vec<HospitalRecord>,
}

/// Reconciles a raw backend payload into an [`AssistantReply`].
///
/// Fails with [`SautiError::InvalidResponseShape`] only when the payload is
/// not a JSON object at all; every other shape variance is absorbed.
pub fn normalize(raw: &Value) -> Result<AssistantReply> {
    let object = raw
        .as_object()
        .ok_or_else(|| SautiError::invalid_shape(describe_value(raw)))?;

    let text = object
        .get("response")
        .and_then(Value::as_str)
        .or_else(|| object.get("reply").and_then(Value::as_str))
        .unwrap_or(NO_RESPONSE_TEXT)
        .to_string();

    let hospitals = object
        .get("nearby_hospitals")
        .and_then(Value::as_array)
        .or_else(|| object.get("hospitals").and_then(Value::as_array))
        .map(|list| hospital::normalize(list))
        .unwrap_or_default();

    Ok(AssistantReply {
        text,
        new_session_id: session_id_of(raw),
        hospitals,
    })
}

/// Extracts a session id from a raw payload, accepting both the snake_case
/// and camelCase spellings. Used for message replies and for the initialize
/// response alike.
pub fn session_id_of(raw: &Value) -> Option<String> {
    raw.get("session_id")
        .and_then(Value::as_str)
        .or_else(|| raw.get("sessionId").and_then(Value::as_str))
        .map(str::to_string)
}

fn describe_value(raw: &Value) -> String {
    match raw {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
