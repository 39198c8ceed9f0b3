//! Conversation message types.

use crate::hospital::HospitalRecord;
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a conversation history.
///
/// Messages are append-only: once pushed onto a history they are never
/// mutated, and insertion order is conversation order. Hospital
/// recommendations returned alongside an assistant reply travel as
/// attachments of that message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Normalized hospital records attached to this message, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<HospitalRecord>,
}

impl ConversationMessage {
    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            attachments: Vec::new(),
        }
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            attachments: Vec::new(),
        }
    }

    /// Creates an assistant message carrying hospital recommendations.
    pub fn assistant_with_hospitals(
        content: impl Into<String>,
        hospitals: Vec<HospitalRecord>,
    ) -> Self {
        Self {
            attachments: hospitals,
            ..Self::assistant(content)
        }
    }
}
