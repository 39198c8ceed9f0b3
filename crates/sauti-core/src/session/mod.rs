//! Session domain module.
//!
//! This module contains the session model, conversation message types, and
//! the lifecycle manager.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`ChatSession`, `SessionStatus`)
//! - `message`: Conversation message types (`MessageRole`, `ConversationMessage`)
//! - `manager`: Session lifecycle management (`SessionManager`)

mod manager;
mod message;
mod model;

// Re-export public API
pub use manager::SessionManager;
pub use message::{ConversationMessage, MessageRole};
pub use model::{ChatSession, SessionStatus};
