//! Sauti core: session and response normalization for the maternal health
//! assistant backend.
//!
//! The backend's response shape drifts across deployments (`response` vs
//! `reply`, `session_id` vs `sessionId`, `nearby_hospitals` vs
//! `hospitals`). This crate owns the client-side protocol: session
//! lifecycle with lazy recovery, strictly serialized message dispatch,
//! best-effort location, and tolerant normalization of replies and
//! hospital records, degrading gracefully whenever a step fails.
//!
//! The HTTP transport is behind the [`backend::ChatBackend`] trait; the
//! `sauti-client` crate provides the reqwest implementation.

pub mod backend;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod hospital;
pub mod location;
pub mod reply;
pub mod session;

// Re-export common error type
pub use error::{Result, SautiError};
