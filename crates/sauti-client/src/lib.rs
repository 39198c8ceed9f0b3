//! HTTP transport and environment integration for the Sauti client.
//!
//! Provides the reqwest-backed [`AssistantApiClient`] implementing
//! `sauti_core::backend::ChatBackend`, concrete location providers, and
//! file/env configuration.

pub mod assistant_api_client;
pub mod config;
pub mod location;

pub use assistant_api_client::{AssistantApiClient, GeocodePoint};
pub use config::{ClientConfig, LocationConfig};
pub use location::{GeocodeLocationProvider, NullLocationProvider, StaticLocationProvider};
