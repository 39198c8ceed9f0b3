//! Location types and the provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One best-effort geolocation fix.
///
/// At most one sample exists per session; once obtained it is cached by the
/// conversation and reused for every send, never re-requested mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated accuracy in meters, when the source reports one.
    pub accuracy: Option<f64>,
    /// Timestamp when the fix was obtained (ISO 8601 format).
    pub obtained_at: String,
}

impl LocationSample {
    /// Creates a sample at the given coordinates, stamped with the current
    /// time.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            obtained_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Source of best-effort, one-shot geolocation.
///
/// `acquire` makes exactly one attempt. A missing capability, a denied or
/// ignored permission prompt, and an elapsed timeout all resolve to `None`:
/// "unknown location" is a valid outcome, not an error. Providers never
/// retry on their own; a fresh `acquire` call is a new explicit attempt.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Attempts one geolocation fix, bounded by `timeout`.
    async fn acquire(&self, timeout: Duration) -> Option<LocationSample>;
}
