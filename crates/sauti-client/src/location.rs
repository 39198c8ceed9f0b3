//! Concrete location providers.
//!
//! Each provider makes exactly one attempt per `acquire` call and collapses
//! every failure mode into `None`; an unknown location is a valid outcome
//! the rest of the client is built to handle.

use crate::assistant_api_client::AssistantApiClient;
use async_trait::async_trait;
use sauti_core::location::{LocationProvider, LocationSample};
use std::time::Duration;

/// Fixed coordinates from configuration.
pub struct StaticLocationProvider {
    latitude: f64,
    longitude: f64,
}

impl StaticLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn acquire(&self, _timeout: Duration) -> Option<LocationSample> {
        Some(LocationSample::at(self.latitude, self.longitude))
    }
}

/// The "no location capability" environment.
pub struct NullLocationProvider;

#[async_trait]
impl LocationProvider for NullLocationProvider {
    async fn acquire(&self, _timeout: Duration) -> Option<LocationSample> {
        None
    }
}

/// Resolves a configured address through the backend's geocode endpoint.
///
/// The whole attempt is bounded by the acquire timeout; an HTTP failure, an
/// unknown address, and an elapsed timeout all log a warning and resolve to
/// `None`.
pub struct GeocodeLocationProvider {
    client: AssistantApiClient,
    address: String,
}

impl GeocodeLocationProvider {
    pub fn new(client: AssistantApiClient, address: impl Into<String>) -> Self {
        Self {
            client,
            address: address.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for GeocodeLocationProvider {
    async fn acquire(&self, timeout: Duration) -> Option<LocationSample> {
        match tokio::time::timeout(timeout, self.client.geocode(&self.address)).await {
            Ok(Ok(Some(point))) => Some(LocationSample::at(point.latitude, point.longitude)),
            Ok(Ok(None)) => {
                tracing::warn!(address = %self.address, "address could not be geocoded");
                None
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "geocode request failed");
                None
            }
            Err(_) => {
                tracing::warn!(address = %self.address, "geocode attempt timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_static_provider_always_yields_its_coordinates() {
        let provider = StaticLocationProvider::new(-1.2921, 36.8219);

        let sample = provider.acquire(TIMEOUT).await.unwrap();

        assert_eq!(sample.latitude, -1.2921);
        assert_eq!(sample.longitude, 36.8219);
        assert_eq!(sample.accuracy, None);
    }

    #[tokio::test]
    async fn test_null_provider_never_yields() {
        assert!(NullLocationProvider.acquire(TIMEOUT).await.is_none());
    }
}
