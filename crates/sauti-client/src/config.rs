//! Configuration file management for the Sauti client.
//!
//! Supports reading `~/.config/sauti/config.json`, with environment
//! variables filling in whatever the file leaves unset.

use crate::assistant_api_client::AssistantApiClient;
use crate::location::{GeocodeLocationProvider, NullLocationProvider, StaticLocationProvider};
use sauti_core::location::LocationProvider;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Root configuration structure for config.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub location: Option<LocationConfig>,
}

/// Location source configuration.
///
/// Fixed coordinates win over a geocodable address; with neither set the
/// client runs without location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

impl ClientConfig {
    /// Loads the configuration file, falling back to environment variables
    /// for anything unset. A missing file is not an error; it simply means
    /// everything comes from the environment or defaults.
    pub fn load() -> Self {
        let from_file = config_path()
            .ok()
            .filter(|path| path.exists())
            .and_then(|path| Self::from_file(&path).ok())
            .unwrap_or_default();
        from_file.with_env_fallbacks()
    }

    /// Loads the configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| {
            format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            )
        })
    }

    /// Builds the API client this configuration describes.
    pub fn api_client(&self) -> AssistantApiClient {
        let client = match &self.api_url {
            Some(url) => AssistantApiClient::new(url.clone()),
            None => AssistantApiClient::from_env(),
        };
        match self.request_timeout_secs {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => client,
        }
    }

    /// Selects the location provider this configuration describes.
    pub fn location_provider(&self) -> Arc<dyn LocationProvider> {
        let location = self.location.clone().unwrap_or_default();

        if let (Some(latitude), Some(longitude)) = (location.latitude, location.longitude) {
            return Arc::new(StaticLocationProvider::new(latitude, longitude));
        }
        if let Some(address) = location.address {
            return Arc::new(GeocodeLocationProvider::new(self.api_client(), address));
        }
        Arc::new(NullLocationProvider)
    }

    fn with_env_fallbacks(mut self) -> Self {
        if self.api_url.is_none() {
            self.api_url = env::var("SAUTI_API_URL").ok();
        }
        if self.request_timeout_secs.is_none() {
            self.request_timeout_secs = env::var("SAUTI_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok());
        }

        let mut location = self.location.unwrap_or_default();
        if location.latitude.is_none() {
            location.latitude = env::var("SAUTI_LATITUDE").ok().and_then(|v| v.parse().ok());
        }
        if location.longitude.is_none() {
            location.longitude = env::var("SAUTI_LONGITUDE").ok().and_then(|v| v.parse().ok());
        }
        if location.address.is_none() {
            location.address = env::var("SAUTI_LOCATION_ADDRESS").ok();
        }
        self.location = Some(location);

        self
    }
}

/// Returns the path to the configuration file: ~/.config/sauti/config.json
fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;
    Ok(home.join(".config").join("sauti").join("config.json"))
}
