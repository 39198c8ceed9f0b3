//! AssistantApiClient - REST client for the Sauti assistant backend.
//!
//! The backend is an opaque HTTP service; this client speaks its four
//! endpoints and maps transport failures into the protocol error taxonomy.
//! Response payloads are returned raw so the core normalizers can absorb
//! the backend's shape drift in one place.

use async_trait::async_trait;
use reqwest::{Client, Url};
use sauti_core::backend::{ChatBackend, MessageRequest};
use sauti_core::error::{Result, SautiError};
use sauti_core::hospital::{self, HospitalRecord};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the assistant backend's HTTP API.
#[derive(Clone)]
pub struct AssistantApiClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

/// Coordinates resolved from an address by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
}

#[derive(Serialize)]
struct NearbyClinicsRequest {
    latitude: f64,
    longitude: f64,
    radius: u32,
}

impl AssistantApiClient {
    /// Creates a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a client from the environment.
    ///
    /// Reads `SAUTI_API_URL`, defaulting to `http://localhost:8000`.
    pub fn from_env() -> Self {
        let base_url = env::var("SAUTI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    /// Overrides the per-request timeout after construction.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Fetches nearby clinics for a coordinate pair.
    ///
    /// `POST /api/nearby-clinics` with `{ latitude, longitude, radius }`;
    /// the `clinics` list is folded through the hospital normalizer, with
    /// an absent or null list treated as empty.
    pub async fn nearby_clinics(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<Vec<HospitalRecord>> {
        let url = self.endpoint(&["api", "nearby-clinics"])?;
        let body = NearbyClinicsRequest {
            latitude,
            longitude,
            radius: radius_m,
        };

        let raw = self.post_json(url, &body).await?;
        let clinics = raw
            .get("clinics")
            .and_then(Value::as_array)
            .map(|list| hospital::normalize(list))
            .unwrap_or_default();

        tracing::debug!(count = clinics.len(), "fetched nearby clinics");
        Ok(clinics)
    }

    /// Resolves an address to coordinates via the backend.
    ///
    /// `GET /api/geocode/{address}`. The backend reports an unknown address
    /// as `{ "error": ... }` with a 200 status; that resolves to `None`.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodePoint>> {
        let url = self.endpoint(&["api", "geocode", address])?;

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| SautiError::send_failure(format!("geocode request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(SautiError::send_failure_with_status(status.as_u16(), body));
        }

        let raw: Value = response.json().await.map_err(|err| {
            SautiError::invalid_shape(format!("geocode response was not JSON: {err}"))
        })?;

        Ok(parse_geocode_payload(&raw))
    }

    async fn post_json(&self, url: Url, body: &impl Serialize) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(SautiError::send_failure_with_status(status.as_u16(), body));
        }

        response.json::<Value>().await.map_err(|err| {
            SautiError::invalid_shape(format!("response body was not JSON: {err}"))
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            SautiError::internal(format!("invalid backend URL {}: {err}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| SautiError::internal("backend URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ChatBackend for AssistantApiClient {
    /// `POST /api/chat/initialize`.
    ///
    /// The patient id travels both as the JSON body and as a query
    /// parameter; older backend deployments only read the latter.
    async fn initialize(&self, patient_id: &str) -> Result<Value> {
        let url = self.endpoint(&["api", "chat", "initialize"])?;

        let response = self
            .client
            .post(url)
            .query(&[("patient_id", patient_id)])
            .json(&serde_json::json!({ "patient_id": patient_id }))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| {
                SautiError::session_init(format!("initialize request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(SautiError::session_init(format!(
                "backend returned {status}: {body}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| SautiError::session_init(format!("unreadable initialize response: {err}")))
    }

    /// `POST /api/chat/message`.
    async fn send_message(&self, request: &MessageRequest) -> Result<Value> {
        let url = self.endpoint(&["api", "chat", "message"])?;
        self.post_json(url, request).await
    }
}

fn map_transport_error(err: reqwest::Error) -> SautiError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    SautiError::send_failure(format!("{kind}: {err}"))
}

async fn read_error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string())
}

fn parse_geocode_payload(raw: &Value) -> Option<GeocodePoint> {
    if raw.get("error").is_some() {
        return None;
    }

    let latitude = raw.get("latitude").and_then(Value::as_f64)?;
    let longitude = raw.get("longitude").and_then(Value::as_f64)?;

    Some(GeocodePoint {
        latitude,
        longitude,
        formatted_address: raw
            .get("formatted_address")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
