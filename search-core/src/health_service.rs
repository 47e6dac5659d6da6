//! Liveness probe for the retrieval service.
//!
//! `GET {base}/health`; any 2xx means healthy, the body is informational.
//! [`HealthService::check`] never fails: every problem is mapped to
//! `ok = false` with a message, which is what a status line wants.
//! [`HealthService::try_probe`] is the strict variant.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::client_config::DEFAULT_HEALTH_TIMEOUT_SECS,
    error_handler::{SearchResult, normalize_api_base},
    services::http::{build_client, ensure_success},
};

/// A serializable health snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Service base URL that was probed.
    pub endpoint: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured latency of the probe in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
    /// Parsed body, when it was JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HealthStatus {
    #[inline]
    fn ok(endpoint: &str, latency_ms: u128, body: Option<Value>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ok: true,
            latency_ms,
            message: "service is healthy".to_string(),
            body,
        }
    }

    #[inline]
    fn fail(endpoint: &str, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ok: false,
            latency_ms,
            message: message.into(),
            body: None,
        }
    }
}

/// Health checker that reuses a single HTTP client.
#[derive(Debug)]
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a health service with an optional timeout (seconds, default 5).
    ///
    /// # Errors
    /// Returns [`crate::SearchError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> SearchResult<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_HEALTH_TIMEOUT_SECS));
        let client = build_client(timeout)?;
        debug!(timeout_secs = timeout.as_secs(), "HealthService initialized");
        Ok(Self { client })
    }

    /// Resilient probe: never returns an error.
    pub async fn check(&self, api_base: &str) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(api_base).await {
            Ok(status) => {
                info!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::fail(
                    api_base.trim(),
                    start.elapsed().as_millis(),
                    err.to_string(),
                );
                warn!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe.
    ///
    /// # Errors
    /// Validation, transport and status errors are returned as-is. A body
    /// that is not JSON is still healthy.
    pub async fn try_probe(&self, api_base: &str) -> SearchResult<HealthStatus> {
        let base = normalize_api_base(api_base)?;
        let url = format!("{base}/health");

        let start = Instant::now();
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;
        let resp = ensure_success(resp, &url).await?;
        let latency = start.elapsed().as_millis();

        let body = match resp.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(e) => {
                warn!(error = %e, "failed to read /health body; treating service as reachable");
                None
            }
        };
        Ok(HealthStatus::ok(&base, latency, body))
    }
}
