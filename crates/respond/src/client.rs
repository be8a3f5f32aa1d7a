//! Response client for the orchestrator's pre-signed URL.
//!
//! Each envelope is written with one HTTP PUT per attempt. Only a `200`
//! counts as delivered; anything else, including other 2xx codes, is retried
//! immediately until the attempt budget runs out.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::DeliveryConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::{Error, Result};

/// Client that delivers status envelopes.
#[derive(Debug, Clone)]
pub struct ResponseClient {
    /// Configuration for the client.
    config: Arc<DeliveryConfig>,
    /// HTTP client shared by all attempts.
    http_client: reqwest::Client,
}

impl ResponseClient {
    /// Create a new ResponseClient with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(DeliveryConfig::default())
    }

    /// Create a new ResponseClient with custom configuration.
    pub fn with_config(config: DeliveryConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config_error(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Serialize `envelope` and PUT it to `endpoint`.
    pub async fn deliver(&self, endpoint: &str, envelope: &ResponseEnvelope) -> Result<()> {
        let body = envelope.to_body()?;
        info!(
            status = %envelope.status,
            physical_resource_id = %envelope.physical_resource_id,
            "Delivering status"
        );
        self.send_body(endpoint, body).await
    }

    /// PUT an already serialized body to `endpoint`.
    ///
    /// Fails without any network call when either argument is empty or the
    /// endpoint is not a valid absolute URL.
    pub async fn send_body(&self, endpoint: &str, body: String) -> Result<()> {
        if endpoint.trim().is_empty() {
            return Err(Error::EmptyEndpoint);
        }
        if body.is_empty() {
            return Err(Error::EmptyBody);
        }

        let url = Url::parse(endpoint).map_err(|e| Error::invalid_endpoint(e.to_string()))?;

        let start = Instant::now();
        let result = self.put_with_retry(&url, body).await;
        debug!(
            duration_ms = start.elapsed().as_millis(),
            delivered = result.is_ok(),
            "Delivery finished"
        );
        result
    }

    /// PUT with immediate retries, returning the last error when every
    /// attempt fails.
    async fn put_with_retry(&self, url: &Url, body: String) -> Result<()> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match self.put_once(url, &body, attempt).await {
                Ok(()) => {
                    info!(attempt, "Status delivered");
                    return Ok(());
                }
                Err(e) if attempt >= max_attempts || !e.is_retryable() => {
                    warn!(attempt, max_attempts, error = %e, "Giving up on status delivery");
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Delivery attempt failed, retrying"
                    );
                    attempt += 1;
                }
            }
        }
    }

    /// A single PUT attempt.
    async fn put_once(&self, url: &Url, body: &str, attempt: u32) -> Result<()> {
        let response = self
            .http_client
            .put(url.clone())
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| Error::transport(attempt, e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            Ok(())
        } else {
            Err(Error::unexpected_status(status.as_u16(), attempt))
        }
    }
}
