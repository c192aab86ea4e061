//! HTTP reviewer client

use super::models::{ReviewRequest, ReviewResponse};
use super::ReviewerClient;
use crate::config::{ReviewerConfig, SecretString};
use crate::domain::ReviewerError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Reviewer reached over HTTPS with bearer authentication
///
/// Transport failures are retried with linear backoff; parse failures are
/// returned immediately.
pub struct HttpReviewerClient {
    endpoint: String,
    api_key: SecretString,
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpReviewerClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ReviewerError::Unavailable`] if no endpoint or credential is
    /// configured, or [`ReviewerError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &ReviewerConfig) -> Result<Self, ReviewerError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| ReviewerError::Unavailable("no reviewer endpoint configured".to_string()))?;

        let api_key = match &config.api_key {
            Some(key) if config.has_credential() => key.clone(),
            _ => {
                return Err(ReviewerError::Unavailable(
                    "no reviewer credential configured".to_string(),
                ))
            }
        };

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ReviewerError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            api_key,
            client,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, request: &ReviewRequest) -> Result<ReviewResponse, ReviewerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret().as_str())
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewerError::Transport(format!(
                "reviewer returned status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReviewerError::Transport(format!("Failed to read response body: {e}")))?;

        ReviewResponse::from_json(&body)
    }
}

impl std::fmt::Debug for HttpReviewerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReviewerClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.expose_secret().masked())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn map_send_error(e: reqwest::Error) -> ReviewerError {
    if e.is_timeout() {
        ReviewerError::Transport("request timed out".to_string())
    } else if e.is_connect() {
        ReviewerError::Transport(format!("connection failed: {e}"))
    } else {
        ReviewerError::Transport(e.to_string())
    }
}

#[async_trait]
impl ReviewerClient for HttpReviewerClient {
    async fn review(&self, original: &str, redacted: &str) -> Result<ReviewResponse, ReviewerError> {
        let request = ReviewRequest::new(original, redacted);
        let mut attempt: u32 = 0;

        loop {
            match self.send_once(&request).await {
                Ok(response) => return Ok(response),
                Err(e @ ReviewerError::Transport(_)) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying reviewer request after transport error"
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(endpoint: Option<&str>, key: Option<&str>) -> ReviewerConfig {
        ReviewerConfig {
            enabled: true,
            endpoint: endpoint.map(str::to_string),
            api_key: key.map(|k| secret_string(k.to_string())),
            ..ReviewerConfig::default()
        }
    }

    #[test]
    fn test_missing_credential_is_unavailable() {
        let err = HttpReviewerClient::new(&config(Some("https://r.example"), None)).unwrap_err();
        assert_eq!(err.kind(), "unavailable");

        let err = HttpReviewerClient::new(&config(Some("https://r.example"), Some("  "))).unwrap_err();
        assert_eq!(err.kind(), "unavailable");

        let err = HttpReviewerClient::new(&config(None, Some("key"))).unwrap_err();
        assert_eq!(err.kind(), "unavailable");
    }

    #[test]
    fn test_debug_masks_credential() {
        let client =
            HttpReviewerClient::new(&config(Some("https://r.example"), Some("sk-secret-key"))).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("sk-s****"));
        assert!(!debug.contains("secret-key"));
    }
}
