//! Brickset API v3 client with rate limiting and bounded retries.
//!
//! All requests wait on a governor rate limiter before hitting the wire.
//! Transient failures (network, timeout, 429, 5xx) are retried with
//! exponential backoff up to the configured attempt budget; everything
//! else fails immediately.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{BricksetError, Result};
use crate::types::{BricksetResponse, BricksetSet, GetSetsParams};

/// Production Brickset API endpoint.
pub const BRICKSET_API_URL: &str = "https://brickset.com/api/v3.asmx";

/// Configuration for the Brickset client.
#[derive(Debug, Clone)]
pub struct BricksetClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// API key issued by Brickset.
    pub api_key: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retry attempts for transient failures.
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
}

impl Default for BricksetClientConfig {
    fn default() -> Self {
        Self {
            base_url: BRICKSET_API_URL.to_string(),
            api_key: String::new(),
            requests_per_minute: nonzero!(60u32),
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl BricksetClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Rate-limited Brickset API client.
pub struct BricksetClient {
    config: BricksetClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for BricksetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BricksetClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl BricksetClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or the HTTP client fails
    /// to build.
    pub fn new(config: BricksetClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(BricksetError::Configuration("missing API key".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BricksetError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Runs `getSets` with the given parameters.
    ///
    /// # Errors
    /// Returns an error after exhausting retries for transient failures, or
    /// immediately for permanent ones (including a non-success API status).
    pub async fn get_sets(&self, params: &GetSetsParams) -> Result<Vec<BricksetSet>> {
        let mut attempt = 0;
        loop {
            match self.get_sets_once(params).await {
                Ok(sets) => return Ok(sets),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let backoff = Duration::from_millis(
                        self.config.backoff_base_ms.saturating_mul(1 << attempt),
                    );
                    warn!(
                        attempt,
                        delay_ms = backoff.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_sets_once(&self, params: &GetSetsParams) -> Result<Vec<BricksetSet>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/getSets", self.config.base_url);
        let params_json = serde_json::to_string(params)?;
        debug!(%url, params = %params_json, "Brickset request");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("apiKey", self.config.api_key.as_str()),
                ("userHash", ""),
                ("params", params_json.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BricksetError::Http {
                status_code: status.as_u16(),
            });
        }

        let parsed: BricksetResponse = response.json().await?;
        if !parsed.is_success() {
            return Err(BricksetError::Api(
                parsed.message.unwrap_or_else(|| parsed.status.clone()),
            ));
        }

        Ok(parsed.sets)
    }
}
