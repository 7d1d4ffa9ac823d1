//! Finding API client with rate limiting and bounded retries.
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

use crate::error::{EbayError, Result};
use crate::types::FindingResponse;

/// Production Finding API endpoint.
pub const EBAY_FINDING_URL: &str = "https://svcs.ebay.com/services/search/FindingService/v1";

/// Finding API operation for active listings.
pub const OP_FIND_ACTIVE: &str = "findItemsAdvanced";

/// Finding API operation for completed (sold and unsold) listings.
pub const OP_FIND_COMPLETED: &str = "findCompletedItems";

const SERVICE_VERSION: &str = "1.13.0";

/// Configuration for the Finding API client.
#[derive(Debug, Clone)]
pub struct EbayClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Application ID issued by the developer program.
    pub app_id: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retry attempts for transient failures.
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
}

impl Default for EbayClientConfig {
    fn default() -> Self {
        Self {
            base_url: EBAY_FINDING_URL.to_string(),
            app_id: String::new(),
            requests_per_minute: nonzero!(100u32),
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl EbayClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the application ID.
    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
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

/// Rate-limited Finding API client.
pub struct EbayClient {
    config: EbayClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for EbayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EbayClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl EbayClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the app id is missing or the HTTP client fails
    /// to build.
    pub fn new(config: EbayClientConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(EbayError::Configuration("missing app id".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EbayError::Network(format!("failed to build HTTP client: {e}")))?;

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

    /// Runs one Finding API search operation.
    ///
    /// # Errors
    /// Returns an error after exhausting retries for transient failures, or
    /// immediately for permanent ones.
    pub async fn search(
        &self,
        operation: &str,
        keywords: &str,
        entries_per_page: u32,
    ) -> Result<FindingResponse> {
        let mut attempt = 0;
        loop {
            match self.search_once(operation, keywords, entries_per_page).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let backoff = self.backoff_delay(&e, attempt);
                    warn!(
                        %operation,
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

    fn backoff_delay(&self, error: &EbayError, attempt: u32) -> Duration {
        if let Some(secs) = error.retry_delay_secs() {
            if matches!(error, EbayError::RateLimit { .. }) {
                return Duration::from_secs(secs);
            }
        }
        Duration::from_millis(self.config.backoff_base_ms.saturating_mul(1 << attempt))
    }

    async fn search_once(
        &self,
        operation: &str,
        keywords: &str,
        entries_per_page: u32,
    ) -> Result<FindingResponse> {
        self.rate_limiter.until_ready().await;

        debug!(%operation, %keywords, "Finding API request");

        let per_page = entries_per_page.to_string();
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("OPERATION-NAME", operation),
                ("SERVICE-VERSION", SERVICE_VERSION),
                ("SECURITY-APPNAME", self.config.app_id.as_str()),
                ("RESPONSE-DATA-FORMAT", "JSON"),
                ("REST-PAYLOAD", ""),
                ("keywords", keywords),
                ("paginationInput.entriesPerPage", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(EbayError::rate_limit(retry_after));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EbayError::api(status.as_u16(), text));
        }

        let parsed: FindingResponse = response.json().await?;
        match parsed.body() {
            Some(body) if body.is_success() => Ok(parsed),
            Some(body) => Err(EbayError::api(
                200,
                format!(
                    "Finding API failure: {}",
                    serde_json::to_string(&body.error_message).unwrap_or_default()
                ),
            )),
            None => Err(EbayError::Serialization(
                "missing operation response body".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> EbayClient {
        EbayClient::new(
            EbayClientConfig::default()
                .with_base_url(base_url)
                .with_app_id("test-app"),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_app_id_is_a_configuration_error() {
        let err = EbayClient::new(EbayClientConfig::default()).unwrap_err();
        assert!(matches!(err, EbayError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_search_sends_finding_api_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("OPERATION-NAME", "findCompletedItems"))
            .and(query_param("SECURITY-APPNAME", "test-app"))
            .and(query_param("RESPONSE-DATA-FORMAT", "JSON"))
            .and(query_param("keywords", "lego minifigure sw0001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "findCompletedItemsResponse": [{"ack": ["Success"], "searchResult": [{"@count": "0"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let response = client
            .search(OP_FIND_COMPLETED, "lego minifigure sw0001", 100)
            .await
            .unwrap();
        assert!(response.body().unwrap().items().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "findItemsAdvancedResponse": [{"ack": ["Success"], "searchResult": [{"@count": "0"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = EbayClientConfig::default()
            .with_base_url(server.uri())
            .with_app_id("test-app");
        config.backoff_base_ms = 1;
        let client = EbayClient::new(config).unwrap();

        let response = client.search(OP_FIND_ACTIVE, "lego", 10).await.unwrap();
        assert!(response.body().unwrap().is_success());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let err = client.search(OP_FIND_ACTIVE, "lego", 10).await.unwrap_err();
        assert!(matches!(err, EbayError::Api { status_code: 400, .. }));
    }

    #[tokio::test]
    async fn test_ack_failure_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "findItemsAdvancedResponse": [{
                    "ack": ["Failure"],
                    "errorMessage": [{"error": [{"message": ["Invalid app id"]}]}]
                }]
            })))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let err = client.search(OP_FIND_ACTIVE, "lego", 10).await.unwrap_err();
        assert!(err.to_string().contains("Finding API failure"));
    }
}
