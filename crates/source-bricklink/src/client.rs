//! Robots-aware scrape client for bricklink.com.
//!
//! Every request is checked against the site's robots.txt (fetched once,
//! then cached; an unreachable robots.txt permits fetching), waits on a
//! governor rate limiter, and retries transient failures with exponential
//! backoff up to the configured attempt budget.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{BricklinkError, Result};
use crate::robots::RobotsRules;
use crate::types::{CatalogItem, CatalogSearchResponse, PriceGuideResponse};

/// Production site base URL.
pub const BRICKLINK_BASE_URL: &str = "https://www.bricklink.com";

/// Catalog search endpoint path.
pub const SEARCH_PATH: &str = "/ajax/clone/search/searchproduct.ajax";

/// Price guide endpoint path.
pub const PRICE_GUIDE_PATH: &str = "/ajax/clone/catalogitem/priceguide.ajax";

/// BrickLink's type code for minifigure catalog items.
const ITEM_TYPE_MINIFIG: &str = "M";

const USER_AGENT: &str = "figstonks/0.1";

/// Configuration for the BrickLink client.
#[derive(Debug, Clone)]
pub struct BricklinkClientConfig {
    /// Base URL for the site.
    pub base_url: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retry attempts for transient failures.
    pub max_retries: u32,

    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
}

impl Default for BricklinkClientConfig {
    fn default() -> Self {
        Self {
            base_url: BRICKLINK_BASE_URL.to_string(),
            requests_per_minute: nonzero!(120u32),
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

impl BricklinkClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
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

/// Rate-limited, robots-gated BrickLink client.
pub struct BricklinkClient {
    config: BricklinkClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
    robots: OnceCell<RobotsRules>,
}

impl std::fmt::Debug for BricklinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BricklinkClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl BricklinkClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: BricklinkClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BricklinkError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            robots: OnceCell::new(),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Searches the minifigure catalog.
    ///
    /// # Errors
    /// Returns an error after exhausting retries for transient failures,
    /// immediately for permanent ones, or when robots.txt excludes the path.
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<CatalogItem>> {
        let response: CatalogSearchResponse = self
            .get_json(SEARCH_PATH, &[("q", query), ("type", ITEM_TYPE_MINIFIG)])
            .await?;

        Ok(response
            .result
            .type_list
            .into_iter()
            .filter(|group| group.item_type == ITEM_TYPE_MINIFIG)
            .flat_map(|group| group.items)
            .collect())
    }

    /// Fetches the current items-for-sale price guide for one item.
    ///
    /// # Errors
    /// Returns an error after exhausting retries for transient failures,
    /// immediately for permanent ones, or when robots.txt excludes the path.
    pub async fn price_guide(&self, item_no: &str) -> Result<PriceGuideResponse> {
        self.get_json(PRICE_GUIDE_PATH, &[("itemNo", item_no), ("type", ITEM_TYPE_MINIFIG)])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        if !self.robots().await.is_allowed(path) {
            return Err(BricklinkError::RobotsDisallowed(path.to_string()));
        }

        let mut attempt = 0;
        loop {
            match self.get_json_once(path, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let backoff = self.backoff_delay(&e, attempt);
                    warn!(
                        %path,
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

    fn backoff_delay(&self, error: &BricklinkError, attempt: u32) -> Duration {
        if let Some(secs) = error.retry_delay_secs() {
            if matches!(error, BricklinkError::RateLimit { .. }) {
                return Duration::from_secs(secs);
            }
        }
        Duration::from_millis(self.config.backoff_base_ms.saturating_mul(1 << attempt))
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        debug!(%url, "BrickLink request");

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(BricklinkError::rate_limit(retry_after));
        }
        if !status.is_success() {
            return Err(BricklinkError::Http {
                status_code: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn robots(&self) -> &RobotsRules {
        self.robots
            .get_or_init(|| async {
                match self.fetch_robots().await {
                    Ok(rules) => rules,
                    Err(e) => {
                        warn!(error = %e, "robots.txt unavailable, proceeding without exclusions");
                        RobotsRules::allow_all()
                    }
                }
            })
            .await
    }

    async fn fetch_robots(&self) -> Result<RobotsRules> {
        let url = format!("{}/robots.txt", self.config.base_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BricklinkError::Http {
                status_code: status.as_u16(),
            });
        }
        let text = response.text().await?;
        Ok(RobotsRules::parse(&text, "figstonks"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "result": {
                "typeList": [{
                    "type": "M",
                    "items": [{
                        "strItemNo": "sw0001",
                        "strItemName": "Darth Vader",
                        "strCategory": "Star Wars",
                        "yearReleased": 1999
                    }]
                }]
            }
        })
    }

    async fn mount_robots(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_search_sends_query_and_parses_items() {
        let server = MockServer::start().await;
        mount_robots(&server, "User-agent: *\nDisallow: /checkout/").await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("q", "minifig star wars"))
            .and(query_param("type", "M"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            BricklinkClient::new(BricklinkClientConfig::default().with_base_url(server.uri()))
                .unwrap();

        let items = client.search_catalog("minifig star wars").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_no.as_deref(), Some("sw0001"));
    }

    #[tokio::test]
    async fn test_disallowed_path_is_never_requested() {
        let server = MockServer::start().await;
        mount_robots(&server, "User-agent: *\nDisallow: /ajax/").await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            BricklinkClient::new(BricklinkClientConfig::default().with_base_url(server.uri()))
                .unwrap();

        let err = client.search_catalog("minifig").await.unwrap_err();
        assert!(matches!(err, BricklinkError::RobotsDisallowed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_robots_txt_permits_fetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            BricklinkClient::new(BricklinkClientConfig::default().with_base_url(server.uri()))
                .unwrap();

        let items = client.search_catalog("minifig").await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_robots_txt_is_fetched_once() {
        let server = MockServer::start().await;
        // expect(1) on the robots mock holds across both searches.
        mount_robots(&server, "User-agent: *\nDisallow: /checkout/").await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(2)
            .mount(&server)
            .await;

        let client =
            BricklinkClient::new(BricklinkClientConfig::default().with_base_url(server.uri()))
                .unwrap();

        client.search_catalog("minifig").await.unwrap();
        client.search_catalog("minifig").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_succeeds() {
        let server = MockServer::start().await;
        mount_robots(&server, "").await;
        Mock::given(method("GET"))
            .and(path(PRICE_GUIDE_PATH))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(PRICE_GUIDE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "itemNo": "sw0001",
                "listings": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = BricklinkClientConfig::default().with_base_url(server.uri());
        config.backoff_base_ms = 1;
        let client = BricklinkClient::new(config).unwrap();

        let guide = client.price_guide("sw0001").await.unwrap();
        assert_eq!(guide.item_no.as_deref(), Some("sw0001"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        mount_robots(&server, "").await;
        Mock::given(method("GET"))
            .and(path(PRICE_GUIDE_PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            BricklinkClient::new(BricklinkClientConfig::default().with_base_url(server.uri()))
                .unwrap();

        let err = client.price_guide("sw9999").await.unwrap_err();
        assert!(matches!(err, BricklinkError::Http { status_code: 404 }));
    }
}
