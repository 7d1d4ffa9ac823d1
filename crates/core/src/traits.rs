use crate::types::{ApiType, CatalogEntry, CatalogFilter, ListingFilter, RateLimitPolicy, RawListing};
use anyhow::Result;
use async_trait::async_trait;

/// Contract implemented by every external data source.
///
/// A fetch is finite and bounded: the adapter pages internally under its own
/// rate limiter and returns everything it could parse. A single malformed
/// item never fails the fetch; the adapter skips it and logs. Transient
/// errors are retried inside the adapter with bounded exponential backoff;
/// only after exhausting retries does the whole fetch fail, and that failure
/// is recorded on the source's bookkeeping rather than propagated fatally.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable source name, matching the `sources` table row.
    fn name(&self) -> &str;

    fn api_type(&self) -> ApiType;

    /// Declared pacing policy; the scheduler staggers work under it.
    fn rate_limit(&self) -> RateLimitPolicy;

    /// Fetches current price listings for one catalog item.
    async fn fetch_listings(&self, filter: &ListingFilter) -> Result<Vec<RawListing>>;

    /// Fetches catalog entries. Sources without catalog data return empty.
    async fn fetch_catalog(&self, filter: &CatalogFilter) -> Result<Vec<CatalogEntry>>;
}
