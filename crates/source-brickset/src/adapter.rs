//! `SourceAdapter` implementation over the Brickset API.
//!
//! Brickset is catalog-only: it provides set metadata but no market
//! prices, so `fetch_listings` always returns empty.

use anyhow::Result;
use async_trait::async_trait;
use figstonks_core::{
    ApiType, CatalogEntry, CatalogFilter, ListingFilter, RateLimitPolicy, RawListing,
    SourceAdapter,
};
use serde_json::json;
use tracing::debug;

use crate::client::BricksetClient;
use crate::types::{BricksetSet, GetSetsParams};

/// Stable source name, matching the `sources` table row.
pub const SOURCE_NAME: &str = "brickset";

/// Brickset's type label for minifigure records.
const SET_TYPE_MINIFIG: &str = "Minifig";

/// Catalog source backed by the Brickset API.
#[derive(Debug)]
pub struct BricksetAdapter {
    client: BricksetClient,
    policy: RateLimitPolicy,
}

impl BricksetAdapter {
    #[must_use]
    pub fn new(client: BricksetClient, policy: RateLimitPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl SourceAdapter for BricksetAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn api_type(&self) -> ApiType {
        ApiType::Api
    }

    fn rate_limit(&self) -> RateLimitPolicy {
        self.policy
    }

    async fn fetch_listings(&self, _filter: &ListingFilter) -> Result<Vec<RawListing>> {
        Ok(Vec::new())
    }

    async fn fetch_catalog(&self, filter: &CatalogFilter) -> Result<Vec<CatalogEntry>> {
        let params = GetSetsParams {
            set_type: Some(SET_TYPE_MINIFIG.to_string()),
            theme: filter.theme.clone(),
            year: filter.year,
            set_number: None,
            page_size: filter.limit,
        };

        let sets = self.client.get_sets(&params).await?;
        let mut entries = Vec::with_capacity(sets.len());
        for set in sets {
            match convert_set(&set) {
                Some(entry) => entries.push(entry),
                None => {
                    debug!(set_id = set.set_id, "skipping set without a number");
                }
            }
        }

        debug!(entries = entries.len(), "Brickset catalog fetch complete");
        Ok(entries)
    }
}

/// Converts one Brickset set record. Returns `None` when the record has no
/// set number to key the catalog on.
fn convert_set(set: &BricksetSet) -> Option<CatalogEntry> {
    let number = set.number.as_deref()?.to_string();
    Some(CatalogEntry {
        source: SOURCE_NAME.to_string(),
        source_id: set.set_id.to_string(),
        set_number: number,
        name: set.name.clone().unwrap_or_default(),
        theme: set.theme.clone(),
        subtheme: set.subtheme.clone(),
        year_released: set.year,
        image_url: set.image.as_ref().and_then(|i| i.image_url.clone()),
        thumbnail_url: set.image.as_ref().and_then(|i| i.thumbnail_url.clone()),
        piece_count: set.pieces,
        raw: json!({
            "setID": set.set_id,
            "numberVariant": set.number_variant,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BricksetClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base_url: &str) -> BricksetAdapter {
        let client = BricksetClient::new(
            BricksetClientConfig::default()
                .with_base_url(base_url)
                .with_api_key("test-key"),
        )
        .unwrap();
        BricksetAdapter::new(client, RateLimitPolicy::default())
    }

    #[tokio::test]
    async fn test_catalog_fetch_converts_sets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getSets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "matches": 2,
                "sets": [
                    {
                        "setID": 32451,
                        "number": "sw0001",
                        "numberVariant": 1,
                        "name": "Darth Vader",
                        "year": 1999,
                        "theme": "Star Wars",
                        "pieces": 4,
                        "image": {"imageURL": "https://img/sw0001.jpg"}
                    },
                    // No number: skipped, not fatal.
                    {"setID": 99, "name": "unknown"}
                ]
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server.uri());
        let entries = adapter.fetch_catalog(&CatalogFilter::default()).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].set_number, "sw0001");
        assert_eq!(entries[0].name, "Darth Vader");
        assert_eq!(entries[0].year_released, Some(1999));
        assert_eq!(entries[0].image_url.as_deref(), Some("https://img/sw0001.jpg"));
    }

    #[tokio::test]
    async fn test_listings_fetch_is_empty() {
        let server = MockServer::start().await;
        let adapter = adapter(&server.uri());
        let listings = adapter
            .fetch_listings(&ListingFilter::for_set("sw0001"))
            .await
            .unwrap();
        assert!(listings.is_empty());
    }
}
