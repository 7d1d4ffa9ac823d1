//! `SourceAdapter` implementation over the BrickLink site.
//!
//! BrickLink carries both sides: the minifigure catalog and the price
//! guide's current items for sale. Theme, year, and limit filters are
//! applied after the fetch, since the search endpoint takes free text.
//! A malformed item is skipped with a log line; only a failed request
//! fails the fetch.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use figstonks_core::{
    ApiType, CatalogEntry, CatalogFilter, ListingFilter, RateLimitPolicy, RawListing,
    SourceAdapter,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tracing::debug;

use crate::client::BricklinkClient;
use crate::types::{CatalogItem, PriceGuideListing};

/// Stable source name, matching the `sources` table row.
pub const SOURCE_NAME: &str = "bricklink";

/// Scrape source backed by bricklink.com's catalog and price guide.
#[derive(Debug)]
pub struct BricklinkAdapter {
    client: BricklinkClient,
    policy: RateLimitPolicy,
}

impl BricklinkAdapter {
    #[must_use]
    pub fn new(client: BricklinkClient, policy: RateLimitPolicy) -> Self {
        Self { client, policy }
    }

    fn search_query(filter: &CatalogFilter) -> String {
        match &filter.theme {
            Some(theme) => format!("minifig {theme}"),
            None => "minifig".to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for BricklinkAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn api_type(&self) -> ApiType {
        ApiType::Scrape
    }

    fn rate_limit(&self) -> RateLimitPolicy {
        self.policy
    }

    async fn fetch_listings(&self, filter: &ListingFilter) -> Result<Vec<RawListing>> {
        let guide = self.client.price_guide(&filter.set_number).await?;

        let mut listings = Vec::new();
        for listing in &guide.listings {
            match convert_listing(listing, &filter.set_number, self.client.base_url()) {
                Some(raw) => listings.push(raw),
                None => {
                    debug!(inventory_id = ?listing.inventory_id, "skipping malformed listing");
                }
            }
        }

        // The price guide carries every condition; narrow after the fetch.
        if let Some(condition) = filter.condition {
            let wanted = condition.as_str().to_lowercase();
            listings.retain(|l| l.condition == wanted);
        }

        debug!(
            set_number = %filter.set_number,
            listings = listings.len(),
            "price guide fetch complete"
        );
        Ok(listings)
    }

    async fn fetch_catalog(&self, filter: &CatalogFilter) -> Result<Vec<CatalogEntry>> {
        let items = self.client.search_catalog(&Self::search_query(filter)).await?;

        let mut entries = Vec::new();
        for item in &items {
            let Some(entry) = convert_item(item, self.client.base_url()) else {
                debug!(name = ?item.item_name, "skipping item without a number");
                continue;
            };
            if !matches_filter(&entry, filter) {
                continue;
            }
            entries.push(entry);
            if filter.limit.is_some_and(|limit| entries.len() as u32 >= limit) {
                break;
            }
        }

        debug!(entries = entries.len(), "catalog search complete");
        Ok(entries)
    }
}

fn matches_filter(entry: &CatalogEntry, filter: &CatalogFilter) -> bool {
    if let Some(theme) = &filter.theme {
        let theme = theme.to_lowercase();
        if !entry
            .theme
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&theme))
        {
            return false;
        }
    }
    if let Some(year) = filter.year {
        if entry.year_released != Some(year) {
            return false;
        }
    }
    true
}

fn catalog_url(base_url: &str, item_no: &str) -> String {
    format!("{base_url}/v2/catalog/catalogitem.page?M={item_no}")
}

/// Converts one catalog search hit. Returns `None` when the record has no
/// item number to key the catalog on.
fn convert_item(item: &CatalogItem, base_url: &str) -> Option<CatalogEntry> {
    let item_no = item.item_no.as_deref()?.to_string();
    Some(CatalogEntry {
        source: SOURCE_NAME.to_string(),
        source_id: item_no.clone(),
        set_number: item_no.clone(),
        name: item.item_name.clone().unwrap_or_default(),
        theme: item.category.clone(),
        subtheme: None,
        year_released: item.year_released,
        image_url: Some(format!(
            "https://img.bricklink.com/ItemImage/MN/0/{item_no}.png"
        )),
        thumbnail_url: Some(format!(
            "https://img.bricklink.com/ItemImage/MN/0/{item_no}.t1.png"
        )),
        piece_count: None,
        raw: json!({
            "catalogUrl": catalog_url(base_url, &item_no),
        }),
    })
}

/// Converts one price guide entry. Returns `None` when the fields a price
/// record cannot exist without are missing.
fn convert_listing(
    listing: &PriceGuideListing,
    set_number: &str,
    base_url: &str,
) -> Option<RawListing> {
    let inventory_id = listing.inventory_id?;
    let price = listing.price?;
    let condition = match listing.new_or_used.as_deref()? {
        "N" => "new".to_string(),
        "U" => "used".to_string(),
        other => other.to_lowercase(),
    };

    // A used figure is likelier to be misidentified than a new one still
    // matching its catalog photo.
    let confidence = if condition == "used" {
        dec!(0.95)
    } else {
        Decimal::ONE
    };

    Some(RawListing {
        source: SOURCE_NAME.to_string(),
        source_listing_id: inventory_id.to_string(),
        set_number: Some(set_number.to_string()),
        // Current asks are priced at observation time.
        timestamp: Some(Utc::now()),
        price: Some(price),
        currency: listing.currency.clone().unwrap_or_else(|| "USD".to_string()),
        condition,
        quantity: listing.quantity,
        seller_name: listing.seller_name.clone(),
        seller_rating: listing.seller_feedback_pct,
        url: Some(catalog_url(base_url, set_number)),
        confidence,
        raw: json!({
            "feedbackCount": listing.seller_feedback_count,
            "country": listing.seller_country,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BricklinkClientConfig, PRICE_GUIDE_PATH, SEARCH_PATH};
    use figstonks_core::Condition;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BRICKLINK_TEST_BASE: &str = "https://www.bricklink.com";

    fn adapter(base_url: &str) -> BricklinkAdapter {
        let client =
            BricklinkClient::new(BricklinkClientConfig::default().with_base_url(base_url))
                .unwrap();
        BricklinkAdapter::new(client, RateLimitPolicy::default())
    }

    async fn mount_robots(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow:"))
            .mount(server)
            .await;
    }

    fn search_item(item_no: &str, name: &str, category: &str, year: i32) -> serde_json::Value {
        serde_json::json!({
            "strItemNo": item_no,
            "strItemName": name,
            "strCategory": category,
            "yearReleased": year
        })
    }

    fn guide_listing(id: i64, new_or_used: &str, price: &str, seller: &str) -> serde_json::Value {
        serde_json::json!({
            "idInventory": id,
            "strNewOrUsed": new_or_used,
            "mSalePrice": price,
            "strCurrencyCode": "USD",
            "nQty": 1,
            "strSellerUsername": seller,
            "dblSellerFeedbackPct": "99.8",
            "nSellerFeedbackCount": 5432,
            "strSellerCountryCode": "US"
        })
    }

    #[test]
    fn test_search_query_includes_theme() {
        let filter = CatalogFilter {
            theme: Some("Star Wars".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(BricklinkAdapter::search_query(&filter), "minifig Star Wars");
    }

    #[tokio::test]
    async fn test_catalog_fetch_applies_theme_year_and_limit() {
        let server = MockServer::start().await;
        mount_robots(&server).await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {
                    "typeList": [{
                        "type": "M",
                        "items": [
                            search_item("sw0001", "Darth Vader", "Star Wars", 1999),
                            search_item("sw0002", "Stormtrooper", "Star Wars", 1999),
                            search_item("hp001", "Harry Potter", "Harry Potter", 2001),
                            // No item number: skipped, not fatal.
                            {"strItemName": "unknown"}
                        ]
                    }]
                }
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server.uri());
        let entries = adapter
            .fetch_catalog(&CatalogFilter {
                theme: Some("star wars".to_string()),
                year: Some(1999),
                limit: Some(1),
            })
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].set_number, "sw0001");
        assert_eq!(entries[0].theme.as_deref(), Some("Star Wars"));
        assert!(entries[0]
            .image_url
            .as_deref()
            .unwrap()
            .contains("sw0001.png"));
    }

    #[tokio::test]
    async fn test_listings_fetch_converts_and_filters_condition() {
        let server = MockServer::start().await;
        mount_robots(&server).await;
        Mock::given(method("GET"))
            .and(path(PRICE_GUIDE_PATH))
            .and(query_param("itemNo", "sw0001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "itemNo": "sw0001",
                "listings": [
                    guide_listing(101, "N", "25.99", "BrickMaster123"),
                    guide_listing(102, "N", "22.50", "MinifigStore"),
                    guide_listing(103, "U", "18.75", "LegoCollector"),
                    // No price: skipped, not fatal.
                    {"idInventory": 104, "strNewOrUsed": "N"}
                ]
            })))
            .mount(&server)
            .await;

        let adapter = adapter(&server.uri());

        let all = adapter
            .fetch_listings(&ListingFilter::for_set("sw0001"))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let used = adapter
            .fetch_listings(&ListingFilter::for_set("sw0001").with_condition(Condition::Used))
            .await
            .unwrap();
        assert_eq!(used.len(), 1);
        assert_eq!(used[0].source_listing_id, "103");
        assert_eq!(used[0].price, Some(dec!(18.75)));
        assert_eq!(used[0].seller_name.as_deref(), Some("LegoCollector"));
    }

    #[test]
    fn test_new_listing_has_full_confidence() {
        let listing: PriceGuideListing =
            serde_json::from_value(guide_listing(101, "N", "25.99", "BrickMaster123")).unwrap();
        let raw = convert_listing(&listing, "sw0001", BRICKLINK_TEST_BASE).unwrap();
        assert_eq!(raw.confidence, Decimal::ONE);
        assert_eq!(raw.condition, "new");
        assert_eq!(raw.currency, "USD");
    }

    #[test]
    fn test_used_listing_is_discounted() {
        let listing: PriceGuideListing =
            serde_json::from_value(guide_listing(103, "U", "18.75", "LegoCollector")).unwrap();
        let raw = convert_listing(&listing, "sw0001", BRICKLINK_TEST_BASE).unwrap();
        assert_eq!(raw.confidence, dec!(0.95));
        assert_eq!(raw.condition, "used");
    }

    #[test]
    fn test_listing_without_condition_is_dropped() {
        let listing: PriceGuideListing = serde_json::from_value(serde_json::json!({
            "idInventory": 105,
            "mSalePrice": "9.99"
        }))
        .unwrap();
        assert!(convert_listing(&listing, "sw0001", BRICKLINK_TEST_BASE).is_none());
    }
}
