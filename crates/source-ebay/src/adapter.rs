//! `SourceAdapter` implementation over the Finding API.
//!
//! One fetch runs the completed-items search and the active-items search
//! and merges the results. A malformed item is skipped with a log line;
//! only a failed request fails the fetch.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use figstonks_core::{
    ApiType, CatalogEntry, CatalogFilter, ListingFilter, RateLimitPolicy, RawListing,
    SourceAdapter,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tracing::debug;

use crate::client::{EbayClient, OP_FIND_ACTIVE, OP_FIND_COMPLETED};
use crate::types::RawItem;

/// Stable source name, matching the `sources` table row.
pub const SOURCE_NAME: &str = "ebay";

const MAX_ENTRIES_PER_PAGE: u32 = 100;

/// Price source backed by the eBay Finding API. Carries no catalog data.
#[derive(Debug)]
pub struct EbayAdapter {
    client: EbayClient,
    policy: RateLimitPolicy,
}

impl EbayAdapter {
    #[must_use]
    pub fn new(client: EbayClient, policy: RateLimitPolicy) -> Self {
        Self { client, policy }
    }

    fn keywords(filter: &ListingFilter) -> String {
        let mut keywords = format!("lego minifigure {}", filter.set_number);
        if let Some(condition) = filter.condition {
            keywords.push(' ');
            keywords.push_str(&condition.as_str().to_lowercase());
        }
        keywords
    }
}

#[async_trait]
impl SourceAdapter for EbayAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn api_type(&self) -> ApiType {
        ApiType::Api
    }

    fn rate_limit(&self) -> RateLimitPolicy {
        self.policy
    }

    async fn fetch_listings(&self, filter: &ListingFilter) -> Result<Vec<RawListing>> {
        let keywords = Self::keywords(filter);
        let per_page = filter.limit.unwrap_or(MAX_ENTRIES_PER_PAGE).min(MAX_ENTRIES_PER_PAGE);

        let completed = self
            .client
            .search(OP_FIND_COMPLETED, &keywords, per_page)
            .await?;
        let active = self.client.search(OP_FIND_ACTIVE, &keywords, per_page).await?;

        let mut listings = Vec::new();
        for (response, is_completed) in [(&completed, true), (&active, false)] {
            let Some(body) = response.body() else {
                continue;
            };
            for item in body.items() {
                match convert_item(item, &filter.set_number, is_completed) {
                    Some(listing) => listings.push(listing),
                    None => {
                        debug!(item_id = ?item.item_id(), "skipping malformed item");
                    }
                }
            }
        }

        debug!(
            set_number = %filter.set_number,
            listings = listings.len(),
            "Finding API fetch complete"
        );
        Ok(listings)
    }

    async fn fetch_catalog(&self, _filter: &CatalogFilter) -> Result<Vec<CatalogEntry>> {
        Ok(Vec::new())
    }
}

/// Converts one Finding API item. Returns `None` when the fields a price
/// record cannot exist without are missing or unparseable.
fn convert_item(item: &RawItem, set_number: &str, completed: bool) -> Option<RawListing> {
    let item_id = item.item_id()?;
    let money = item.price()?;
    let price: Decimal = money.value.as_deref()?.parse().ok()?;
    let currency = money.currency_id.clone().unwrap_or_else(|| "USD".to_string());

    // Completed listings carry their end time; active ones are priced now.
    let timestamp = if completed {
        item.end_time()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))?
    } else {
        Utc::now()
    };

    let seller_rating: Option<Decimal> =
        item.feedback_percent().and_then(|s| s.parse().ok());

    Some(RawListing {
        source: SOURCE_NAME.to_string(),
        source_listing_id: item_id.to_string(),
        set_number: Some(set_number.to_string()),
        timestamp: Some(timestamp),
        price: Some(price),
        currency,
        condition: item.condition_name().unwrap_or("used").to_string(),
        quantity: Some(1),
        seller_name: item.seller_name().map(ToString::to_string),
        seller_rating,
        url: item.url().map(ToString::to_string),
        confidence: confidence(item, seller_rating),
        raw: json!({
            "itemId": item_id,
            "title": item.title(),
            "sellingState": item.selling_state(),
            "listingType": item.listing_type(),
        }),
    })
}

/// Data-quality estimate for one listing.
///
/// Only a realized sale is a market price; an active or unsold listing is
/// an ask. An auction price is noisier than fixed price, and a low-feedback
/// seller is discounted too.
fn confidence(item: &RawItem, seller_rating: Option<Decimal>) -> Decimal {
    let mut confidence = Decimal::ONE;

    if item.selling_state() != Some("EndedWithSales") {
        confidence *= dec!(0.8);
    }
    if item
        .listing_type()
        .is_some_and(|t| t.contains("Auction"))
    {
        confidence *= dec!(0.9);
    }
    if seller_rating.is_some_and(|r| r < dec!(95)) {
        confidence *= dec!(0.9);
    }

    confidence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EbayClientConfig;
    use figstonks_core::Condition;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base_url: &str) -> EbayAdapter {
        let client = EbayClient::new(
            EbayClientConfig::default()
                .with_base_url(base_url)
                .with_app_id("test-app"),
        )
        .unwrap();
        EbayAdapter::new(client, RateLimitPolicy::default())
    }

    fn finding_item(
        item_id: &str,
        price: &str,
        selling_state: &str,
        listing_type: &str,
        feedback: &str,
    ) -> serde_json::Value {
        json!({
            "itemId": [item_id],
            "title": ["LEGO minifigure sw0001"],
            "sellingStatus": [{
                "currentPrice": [{"@currencyId": "USD", "__value__": price}],
                "sellingState": [selling_state]
            }],
            "listingInfo": [{
                "listingType": [listing_type],
                "endTime": ["2026-08-20T14:30:00.000Z"]
            }],
            "condition": [{"conditionDisplayName": ["Used"]}],
            "sellerInfo": [{
                "sellerUserName": ["dealer"],
                "positiveFeedbackPercent": [feedback]
            }]
        })
    }

    fn response_body(operation: &str, items: Vec<serde_json::Value>) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(
            format!("{operation}Response"),
            json!([{
                "ack": ["Success"],
                "searchResult": [{"@count": items.len().to_string(), "item": items}]
            }]),
        );
        serde_json::Value::Object(map)
    }

    #[test]
    fn test_keywords_include_condition_when_set() {
        let filter = ListingFilter::for_set("sw0001").with_condition(Condition::New);
        assert_eq!(EbayAdapter::keywords(&filter), "lego minifigure sw0001 new");
    }

    #[test]
    fn test_sold_fixed_price_has_full_confidence() {
        let item: RawItem = serde_json::from_value(finding_item(
            "1", "8.99", "EndedWithSales", "FixedPrice", "99.5",
        ))
        .unwrap();
        let listing = convert_item(&item, "sw0001", true).unwrap();
        assert_eq!(listing.confidence, Decimal::ONE);
        assert_eq!(listing.price, Some(dec!(8.99)));
        assert_eq!(listing.set_number.as_deref(), Some("sw0001"));
    }

    #[test]
    fn test_unsold_completed_listing_is_discounted() {
        let item: RawItem = serde_json::from_value(finding_item(
            "1", "8.99", "EndedWithoutSales", "FixedPrice", "99.5",
        ))
        .unwrap();
        let listing = convert_item(&item, "sw0001", true).unwrap();
        assert_eq!(listing.confidence, dec!(0.8));
    }

    #[test]
    fn test_active_listing_is_an_ask_not_a_sale() {
        let item: RawItem = serde_json::from_value(finding_item(
            "1", "9.50", "Active", "FixedPrice", "99.5",
        ))
        .unwrap();
        let listing = convert_item(&item, "sw0001", false).unwrap();
        assert_eq!(listing.confidence, dec!(0.8));
    }

    #[test]
    fn test_auction_and_low_feedback_stack() {
        let item: RawItem = serde_json::from_value(finding_item(
            "1", "8.99", "EndedWithSales", "Auction", "90.0",
        ))
        .unwrap();
        let listing = convert_item(&item, "sw0001", true).unwrap();
        assert_eq!(listing.confidence, dec!(0.81));
    }

    #[test]
    fn test_item_without_price_is_dropped() {
        let item: RawItem =
            serde_json::from_value(json!({"itemId": ["1"], "title": ["no price"]})).unwrap();
        assert!(convert_item(&item, "sw0001", true).is_none());
    }

    #[tokio::test]
    async fn test_fetch_merges_completed_and_active() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("OPERATION-NAME", "findCompletedItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body(
                "findCompletedItems",
                vec![finding_item("sold-1", "8.00", "EndedWithSales", "FixedPrice", "99.0")],
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("OPERATION-NAME", "findItemsAdvanced"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body(
                "findItemsAdvanced",
                vec![
                    finding_item("live-1", "9.50", "Active", "FixedPrice", "99.0"),
                    // Malformed: no price, skipped without failing the fetch.
                    json!({"itemId": ["live-2"]}),
                ],
            )))
            .mount(&server)
            .await;

        let adapter = adapter(&server.uri());
        let listings = adapter
            .fetch_listings(&ListingFilter::for_set("sw0001"))
            .await
            .unwrap();

        assert_eq!(listings.len(), 2);
        let ids: Vec<_> = listings.iter().map(|l| l.source_listing_id.as_str()).collect();
        assert!(ids.contains(&"sold-1"));
        assert!(ids.contains(&"live-1"));
    }

    #[tokio::test]
    async fn test_catalog_fetch_is_empty() {
        let server = MockServer::start().await;
        let adapter = adapter(&server.uri());
        let entries = adapter.fetch_catalog(&CatalogFilter::default()).await.unwrap();
        assert!(entries.is_empty());
    }
}
