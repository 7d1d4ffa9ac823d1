//! Wire types for the bricklink.com AJAX endpoints.
//!
//! The catalog search endpoint groups results by item type; minifigures
//! are type `M`. The price guide endpoint returns the current items for
//! sale. Prices travel as strings and parse into `Decimal` exactly.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Envelope of the catalog search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSearchResponse {
    pub result: SearchResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "typeList", default)]
    pub type_list: Vec<TypeGroup>,
}

/// One item-type bucket of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeGroup {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

/// One catalog search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "strItemNo")]
    pub item_no: Option<String>,
    #[serde(rename = "strItemName")]
    pub item_name: Option<String>,
    #[serde(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "yearReleased")]
    pub year_released: Option<i32>,
}

/// Envelope of the price guide endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceGuideResponse {
    #[serde(rename = "itemNo")]
    pub item_no: Option<String>,
    #[serde(default)]
    pub listings: Vec<PriceGuideListing>,
}

/// One current item-for-sale entry from the price guide.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceGuideListing {
    #[serde(rename = "idInventory")]
    pub inventory_id: Option<i64>,
    /// `N` for new, `U` for used.
    #[serde(rename = "strNewOrUsed")]
    pub new_or_used: Option<String>,
    #[serde(rename = "mSalePrice")]
    pub price: Option<Decimal>,
    #[serde(rename = "strCurrencyCode")]
    pub currency: Option<String>,
    #[serde(rename = "nQty")]
    pub quantity: Option<i32>,
    #[serde(rename = "strSellerUsername")]
    pub seller_name: Option<String>,
    #[serde(rename = "dblSellerFeedbackPct")]
    pub seller_feedback_pct: Option<Decimal>,
    #[serde(rename = "nSellerFeedbackCount")]
    pub seller_feedback_count: Option<i64>,
    #[serde(rename = "strSellerCountryCode")]
    pub seller_country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_catalog_search_deserializes() {
        let json = r#"{
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
        }"#;
        let parsed: CatalogSearchResponse = serde_json::from_str(json).unwrap();
        let group = &parsed.result.type_list[0];
        assert_eq!(group.item_type, "M");
        assert_eq!(group.items[0].item_no.as_deref(), Some("sw0001"));
        assert_eq!(group.items[0].year_released, Some(1999));
    }

    #[test]
    fn test_price_guide_deserializes() {
        let json = r#"{
            "itemNo": "sw0001",
            "listings": [{
                "idInventory": 101,
                "strNewOrUsed": "N",
                "mSalePrice": "25.99",
                "strCurrencyCode": "USD",
                "nQty": 3,
                "strSellerUsername": "BrickMaster123",
                "dblSellerFeedbackPct": "99.8",
                "nSellerFeedbackCount": 5432,
                "strSellerCountryCode": "US"
            }]
        }"#;
        let parsed: PriceGuideResponse = serde_json::from_str(json).unwrap();
        let listing = &parsed.listings[0];
        assert_eq!(listing.price, Some(dec!(25.99)));
        assert_eq!(listing.new_or_used.as_deref(), Some("N"));
        assert_eq!(listing.seller_feedback_pct, Some(dec!(99.8)));
    }

    #[test]
    fn test_missing_listings_default_to_empty() {
        let parsed: PriceGuideResponse = serde_json::from_str(r#"{"itemNo": "sw0001"}"#).unwrap();
        assert!(parsed.listings.is_empty());
    }
}
