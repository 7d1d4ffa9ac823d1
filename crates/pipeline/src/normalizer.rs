//! Stage 2: normalization.
//!
//! Converts the vendor's currency into the reporting currency (USD) with a
//! fixed rate table, maps vendor condition vocabulary onto the closed enum,
//! and canonicalizes the catalog identifier. The original price, currency,
//! and applied rate ride along unmodified for audit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use figstonks_core::{canonical_set_number, Condition};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value as JsonValue;

use crate::validator::ValidListing;

/// Immutable lookup tables injected at construction. Unknown currencies and
/// unmappable conditions were already rejected by the validator, so lookups
/// here are total in practice.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    rates: HashMap<String, Decimal>,
    conditions: HashMap<String, Condition>,
}

impl NormalizerConfig {
    /// Exchange rate into USD for a currency code, if known.
    #[must_use]
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Maps a vendor condition string (case-insensitive) to the closed enum.
    #[must_use]
    pub fn condition(&self, raw: &str) -> Option<Condition> {
        self.conditions.get(raw.to_lowercase().as_str()).copied()
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        let rates = HashMap::from([
            ("USD".to_string(), Decimal::ONE),
            ("EUR".to_string(), dec!(1.08)),
            ("GBP".to_string(), dec!(1.26)),
            ("CAD".to_string(), dec!(0.74)),
            ("AUD".to_string(), dec!(0.66)),
        ]);
        let conditions = HashMap::from([
            ("new".to_string(), Condition::New),
            ("mint".to_string(), Condition::New),
            ("used".to_string(), Condition::Used),
            ("complete".to_string(), Condition::Used),
            ("sealed".to_string(), Condition::Sealed),
        ]);
        Self { rates, conditions }
    }
}

/// Listing after normalization, ready for duplicate detection and persist.
#[derive(Debug, Clone)]
pub struct NormalizedListing {
    pub source: String,
    pub source_listing_id: String,
    /// Canonical catalog identifier.
    pub set_number: String,
    pub timestamp: DateTime<Utc>,
    /// Price in the reporting currency.
    pub price_usd: Decimal,
    pub original_price: Decimal,
    pub original_currency: String,
    pub exchange_rate: Decimal,
    pub condition: Condition,
    pub quantity: Option<i32>,
    pub seller_name: Option<String>,
    pub seller_rating: Option<Decimal>,
    pub confidence: Decimal,
    pub raw: JsonValue,
}

impl NormalizedListing {
    /// UTC day bucket used as the duplicate-detection window.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Stage 2 of the pipeline.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: Arc<NormalizerConfig>,
}

impl Normalizer {
    #[must_use]
    pub fn new(config: Arc<NormalizerConfig>) -> Self {
        Self { config }
    }

    /// Normalizes a validated listing. Currency and condition were checked
    /// upstream; identity fallbacks keep this path total.
    #[must_use]
    pub fn normalize(&self, listing: ValidListing) -> NormalizedListing {
        let rate = self.config.rate(&listing.currency).unwrap_or(Decimal::ONE);
        let condition = self
            .config
            .condition(&listing.condition)
            .unwrap_or(Condition::Used);

        NormalizedListing {
            source: listing.source,
            source_listing_id: listing.source_listing_id,
            set_number: canonical_set_number(&listing.set_number),
            timestamp: listing.timestamp,
            price_usd: listing.price * rate,
            original_price: listing.price,
            original_currency: listing.currency,
            exchange_rate: rate,
            condition,
            quantity: listing.quantity,
            seller_name: listing.seller_name,
            seller_rating: listing.seller_rating,
            confidence: listing.confidence,
            raw: listing.raw,
        }
    }
}
