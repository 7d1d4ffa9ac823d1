//! Domain types shared across the price-tracking pipeline.
//!
//! `RawListing` and `CatalogEntry` are the intermediate shapes produced by
//! source adapters before validation; everything downstream of the pipeline
//! works with the persisted models in `figstonks-data`.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Closed condition vocabulary stored with every price record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    New,
    Used,
    Sealed,
}

impl Condition {
    /// Canonical string form used in the database and wire filters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Used => "USED",
            Self::Sealed => "SEALED",
        }
    }

    /// Parses the canonical form. Vendor vocabulary mapping happens in the
    /// normalizer, not here.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "USED" => Some(Self::Used),
            "SEALED" => Some(Self::Sealed),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an external source is accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiType {
    Api,
    Scrape,
    Feed,
}

impl ApiType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Scrape => "SCRAPE",
            Self::Feed => "FEED",
        }
    }
}

/// Pacing policy a source adapter declares so the scheduler can stagger
/// work without violating external quotas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub requests_per_minute: u32,
    pub requests_per_hour: u32,
    /// Bounded retry attempts for transient failures.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            requests_per_hour: 3600,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

/// Raw price listing as produced by a source adapter, before validation.
///
/// Fields the validator requires are optional here: adapters emit whatever
/// they could parse and let the pipeline reject the rest per item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    /// Source name matching the `sources` table row.
    pub source: String,
    /// Vendor-side listing identifier, for audit.
    pub source_listing_id: String,
    /// Catalog identifier candidate (e.g. "sw0001"), pre-canonicalization.
    pub set_number: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
    /// ISO 4217 code as reported by the vendor.
    pub currency: String,
    /// Vendor condition string, mapped to [`Condition`] by the normalizer.
    pub condition: String,
    pub quantity: Option<i32>,
    pub seller_name: Option<String>,
    pub seller_rating: Option<Decimal>,
    pub url: Option<String>,
    /// Data-quality estimate in [0, 1], assigned at the adapter boundary.
    pub confidence: Decimal,
    /// Vendor payload retained verbatim for reprocessing.
    pub raw: JsonValue,
}

/// Catalog entry scraped from a catalog source, before canonicalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub source: String,
    pub source_id: String,
    pub set_number: String,
    pub name: String,
    pub theme: Option<String>,
    pub subtheme: Option<String>,
    pub year_released: Option<i32>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub piece_count: Option<i32>,
    pub raw: JsonValue,
}

/// Parameters for a price fetch against one catalog item.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    pub set_number: String,
    pub condition: Option<Condition>,
    /// Per-page cap; adapters clamp to their API maximum.
    pub limit: Option<u32>,
}

impl ListingFilter {
    #[must_use]
    pub fn for_set(set_number: impl Into<String>) -> Self {
        Self {
            set_number: set_number.into(),
            condition: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Parameters for a catalog fetch.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub theme: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<u32>,
}

/// Canonical stored form of a catalog identifier: trimmed and lowercased.
#[must_use]
pub fn canonical_set_number(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_round_trip() {
        for c in [Condition::New, Condition::Used, Condition::Sealed] {
            assert_eq!(Condition::parse(c.as_str()), Some(c));
        }
    }

    #[test]
    fn test_condition_rejects_vendor_vocabulary() {
        // Lowercase vendor strings are the normalizer's job.
        assert_eq!(Condition::parse("new"), None);
        assert_eq!(Condition::parse("Mint"), None);
        assert_eq!(Condition::parse(""), None);
    }

    #[test]
    fn test_canonical_set_number() {
        assert_eq!(canonical_set_number("  SW0001 "), "sw0001");
        assert_eq!(canonical_set_number("hp123"), "hp123");
    }

    #[test]
    fn test_listing_filter_builder() {
        let filter = ListingFilter::for_set("sw0001").with_condition(Condition::New);
        assert_eq!(filter.set_number, "sw0001");
        assert_eq!(filter.condition, Some(Condition::New));
        assert!(filter.limit.is_none());
    }

    #[test]
    fn test_rate_limit_policy_defaults() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.requests_per_minute, 60);
        assert_eq!(policy.max_retries, 3);
    }
}
