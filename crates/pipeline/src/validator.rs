//! Stage 1: validation.
//!
//! Rejects listings that cannot become a well-formed price record. Every
//! rejection carries a reason; none of them aborts the batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use figstonks_core::RawListing;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::normalizer::NormalizerConfig;

/// Per-item rejection reasons.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("missing catalog identifier")]
    MissingSetNumber,

    #[error("missing price")]
    MissingPrice,

    #[error("non-positive price: {0}")]
    NonPositivePrice(Decimal),

    #[error("missing observation timestamp")]
    MissingTimestamp,

    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("unmapped condition: {0}")]
    UnmappedCondition(String),
}

/// Listing that passed validation: required fields are guaranteed present,
/// the currency has a known rate, and the condition string is mappable.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidListing {
    pub source: String,
    pub source_listing_id: String,
    pub set_number: String,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub currency: String,
    pub condition: String,
    pub quantity: Option<i32>,
    pub seller_name: Option<String>,
    pub seller_rating: Option<Decimal>,
    /// Clamped into [0, 1].
    pub confidence: Decimal,
    pub raw: JsonValue,
}

/// Stage 1 of the pipeline. Holds the same immutable lookup tables as the
/// normalizer so unknown currencies and conditions are caught here, not
/// downstream.
#[derive(Debug, Clone)]
pub struct Validator {
    config: Arc<NormalizerConfig>,
}

impl Validator {
    #[must_use]
    pub fn new(config: Arc<NormalizerConfig>) -> Self {
        Self { config }
    }

    /// Validates one raw listing.
    ///
    /// # Errors
    /// Returns the rejection reason; callers count it and move on.
    pub fn validate(&self, listing: RawListing) -> Result<ValidListing, Rejection> {
        let set_number = listing
            .set_number
            .filter(|s| !s.trim().is_empty())
            .ok_or(Rejection::MissingSetNumber)?;

        let price = listing.price.ok_or(Rejection::MissingPrice)?;
        if price <= Decimal::ZERO {
            return Err(Rejection::NonPositivePrice(price));
        }

        let timestamp = listing.timestamp.ok_or(Rejection::MissingTimestamp)?;

        if self.config.rate(&listing.currency).is_none() {
            return Err(Rejection::UnknownCurrency(listing.currency));
        }

        if self.config.condition(&listing.condition).is_none() {
            return Err(Rejection::UnmappedCondition(listing.condition));
        }

        let confidence = listing.confidence.clamp(Decimal::ZERO, Decimal::ONE);

        Ok(ValidListing {
            source: listing.source,
            source_listing_id: listing.source_listing_id,
            set_number,
            timestamp,
            price,
            currency: listing.currency,
            condition: listing.condition,
            quantity: listing.quantity,
            seller_name: listing.seller_name,
            seller_rating: listing.seller_rating,
            confidence,
            raw: listing.raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw_listing() -> RawListing {
        RawListing {
            source: "ebay".to_string(),
            source_listing_id: "item-1".to_string(),
            set_number: Some("sw0001".to_string()),
            timestamp: Some(Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()),
            price: Some(dec!(12.50)),
            currency: "USD".to_string(),
            condition: "New".to_string(),
            quantity: Some(1),
            seller_name: None,
            seller_rating: None,
            url: None,
            confidence: Decimal::ONE,
            raw: json!({}),
        }
    }

    fn validator() -> Validator {
        Validator::new(Arc::new(NormalizerConfig::default()))
    }

    #[test]
    fn test_valid_listing_passes() {
        let valid = validator().validate(raw_listing()).unwrap();
        assert_eq!(valid.set_number, "sw0001");
        assert_eq!(valid.price, dec!(12.50));
    }

    #[test]
    fn test_missing_set_number_rejected() {
        let mut listing = raw_listing();
        listing.set_number = None;
        assert_eq!(
            validator().validate(listing),
            Err(Rejection::MissingSetNumber)
        );

        let mut listing = raw_listing();
        listing.set_number = Some("   ".to_string());
        assert_eq!(
            validator().validate(listing),
            Err(Rejection::MissingSetNumber)
        );
    }

    #[test]
    fn test_missing_price_rejected() {
        let mut listing = raw_listing();
        listing.price = None;
        assert_eq!(validator().validate(listing), Err(Rejection::MissingPrice));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        for price in [Decimal::ZERO, dec!(-1.00)] {
            let mut listing = raw_listing();
            listing.price = Some(price);
            assert_eq!(
                validator().validate(listing),
                Err(Rejection::NonPositivePrice(price))
            );
        }
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let mut listing = raw_listing();
        listing.timestamp = None;
        assert_eq!(
            validator().validate(listing),
            Err(Rejection::MissingTimestamp)
        );
    }

    #[test]
    fn test_unknown_currency_rejected_at_validation() {
        let mut listing = raw_listing();
        listing.currency = "JPY".to_string();
        assert_eq!(
            validator().validate(listing),
            Err(Rejection::UnknownCurrency("JPY".to_string()))
        );
    }

    #[test]
    fn test_unmapped_condition_rejected() {
        let mut listing = raw_listing();
        listing.condition = "for parts".to_string();
        assert_eq!(
            validator().validate(listing),
            Err(Rejection::UnmappedCondition("for parts".to_string()))
        );
    }

    #[test]
    fn test_confidence_clamped() {
        let mut listing = raw_listing();
        listing.confidence = dec!(1.7);
        let valid = validator().validate(listing).unwrap();
        assert_eq!(valid.confidence, Decimal::ONE);

        let mut listing = raw_listing();
        listing.confidence = dec!(-0.2);
        let valid = validator().validate(listing).unwrap();
        assert_eq!(valid.confidence, Decimal::ZERO);
    }
}
