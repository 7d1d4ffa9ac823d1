//! Stage 4: persistence.
//!
//! Resolves the catalog item and writes the immutable price record. A
//! missing catalog item is an integrity rejection scoped to that one
//! listing; the batch continues.

use std::sync::Arc;

use anyhow::Result;
use figstonks_data::NewPriceRecord;
use uuid::Uuid;

use crate::normalizer::NormalizedListing;
use crate::store::PriceStore;

/// Stage 4 of the pipeline.
pub struct Persister {
    store: Arc<dyn PriceStore>,
}

impl Persister {
    #[must_use]
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    /// Resolves the listing's catalog item, if it exists.
    ///
    /// # Errors
    /// Returns an error if the store lookup fails.
    pub async fn resolve_item(&self, listing: &NormalizedListing) -> Result<Option<Uuid>> {
        self.store.resolve_item(&listing.set_number).await
    }

    /// Writes one price record for an already-resolved item.
    ///
    /// # Errors
    /// Returns an error if the insert fails; callers count it per item.
    pub async fn persist(
        &self,
        catalog_item_id: Uuid,
        source_id: i32,
        listing: &NormalizedListing,
    ) -> Result<i64> {
        let record = NewPriceRecord {
            catalog_item_id,
            source_id,
            timestamp: listing.timestamp,
            price_usd: listing.price_usd,
            original_price: listing.original_price,
            original_currency: listing.original_currency.clone(),
            exchange_rate: listing.exchange_rate,
            condition: listing.condition.as_str().to_string(),
            quantity: listing.quantity,
            seller_name: listing.seller_name.clone(),
            seller_rating: listing.seller_rating,
            confidence_score: listing.confidence,
            raw: listing.raw.clone(),
        };

        self.store.insert_record(record).await
    }
}
