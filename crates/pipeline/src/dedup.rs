//! Stage 3: duplicate detection.
//!
//! At most one listing per (catalog item, source, UTC day) passes;
//! first-seen wins. A batch-local key set catches repeats within one fetch,
//! a store probe catches repeats against earlier runs. This is a heuristic
//! window, not an identity check: legitimately distinct same-day listings
//! for the same key are suppressed.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::store::PriceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DuplicateKey {
    catalog_item_id: Uuid,
    source_id: i32,
    day: NaiveDate,
}

/// Stage 3 of the pipeline. One detector lives for one batch; the key set
/// resets with it.
pub struct DuplicateDetector {
    store: Arc<dyn PriceStore>,
    seen: HashSet<DuplicateKey>,
}

impl DuplicateDetector {
    #[must_use]
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self {
            store,
            seen: HashSet::new(),
        }
    }

    /// Whether a listing for this key should be suppressed.
    ///
    /// # Errors
    /// Returns an error if the store probe fails.
    pub async fn is_duplicate(
        &mut self,
        catalog_item_id: Uuid,
        source_id: i32,
        day: NaiveDate,
    ) -> Result<bool> {
        let key = DuplicateKey {
            catalog_item_id,
            source_id,
            day,
        };

        if self.seen.contains(&key) {
            return Ok(true);
        }

        let exists = self
            .store
            .has_record_for_day(catalog_item_id, source_id, day)
            .await?;
        if exists {
            self.seen.insert(key);
        }
        Ok(exists)
    }

    /// Marks a key as taken after its first listing persisted, suppressing
    /// later same-key listings in the batch.
    pub fn mark_persisted(&mut self, catalog_item_id: Uuid, source_id: i32, day: NaiveDate) {
        self.seen.insert(DuplicateKey {
            catalog_item_id,
            source_id,
            day,
        });
    }
}
