//! Pipeline runners: wire the four stages over one fetched batch.
//!
//! Every input item is accounted for exactly once: persisted, duplicate,
//! rejected, or errored. Nothing here aborts the batch; per-item failures
//! are counted and logged.

use std::sync::Arc;

use anyhow::Result;
use figstonks_core::{canonical_set_number, CatalogEntry, RawListing};
use figstonks_data::{NewCatalogItem, UpsertOutcome};
use tracing::{debug, info, warn};

use crate::dedup::DuplicateDetector;
use crate::normalizer::{Normalizer, NormalizerConfig};
use crate::persister::Persister;
use crate::store::{CatalogStore, PriceStore};
use crate::validator::Validator;

/// Per-batch accounting for the price pipeline.
///
/// Invariant: `persisted + duplicates + rejected + errors == input`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub input: usize,
    pub persisted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub errors: usize,
}

impl PipelineReport {
    /// Sum of all outcome counters; equals `input` when the batch completed.
    #[must_use]
    pub fn accounted(&self) -> usize {
        self.persisted + self.duplicates + self.rejected + self.errors
    }
}

/// Runs validate → normalize → dedup → persist over fetched listings.
pub struct PricePipeline {
    validator: Validator,
    normalizer: Normalizer,
    store: Arc<dyn PriceStore>,
}

impl PricePipeline {
    #[must_use]
    pub fn new(store: Arc<dyn PriceStore>, config: Arc<NormalizerConfig>) -> Self {
        Self {
            validator: Validator::new(config.clone()),
            normalizer: Normalizer::new(config),
            store,
        }
    }

    /// Processes one batch fetched from a single source.
    ///
    /// # Errors
    /// Returns an error only if the store itself fails on a probe; per-item
    /// insert failures are counted in the report.
    pub async fn run(&self, source_id: i32, listings: Vec<RawListing>) -> Result<PipelineReport> {
        let mut report = PipelineReport {
            input: listings.len(),
            ..PipelineReport::default()
        };
        let mut dedup = DuplicateDetector::new(self.store.clone());
        let persister = Persister::new(self.store.clone());

        for listing in listings {
            let valid = match self.validator.validate(listing) {
                Ok(valid) => valid,
                Err(reason) => {
                    debug!(%reason, "listing rejected");
                    report.rejected += 1;
                    continue;
                }
            };

            let normalized = self.normalizer.normalize(valid);

            let Some(item_id) = self.store.resolve_item(&normalized.set_number).await? else {
                warn!(
                    set_number = %normalized.set_number,
                    "no catalog item for listing, skipping"
                );
                report.errors += 1;
                continue;
            };

            let day = normalized.day();
            if dedup.is_duplicate(item_id, source_id, day).await? {
                report.duplicates += 1;
                continue;
            }

            match persister.persist(item_id, source_id, &normalized).await {
                Ok(record_id) => {
                    debug!(record_id, set_number = %normalized.set_number, "price record persisted");
                    dedup.mark_persisted(item_id, source_id, day);
                    report.persisted += 1;
                }
                Err(e) => {
                    warn!(set_number = %normalized.set_number, error = %e, "persist failed");
                    report.errors += 1;
                }
            }
        }

        info!(
            input = report.input,
            persisted = report.persisted,
            duplicates = report.duplicates,
            rejected = report.rejected,
            errors = report.errors,
            "price batch processed"
        );
        Ok(report)
    }
}

/// Per-batch accounting for catalog sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub input: usize,
    pub created: usize,
    pub updated: usize,
    pub rejected: usize,
    pub errors: usize,
}

/// Runs validate → canonicalize → upsert over fetched catalog entries.
/// The upsert itself is the duplicate handling: set numbers are unique and
/// refreshes are in-place.
pub struct CatalogPipeline {
    store: Arc<dyn CatalogStore>,
}

impl CatalogPipeline {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Processes one catalog fetch.
    ///
    /// # Errors
    /// Never fails the batch; store errors are counted per entry.
    pub async fn run(&self, entries: Vec<CatalogEntry>) -> Result<CatalogReport> {
        let mut report = CatalogReport {
            input: entries.len(),
            ..CatalogReport::default()
        };

        for entry in entries {
            let set_number = canonical_set_number(&entry.set_number);
            if set_number.is_empty() || entry.name.trim().is_empty() {
                debug!(source_id = %entry.source_id, "catalog entry rejected");
                report.rejected += 1;
                continue;
            }

            let item = NewCatalogItem {
                set_number,
                name: entry.name.trim().to_string(),
                theme: entry.theme.map(|t| t.trim().to_string()),
                subtheme: entry.subtheme.map(|t| t.trim().to_string()),
                year_released: entry.year_released,
                image_url: entry.image_url,
                thumbnail_url: entry.thumbnail_url,
                piece_count: entry.piece_count,
                extra: entry.raw,
            };

            match self.store.upsert_item(item).await {
                Ok(UpsertOutcome::Created) => report.created += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Err(e) => {
                    warn!(error = %e, "catalog upsert failed");
                    report.errors += 1;
                }
            }
        }

        info!(
            input = report.input,
            created = report.created,
            updated = report.updated,
            rejected = report.rejected,
            errors = report.errors,
            "catalog batch processed"
        );
        Ok(report)
    }
}
