//! Daily snapshot aggregation.
//!
//! Reads one item's price records for one UTC day and rolls them up into a
//! snapshot upserted by (item, date). Re-running a date with unchanged
//! records writes identical contents, so every invocation is idempotent.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use figstonks_data::{
    NewSnapshot, PriceRecordRepository, PriceRecordRow, SnapshotRepository,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::stats::{mean, median};

/// Rolls a day's records up into a snapshot. Empty input yields `None`:
/// a date with no listings gets no row, not a zero-valued one.
#[must_use]
pub fn compute_snapshot(
    catalog_item_id: Uuid,
    date: NaiveDate,
    records: &[PriceRecordRow],
) -> Option<NewSnapshot> {
    if records.is_empty() {
        return None;
    }

    let mut prices: Vec<_> = records.iter().map(|r| r.price_usd).collect();
    prices.sort();

    let sources: HashSet<i32> = records.iter().map(|r| r.source_id).collect();
    let count_of = |condition: &str| {
        i32::try_from(records.iter().filter(|r| r.condition == condition).count())
            .unwrap_or(i32::MAX)
    };

    Some(NewSnapshot {
        catalog_item_id,
        date,
        min_price_usd: prices[0],
        max_price_usd: prices[prices.len() - 1],
        mean_price_usd: mean(&prices)?,
        median_price_usd: median(&prices)?,
        listing_count: i32::try_from(records.len()).unwrap_or(i32::MAX),
        source_count: i32::try_from(sources.len()).unwrap_or(i32::MAX),
        new_count: count_of("NEW"),
        used_count: count_of("USED"),
        sealed_count: count_of("SEALED"),
    })
}

/// Summary of aggregating one date across all items.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyAggregation {
    pub items_seen: usize,
    pub snapshots_written: usize,
    pub errors: usize,
}

/// Summary of a backfill range.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackfillSummary {
    pub days: usize,
    pub snapshots_written: usize,
    pub errors: usize,
}

/// Reads price records and upserts daily snapshots.
#[derive(Debug, Clone)]
pub struct Aggregator {
    prices: PriceRecordRepository,
    snapshots: SnapshotRepository,
}

impl Aggregator {
    #[must_use]
    pub fn new(prices: PriceRecordRepository, snapshots: SnapshotRepository) -> Self {
        Self { prices, snapshots }
    }

    /// Aggregates one (item, date) key. Returns the written snapshot, or
    /// `None` when the item has no records that day.
    ///
    /// # Errors
    /// Returns an error if the read or the upsert fails.
    pub async fn aggregate_item_date(
        &self,
        catalog_item_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<NewSnapshot>> {
        let records = self.prices.query_item_day(catalog_item_id, date).await?;

        let Some(snapshot) = compute_snapshot(catalog_item_id, date, &records) else {
            debug!(%catalog_item_id, %date, "no records for date, skipping snapshot");
            return Ok(None);
        };

        self.snapshots
            .upsert(&snapshot)
            .await
            .context("Failed to write snapshot")?;
        Ok(Some(snapshot))
    }

    /// Aggregates every item that has records on the given date. Per-item
    /// failures are counted and do not stop the run.
    ///
    /// # Errors
    /// Returns an error only if the item listing query fails.
    pub async fn aggregate_date(&self, date: NaiveDate) -> Result<DailyAggregation> {
        let items = self.prices.items_with_records_on(date).await?;
        let mut summary = DailyAggregation {
            items_seen: items.len(),
            ..DailyAggregation::default()
        };

        for item_id in items {
            match self.aggregate_item_date(item_id, date).await {
                Ok(Some(_)) => summary.snapshots_written += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!(%item_id, %date, error = %e, "snapshot aggregation failed");
                    summary.errors += 1;
                }
            }
        }

        info!(
            %date,
            items = summary.items_seen,
            written = summary.snapshots_written,
            errors = summary.errors,
            "daily aggregation complete"
        );
        Ok(summary)
    }

    /// Backfills snapshots for each date in the inclusive range, each date
    /// independently.
    ///
    /// # Errors
    /// Returns an error if a date's item listing query fails.
    pub async fn backfill(&self, start: NaiveDate, end: NaiveDate) -> Result<BackfillSummary> {
        let mut summary = BackfillSummary::default();
        let mut date = start;

        while date <= end {
            let daily = self.aggregate_date(date).await?;
            summary.days += 1;
            summary.snapshots_written += daily.snapshots_written;
            summary.errors += daily.errors;

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        info!(
            %start,
            %end,
            days = summary.days,
            written = summary.snapshots_written,
            "backfill complete"
        );
        Ok(summary)
    }

    /// Deletes price records older than the retention horizon. Snapshots
    /// are preserved; they have superseded the raw facts.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn cleanup_listings(&self, retention_days: i64) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let deleted = self.prices.delete_before(cutoff).await?;
        info!(%cutoff, deleted, "retention cleanup complete");
        Ok(deleted)
    }
}
