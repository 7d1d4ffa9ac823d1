//! Snapshot repository.
//!
//! Snapshots are unique per (catalog item, date) and written with a full
//! overwrite upsert so re-aggregation is idempotent.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::NewSnapshot;

/// Repository for daily price snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a snapshot, overwriting every statistic on conflict.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(&self, snapshot: &NewSnapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO price_snapshots
                (catalog_item_id, date, min_price_usd, max_price_usd,
                 mean_price_usd, median_price_usd, listing_count, source_count,
                 new_count, used_count, sealed_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (catalog_item_id, date) DO UPDATE
            SET min_price_usd = EXCLUDED.min_price_usd,
                max_price_usd = EXCLUDED.max_price_usd,
                mean_price_usd = EXCLUDED.mean_price_usd,
                median_price_usd = EXCLUDED.median_price_usd,
                listing_count = EXCLUDED.listing_count,
                source_count = EXCLUDED.source_count,
                new_count = EXCLUDED.new_count,
                used_count = EXCLUDED.used_count,
                sealed_count = EXCLUDED.sealed_count,
                updated_at = NOW()
            "#,
        )
        .bind(snapshot.catalog_item_id)
        .bind(snapshot.date)
        .bind(snapshot.min_price_usd)
        .bind(snapshot.max_price_usd)
        .bind(snapshot.mean_price_usd)
        .bind(snapshot.median_price_usd)
        .bind(snapshot.listing_count)
        .bind(snapshot.source_count)
        .bind(snapshot.new_count)
        .bind(snapshot.used_count)
        .bind(snapshot.sealed_count)
        .execute(&self.pool)
        .await
        .context("Failed to upsert snapshot")?;

        Ok(())
    }
}
