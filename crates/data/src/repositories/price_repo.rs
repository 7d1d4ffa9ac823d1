//! Price record repository.
//!
//! Price records are append-only facts: single-row inserts from the
//! pipeline, day-bucket range queries for the aggregator and the duplicate
//! detector, and a retention delete for cleanup.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewPriceRecord, PriceRecordRow};

/// Half-open UTC bounds [start, end) of one calendar day.
#[must_use]
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Repository for time-series price records.
#[derive(Debug, Clone)]
pub struct PriceRecordRepository {
    pool: PgPool,
}

impl PriceRecordRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a single price record and returns its id.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including referential-integrity
    /// violations when the catalog item or source does not exist.
    pub async fn insert(&self, record: &NewPriceRecord) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO price_records
                (catalog_item_id, source_id, timestamp, price_usd,
                 original_price, original_currency, exchange_rate, condition,
                 quantity, seller_name, seller_rating, confidence_score, raw)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(record.catalog_item_id)
        .bind(record.source_id)
        .bind(record.timestamp)
        .bind(record.price_usd)
        .bind(record.original_price)
        .bind(&record.original_currency)
        .bind(record.exchange_rate)
        .bind(&record.condition)
        .bind(record.quantity)
        .bind(&record.seller_name)
        .bind(record.seller_rating)
        .bind(record.confidence_score)
        .bind(&record.raw)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert price record")?;

        Ok(row.0)
    }

    /// Checks whether any record exists for (item, source, day).
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn exists_for_day(
        &self,
        catalog_item_id: Uuid,
        source_id: i32,
        day: NaiveDate,
    ) -> Result<bool> {
        let (start, end) = day_bounds(day);

        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM price_records
                WHERE catalog_item_id = $1 AND source_id = $2
                  AND timestamp >= $3 AND timestamp < $4
            )
            "#,
        )
        .bind(catalog_item_id)
        .bind(source_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .context("Failed to probe for existing price record")?;

        Ok(row.0)
    }

    /// Queries all records for one item on one day, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_item_day(
        &self,
        catalog_item_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<PriceRecordRow>> {
        let (start, end) = day_bounds(day);

        let rows = sqlx::query_as::<_, PriceRecordRow>(
            r#"
            SELECT id, catalog_item_id, source_id, timestamp, price_usd,
                   original_price, original_currency, exchange_rate, condition,
                   quantity, seller_name, seller_rating, confidence_score, raw
            FROM price_records
            WHERE catalog_item_id = $1 AND timestamp >= $2 AND timestamp < $3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(catalog_item_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query price records for day")?;

        Ok(rows)
    }

    /// Lists the distinct items that have records on a given day.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn items_with_records_on(&self, day: NaiveDate) -> Result<Vec<Uuid>> {
        let (start, end) = day_bounds(day);

        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT catalog_item_id
            FROM price_records
            WHERE timestamp >= $1 AND timestamp < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list items with records")?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Deletes records older than the cutoff. Snapshots are untouched.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM price_records WHERE timestamp < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .context("Failed to delete old price records")?;

        Ok(result.rows_affected())
    }
}
