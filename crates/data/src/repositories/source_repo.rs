//! Source repository.
//!
//! Sources hold the per-fetch bookkeeping required by the error model:
//! every invocation outcome, success or failure, lands here so a dead
//! source is visible without log archaeology.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::SourceRow;

/// Repository for external source bookkeeping.
#[derive(Debug, Clone)]
pub struct SourceRepository {
    pool: PgPool,
}

impl SourceRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a source by name, creating it on first use.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn get_or_create(
        &self,
        name: &str,
        api_type: &str,
        rate_limit_per_hour: Option<i32>,
    ) -> Result<SourceRow> {
        // DO UPDATE on the unique name so RETURNING yields the row either way.
        let row = sqlx::query_as::<_, SourceRow>(
            r#"
            INSERT INTO sources (name, api_type, is_active, rate_limit_per_hour)
            VALUES ($1, $2, TRUE, $3)
            ON CONFLICT (name) DO UPDATE SET api_type = EXCLUDED.api_type
            RETURNING id, name, api_type, is_active, rate_limit_per_hour,
                      last_fetch_at, last_fetch_success, last_fetch_error,
                      successful_fetches, failed_fetches
            "#,
        )
        .bind(name)
        .bind(api_type)
        .bind(rate_limit_per_hour)
        .fetch_one(&self.pool)
        .await
        .context("Failed to get or create source")?;

        Ok(row)
    }

    /// Records the outcome of a fetch invocation.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn record_fetch_outcome(
        &self,
        source_id: i32,
        success: bool,
        error: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sources
            SET last_fetch_at = NOW(),
                last_fetch_success = $2,
                last_fetch_error = $3,
                successful_fetches = successful_fetches + CASE WHEN $2 THEN 1 ELSE 0 END,
                failed_fetches = failed_fetches + CASE WHEN $2 THEN 0 ELSE 1 END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(source_id)
        .bind(success)
        .bind(error)
        .execute(&self.pool)
        .await
        .context("Failed to record fetch outcome")?;

        Ok(())
    }
}
