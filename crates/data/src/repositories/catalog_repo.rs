//! Catalog item repository.
//!
//! Upsert-by-set-number is the catalog sync contract: the identifier is
//! immutable once created, every other attribute is refreshed in place.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CatalogItemRow, NewCatalogItem};

/// Outcome of a catalog upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Repository for catalog item operations.
#[derive(Debug, Clone)]
pub struct CatalogItemRepository {
    pool: PgPool,
}

impl CatalogItemRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or refreshes a catalog item keyed by its set number.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(&self, item: &NewCatalogItem) -> Result<(Uuid, UpsertOutcome)> {
        // xmax = 0 distinguishes a fresh insert from a conflict-update.
        let row: (Uuid, bool) = sqlx::query_as(
            r#"
            INSERT INTO catalog_items
                (set_number, name, theme, subtheme, year_released,
                 image_url, thumbnail_url, piece_count, extra)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (set_number) DO UPDATE
            SET name = EXCLUDED.name,
                theme = EXCLUDED.theme,
                subtheme = EXCLUDED.subtheme,
                year_released = EXCLUDED.year_released,
                image_url = EXCLUDED.image_url,
                thumbnail_url = EXCLUDED.thumbnail_url,
                piece_count = EXCLUDED.piece_count,
                extra = EXCLUDED.extra,
                updated_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(&item.set_number)
        .bind(&item.name)
        .bind(&item.theme)
        .bind(&item.subtheme)
        .bind(item.year_released)
        .bind(&item.image_url)
        .bind(&item.thumbnail_url)
        .bind(item.piece_count)
        .bind(&item.extra)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert catalog item")?;

        let outcome = if row.1 {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };
        Ok((row.0, outcome))
    }

    /// Looks up an item id by its canonical set number.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn id_by_set_number(&self, set_number: &str) -> Result<Option<Uuid>> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM catalog_items WHERE set_number = $1
            "#,
        )
        .bind(set_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query catalog item id")?;

        Ok(row.map(|r| r.0))
    }

    /// Lists the most recently added items, used to pick the price-update
    /// batch.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<CatalogItemRow>> {
        let rows = sqlx::query_as::<_, CatalogItemRow>(
            r#"
            SELECT id, set_number, name, theme, subtheme, year_released,
                   image_url, thumbnail_url, piece_count, extra,
                   created_at, updated_at
            FROM catalog_items
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list catalog items")?;

        Ok(rows)
    }
}
