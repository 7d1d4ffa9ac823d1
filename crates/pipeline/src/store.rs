//! Storage seam for the pipeline stages.
//!
//! The duplicate detector and persister only need three operations, so they
//! depend on this trait rather than on the repositories directly. Production
//! wires [`PgPriceStore`]; tests use an in-memory double.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use figstonks_data::{NewCatalogItem, NewPriceRecord, Repositories, UpsertOutcome};
use uuid::Uuid;

/// Store operations used by the price pipeline.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Resolves a canonical set number to its catalog item id.
    async fn resolve_item(&self, set_number: &str) -> Result<Option<Uuid>>;

    /// Whether any record already exists for (item, source, day).
    async fn has_record_for_day(
        &self,
        catalog_item_id: Uuid,
        source_id: i32,
        day: NaiveDate,
    ) -> Result<bool>;

    /// Inserts one immutable price record, returning its id.
    async fn insert_record(&self, record: NewPriceRecord) -> Result<i64>;
}

/// Store operations used by the catalog pipeline.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Upserts a catalog item keyed by set number.
    async fn upsert_item(&self, item: NewCatalogItem) -> Result<UpsertOutcome>;
}

/// Postgres-backed store built on the data repositories.
#[derive(Debug, Clone)]
pub struct PgPriceStore {
    repos: Repositories,
}

impl PgPriceStore {
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    async fn resolve_item(&self, set_number: &str) -> Result<Option<Uuid>> {
        self.repos.catalog.id_by_set_number(set_number).await
    }

    async fn has_record_for_day(
        &self,
        catalog_item_id: Uuid,
        source_id: i32,
        day: NaiveDate,
    ) -> Result<bool> {
        self.repos
            .prices
            .exists_for_day(catalog_item_id, source_id, day)
            .await
    }

    async fn insert_record(&self, record: NewPriceRecord) -> Result<i64> {
        self.repos.prices.insert(&record).await
    }
}

#[async_trait]
impl CatalogStore for PgPriceStore {
    async fn upsert_item(&self, item: NewCatalogItem) -> Result<UpsertOutcome> {
        let (_, outcome) = self.repos.catalog.upsert(&item).await?;
        Ok(outcome)
    }
}
