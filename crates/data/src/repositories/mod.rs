//! Database repositories for the price-tracking pipeline.
//!
//! Each repository provides typed access to one table; all coordination
//! between invocations happens through these tables, never in memory.

pub mod catalog_repo;
pub mod price_repo;
pub mod snapshot_repo;
pub mod source_repo;

pub use catalog_repo::{CatalogItemRepository, UpsertOutcome};
pub use price_repo::{day_bounds, PriceRecordRepository};
pub use snapshot_repo::SnapshotRepository;
pub use source_repo::SourceRepository;

use sqlx::PgPool;

/// All repositories built from a single database pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub catalog: CatalogItemRepository,
    pub sources: SourceRepository,
    pub prices: PriceRecordRepository,
    pub snapshots: SnapshotRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            catalog: CatalogItemRepository::new(pool.clone()),
            sources: SourceRepository::new(pool.clone()),
            prices: PriceRecordRepository::new(pool.clone()),
            snapshots: SnapshotRepository::new(pool),
        }
    }
}
