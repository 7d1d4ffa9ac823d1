pub mod database;
pub mod models;
pub mod repositories;

pub use database::connect;
pub use models::{
    CatalogItemRow, NewCatalogItem, NewPriceRecord, NewSnapshot, PriceRecordRow, SourceRow,
};
pub use repositories::{
    day_bounds, CatalogItemRepository, PriceRecordRepository, Repositories, SnapshotRepository,
    SourceRepository, UpsertOutcome,
};
