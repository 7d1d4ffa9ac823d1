//! Row models for the persistent store.

pub mod catalog_item;
pub mod price;
pub mod snapshot;
pub mod source;

pub use catalog_item::{CatalogItemRow, NewCatalogItem};
pub use price::{NewPriceRecord, PriceRecordRow};
pub use snapshot::NewSnapshot;
pub use source::SourceRow;
