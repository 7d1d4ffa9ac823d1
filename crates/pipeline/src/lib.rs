//! Four-stage ingest pipeline for scraped price listings:
//! validate → normalize → deduplicate → persist.
//!
//! Stages are synchronous, in-memory transforms; only the duplicate probe
//! and the final insert touch the store. Per-item failures never abort a
//! batch, and every input item lands in exactly one report counter.

pub mod dedup;
pub mod normalizer;
pub mod persister;
pub mod runner;
pub mod store;
pub mod validator;

pub use dedup::DuplicateDetector;
pub use normalizer::{NormalizedListing, Normalizer, NormalizerConfig};
pub use persister::Persister;
pub use runner::{CatalogPipeline, CatalogReport, PipelineReport, PricePipeline};
pub use store::{CatalogStore, PgPriceStore, PriceStore};
pub use validator::{Rejection, ValidListing, Validator};
