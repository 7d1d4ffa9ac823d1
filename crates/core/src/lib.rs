pub mod config;
pub mod config_loader;
pub mod traits;
pub mod types;

pub use config::{
    AppConfig, BricklinkConfig, BricksetConfig, DatabaseConfig, EbayConfig, SchedulerConfig,
};
pub use config_loader::ConfigLoader;
pub use traits::SourceAdapter;
pub use types::{
    canonical_set_number, ApiType, CatalogEntry, CatalogFilter, Condition, ListingFilter,
    RateLimitPolicy, RawListing,
};
