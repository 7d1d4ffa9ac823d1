//! eBay Finding API source adapter.
//!
//! Fetches completed and active listings for one catalog item, with rate
//! limiting, bounded retries, and a per-listing confidence estimate.

pub mod adapter;
pub mod client;
pub mod error;
pub mod types;

pub use adapter::{EbayAdapter, SOURCE_NAME};
pub use client::{EbayClient, EbayClientConfig, EBAY_FINDING_URL, OP_FIND_ACTIVE, OP_FIND_COMPLETED};
pub use error::EbayError;
