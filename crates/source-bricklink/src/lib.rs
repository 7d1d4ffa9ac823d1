//! BrickLink scrape source adapter: minifigure catalog and price guide
//! listings, with robots.txt and rate-limit gating.

pub mod adapter;
pub mod client;
pub mod error;
pub mod robots;
pub mod types;

pub use adapter::{BricklinkAdapter, SOURCE_NAME};
pub use client::{BricklinkClient, BricklinkClientConfig, BRICKLINK_BASE_URL};
pub use error::BricklinkError;
pub use robots::RobotsRules;
