//! Brickset API source adapter: catalog metadata for minifigures.

pub mod adapter;
pub mod client;
pub mod error;
pub mod types;

pub use adapter::{BricksetAdapter, SOURCE_NAME};
pub use client::{BricksetClient, BricksetClientConfig, BRICKSET_API_URL};
pub use error::BricksetError;
