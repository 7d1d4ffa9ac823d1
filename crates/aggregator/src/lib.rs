//! Daily price snapshot aggregation.
//!
//! Rolls the immutable price records for each (item, UTC day) pair into a
//! single snapshot row, plus the retention cleanup that deletes raw records
//! the snapshots have superseded.

pub mod aggregator;
pub mod stats;

pub use aggregator::{Aggregator, BackfillSummary, DailyAggregation, compute_snapshot};
pub use stats::{mean, median};
