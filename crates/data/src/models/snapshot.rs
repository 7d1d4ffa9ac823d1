use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Upsert shape produced by the aggregator, unique per (catalog item, date).
/// Overwritten entirely on re-aggregation; never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshot {
    pub catalog_item_id: Uuid,
    pub date: NaiveDate,
    pub min_price_usd: Decimal,
    pub max_price_usd: Decimal,
    pub mean_price_usd: Decimal,
    pub median_price_usd: Decimal,
    pub listing_count: i32,
    /// Distinct sources contributing listings that day.
    pub source_count: i32,
    pub new_count: i32,
    pub used_count: i32,
    pub sealed_count: i32,
}
