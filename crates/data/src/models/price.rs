use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Time-series price fact. Immutable once written; deleted only by retention
/// cleanup after snapshots have superseded it.
///
/// `price_usd` is the reporting-currency price; the original price, currency,
/// and applied exchange rate are retained unmodified for audit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceRecordRow {
    pub id: i64,
    pub catalog_item_id: Uuid,
    pub source_id: i32,
    pub timestamp: DateTime<Utc>,
    pub price_usd: Decimal,
    pub original_price: Decimal,
    pub original_currency: String,
    pub exchange_rate: Decimal,
    /// Canonical form of [`figstonks_core::Condition`].
    pub condition: String,
    pub quantity: Option<i32>,
    pub seller_name: Option<String>,
    pub seller_rating: Option<Decimal>,
    pub confidence_score: Decimal,
    pub raw: JsonValue,
}

/// Insert shape produced by the pipeline's persister.
#[derive(Debug, Clone)]
pub struct NewPriceRecord {
    pub catalog_item_id: Uuid,
    pub source_id: i32,
    pub timestamp: DateTime<Utc>,
    pub price_usd: Decimal,
    pub original_price: Decimal,
    pub original_currency: String,
    pub exchange_rate: Decimal,
    pub condition: String,
    pub quantity: Option<i32>,
    pub seller_name: Option<String>,
    pub seller_rating: Option<Decimal>,
    pub confidence_score: Decimal,
    pub raw: JsonValue,
}
