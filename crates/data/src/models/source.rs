use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External data source row with per-fetch bookkeeping.
///
/// Created once at setup; every fetch attempt updates the outcome fields.
/// Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SourceRow {
    pub id: i32,
    pub name: String,
    /// "API", "SCRAPE", or "FEED".
    pub api_type: String,
    pub is_active: bool,
    pub rate_limit_per_hour: Option<i32>,
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub last_fetch_success: Option<bool>,
    pub last_fetch_error: Option<String>,
    pub successful_fetches: i32,
    pub failed_fetches: i32,
}
