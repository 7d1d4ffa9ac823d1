use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Catalog item row. The `set_number` is the canonical external identifier
/// and never changes once created; other attributes are updated in place by
/// catalog sync. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogItemRow {
    pub id: Uuid,
    pub set_number: String,
    pub name: String,
    pub theme: Option<String>,
    pub subtheme: Option<String>,
    pub year_released: Option<i32>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub piece_count: Option<i32>,
    pub extra: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert/upsert shape for catalog sync.
#[derive(Debug, Clone)]
pub struct NewCatalogItem {
    pub set_number: String,
    pub name: String,
    pub theme: Option<String>,
    pub subtheme: Option<String>,
    pub year_released: Option<i32>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub piece_count: Option<i32>,
    pub extra: JsonValue,
}
