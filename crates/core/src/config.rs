use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub ebay: EbayConfig,
    pub brickset: BricksetConfig,
    pub bricklink: BricklinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Trigger table defaults. Cron expressions are six-field
/// (sec min hour day month weekday), all times UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Fixed worker pool size for queued invocations.
    pub workers: usize,
    /// Bounded invocation queue depth.
    pub queue_depth: usize,
    pub catalog_sync_cron: String,
    pub catalog_sync_limit: u32,
    pub price_update_cron: String,
    pub price_update_batch_size: u32,
    pub aggregation_cron: String,
    pub cleanup_cron: String,
    pub retention_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbayConfig {
    pub api_url: String,
    pub app_id: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BricksetConfig {
    pub api_url: String,
    pub api_key: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

/// BrickLink needs no credentials; the scrape is gated by robots.txt and
/// the declared rate limit instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BricklinkConfig {
    pub base_url: String,
    pub enabled: bool,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/figstonks".to_string(),
                max_connections: 10,
            },
            scheduler: SchedulerConfig::default(),
            ebay: EbayConfig::default(),
            brickset: BricksetConfig::default(),
            bricklink: BricklinkConfig::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 4,
            queue_depth: 64,
            // Catalog sync daily at 02:00 UTC.
            catalog_sync_cron: "0 0 2 * * *".to_string(),
            catalog_sync_limit: 500,
            // Price updates every six hours.
            price_update_cron: "0 0 */6 * * *".to_string(),
            price_update_batch_size: 50,
            // Aggregate the previous day at 01:00 UTC.
            aggregation_cron: "0 0 1 * * *".to_string(),
            // Retention cleanup Sunday 03:00 UTC.
            cleanup_cron: "0 0 3 * * 0".to_string(),
            retention_days: 90,
        }
    }
}

impl Default for EbayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://svcs.ebay.com/services/search/FindingService/v1".to_string(),
            app_id: String::new(),
            requests_per_minute: 100,
            timeout_secs: 30,
        }
    }
}

impl Default for BricksetConfig {
    fn default() -> Self {
        Self {
            api_url: "https://brickset.com/api/v3.asmx".to_string(),
            api_key: String::new(),
            requests_per_minute: 60,
            timeout_secs: 30,
        }
    }
}

impl Default for BricklinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.bricklink.com".to_string(),
            enabled: true,
            // BrickLink's published limit.
            requests_per_minute: 120,
            timeout_secs: 30,
        }
    }
}
