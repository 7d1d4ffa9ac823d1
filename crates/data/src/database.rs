use anyhow::{Context, Result};
use figstonks_core::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Connects to Postgres with the configured pool size.
///
/// # Errors
/// Returns an error if the database connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}
