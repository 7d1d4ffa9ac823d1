//! Invocation dispatch.
//!
//! One `Dispatcher` owns the adapters, the pipelines and the aggregator,
//! and executes any `Invocation` against them. Source bookkeeping is
//! written for every fetch, success or failure, so a dead source is
//! visible from its row alone.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use figstonks_aggregator::Aggregator;
use figstonks_core::{
    canonical_set_number, CatalogFilter, Condition, ListingFilter, SchedulerConfig, SourceAdapter,
};
use figstonks_data::Repositories;
use figstonks_pipeline::{CatalogPipeline, NormalizerConfig, PgPriceStore, PricePipeline};
use tracing::{info, warn};

use crate::invocation::{yesterday_utc, Invocation};
use crate::queue::InvocationHandler;

/// Executes invocations against the configured sources and stores.
pub struct Dispatcher {
    repos: Repositories,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    price_pipeline: PricePipeline,
    catalog_pipeline: CatalogPipeline,
    aggregator: Aggregator,
    config: SchedulerConfig,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        repos: Repositories,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        config: SchedulerConfig,
    ) -> Self {
        let store = Arc::new(PgPriceStore::new(repos.clone()));
        let aggregator = Aggregator::new(repos.prices.clone(), repos.snapshots.clone());
        Self {
            repos,
            adapters,
            price_pipeline: PricePipeline::new(store.clone(), Arc::new(NormalizerConfig::default())),
            catalog_pipeline: CatalogPipeline::new(store),
            aggregator,
            config,
        }
    }

    /// Runs one invocation to completion.
    ///
    /// # Errors
    /// Returns an error when the invocation as a whole could not run;
    /// per-source and per-item failures are logged and recorded instead.
    pub async fn run(&self, invocation: Invocation) -> Result<()> {
        match invocation {
            Invocation::SyncCatalog { theme, year, limit } => {
                self.sync_catalog(&CatalogFilter { theme, year, limit }).await
            }
            Invocation::UpdatePrices { batch_size } => self.update_prices(batch_size).await,
            Invocation::FetchPrices {
                set_number,
                condition,
            } => self.fetch_prices(&set_number, condition).await,
            Invocation::Aggregate { date } => {
                let date = date.unwrap_or_else(yesterday_utc);
                self.aggregator.aggregate_date(date).await?;
                Ok(())
            }
            Invocation::Backfill { start, end } => {
                self.aggregator.backfill(start, end).await?;
                Ok(())
            }
            Invocation::Cleanup { retention_days } => {
                let days = retention_days.unwrap_or(self.config.retention_days);
                self.aggregator.cleanup_listings(days).await?;
                Ok(())
            }
        }
    }

    async fn sync_catalog(&self, filter: &CatalogFilter) -> Result<()> {
        for adapter in &self.adapters {
            let source = self.register_source(adapter.as_ref()).await?;
            if !source.is_active {
                info!(source = adapter.name(), "source disabled, skipping");
                continue;
            }

            match adapter.fetch_catalog(filter).await {
                Ok(entries) if entries.is_empty() => {
                    // Price-only sources have no catalog; nothing to record.
                }
                Ok(entries) => {
                    let report = self.catalog_pipeline.run(entries).await?;
                    self.repos
                        .sources
                        .record_fetch_outcome(source.id, true, None)
                        .await?;
                    info!(
                        source = adapter.name(),
                        created = report.created,
                        updated = report.updated,
                        "catalog sync finished"
                    );
                }
                Err(e) => {
                    warn!(source = adapter.name(), error = %e, "catalog fetch failed");
                    self.repos
                        .sources
                        .record_fetch_outcome(source.id, false, Some(&e.to_string()))
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn fetch_prices(&self, set_number: &str, condition: Option<Condition>) -> Result<()> {
        let set_number = canonical_set_number(set_number);
        let mut filter = ListingFilter::for_set(set_number.clone());
        if let Some(condition) = condition {
            filter = filter.with_condition(condition);
        }

        for adapter in &self.adapters {
            let source = self.register_source(adapter.as_ref()).await?;
            if !source.is_active {
                info!(source = adapter.name(), "source disabled, skipping");
                continue;
            }

            match adapter.fetch_listings(&filter).await {
                Ok(listings) => {
                    let report = self.price_pipeline.run(source.id, listings).await?;
                    self.repos
                        .sources
                        .record_fetch_outcome(source.id, true, None)
                        .await?;
                    info!(
                        source = adapter.name(),
                        set_number = %set_number,
                        persisted = report.persisted,
                        duplicates = report.duplicates,
                        "price fetch finished"
                    );
                }
                Err(e) => {
                    warn!(
                        source = adapter.name(),
                        set_number = %set_number,
                        error = %e,
                        "price fetch failed"
                    );
                    self.repos
                        .sources
                        .record_fetch_outcome(source.id, false, Some(&e.to_string()))
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn update_prices(&self, batch_size: u32) -> Result<()> {
        let items = self.repos.catalog.list_recent(i64::from(batch_size)).await?;
        info!(items = items.len(), "price update batch selected");

        let pause = self.batch_pause();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                // Stagger items so the slowest source's quota holds across
                // the whole batch.
                tokio::time::sleep(pause).await;
            }
            self.fetch_prices(&item.set_number, None).await?;
        }
        Ok(())
    }

    /// Minimum spacing between batch items, derived from the tightest
    /// per-minute limit any adapter declares.
    fn batch_pause(&self) -> Duration {
        let slowest_rpm = self
            .adapters
            .iter()
            .map(|a| a.rate_limit().requests_per_minute.max(1))
            .min()
            .unwrap_or(60);
        Duration::from_millis(u64::from(60_000 / slowest_rpm))
    }

    async fn register_source(
        &self,
        adapter: &dyn SourceAdapter,
    ) -> Result<figstonks_data::SourceRow> {
        let policy = adapter.rate_limit();
        self.repos
            .sources
            .get_or_create(
                adapter.name(),
                adapter.api_type().as_str(),
                i32::try_from(policy.requests_per_hour).ok(),
            )
            .await
    }
}

#[async_trait]
impl InvocationHandler for Dispatcher {
    async fn handle(&self, invocation: Invocation) -> Result<()> {
        self.run(invocation).await
    }
}
