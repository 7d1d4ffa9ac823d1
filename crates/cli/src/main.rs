use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use figstonks_core::{AppConfig, Condition, ConfigLoader, RateLimitPolicy, SourceAdapter};
use figstonks_data::Repositories;
use figstonks_scheduler::{Dispatcher, Invocation, InvocationQueue, Scheduler, WorkerPool};
use figstonks_source_bricklink::{BricklinkAdapter, BricklinkClient, BricklinkClientConfig};
use figstonks_source_brickset::{BricksetAdapter, BricksetClient, BricksetClientConfig};
use figstonks_source_ebay::{EbayAdapter, EbayClient, EbayClientConfig};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "figstonks")]
#[command(about = "Minifigure price tracking and aggregation", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the catalog from catalog sources
    SyncCatalog {
        /// Restrict to one theme (e.g. "Star Wars")
        #[arg(long)]
        theme: Option<String>,
        /// Restrict to one release year
        #[arg(long)]
        year: Option<i32>,
        /// Maximum entries to fetch
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Fetch prices for one catalog item across all price sources
    FetchPrices {
        /// Set number (e.g. "sw0001")
        set_number: String,
        /// Filter by condition: NEW, USED or SEALED
        #[arg(long)]
        condition: Option<String>,
    },
    /// Fetch prices for a batch of recently added catalog items
    UpdatePrices {
        /// Batch size (defaults to the configured value)
        #[arg(long)]
        batch_size: Option<u32>,
    },
    /// Aggregate one date's price records into snapshots
    Aggregate {
        /// Date to aggregate (YYYY-MM-DD, defaults to yesterday UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Aggregate every date in an inclusive range
    Backfill {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
    /// Delete price records older than the retention horizon
    Cleanup {
        /// Retention in days (defaults to the configured value)
        #[arg(long)]
        retention_days: Option<i64>,
    },
    /// Run the scheduler daemon with cron triggers and workers
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load_from(&cli.config)?;

    match cli.command {
        Commands::SyncCatalog { theme, year, limit } => {
            run_invocation(&config, Invocation::SyncCatalog { theme, year, limit }).await
        }
        Commands::FetchPrices {
            set_number,
            condition,
        } => {
            let condition = condition.map(|c| parse_condition(&c)).transpose()?;
            run_invocation(
                &config,
                Invocation::FetchPrices {
                    set_number,
                    condition,
                },
            )
            .await
        }
        Commands::UpdatePrices { batch_size } => {
            let batch_size = batch_size.unwrap_or(config.scheduler.price_update_batch_size);
            run_invocation(&config, Invocation::UpdatePrices { batch_size }).await
        }
        Commands::Aggregate { date } => {
            run_invocation(&config, Invocation::Aggregate { date }).await
        }
        Commands::Backfill { start, end } => {
            anyhow::ensure!(start <= end, "start date must not be after end date");
            run_invocation(&config, Invocation::Backfill { start, end }).await
        }
        Commands::Cleanup { retention_days } => {
            run_invocation(&config, Invocation::Cleanup { retention_days }).await
        }
        Commands::Schedule => run_daemon(config).await,
    }
}

fn parse_condition(input: &str) -> Result<Condition> {
    Condition::parse(&input.to_uppercase())
        .with_context(|| format!("invalid condition '{input}', expected NEW, USED or SEALED"))
}

async fn build_dispatcher(config: &AppConfig) -> Result<Dispatcher> {
    let pool = figstonks_data::connect(&config.database).await?;
    let repos = Repositories::new(pool);
    let adapters = build_adapters(config)?;
    anyhow::ensure!(
        !adapters.is_empty(),
        "no sources configured: set ebay.app_id, brickset.api_key, or bricklink.enabled"
    );
    Ok(Dispatcher::new(repos, adapters, config.scheduler.clone()))
}

fn build_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if config.ebay.app_id.is_empty() {
        warn!("ebay.app_id not set, skipping eBay source");
    } else {
        let client = EbayClient::new(
            EbayClientConfig::default()
                .with_base_url(config.ebay.api_url.clone())
                .with_app_id(config.ebay.app_id.clone())
                .with_rate_limit(per_minute(config.ebay.requests_per_minute))
                .with_timeout_secs(config.ebay.timeout_secs),
        )?;
        adapters.push(Arc::new(EbayAdapter::new(
            client,
            policy(config.ebay.requests_per_minute),
        )));
    }

    if config.brickset.api_key.is_empty() {
        warn!("brickset.api_key not set, skipping Brickset source");
    } else {
        let client = BricksetClient::new(
            BricksetClientConfig::default()
                .with_base_url(config.brickset.api_url.clone())
                .with_api_key(config.brickset.api_key.clone())
                .with_rate_limit(per_minute(config.brickset.requests_per_minute))
                .with_timeout_secs(config.brickset.timeout_secs),
        )?;
        adapters.push(Arc::new(BricksetAdapter::new(
            client,
            policy(config.brickset.requests_per_minute),
        )));
    }

    if config.bricklink.enabled {
        let client = BricklinkClient::new(
            BricklinkClientConfig::default()
                .with_base_url(config.bricklink.base_url.clone())
                .with_rate_limit(per_minute(config.bricklink.requests_per_minute))
                .with_timeout_secs(config.bricklink.timeout_secs),
        )?;
        adapters.push(Arc::new(BricklinkAdapter::new(
            client,
            RateLimitPolicy {
                backoff_base_ms: 500,
                ..policy(config.bricklink.requests_per_minute)
            },
        )));
    } else {
        warn!("bricklink.enabled is false, skipping BrickLink source");
    }

    Ok(adapters)
}

fn per_minute(requests_per_minute: u32) -> NonZeroU32 {
    NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN)
}

fn policy(requests_per_minute: u32) -> RateLimitPolicy {
    RateLimitPolicy {
        requests_per_minute,
        requests_per_hour: requests_per_minute.saturating_mul(60),
        ..RateLimitPolicy::default()
    }
}

async fn run_invocation(config: &AppConfig, invocation: Invocation) -> Result<()> {
    let dispatcher = build_dispatcher(config).await?;
    info!(%invocation, "running");
    dispatcher.run(invocation).await
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let dispatcher = Arc::new(build_dispatcher(&config).await?);
    let (queue, rx) = InvocationQueue::new(config.scheduler.queue_depth);
    let _workers = WorkerPool::spawn(config.scheduler.workers, rx, dispatcher);

    Scheduler::new(config.scheduler, queue).start().await
}
