//! Cron trigger registration.
//!
//! Four timed triggers, all UTC: catalog sync, price updates, daily
//! aggregation and retention cleanup. Each tick only enqueues an
//! invocation; the worker pool does the actual work, so a slow fetch
//! never delays the next trigger.

use anyhow::{Context, Result};
use figstonks_core::SchedulerConfig;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::invocation::Invocation;
use crate::queue::InvocationQueue;

/// Registers the timed triggers and keeps them firing.
pub struct Scheduler {
    config: SchedulerConfig,
    queue: InvocationQueue,
}

impl Scheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig, queue: InvocationQueue) -> Self {
        Self { config, queue }
    }

    /// Builds the trigger table from the config.
    #[must_use]
    pub fn triggers(&self) -> Vec<(String, Invocation)> {
        vec![
            (
                self.config.catalog_sync_cron.clone(),
                Invocation::SyncCatalog {
                    theme: None,
                    year: None,
                    limit: Some(self.config.catalog_sync_limit),
                },
            ),
            (
                self.config.price_update_cron.clone(),
                Invocation::UpdatePrices {
                    batch_size: self.config.price_update_batch_size,
                },
            ),
            (
                self.config.aggregation_cron.clone(),
                Invocation::Aggregate { date: None },
            ),
            (
                self.config.cleanup_cron.clone(),
                Invocation::Cleanup {
                    retention_days: None,
                },
            ),
        ]
    }

    /// Starts the cron scheduler and blocks forever.
    ///
    /// # Errors
    /// Returns an error if the scheduler fails to start or a cron
    /// expression does not parse.
    pub async fn start(self) -> Result<()> {
        if !self.config.enabled {
            info!("scheduler is disabled");
            return Ok(());
        }

        let scheduler = JobScheduler::new().await?;

        for (cron, invocation) in self.triggers() {
            info!(%cron, %invocation, "registering trigger");
            let queue = self.queue.clone();
            let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
                let queue = queue.clone();
                let invocation = invocation.clone();
                Box::pin(async move {
                    queue.try_enqueue(invocation);
                })
            })
            .with_context(|| format!("Invalid cron expression: {cron}"))?;
            scheduler.add(job).await?;
        }

        scheduler.start().await?;
        info!("scheduler started");

        // Keep the triggers firing.
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_table_covers_all_jobs() {
        let (queue, _rx) = InvocationQueue::new(4);
        let scheduler = Scheduler::new(SchedulerConfig::default(), queue);
        let triggers = scheduler.triggers();

        assert_eq!(triggers.len(), 4);
        assert!(triggers
            .iter()
            .any(|(_, i)| matches!(i, Invocation::SyncCatalog { .. })));
        assert!(triggers
            .iter()
            .any(|(_, i)| matches!(i, Invocation::UpdatePrices { batch_size: 50 })));
        assert!(triggers
            .iter()
            .any(|(_, i)| matches!(i, Invocation::Aggregate { date: None })));
        assert!(triggers
            .iter()
            .any(|(_, i)| matches!(i, Invocation::Cleanup { retention_days: None })));
    }

    #[test]
    fn test_timed_aggregation_targets_yesterday() {
        // The timed trigger carries no date; the dispatcher resolves it to
        // the last fully elapsed UTC day at run time.
        let (queue, _rx) = InvocationQueue::new(4);
        let scheduler = Scheduler::new(SchedulerConfig::default(), queue);
        let (_, invocation) = scheduler
            .triggers()
            .into_iter()
            .find(|(_, i)| matches!(i, Invocation::Aggregate { .. }))
            .unwrap();
        assert_eq!(invocation, Invocation::Aggregate { date: None });
    }
}
