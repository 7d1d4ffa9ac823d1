//! Invocation model.
//!
//! Every unit of scheduled or on-demand work is one `Invocation`. Cron
//! triggers and CLI commands both produce these; the dispatcher consumes
//! them, so manual runs and timed runs share one code path.

use std::fmt;

use chrono::{NaiveDate, Utc};
use figstonks_core::Condition;

/// One unit of work for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Refresh the catalog from all catalog-capable sources.
    SyncCatalog {
        theme: Option<String>,
        year: Option<i32>,
        limit: Option<u32>,
    },
    /// Fetch prices for a batch of recently added catalog items.
    UpdatePrices { batch_size: u32 },
    /// Fetch prices for one item across all price sources.
    FetchPrices {
        set_number: String,
        condition: Option<Condition>,
    },
    /// Aggregate one date's records into snapshots. `None` means yesterday.
    Aggregate { date: Option<NaiveDate> },
    /// Aggregate each date in the inclusive range.
    Backfill { start: NaiveDate, end: NaiveDate },
    /// Delete price records older than the retention horizon. `None` uses
    /// the configured default.
    Cleanup { retention_days: Option<i64> },
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyncCatalog { theme, year, .. } => {
                write!(f, "sync-catalog theme={theme:?} year={year:?}")
            }
            Self::UpdatePrices { batch_size } => write!(f, "update-prices batch={batch_size}"),
            Self::FetchPrices {
                set_number,
                condition,
            } => write!(f, "fetch-prices {set_number} condition={condition:?}"),
            Self::Aggregate { date } => write!(f, "aggregate date={date:?}"),
            Self::Backfill { start, end } => write!(f, "backfill {start}..={end}"),
            Self::Cleanup { retention_days } => write!(f, "cleanup retention={retention_days:?}"),
        }
    }
}

/// The default aggregation target: the last fully elapsed UTC day.
#[must_use]
pub fn yesterday_utc() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.pred_opt().unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yesterday_is_one_day_back() {
        let today = Utc::now().date_naive();
        let diff = today - yesterday_utc();
        assert_eq!(diff.num_days(), 1);
    }

    #[test]
    fn test_display_names_the_work() {
        let inv = Invocation::FetchPrices {
            set_number: "sw0001".to_string(),
            condition: Some(Condition::New),
        };
        assert!(inv.to_string().starts_with("fetch-prices sw0001"));
    }
}
