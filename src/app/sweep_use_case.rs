use crate::common::error::{Result, ScraperError};
use crate::config::SweeperConfig;
use crate::metrics;
use crate::storage::PostingStore;
use chrono::{Duration, NaiveDate};
use std::io::Write;
use tracing::{info, instrument};

/// Inclusive creation-date window the sweep deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RetentionWindow {
    /// Errors when the grace period reaches past the representable date range
    pub fn for_date(today: NaiveDate, config: &SweeperConfig) -> Result<Self> {
        let end = Duration::try_days(config.grace_days)
            .and_then(|grace| today.checked_sub_signed(grace))
            .ok_or_else(|| {
                ScraperError::Config(format!(
                    "sweeper.grace_days {} is out of range for {}",
                    config.grace_days, today
                ))
            })?;
        Ok(Self {
            start: config.epoch,
            end,
        })
    }
}

pub fn removal_message(count: u64) -> String {
    format!("{} Items Removed", count)
}

pub struct SweepUseCase<'a> {
    store: &'a dyn PostingStore,
    config: &'a SweeperConfig,
}

impl<'a> SweepUseCase<'a> {
    pub fn new(store: &'a dyn PostingStore, config: &'a SweeperConfig) -> Self {
        Self { store, config }
    }

    /// Counts, reports and deletes everything in the window for `today`.
    /// Any store failure aborts the sweep.
    #[instrument(skip(self, out))]
    pub async fn run(&self, today: NaiveDate, out: &mut dyn Write) -> Result<u64> {
        let window = RetentionWindow::for_date(today, self.config)?;
        let count = self
            .store
            .count_created_between(window.start, window.end)
            .await?;
        writeln!(out, "{}", removal_message(count)).map_err(ScraperError::Io)?;

        let deleted = self
            .store
            .delete_created_between(window.start, window.end)
            .await?;
        metrics::sweeper::postings_swept(deleted);
        info!(
            "Swept {} postings created between {} and {}",
            deleted, window.start, window.end
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = RetentionWindow::for_date(today, &SweeperConfig::default()).unwrap();
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_window_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let window = RetentionWindow::for_date(today, &SweeperConfig::default()).unwrap();
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 2, 26).unwrap());
    }

    #[test]
    fn test_huge_grace_is_config_error() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        for grace_days in [100_000_000, i64::MAX] {
            let config = SweeperConfig {
                grace_days,
                ..Default::default()
            };
            assert!(matches!(
                RetentionWindow::for_date(today, &config),
                Err(ScraperError::Config(_))
            ));
        }
    }

    #[test]
    fn test_removal_message() {
        assert_eq!(removal_message(0), "0 Items Removed");
        assert_eq!(removal_message(12), "12 Items Removed");
    }
}
