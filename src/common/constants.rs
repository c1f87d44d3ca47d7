//! Shared constants for the ingest, sweeper and admin commands

use chrono::NaiveDate;

// Default locations (relative to the working directory)
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_DATABASE_PATH: &str = "data/postings.db";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_OUTBOX_PATH: &str = "data/mail_outbox.ndjson";

// Environment overrides
pub const DATABASE_PATH_ENV: &str = "POSTING_SCRAPER_DB";
pub const LOG_DIR_ENV: &str = "POSTING_SCRAPER_LOG_DIR";

// Retention window: everything from the epoch up to `today - grace` is swept
pub const RETENTION_EPOCH: (i32, u32, u32) = (2010, 1, 1);
pub const RETENTION_GRACE_DAYS: i64 = 5;

// Admin email action
pub const REPLY_SUBJECT_PREFIX: &str = "RE: ";

/// First day covered by the retention sweep
pub fn retention_epoch() -> NaiveDate {
    let (y, m, d) = RETENTION_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}
