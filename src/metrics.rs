//! Run counters for the batch commands.
//!
//! Recorded through an in-process Prometheus recorder; short-lived jobs dump the
//! rendered exposition to a textfile instead of serving it.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const FEEDS_FETCHED: &str = "posting_scraper_feeds_fetched_total";
pub const FEED_ERRORS: &str = "posting_scraper_feed_errors_total";
pub const ENTRIES_SEEN: &str = "posting_scraper_entries_seen_total";
pub const POSTINGS_CREATED: &str = "posting_scraper_postings_created_total";
pub const EMAIL_EXTRACT_FAILURES: &str = "posting_scraper_email_extract_failures_total";
pub const POSTINGS_SWEPT: &str = "posting_scraper_postings_swept_total";

/// Installs the global recorder. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

pub fn get_handle() -> Option<&'static PrometheusHandle> {
    HANDLE.get()
}

pub mod ingest {
    use super::*;

    pub fn feed_fetched() {
        ::metrics::counter!(FEEDS_FETCHED).increment(1);
    }

    pub fn feed_error() {
        ::metrics::counter!(FEED_ERRORS).increment(1);
    }

    pub fn entry_seen() {
        ::metrics::counter!(ENTRIES_SEEN).increment(1);
    }

    pub fn posting_created() {
        ::metrics::counter!(POSTINGS_CREATED).increment(1);
    }

    pub fn email_extract_failed() {
        ::metrics::counter!(EMAIL_EXTRACT_FAILURES).increment(1);
    }
}

pub mod sweeper {
    use super::*;

    pub fn postings_swept(count: u64) {
        ::metrics::counter!(POSTINGS_SWEPT).increment(count);
    }
}

/// Writes the current exposition to `path`, if a recorder is installed.
pub fn write_textfile(path: &Path) -> std::io::Result<()> {
    let Some(handle) = get_handle() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = handle.render();
    std::fs::write(path, &rendered)?;
    info!("Wrote {} bytes of metrics to {}", rendered.len(), path.display());
    Ok(())
}
