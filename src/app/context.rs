use crate::app::ports::HttpFetcher;
use crate::config::Config;
use crate::storage::PostingStore;
use chrono::NaiveDate;
use std::sync::Arc;

/// Everything a batch command needs, built once at process start
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn PostingStore>,
    pub fetcher: Arc<dyn HttpFetcher>,
    /// Run date; creation dates and retention cutoffs derive from it
    pub today: NaiveDate,
}

impl AppContext {
    pub fn new(
        config: Config,
        store: Arc<dyn PostingStore>,
        fetcher: Arc<dyn HttpFetcher>,
        today: NaiveDate,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            today,
        }
    }
}
