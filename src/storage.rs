use crate::common::error::Result;
use crate::domain::{NewPosting, Posting, PostingFilter, Site};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

/// Persistence boundary for sites and postings
#[async_trait]
pub trait PostingStore: Send + Sync {
    // Site operations
    async fn add_site(&self, domain: &str) -> Result<Site>;
    async fn list_sites(&self) -> Result<Vec<Site>>;
    /// Removes a site and its postings; returns whether the site existed
    async fn remove_site(&self, site_id: i64) -> Result<bool>;

    // Posting lookups
    async fn find_posting_by_url(&self, page_url: &str) -> Result<Option<Posting>>;
    async fn get_postings(&self, ids: &[i64]) -> Result<Vec<Posting>>;
    async fn query_postings(&self, filter: &PostingFilter) -> Result<Vec<Posting>>;

    /// Returns the posting for `new.page_url`, inserting it dated `created_on`
    /// if absent. The flag is true when a row was inserted.
    async fn get_or_create_posting(
        &self,
        new: NewPosting,
        created_on: NaiveDate,
    ) -> Result<(Posting, bool)>;

    // Bulk operations
    async fn count_created_between(&self, start: NaiveDate, end: NaiveDate) -> Result<u64>;
    async fn delete_created_between(&self, start: NaiveDate, end: NaiveDate) -> Result<u64>;
    async fn set_active(&self, ids: &[i64], active: bool) -> Result<u64>;
}
