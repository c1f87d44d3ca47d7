use crate::common::error::{Result, ScraperError};
use crate::domain::{NewPosting, Posting, PostingFilter, Site};
use crate::storage::PostingStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Tables {
    next_site_id: i64,
    next_posting_id: i64,
    sites: BTreeMap<i64, Site>,
    postings: BTreeMap<i64, Posting>,
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| ScraperError::storage("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl PostingStore for InMemoryStorage {
    async fn add_site(&self, domain: &str) -> Result<Site> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables.sites.values().find(|s| s.domain == domain) {
            return Ok(existing.clone());
        }
        tables.next_site_id += 1;
        let site = Site {
            id: tables.next_site_id,
            domain: domain.to_string(),
        };
        tables.sites.insert(site.id, site.clone());
        debug!("Created site: {} with id {}", site.domain, site.id);
        Ok(site)
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        Ok(self.lock()?.sites.values().cloned().collect())
    }

    async fn remove_site(&self, site_id: i64) -> Result<bool> {
        let mut tables = self.lock()?;
        let existed = tables.sites.remove(&site_id).is_some();
        tables.postings.retain(|_, p| p.site_id != site_id);
        Ok(existed)
    }

    async fn find_posting_by_url(&self, page_url: &str) -> Result<Option<Posting>> {
        let tables = self.lock()?;
        Ok(tables
            .postings
            .values()
            .find(|p| p.page_url == page_url)
            .cloned())
    }

    async fn get_postings(&self, ids: &[i64]) -> Result<Vec<Posting>> {
        let tables = self.lock()?;
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| tables.postings.get(id).cloned())
            .collect())
    }

    async fn query_postings(&self, filter: &PostingFilter) -> Result<Vec<Posting>> {
        let tables = self.lock()?;
        Ok(tables
            .postings
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn get_or_create_posting(
        &self,
        new: NewPosting,
        created_on: NaiveDate,
    ) -> Result<(Posting, bool)> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables.postings.values().find(|p| p.page_url == new.page_url) {
            return Ok((existing.clone(), false));
        }
        tables.next_posting_id += 1;
        let posting = Posting {
            id: tables.next_posting_id,
            site_id: new.site_id,
            page_url: new.page_url,
            title: new.title,
            summary: new.summary,
            creation_date: created_on,
            active: false,
            email: new.email,
        };
        tables.postings.insert(posting.id, posting.clone());
        debug!("Created posting: {} with id {}", posting.page_url, posting.id);
        Ok((posting, true))
    }

    async fn count_created_between(&self, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let tables = self.lock()?;
        Ok(tables
            .postings
            .values()
            .filter(|p| p.creation_date >= start && p.creation_date <= end)
            .count() as u64)
    }

    async fn delete_created_between(&self, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let mut tables = self.lock()?;
        let before = tables.postings.len();
        tables
            .postings
            .retain(|_, p| p.creation_date < start || p.creation_date > end);
        Ok((before - tables.postings.len()) as u64)
    }

    async fn set_active(&self, ids: &[i64], active: bool) -> Result<u64> {
        let mut tables = self.lock()?;
        let mut updated = 0;
        for id in ids.iter().collect::<BTreeSet<_>>() {
            if let Some(posting) = tables.postings.get_mut(id) {
                posting.active = active;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
