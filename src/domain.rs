//! Domain data shapes shared by the ingest, sweeper and admin commands

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A feed target. The domain is used directly as the feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub domain: String,
}

/// A persisted record for one discovered feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: i64,
    pub site_id: i64,
    pub page_url: String,
    pub title: String,
    pub summary: String,
    pub creation_date: NaiveDate,
    pub active: bool,
    pub email: Option<String>,
}

/// Insert payload for a posting; the store assigns id and the active flag starts unset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    pub site_id: i64,
    pub page_url: String,
    pub title: String,
    pub summary: String,
    pub email: Option<String>,
}

/// Admin-side listing filter
#[derive(Debug, Clone, Default)]
pub struct PostingFilter {
    /// Case-insensitive substring match on the title
    pub search: Option<String>,
    pub active: Option<bool>,
    pub site_id: Option<i64>,
    pub created_since: Option<NaiveDate>,
}

impl PostingFilter {
    /// Case-insensitive literal substring match on the title
    pub fn matches_title(&self, title: &str) -> bool {
        self.search
            .as_ref()
            .map_or(true, |search| title.to_lowercase().contains(&search.to_lowercase()))
    }

    pub fn matches(&self, posting: &Posting) -> bool {
        self.matches_title(&posting.title)
            && self.active.map_or(true, |a| posting.active == a)
            && self.site_id.map_or(true, |s| posting.site_id == s)
            && self
                .created_since
                .map_or(true, |d| posting.creation_date >= d)
    }
}
