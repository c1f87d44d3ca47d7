use crate::app::ports::HttpFetcher;
use crate::common::error::Result;
use feed_rs::model::Entry;
use tracing::{debug, instrument};

/// One item of a syndication feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
}

impl From<Entry> for FeedEntry {
    fn from(entry: Entry) -> Self {
        // Atom entries may carry several links; prefer rel="alternate" (or no rel)
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.trim().to_string());
        let summary = entry
            .summary
            .map(|t| t.content)
            .or_else(|| entry.content.and_then(|c| c.body));
        FeedEntry {
            link,
            title: entry.title.map(|t| t.content),
            summary,
        }
    }
}

/// Parses an RSS (0.9x, 1.0, 2.0), Atom or JSON Feed document into entries,
/// in document order
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(bytes)?;
    Ok(feed.entries.into_iter().map(FeedEntry::from).collect())
}

#[instrument(skip(fetcher))]
pub async fn fetch_feed(fetcher: &dyn HttpFetcher, feed_url: &str) -> Result<Vec<FeedEntry>> {
    let response = fetcher.get(feed_url).await?;
    let entries = parse_feed(&response.bytes)?;
    debug!("Feed {} has {} entries", feed_url, entries.len());
    Ok(entries)
}
