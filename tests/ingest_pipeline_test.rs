mod common;

use common::{context, date, rss, ScriptedFetcher};
use posting_scraper::domain::PostingFilter;
use posting_scraper::ingest::IngestPipeline;
use posting_scraper::storage::{InMemoryStorage, PostingStore, SqliteStorage};
use std::sync::Arc;

const FEED: &str = "http://seattle.test/sss/index.rss";

fn fetcher() -> ScriptedFetcher {
    ScriptedFetcher::new()
        .with_page(
            FEED,
            &rss(&[
                (
                    "http://seattle.test/couch.html",
                    "Couch - $50",
                    "<b>Comfy</b> couch\u{A0}",
                ),
                ("http://seattle.test/bike.html", "Bike", "<p>Red bike</p>"),
                ("http://seattle.test/lamp.html", "Lamp", "lamp"),
            ]),
        )
        .with_page(
            "http://seattle.test/couch.html",
            "reply to zz@x.com or sale-1@x.com, sale-1@x.com",
        )
        .with_page("http://seattle.test/bike.html", "<html>call me</html>")
    // lamp.html is not served: the page fetch fails
}

#[tokio::test]
async fn test_ingest_creates_postings_with_emails() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStorage::new());
    let site = store.add_site(FEED).await?;
    let fetcher = Arc::new(fetcher());
    let ctx = context(store.clone(), fetcher.clone(), date(2024, 6, 1));

    let mut pipeline = IngestPipeline::with_output(&ctx, Vec::new());
    let report = pipeline.run().await?;
    let output = String::from_utf8(pipeline.into_output())?;

    assert_eq!(report.sites, 1);
    assert_eq!(report.entries_seen, 3);
    assert_eq!(report.created, 3);
    assert_eq!(report.emails_found, 1);
    // no match on bike, fetch failure on lamp
    assert_eq!(report.errors.len(), 2);

    let couch = store
        .find_posting_by_url("http://seattle.test/couch.html")
        .await?
        .expect("couch stored");
    assert_eq!(couch.site_id, site.id);
    assert_eq!(couch.title, "Couch - $50");
    assert_eq!(couch.summary, "Comfy couch");
    assert_eq!(couch.email.as_deref(), Some("sale-1@x.com"));
    assert_eq!(couch.creation_date, date(2024, 6, 1));
    assert!(!couch.active);

    let bike = store
        .find_posting_by_url("http://seattle.test/bike.html")
        .await?
        .expect("bike stored");
    assert_eq!(bike.summary, "Red bike");
    assert_eq!(bike.email, None);

    let lamp = store
        .find_posting_by_url("http://seattle.test/lamp.html")
        .await?
        .expect("lamp stored despite fetch failure");
    assert_eq!(lamp.email, None);

    assert!(output.contains("Couch - $50 sale-1@x.com\n"));
    let counters: Vec<&str> = output
        .lines()
        .filter(|l| l.chars().all(|c| c.is_ascii_digit()) && !l.is_empty())
        .collect();
    assert_eq!(counters, vec!["1", "2", "3"]);
    Ok(())
}

#[tokio::test]
async fn test_rerun_is_idempotent_and_skips_page_fetch() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(SqliteStorage::open(dir.path().join("postings.db"))?);
    store.add_site(FEED).await?;
    let fetcher = Arc::new(fetcher());
    let ctx = context(store.clone(), fetcher.clone(), date(2024, 6, 1));

    let first = IngestPipeline::with_output(&ctx, Vec::new()).run().await?;
    assert_eq!(first.created, 3);

    let mut second_pipeline = IngestPipeline::with_output(&ctx, Vec::new());
    let second = second_pipeline.run().await?;
    let output = String::from_utf8(second_pipeline.into_output())?;

    assert_eq!(second.entries_seen, 3);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped_existing, 3);
    assert!(second.errors.is_empty());
    // only the counter is printed for known entries
    assert_eq!(output, "1\n2\n3\n");

    assert_eq!(
        store.query_postings(&PostingFilter::default()).await?.len(),
        3
    );
    assert_eq!(fetcher.requested("http://seattle.test/couch.html"), 1);
    assert_eq!(fetcher.requested(FEED), 2);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_feed_does_not_stop_other_sites() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStorage::new());
    store.add_site("http://down.test/feed.rss").await?;
    store.add_site(FEED).await?;
    let fetcher = Arc::new(fetcher().with_page("http://garbage.test/feed.rss", "<html/>"));
    store.add_site("http://garbage.test/feed.rss").await?;
    let ctx = context(store.clone(), fetcher, date(2024, 6, 1));

    let report = IngestPipeline::with_output(&ctx, Vec::new()).run().await?;

    assert_eq!(report.sites, 3);
    assert_eq!(report.created, 3);
    assert!(report
        .errors
        .iter()
        .any(|e| e.starts_with("http://down.test/feed.rss")));
    assert!(report
        .errors
        .iter()
        .any(|e| e.starts_with("http://garbage.test/feed.rss")));
    Ok(())
}

#[tokio::test]
async fn test_entry_without_link_is_skipped() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStorage::new());
    store.add_site(FEED).await?;
    let feed = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title><link>http://x/</link><description>d</description>
        <item><title>orphan</title><description>no link here</description></item>
        <item><title>ok</title><link>http://x/ok.html</link></item>
        </channel></rss>"#;
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .with_page(FEED, feed)
            .with_page("http://x/ok.html", "me@ok.org"),
    );
    let ctx = context(store.clone(), fetcher, date(2024, 6, 1));

    let report = IngestPipeline::with_output(&ctx, Vec::new()).run().await?;

    assert_eq!(report.entries_seen, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("orphan"));
    let ok = store.find_posting_by_url("http://x/ok.html").await?.unwrap();
    assert_eq!(ok.summary, "");
    assert_eq!(ok.email.as_deref(), Some("me@ok.org"));
    Ok(())
}
