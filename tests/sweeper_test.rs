mod common;

use common::date;
use posting_scraper::app::sweep_use_case::SweepUseCase;
use posting_scraper::config::SweeperConfig;
use posting_scraper::domain::{NewPosting, PostingFilter};
use posting_scraper::storage::{InMemoryStorage, PostingStore, SqliteStorage};

async fn seed(store: &dyn PostingStore, dates: &[chrono::NaiveDate]) -> anyhow::Result<()> {
    let site = store.add_site("http://feed.test/rss").await?;
    for (i, d) in dates.iter().enumerate() {
        store
            .get_or_create_posting(
                NewPosting {
                    site_id: site.id,
                    page_url: format!("http://feed.test/{i}.html"),
                    title: format!("posting {i}"),
                    summary: String::new(),
                    email: None,
                },
                *d,
            )
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_sweep_deletes_window_and_keeps_grace_period() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = SqliteStorage::open(dir.path().join("sweep.db"))?;
    let today = date(2024, 6, 20);
    seed(
        &store,
        &[
            date(2009, 12, 31), // before the epoch
            date(2010, 1, 1),
            date(2023, 3, 3),
            date(2024, 6, 15), // today - 5, inclusive
            date(2024, 6, 16),
            date(2024, 6, 20),
        ],
    )
    .await?;

    let config = SweeperConfig::default();
    let mut out = Vec::new();
    let deleted = SweepUseCase::new(&store, &config).run(today, &mut out).await?;

    assert_eq!(deleted, 3);
    assert_eq!(String::from_utf8(out)?, "3 Items Removed\n");

    let mut left: Vec<_> = store
        .query_postings(&PostingFilter::default())
        .await?
        .into_iter()
        .map(|p| p.creation_date)
        .collect();
    left.sort();
    assert_eq!(
        left,
        vec![date(2009, 12, 31), date(2024, 6, 16), date(2024, 6, 20)]
    );
    Ok(())
}

#[tokio::test]
async fn test_sweep_empty_store() -> anyhow::Result<()> {
    let store = InMemoryStorage::new();
    let config = SweeperConfig::default();
    let mut out = Vec::new();

    let deleted = SweepUseCase::new(&store, &config)
        .run(date(2024, 6, 20), &mut out)
        .await?;

    assert_eq!(deleted, 0);
    assert_eq!(String::from_utf8(out)?, "0 Items Removed\n");
    Ok(())
}

#[tokio::test]
async fn test_sweep_respects_configured_grace() -> anyhow::Result<()> {
    let store = InMemoryStorage::new();
    seed(&store, &[date(2024, 6, 10), date(2024, 6, 18)]).await?;
    let config = SweeperConfig {
        epoch: date(2024, 1, 1),
        grace_days: 1,
    };
    let mut out = Vec::new();

    let deleted = SweepUseCase::new(&store, &config)
        .run(date(2024, 6, 20), &mut out)
        .await?;

    assert_eq!(deleted, 2);
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_grace_fails_without_deleting() -> anyhow::Result<()> {
    let store = InMemoryStorage::new();
    seed(&store, &[date(2015, 1, 1)]).await?;
    let config = SweeperConfig {
        grace_days: 100_000_000,
        ..Default::default()
    };
    let mut out = Vec::new();

    let result = SweepUseCase::new(&store, &config)
        .run(date(2024, 6, 20), &mut out)
        .await;

    assert!(result.is_err());
    assert!(out.is_empty());
    assert_eq!(
        store.query_postings(&PostingFilter::default()).await?.len(),
        1
    );
    Ok(())
}
