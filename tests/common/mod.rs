#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use posting_scraper::app::context::AppContext;
use posting_scraper::app::ports::{HttpFetcher, HttpGetResult};
use posting_scraper::config::Config;
use posting_scraper::storage::PostingStore;
use posting_scraper::{Result, ScraperError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves canned bodies by URL and records every request
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, String>>,
    pub requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
        self
    }

    pub fn requested(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<HttpGetResult> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(body) => Ok(HttpGetResult {
                bytes: body.as_bytes().to_vec(),
            }),
            None => Err(ScraperError::HttpStatus {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?><rss version="2.0"><channel><title>for sale</title><link>http://feeds.test/</link><description>listings</description>"#,
    );
    for (link, title, summary) in items {
        xml.push_str(&format!(
            "<item><title>{}</title><link>{}</link><description><![CDATA[{}]]></description></item>",
            title, link, summary
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn context(
    store: Arc<dyn PostingStore>,
    fetcher: Arc<ScriptedFetcher>,
    today: NaiveDate,
) -> AppContext {
    AppContext::new(Config::default(), store, fetcher, today)
}
