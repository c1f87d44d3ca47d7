//! Feed ingest: for each site, fetch its feed and store every entry not seen
//! before, together with a contact email scraped from the entry's page.

pub mod extract;
pub mod feed;

use crate::app::context::AppContext;
use crate::common::error::Result;
use crate::domain::{NewPosting, Site};
use crate::metrics;
use extract::{extract_email, sanitize_summary, strip_stray_chars, EmailSelection, ExtractError};
use feed::{fetch_feed, FeedEntry};
use std::io::Write;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

/// Outcome of one ingest run
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    pub sites: usize,
    pub entries_seen: usize,
    pub created: usize,
    pub skipped_existing: usize,
    pub emails_found: usize,
    pub errors: Vec<String>,
}

enum EntryOutcome {
    Existing,
    Created { title: String, email: Option<String> },
}

pub struct IngestPipeline<'a, W: Write> {
    ctx: &'a AppContext,
    selection: EmailSelection,
    out: W,
}

impl<'a> IngestPipeline<'a, std::io::Stdout> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self::with_output(ctx, std::io::stdout())
    }
}

impl<'a, W: Write> IngestPipeline<'a, W> {
    /// Progress lines (running counter, new posting summaries) go to `out`
    pub fn with_output(ctx: &'a AppContext, out: W) -> Self {
        Self {
            ctx,
            selection: ctx.config.ingest.email_selection,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs every configured site. Store failures while listing sites abort;
    /// everything else is recorded in the report and the run continues.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<IngestReport> {
        let sites = self.ctx.store.list_sites().await?;
        info!("Starting ingest for {} sites", sites.len());

        let mut report = IngestReport::default();
        for site in &sites {
            report.sites += 1;
            self.run_site(site, &mut report)
                .instrument(info_span!("site", domain = %site.domain))
                .await;
        }

        info!(
            "Ingest finished: {} entries, {} created, {} existing, {} errors",
            report.entries_seen,
            report.created,
            report.skipped_existing,
            report.errors.len()
        );
        Ok(report)
    }

    async fn run_site(&mut self, site: &Site, report: &mut IngestReport) {
        let entries = match fetch_feed(self.ctx.fetcher.as_ref(), &site.domain).await {
            Ok(entries) => {
                metrics::ingest::feed_fetched();
                entries
            }
            Err(e) => {
                metrics::ingest::feed_error();
                warn!("Skipping site, feed unavailable: {}", e);
                report.errors.push(format!("{}: {}", site.domain, e));
                return;
            }
        };

        for entry in entries {
            report.entries_seen += 1;
            metrics::ingest::entry_seen();

            match self.process_entry(site, &entry, report).await {
                Ok(EntryOutcome::Existing) => report.skipped_existing += 1,
                Ok(EntryOutcome::Created { title, email }) => {
                    report.created += 1;
                    metrics::ingest::posting_created();
                    let _ = writeln!(
                        self.out,
                        "{} {}\n",
                        title,
                        email.as_deref().unwrap_or("")
                    );
                }
                Err(e) => {
                    error!("Entry failed: {}", e);
                    report.errors.push(e);
                }
            }
            let _ = writeln!(self.out, "{}", report.entries_seen);
        }
    }

    async fn process_entry(
        &self,
        site: &Site,
        entry: &FeedEntry,
        report: &mut IngestReport,
    ) -> std::result::Result<EntryOutcome, String> {
        let link = entry
            .link
            .as_deref()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| {
                format!(
                    "{}: entry '{}' has no link",
                    site.domain,
                    entry.title.as_deref().unwrap_or("")
                )
            })?;

        let summary = sanitize_summary(entry.summary.as_deref());

        let existing = self
            .ctx
            .store
            .find_posting_by_url(link)
            .await
            .map_err(|e| format!("{}: lookup failed: {}", link, e))?;
        if existing.is_some() {
            debug!("Already stored: {}", link);
            return Ok(EntryOutcome::Existing);
        }

        let email = match self.fetch_email(link).await {
            Ok(email) => {
                report.emails_found += 1;
                Some(email)
            }
            Err(e) => {
                metrics::ingest::email_extract_failed();
                warn!("No email for {}: {}", link, e);
                report.errors.push(format!("{}: {}", link, e));
                None
            }
        };

        let title = entry.title.clone().unwrap_or_default();
        let new = NewPosting {
            site_id: site.id,
            page_url: link.to_string(),
            title: title.clone(),
            summary,
            email: email.clone(),
        };
        let (_, created) = self
            .ctx
            .store
            .get_or_create_posting(new, self.ctx.today)
            .await
            .map_err(|e| format!("{}: store failed: {}", link, e))?;

        if created {
            Ok(EntryOutcome::Created {
                title: strip_stray_chars(&title),
                email,
            })
        } else {
            Ok(EntryOutcome::Existing)
        }
    }

    async fn fetch_email(&self, link: &str) -> std::result::Result<String, ExtractError> {
        let page = self
            .ctx
            .fetcher
            .get(link)
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;
        extract_email(&page.text(), self.selection)
    }
}
