use crate::app::ports::{MailSender, OutgoingMail};
use crate::common::constants::REPLY_SUBJECT_PREFIX;
use crate::common::error::Result;
use crate::config::MailConfig;
use crate::domain::{Posting, PostingFilter};
use crate::storage::PostingStore;
use tracing::{info, warn};

/// "1 item was" / "3 items were", as used by the bulk action messages
fn rows_phrase(rows: u64) -> String {
    if rows == 1 {
        "1 item was".to_string()
    } else {
        format!("{} items were", rows)
    }
}

pub fn status_message(rows: u64, active: bool) -> String {
    let state = if active { "active" } else { "inactive" };
    format!("{} successfully marked as {}.", rows_phrase(rows), state)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmailReport {
    pub sent: u64,
    pub skipped_no_email: u64,
    pub failed: u64,
    pub marked_active: u64,
}

impl EmailReport {
    pub fn message(&self) -> String {
        format!("{} items added to the email queue.", self.sent)
    }
}

pub struct AdminUseCase<'a> {
    store: &'a dyn PostingStore,
}

impl<'a> AdminUseCase<'a> {
    pub fn new(store: &'a dyn PostingStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &PostingFilter) -> Result<Vec<Posting>> {
        self.store.query_postings(filter).await
    }

    /// Bulk toggle; returns the user-facing message
    pub async fn set_active(&self, ids: &[i64], active: bool) -> Result<String> {
        let rows = self.store.set_active(ids, active).await?;
        info!("Marked {} postings active={}", rows, active);
        Ok(status_message(rows, active))
    }

    /// Sends a reply to each selected posting's contact, then marks all of them active.
    /// A failed send is logged and counted; the remaining postings are still mailed.
    pub async fn email_users(
        &self,
        ids: &[i64],
        mailer: &dyn MailSender,
        mail: &MailConfig,
    ) -> Result<EmailReport> {
        let postings = self.store.get_postings(ids).await?;
        let mut report = EmailReport::default();

        for posting in &postings {
            let Some(email) = posting.email.as_deref().filter(|e| !e.is_empty()) else {
                warn!("Posting {} has no contact email, skipping", posting.id);
                report.skipped_no_email += 1;
                continue;
            };
            let outgoing = OutgoingMail {
                subject: format!("{}{}", REPLY_SUBJECT_PREFIX, posting.title),
                body: mail.body.clone(),
                from: mail.from.clone(),
                to: vec![email.to_string()],
            };
            match mailer.send(&outgoing).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!("Mail to {} for posting {} failed: {}", email, posting.id, e);
                    report.failed += 1;
                }
            }
        }

        let selected: Vec<i64> = postings.iter().map(|p| p.id).collect();
        report.marked_active = self.store.set_active(&selected, true).await?;
        Ok(report)
    }
}
