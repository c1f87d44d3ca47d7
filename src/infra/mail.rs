use crate::app::ports::{MailSender, OutgoingMail};
use crate::common::error::{Result, ScraperError};
use crate::config::{MailBackend, MailConfig};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Basic synchronous sender: the message is emitted on the log and considered delivered
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if mail.to.is_empty() {
            return Err(ScraperError::mail("no recipients"));
        }
        info!(
            from = %mail.from,
            to = %mail.to.join(", "),
            subject = %mail.subject,
            "Sending mail"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct QueuedMail<'a> {
    queued_at: String,
    #[serde(flatten)]
    mail: &'a OutgoingMail,
}

/// Queueing sender: appends one JSON line per message for a separate delivery agent
pub struct OutboxMailSender {
    path: PathBuf,
    lock: Mutex<()>,
}

impl OutboxMailSender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, mail: &OutgoingMail) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ScraperError::mail("outbox lock poisoned"))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(&QueuedMail {
            queued_at: Utc::now().to_rfc3339(),
            mail,
        })?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[async_trait]
impl MailSender for OutboxMailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if mail.to.is_empty() {
            return Err(ScraperError::mail("no recipients"));
        }
        self.append(mail)?;
        info!(to = %mail.to.join(", "), "Queued mail in {}", self.path.display());
        Ok(())
    }
}

/// Picks the sender named by configuration
pub fn mail_sender_from_config(config: &MailConfig) -> Arc<dyn MailSender> {
    match config.backend {
        MailBackend::Log => Arc::new(LogMailSender),
        MailBackend::Outbox => Arc::new(OutboxMailSender::new(config.outbox_path.clone())),
    }
}
