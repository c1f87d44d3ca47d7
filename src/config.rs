use crate::common::constants::{
    retention_epoch, DATABASE_PATH_ENV, DEFAULT_DATABASE_PATH, DEFAULT_LOG_DIR,
    DEFAULT_OUTBOX_PATH, LOG_DIR_ENV, RETENTION_GRACE_DAYS,
};
use crate::common::error::{Result, ScraperError};
use crate::ingest::extract::EmailSelection;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub ingest: IngestConfig,
    pub sweeper: SweeperConfig,
    pub mail: MailConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub email_selection: EmailSelection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    pub epoch: NaiveDate,
    pub grace_days: i64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            epoch: retention_epoch(),
            grace_days: RETENTION_GRACE_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Send synchronously by logging the message
    #[default]
    Log,
    /// Queue to an outbox file for a separate delivery agent
    Outbox,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub from: String,
    pub body: String,
    pub outbox_path: PathBuf,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::Log,
            from: String::new(),
            body: String::new(),
            outbox_path: PathBuf::from(DEFAULT_OUTBOX_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Write the Prometheus exposition here at the end of each run
    pub textfile: Option<PathBuf>,
}

impl Config {
    /// Loads the config file if present, falling back to defaults, then applies
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ScraperError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(db) = std::env::var(DATABASE_PATH_ENV) {
            self.database.path = PathBuf::from(db);
        }
        if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
            self.logging.dir = PathBuf::from(dir);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sweeper.grace_days < 0 {
            return Err(ScraperError::Config(format!(
                "sweeper.grace_days must not be negative (got {})",
                self.sweeper.grace_days
            )));
        }
        // Anything longer than the whole NaiveDate range can never yield a cutoff
        let max_days = (NaiveDate::MAX - NaiveDate::MIN).num_days();
        if self.sweeper.grace_days > max_days {
            return Err(ScraperError::Config(format!(
                "sweeper.grace_days must be at most {} (got {})",
                max_days, self.sweeper.grace_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.sweeper.grace_days, 5);
        assert_eq!(
            config.sweeper.epoch,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
        assert_eq!(config.mail.backend, MailBackend::Log);
        assert_eq!(config.ingest.email_selection, EmailSelection::Smallest);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            [database]
            path = "/tmp/p.db"

            [ingest]
            email_selection = "random"

            [sweeper]
            epoch = "2015-06-01"
            grace_days = 10

            [mail]
            backend = "outbox"
            from = "me@example.com"
            body = "Still available?"
            outbox_path = "/tmp/outbox.ndjson"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.ingest.email_selection, EmailSelection::Random);
        assert_eq!(config.sweeper.grace_days, 10);
        assert_eq!(
            config.sweeper.epoch,
            NaiveDate::from_ymd_opt(2015, 6, 1).unwrap()
        );
        assert_eq!(config.mail.backend, MailBackend::Outbox);
        assert_eq!(config.mail.from, "me@example.com");
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_negative_grace_rejected() {
        let config = Config::from_toml_str("[sweeper]\ngrace_days = -1\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_grace_rejected() {
        let config = Config::from_toml_str("[sweeper]\ngrace_days = 1000000000\n").unwrap();
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sweeper]\ngrace_days = 1000000000\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_unknown_backend_is_error() {
        assert!(Config::from_toml_str("[mail]\nbackend = \"carrier-pigeon\"\n").is_err());
    }
}
