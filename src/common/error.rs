use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Feed parsing failed: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Mail delivery failed: {message}")]
    Mail { message: String },
}

impl ScraperError {
    pub fn storage(message: impl Into<String>) -> Self {
        ScraperError::Storage {
            message: message.into(),
        }
    }

    pub fn mail(message: impl Into<String>) -> Self {
        ScraperError::Mail {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
