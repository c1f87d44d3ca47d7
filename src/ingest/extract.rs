//! Text clean-up and contact email extraction for feed entries.

use once_cell::sync::Lazy;
use rand::seq::IteratorRandom;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag pattern"));

// C1 controls 0x90-0x97 and NBSP..pound sign left over from latin-1 feeds
static STRAY_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{90}-\x{97}\x{A0}-\x{A3}]").expect("valid char class"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-a-zA-Z0-9._]+@[-a-zA-Z0-9_]+.[a-zA-Z0-9_.]+").expect("valid email pattern")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("page fetch failed: {0}")]
    Fetch(String),

    #[error("page body was empty")]
    EmptyPage,

    #[error("no email address found")]
    NoMatch,
}

/// How to pick one address when a page carries several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailSelection {
    /// Lexicographically smallest; deterministic
    #[default]
    Smallest,
    /// Any one of the candidates
    Random,
}

impl EmailSelection {
    pub fn pick(&self, candidates: &BTreeSet<String>) -> Option<String> {
        match self {
            EmailSelection::Smallest => candidates.first().cloned(),
            EmailSelection::Random => candidates.iter().choose(&mut rand::thread_rng()).cloned(),
        }
    }
}

pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

pub fn strip_stray_chars(text: &str) -> String {
    STRAY_CHARS.replace_all(text, "").into_owned()
}

/// Tag strip followed by the stray-character strip; a missing summary is empty
pub fn sanitize_summary(summary: Option<&str>) -> String {
    summary
        .map(|s| strip_stray_chars(&strip_html(s)))
        .unwrap_or_default()
}

/// Every distinct email-shaped substring of `body`
pub fn email_candidates(body: &str) -> BTreeSet<String> {
    EMAIL
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Picks one address from a fetched page body and cleans it
pub fn extract_email(body: &str, selection: EmailSelection) -> Result<String, ExtractError> {
    if body.trim().is_empty() {
        return Err(ExtractError::EmptyPage);
    }
    let candidates = email_candidates(body);
    selection
        .pick(&candidates)
        .map(|email| strip_stray_chars(&email))
        .ok_or(ExtractError::NoMatch)
}
