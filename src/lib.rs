//! Feed scraper that harvests postings and their contact emails, a retention
//! sweeper for old postings, and a build-time type-table generator.

pub mod app;
pub mod common;
pub mod config;
pub mod domain;
pub mod infra;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod storage;
pub mod typegen;

pub use common::error::{Result, ScraperError};
