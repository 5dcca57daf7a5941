//! Ripple-Search: a small polite web search engine
//!
//! This crate crawls web pages breadth-first, extracts structured content,
//! stores it in a stemmed full-text index, and ranks query results with a
//! configurable multi-factor scoring model. Crawl jobs can be scheduled and
//! run in the background.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod extractor;
pub mod index;
pub mod jobs;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod ranking;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Ripple-Search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extractor::ExtractError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Query error: {0}")]
    Query(#[from] query::QueryError),

    #[error("Ranking error: {0}")]
    Ranking(#[from] ranking::RankingError),

    #[error("Job error: {0}")]
    Job(#[from] jobs::JobError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Ripple-Search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::SearchEngine;
pub use extractor::ExtractedDocument;
pub use jobs::{CrawlJob, JobStatus, ScheduleType};
pub use query::SearchHit;
pub use ranking::{RankedResult, RankingWeights};
