//! Crawler module for web page fetching
//!
//! This module contains the write-path front end:
//! - HTTP fetching and response classification
//! - Anchor link discovery
//! - The breadth-first frontier with its per-run visited set
//! - The sequential crawl loop with robots.txt checks and politeness delay

mod coordinator;
mod fetcher;
mod frontier;
mod links;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{CrawlTask, Frontier};
pub use links::extract_links;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A fetched HTML page, handed to the extractor and then discarded
#[derive(Debug, Clone, Serialize)]
pub struct CrawledPage {
    /// Normalized URL the page was requested as
    pub url: String,
    pub raw_html: String,
    pub fetched_at: DateTime<Utc>,
    pub depth: u32,
}
