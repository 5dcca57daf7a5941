//! The write path: crawl, extract, index
//!
//! Shared by the job scheduler and the `SearchEngine` facade so both run a
//! crawl the same way.

use crate::config::Config;
use crate::crawler::Crawler;
use crate::extractor::Extractor;
use crate::index::IndexStore;
use crate::SearchError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Page counts of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub crawled: usize,
    pub extracted: usize,
    pub indexed: usize,
}

/// Fetcher, extractor and index store wired together
#[derive(Debug)]
pub struct CrawlPipeline {
    crawler: Crawler,
    extractor: Extractor,
    index: Arc<IndexStore>,
    delay: Duration,
}

impl CrawlPipeline {
    pub fn new(config: &Config, index: Arc<IndexStore>) -> Result<Self, SearchError> {
        Ok(Self {
            crawler: Crawler::new(config)?,
            extractor: Extractor::new()?,
            index,
            delay: config.crawler.delay(),
        })
    }

    pub fn index(&self) -> &Arc<IndexStore> {
        &self.index
    }

    /// Crawls from `seed_urls`, extracts every page and indexes the batch
    ///
    /// Zero crawled or extracted pages is not an error; the outcome reports
    /// the counts and nothing is written.
    ///
    /// # Errors
    ///
    /// Index write failures. The batch is rolled back as a whole.
    pub async fn run(
        &self,
        seed_urls: &[String],
        max_pages: usize,
        max_depth: u32,
    ) -> Result<PipelineOutcome, SearchError> {
        let pages = self
            .crawler
            .crawl(seed_urls, max_pages, max_depth, self.delay)
            .await;

        let mut outcome = PipelineOutcome {
            crawled: pages.len(),
            ..PipelineOutcome::default()
        };
        if pages.is_empty() {
            tracing::warn!("No pages were crawled");
            return Ok(outcome);
        }

        tracing::info!("Parsing {} crawled pages", pages.len());
        let documents = self.extractor.extract_all(&pages);
        outcome.extracted = documents.len();
        if documents.is_empty() {
            tracing::warn!("No pages were parsed successfully");
            return Ok(outcome);
        }

        tracing::info!("Indexing {} parsed pages", documents.len());
        let index = Arc::clone(&self.index);
        outcome.indexed = tokio::task::spawn_blocking(move || index.bulk_upsert(&documents)).await??;

        Ok(outcome)
    }
}
