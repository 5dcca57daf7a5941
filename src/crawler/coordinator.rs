//! Crawler coordinator - the breadth-first crawl loop
//!
//! One crawl run is strictly sequential: a single in-flight request at a time,
//! with the politeness delay between successive page fetches.

use crate::config::Config;
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::links::extract_links;
use crate::crawler::{build_http_client, fetch_url, CrawledPage, FetchResult};
use crate::robots::RobotsCache;
use crate::SearchError;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Sequential breadth-first crawler
#[derive(Debug, Clone)]
pub struct Crawler {
    client: Client,
    /// robots.txt product token
    agent_token: String,
}

impl Crawler {
    /// Creates a crawler with the configured user agent and request timeout
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        Ok(Self {
            client,
            agent_token: config.user_agent.crawler_name.clone(),
        })
    }

    /// Crawls breadth-first from the seed URLs
    ///
    /// # Arguments
    ///
    /// * `seed_urls` - Starting points, crawled at depth 0
    /// * `max_pages` - Cap on returned pages
    /// * `max_depth` - Links deeper than this are not followed
    /// * `delay` - Pause between successive page fetches
    ///
    /// # Returns
    ///
    /// The successfully fetched HTML pages, in fetch order. Robots-disallowed,
    /// failed and non-HTML URLs are logged and skipped.
    pub async fn crawl<S: AsRef<str>>(
        &self,
        seed_urls: &[S],
        max_pages: usize,
        max_depth: u32,
        delay: Duration,
    ) -> Vec<CrawledPage> {
        let (mut frontier, rejected) = Frontier::with_seeds(seed_urls);
        for (seed, e) in rejected {
            tracing::warn!("Skipping invalid seed URL {}: {}", seed, e);
        }

        tracing::info!(
            "Starting crawl: {} seeds, max {} pages, max depth {}",
            frontier.pending(),
            max_pages,
            max_depth
        );

        let pages = self
            .crawl_frontier(&mut frontier, max_pages, max_depth, delay)
            .await;

        tracing::info!(
            "Crawling completed. Crawled {} pages ({} URLs visited)",
            pages.len(),
            frontier.visited_count()
        );
        pages
    }

    /// Drains a prepared frontier until it is empty or `max_pages` pages were fetched
    pub async fn crawl_frontier(
        &self,
        frontier: &mut Frontier,
        max_pages: usize,
        max_depth: u32,
        delay: Duration,
    ) -> Vec<CrawledPage> {
        let mut robots = RobotsCache::new();
        let mut pages = Vec::new();
        let mut fetched_any = false;

        while pages.len() < max_pages {
            let Some(task) = frontier.next_task() else {
                break;
            };

            if task.depth > max_depth {
                tracing::debug!("Depth {} exceeds limit for {}", task.depth, task.url);
                continue;
            }

            if !robots
                .is_allowed(&self.client, &task.url, &self.agent_token)
                .await
            {
                tracing::info!("Robots.txt disallows crawling: {}", task.url);
                continue;
            }

            if fetched_any && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            fetched_any = true;

            if let Some(page) = self.fetch_task(&task).await {
                // Links are only worth queueing while there is room for more pages
                if pages.len() + 1 < max_pages && task.depth < max_depth {
                    let base = Url::parse(&page.final_url).unwrap_or_else(|_| task.url.clone());
                    for link in extract_links(&page.page.raw_html, &base) {
                        frontier.push(link, task.depth + 1);
                    }
                }
                pages.push(page.page);
            }
        }

        pages
    }

    /// Fetches one task, returning the page on success
    async fn fetch_task(&self, task: &CrawlTask) -> Option<FetchedPage> {
        tracing::info!("Crawling: {} (depth {})", task.url, task.depth);

        match fetch_url(&self.client, task.url.as_str()).await {
            FetchResult::Success {
                final_url, body, ..
            } => Some(FetchedPage {
                final_url,
                page: CrawledPage {
                    url: task.url.to_string(),
                    raw_html: body,
                    fetched_at: Utc::now(),
                    depth: task.depth,
                },
            }),
            FetchResult::ContentMismatch { content_type } => {
                tracing::debug!("Skipping {}: not HTML ({})", task.url, content_type);
                None
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Error crawling {}: HTTP {}", task.url, status_code);
                None
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Error crawling {}: {}", task.url, error);
                None
            }
        }
    }
}

struct FetchedPage {
    final_url: String,
    page: CrawledPage,
}
