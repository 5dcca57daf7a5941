//! Per-run robots.txt cache
//!
//! Each origin's robots.txt is fetched at most once per crawl run.

use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::origin_key;
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Origin → parsed robots.txt, scoped to one crawl run
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of origins resolved so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores rules for an origin, replacing any previous entry
    pub fn insert(&mut self, origin: String, robots: ParsedRobots) {
        self.entries.insert(origin, robots);
    }

    /// Checks a URL against its origin's robots.txt, fetching it on first use
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client used for the robots.txt request
    /// * `url` - The URL about to be fetched
    /// * `agent_token` - The crawler's robots.txt product token
    pub async fn is_allowed(&mut self, client: &Client, url: &Url, agent_token: &str) -> bool {
        let Some(origin) = origin_key(url) else {
            return false;
        };

        if !self.entries.contains_key(&origin) {
            let robots = fetch_robots(client, url).await;
            self.entries.insert(origin.clone(), robots);
        }

        self.entries
            .get(&origin)
            .map_or(true, |robots| robots.is_allowed(url.as_str(), agent_token))
    }
}
