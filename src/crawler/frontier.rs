//! Breadth-first crawl frontier
//!
//! A FIFO queue of `(url, depth)` tasks plus the per-run visited set. A URL
//! is enqueued at most once per run and attempted at most once per run.

use crate::url::normalize_url;
use crate::UrlError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

/// FIFO queue plus visited set, scoped to one crawl run
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    /// Every URL ever enqueued this run
    seen: HashSet<String>,
    /// Every URL popped for fetching this run, whatever the outcome
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frontier from seed URLs at depth 0
    ///
    /// Seeds that fail normalization are skipped and returned alongside the
    /// frontier so the caller can report them.
    pub fn with_seeds<S: AsRef<str>>(seeds: &[S]) -> (Self, Vec<(String, UrlError)>) {
        let mut frontier = Self::new();
        let mut rejected = Vec::new();

        for seed in seeds {
            match normalize_url(seed.as_ref()) {
                Ok(url) => {
                    frontier.push(url, 0);
                }
                Err(e) => rejected.push((seed.as_ref().to_string(), e)),
            }
        }

        (frontier, rejected)
    }

    /// Enqueues a URL unless it was already enqueued or visited this run
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url, depth: u32) -> bool {
        let key = url.as_str().to_string();
        if self.visited.contains(&key) || !self.seen.insert(key) {
            return false;
        }
        self.queue.push_back(CrawlTask { url, depth });
        true
    }

    /// Pops the next task and marks it visited
    ///
    /// Tasks already visited are skipped, so the caller never sees a URL twice.
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.queue.pop_front() {
            if self.visited.insert(task.url.as_str().to_string()) {
                return Some(task);
            }
        }
        None
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of tasks still queued
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new();
        frontier.push(url("https://a.test/1"), 0);
        frontier.push(url("https://a.test/2"), 1);
        frontier.push(url("https://a.test/3"), 1);

        let order: Vec<String> = std::iter::from_fn(|| frontier.next_task())
            .map(|t| t.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/1", "/2", "/3"]);
    }

    #[test]
    fn test_duplicate_push_ignored() {
        let mut frontier = Frontier::new();
        assert!(frontier.push(url("https://a.test/"), 0));
        assert!(!frontier.push(url("https://a.test/"), 1));
        assert_eq!(frontier.pending(), 1);
    }

    #[test]
    fn test_visited_url_not_requeued() {
        let mut frontier = Frontier::new();
        frontier.push(url("https://a.test/"), 0);
        let task = frontier.next_task().unwrap();
        assert!(frontier.is_visited(&task.url));
        assert!(!frontier.push(task.url.clone(), 2));
        assert!(frontier.next_task().is_none());
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_seeds_are_normalized_and_bad_ones_reported() {
        let (frontier, rejected) =
            Frontier::with_seeds(&["https://a.test", "https://a.test/#top", "not a url"]);
        assert_eq!(frontier.pending(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "not a url");
    }
}
