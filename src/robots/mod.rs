//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! The crawler consults it before every page fetch.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::url::robots_url;
use reqwest::{Client, StatusCode};
use url::Url;

/// Fetches and parses robots.txt for the origin of `url`
///
/// | Response | Rules |
/// |----------|-------|
/// | 2xx | parsed body |
/// | 401 / 403 | disallow all |
/// | other status | allow all |
/// | network error | allow all |
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let Some(location) = robots_url(url) else {
        return ParsedRobots::allow_all();
    };

    let response = match client.get(location.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unreachable at {}: {}", location, e);
            return ParsedRobots::allow_all();
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::info!("robots.txt at {} refused with {}", location, status);
        return ParsedRobots::disallow_all();
    }

    if !status.is_success() {
        tracing::debug!("No robots.txt at {} (HTTP {})", location, status);
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("Failed to read robots.txt body from {}: {}", location, e);
            ParsedRobots::allow_all()
        }
    }
}
