//! URL handling module for Ripple-Search
//!
//! Normalization of crawl keys, resolution of discovered links against the
//! page they appear on, and origin helpers for robots.txt lookups.

mod domain;
mod normalize;
mod resolve;

pub use domain::{origin_key, robots_url};
pub use normalize::{normalize_parsed, normalize_url};
pub use resolve::resolve_link;
