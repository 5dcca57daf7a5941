//! Output module for the command-line interface
//!
//! This module renders engine data as plain text:
//! - Ranked search results with their score breakdowns
//! - The crawl job table
//! - Index statistics and ranking weights
//!
//! Each `format_*` function returns a `String`; the `print_*` wrappers write
//! it to stdout.

mod jobs;
mod results;
mod stats;

pub use jobs::{format_jobs, print_jobs};
pub use results::{format_results, print_results};
pub use stats::{format_index_stats, format_weights, print_index_stats, print_weights};
