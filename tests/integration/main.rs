//! Integration tests for Ripple-Search
//!
//! These tests use wiremock to stand up small sites and drive the crawler,
//! index, search and job scheduler against them end to end.

mod crawl_tests;
mod engine_tests;
