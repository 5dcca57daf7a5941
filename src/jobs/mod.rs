//! Crawl job scheduling
//!
//! This module handles recurring and ad-hoc crawl jobs:
//! - The persisted `CrawlJob` model and its status state machine
//! - Next-run arithmetic per schedule type
//! - A file-backed job table with a single serialization point
//! - The background trigger loop and bounded worker pool

mod schedule;
mod scheduler;
mod store;
mod types;

pub use schedule::{first_run, is_due, next_run_after, parse_schedule_time};
pub use scheduler::JobScheduler;
pub use store::JobStore;
pub use types::{CrawlJob, JobStatus, ScheduleType};

use thiserror::Error;

/// Errors raised by job bookkeeping
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to write job file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize job file: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid schedule time '{0}', expected HH:MM")]
    InvalidScheduleTime(String),

    #[error("Unknown schedule type '{0}'")]
    InvalidScheduleType(String),

    #[error("Unknown job status '{0}'")]
    InvalidStatus(String),

    #[error("A crawl job needs at least one seed URL")]
    EmptySeeds,
}

/// Result type for job operations
pub type JobResult<T> = Result<T, JobError>;
