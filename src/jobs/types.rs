use crate::jobs::JobError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a job recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Daily,
    Weekly,
    Hourly,
    /// Runs only when triggered explicitly
    Manual,
}

impl ScheduleType {
    pub fn is_recurring(self) -> bool {
        !matches!(self, ScheduleType::Manual)
    }

    /// True if the job's `schedule_time` is meaningful
    pub fn uses_time_of_day(self) -> bool {
        matches!(self, ScheduleType::Daily | ScheduleType::Weekly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleType::Daily => "daily",
            ScheduleType::Weekly => "weekly",
            ScheduleType::Hourly => "hourly",
            ScheduleType::Manual => "manual",
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleType {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ScheduleType::Daily),
            "weekly" => Ok(ScheduleType::Weekly),
            "hourly" => Ok(ScheduleType::Hourly),
            "manual" => Ok(ScheduleType::Manual),
            other => Err(JobError::InvalidScheduleType(other.to_string())),
        }
    }
}

/// Job lifecycle state
///
/// `Scheduled -> Running -> Completed | Failed`. Recurring jobs go back to
/// `Scheduled` once their next run is computed; manual jobs stay terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Scheduled,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(JobStatus::Scheduled),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(JobError::InvalidStatus(other.to_string())),
        }
    }
}

/// A persisted crawl job definition and its run state
///
/// Times are local wall-clock times, matching the `HH:MM` schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub id: u64,
    pub name: String,
    pub seed_urls: Vec<String>,
    pub schedule_type: ScheduleType,
    /// `HH:MM`; ignored for hourly and manual jobs
    pub schedule_time: String,
    pub max_pages: usize,
    pub max_depth: u32,
    pub created_at: NaiveDateTime,
    pub last_run: Option<NaiveDateTime>,
    pub next_run: Option<NaiveDateTime>,
    pub status: JobStatus,
}
