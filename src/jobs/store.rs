//! File-backed crawl job table
//!
//! Every mutation goes through one mutex. Changes are made to a copy of the
//! table, written to the JSON file, and only then swapped in, so memory never
//! runs ahead of the file.

use crate::jobs::schedule::{first_run, is_due, next_run_after, parse_schedule_time};
use crate::jobs::{CrawlJob, JobError, JobResult, JobStatus, ScheduleType};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Schedule time recorded for manual jobs
const MANUAL_SCHEDULE_TIME: &str = "00:00";

/// Seed URL characters kept in a manual job's name
const MANUAL_NAME_CHARS: usize = 50;

/// On-disk layout of the job file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct JobFile {
    crawl_jobs: Vec<CrawlJob>,
    /// Next id to assign; ids are never reused
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    last_updated: Option<NaiveDateTime>,
}

/// The persisted job list
#[derive(Debug)]
pub struct JobStore {
    path: PathBuf,
    table: Mutex<JobFile>,
}

impl JobStore {
    /// Loads the job file at `path`
    ///
    /// A missing or unreadable file yields an empty job list; it is logged,
    /// never fatal.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut table = load_job_file(&path);

        let max_id = table.crawl_jobs.iter().map(|job| job.id).max().unwrap_or(0);
        table.next_id = table.next_id.max(max_id + 1);

        Self {
            path,
            table: Mutex::new(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds a job with the next sequential id and persists it
    ///
    /// Daily and weekly jobs need a valid `HH:MM` time; the first run is
    /// computed from it.
    pub fn add_job(
        &self,
        name: &str,
        seed_urls: Vec<String>,
        schedule_type: ScheduleType,
        schedule_time: &str,
        max_pages: usize,
        max_depth: u32,
    ) -> JobResult<u64> {
        if seed_urls.is_empty() {
            return Err(JobError::EmptySeeds);
        }
        if schedule_type.uses_time_of_day() {
            parse_schedule_time(schedule_time)?;
        }

        let now = now();
        let id = self.mutate(|table| {
            insert_job(
                table,
                name.to_string(),
                seed_urls,
                schedule_type,
                schedule_time.to_string(),
                max_pages,
                max_depth,
                now,
            )
        })?;

        tracing::info!("Added crawl job {}: {}", id, name);
        Ok(id)
    }

    /// Deletes a job; returns false if no job had that id
    pub fn remove_job(&self, id: u64) -> JobResult<bool> {
        let removed = self.mutate(|table| {
            let before = table.crawl_jobs.len();
            table.crawl_jobs.retain(|job| job.id != id);
            table.crawl_jobs.len() != before
        })?;

        if removed {
            tracing::info!("Removed crawl job with ID: {}", id);
        }
        Ok(removed)
    }

    /// Returns the id of a job with exactly these seeds and limits, creating
    /// a manual job if none exists
    ///
    /// Seeds are compared as sets, so order and duplicates do not matter.
    pub fn find_or_create_manual_job(
        &self,
        seed_urls: &[String],
        max_pages: usize,
        max_depth: u32,
    ) -> JobResult<u64> {
        let Some(first) = seed_urls.first() else {
            return Err(JobError::EmptySeeds);
        };

        let wanted: HashSet<&str> = seed_urls.iter().map(String::as_str).collect();
        let name = manual_job_name(first);
        let now = now();

        let mut table = self.lock();
        let existing = table.crawl_jobs.iter().find(|job| {
            job.max_pages == max_pages
                && job.max_depth == max_depth
                && job.seed_urls.iter().map(String::as_str).collect::<HashSet<_>>() == wanted
        });
        if let Some(job) = existing {
            return Ok(job.id);
        }

        let mut draft = table.clone();
        let id = insert_job(
            &mut draft,
            name,
            seed_urls.to_vec(),
            ScheduleType::Manual,
            MANUAL_SCHEDULE_TIME.to_string(),
            max_pages,
            max_depth,
            now,
        );
        self.commit(&mut table, draft)?;

        tracing::info!("Created manual crawl job {}", id);
        Ok(id)
    }

    /// Updates a job's status at the current local time
    pub fn update_status(
        &self,
        id: u64,
        status: JobStatus,
        last_run: Option<NaiveDateTime>,
        next_run: Option<NaiveDateTime>,
    ) -> JobResult<Option<CrawlJob>> {
        self.update_status_at(id, status, last_run, next_run, now())
    }

    /// Updates a job's status as of `now`
    ///
    /// `last_run` and `next_run` overwrite the stored values only when given.
    /// A recurring job that completes or fails without an explicit next run
    /// gets one computed from its schedule and returns to `Scheduled`.
    ///
    /// # Returns
    ///
    /// The updated job, or None if no job had that id.
    pub fn update_status_at(
        &self,
        id: u64,
        status: JobStatus,
        last_run: Option<NaiveDateTime>,
        next_run: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> JobResult<Option<CrawlJob>> {
        self.mutate(|table| {
            let job = table.crawl_jobs.iter_mut().find(|job| job.id == id)?;
            job.status = status;
            if let Some(last_run) = last_run {
                job.last_run = Some(last_run);
            }

            if let Some(next_run) = next_run {
                job.next_run = Some(next_run);
            } else if status.is_finished() && job.schedule_type.is_recurring() {
                match next_run_after(job.schedule_type, &job.schedule_time, now) {
                    Some(next) => {
                        job.next_run = Some(next);
                        job.status = JobStatus::Scheduled;
                    }
                    None => tracing::error!(
                        "Error calculating next run for job {}: bad schedule time '{}'",
                        job.id,
                        job.schedule_time
                    ),
                }
            }
            Some(job.clone())
        })
    }

    /// Marks every due job `Running` and returns them
    ///
    /// Claiming under the lock keeps one job from being dispatched twice by
    /// consecutive ticks.
    pub fn claim_due(&self, now: NaiveDateTime) -> JobResult<Vec<CrawlJob>> {
        let mut table = self.lock();
        if !table.crawl_jobs.iter().any(|job| is_due(job, now)) {
            return Ok(Vec::new());
        }

        let mut draft = table.clone();
        let mut claimed = Vec::new();
        for job in draft.crawl_jobs.iter_mut().filter(|job| is_due(job, now)) {
            job.status = JobStatus::Running;
            job.last_run = Some(now);
            claimed.push(job.clone());
        }
        self.commit(&mut table, draft)?;
        Ok(claimed)
    }

    pub fn get(&self, id: u64) -> Option<CrawlJob> {
        self.lock().crawl_jobs.iter().find(|job| job.id == id).cloned()
    }

    /// Snapshot of every job
    pub fn list(&self) -> Vec<CrawlJob> {
        self.lock().crawl_jobs.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().crawl_jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, JobFile> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` to a copy of the table and commits it
    fn mutate<T>(&self, change: impl FnOnce(&mut JobFile) -> T) -> JobResult<T> {
        let mut table = self.lock();
        let mut draft = table.clone();
        let result = change(&mut draft);
        self.commit(&mut table, draft)?;
        Ok(result)
    }

    /// Writes `draft` to disk, then replaces the in-memory table with it
    ///
    /// On a write error the table is left as it was.
    fn commit(&self, table: &mut JobFile, mut draft: JobFile) -> JobResult<()> {
        self.persist(&mut draft)?;
        *table = draft;
        Ok(())
    }

    fn persist(&self, table: &mut JobFile) -> JobResult<()> {
        table.last_updated = Some(now());
        let json = serde_json::to_string_pretty(&*table)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!("Job file saved: {}", self.path.display());
        Ok(())
    }
}

fn load_job_file(path: &Path) -> JobFile {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No existing job file found, starting with empty job list");
            return JobFile::default();
        }
        Err(e) => {
            tracing::error!("Error loading job file {}: {}", path.display(), e);
            return JobFile::default();
        }
    };

    match serde_json::from_str::<JobFile>(&content) {
        Ok(table) => {
            tracing::info!("Loaded {} crawl jobs from {}", table.crawl_jobs.len(), path.display());
            table
        }
        Err(e) => {
            tracing::warn!("Job file {} is unreadable, starting empty: {}", path.display(), e);
            JobFile::default()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_job(
    table: &mut JobFile,
    name: String,
    seed_urls: Vec<String>,
    schedule_type: ScheduleType,
    schedule_time: String,
    max_pages: usize,
    max_depth: u32,
    now: NaiveDateTime,
) -> u64 {
    let id = table.next_id.max(1);
    table.next_id = id + 1;

    table.crawl_jobs.push(CrawlJob {
        id,
        name,
        next_run: first_run(schedule_type, &schedule_time, now),
        seed_urls,
        schedule_type,
        schedule_time,
        max_pages,
        max_depth,
        created_at: now,
        last_run: None,
        status: JobStatus::Scheduled,
    });
    id
}

fn manual_job_name(first_seed: &str) -> String {
    if first_seed.chars().count() > MANUAL_NAME_CHARS {
        let cut: String = first_seed.chars().take(MANUAL_NAME_CHARS).collect();
        format!("Manual Crawl - {}...", cut)
    } else {
        format!("Manual Crawl - {}", first_seed)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
