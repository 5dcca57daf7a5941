//! Background job scheduler
//!
//! A cancellable interval loop claims due jobs and hands each one to a
//! bounded worker pool, so a slow crawl never delays the next tick. Stopping
//! cancels the loop and waits a grace period for running jobs, which are
//! never aborted.

use crate::config::SchedulerConfig;
use crate::jobs::{JobStatus, JobStore};
use crate::pipeline::CrawlPipeline;
use chrono::{Local, NaiveDateTime};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Drives crawl jobs on their schedules
#[derive(Debug, Clone)]
pub struct JobScheduler {
    inner: Arc<SchedulerInner>,
}

#[derive(Debug)]
struct SchedulerInner {
    store: Arc<JobStore>,
    pipeline: Arc<CrawlPipeline>,
    config: SchedulerConfig,
    workers: Arc<Semaphore>,
    tracker: TaskTracker,
    trigger_loop: Mutex<Option<TriggerLoop>>,
}

#[derive(Debug)]
struct TriggerLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl JobScheduler {
    pub fn new(store: Arc<JobStore>, pipeline: Arc<CrawlPipeline>, config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                workers: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
                store,
                pipeline,
                config,
                tracker: TaskTracker::new(),
                trigger_loop: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.inner.store
    }

    /// Starts the trigger loop; returns false if it is already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut trigger_loop = self.lock_loop();
        if trigger_loop.is_some() {
            tracing::warn!("Scheduler is already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(self.clone().run_loop(cancel.clone()));
        *trigger_loop = Some(TriggerLoop { cancel, handle });

        tracing::info!(
            "Scheduler started, checking jobs every {}s",
            self.inner.config.tick_interval_secs
        );
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock_loop().is_some()
    }

    /// Stops the trigger loop and waits up to the grace period for running jobs
    ///
    /// Jobs still running after the grace period keep running in the
    /// background.
    pub async fn stop(&self) {
        let trigger_loop = self.lock_loop().take();
        if let Some(TriggerLoop { cancel, handle }) = trigger_loop {
            cancel.cancel();
            if let Err(e) = handle.await {
                tracing::error!("Scheduler loop ended abnormally: {}", e);
            }
        }

        self.inner.tracker.close();
        let grace = self.inner.config.shutdown_grace();
        if tokio::time::timeout(grace, self.inner.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                "{} crawl jobs still running after {:?}, leaving them to finish",
                self.inner.tracker.len(),
                grace
            );
        }
        self.inner.tracker.reopen();

        tracing::info!("Scheduler stopped");
    }

    /// Dispatches a job immediately without waiting for it
    ///
    /// Returns false if no job has that id.
    pub fn run_now(&self, id: u64) -> bool {
        match self.inner.store.get(id) {
            Some(job) => {
                self.spawn_job(id);
                tracing::info!("Started immediate execution of job '{}'", job.name);
                true
            }
            None => {
                tracing::error!("Job with ID {} not found", id);
                false
            }
        }
    }

    /// Claims every job due at `now` and dispatches it to the worker pool
    ///
    /// Returns the number of jobs dispatched.
    pub fn dispatch_due(&self, now: NaiveDateTime) -> usize {
        let due = match self.inner.store.claim_due(now) {
            Ok(due) => due,
            Err(e) => {
                tracing::error!("Failed to claim due jobs: {}", e);
                return 0;
            }
        };

        for job in &due {
            tracing::info!("Job '{}' is due", job.name);
            self.spawn_job(job.id);
        }
        due.len()
    }

    /// Runs one job end to end and records the outcome
    ///
    /// Any pipeline error, including a panic, marks the job failed. Empty
    /// crawls are logged but still complete.
    ///
    /// # Returns
    ///
    /// The job's status after the run, or None if it does not exist or its
    /// status could not be recorded.
    pub async fn execute_job(&self, id: u64) -> Option<JobStatus> {
        let job = match self
            .inner
            .store
            .update_status(id, JobStatus::Running, Some(now()), None)
        {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!("Job {} disappeared before it could run", id);
                return None;
            }
            Err(e) => {
                tracing::error!("Failed to mark job {} running: {}", id, e);
                return None;
            }
        };

        tracing::info!("Starting crawl job: {}", job.name);

        let pipeline = Arc::clone(&self.inner.pipeline);
        let seeds = job.seed_urls.clone();
        let (max_pages, max_depth) = (job.max_pages, job.max_depth);
        let run = tokio::spawn(async move { pipeline.run(&seeds, max_pages, max_depth).await }).await;

        let (status, last_run) = match run {
            Ok(Ok(outcome)) => {
                if outcome.crawled == 0 {
                    tracing::warn!("No pages were crawled for job '{}'", job.name);
                } else if outcome.extracted == 0 {
                    tracing::warn!("No pages were parsed for job '{}'", job.name);
                } else {
                    tracing::info!(
                        "Crawl job '{}' completed successfully. Processed {} pages",
                        job.name,
                        outcome.indexed
                    );
                }
                (JobStatus::Completed, Some(now()))
            }
            Ok(Err(e)) => {
                tracing::error!("Error executing crawl job '{}': {}", job.name, e);
                (JobStatus::Failed, None)
            }
            Err(e) => {
                tracing::error!("Crawl job '{}' aborted: {}", job.name, e);
                (JobStatus::Failed, None)
            }
        };

        match self.inner.store.update_status(id, status, last_run, None) {
            Ok(updated) => updated.map(|job| job.status),
            Err(e) => {
                tracing::error!("Failed to record outcome of job {}: {}", id, e);
                None
            }
        }
    }

    async fn run_loop(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.inner.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let dispatched = self.dispatch_due(now());
                    if dispatched > 0 {
                        tracing::debug!("Dispatched {} due jobs", dispatched);
                    }
                }
            }
        }
    }

    fn spawn_job(&self, id: u64) {
        let scheduler = self.clone();
        let workers = Arc::clone(&self.inner.workers);
        self.inner.tracker.spawn(async move {
            let Ok(_permit) = workers.acquire_owned().await else {
                return;
            };
            scheduler.execute_job(id).await;
        });
    }

    fn lock_loop(&self) -> MutexGuard<'_, Option<TriggerLoop>> {
        self.inner
            .trigger_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
