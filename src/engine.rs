//! The `SearchEngine` facade
//!
//! Composes the index store, query and ranking engines, crawl pipeline and
//! job scheduler behind one API returning plain data. This is the boundary
//! where failures become logged, non-fatal results: searches degrade to
//! empty lists and crawls to `false`.

use crate::config::Config;
use crate::index::{IndexStats, IndexStore};
use crate::jobs::{CrawlJob, JobScheduler, JobStatus, JobStore, ScheduleType};
use crate::pipeline::CrawlPipeline;
use crate::query::QueryEngine;
use crate::ranking::{RankedResult, RankingEngine, RankingWeights};
use crate::SearchError;
use chrono::Local;
use std::collections::HashMap;
use std::sync::Arc;

/// Crawl, index, search and schedule in one place
#[derive(Debug)]
pub struct SearchEngine {
    config: Config,
    index: Arc<IndexStore>,
    query: QueryEngine,
    ranking: RankingEngine,
    pipeline: Arc<CrawlPipeline>,
    scheduler: JobScheduler,
}

impl SearchEngine {
    /// Opens (or creates) the index and job file under the configured data
    /// directory
    pub fn new(config: Config) -> Result<Self, SearchError> {
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let index = Arc::new(IndexStore::open(config.storage.index_dir())?);
        let jobs = Arc::new(JobStore::open(config.storage.jobs_file()));
        let pipeline = Arc::new(CrawlPipeline::new(&config, Arc::clone(&index))?);
        let scheduler = JobScheduler::new(jobs, Arc::clone(&pipeline), config.scheduler.clone());

        tracing::info!(
            "Search engine initialized with data directory {}",
            config.storage.data_dir.display()
        );

        Ok(Self {
            query: QueryEngine::new(Arc::clone(&index)),
            ranking: RankingEngine::new(config.ranking),
            config,
            index,
            pipeline,
            scheduler,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    fn jobs(&self) -> &JobStore {
        self.scheduler.store()
    }

    /// Crawls the seeds, extracts and indexes the pages
    ///
    /// The run is recorded against a matching job, created as a manual job
    /// if needed. Returns false, marking that job failed, when nothing was
    /// crawled or extracted or indexing failed.
    pub async fn crawl_and_index(&self, seed_urls: &[String], max_pages: usize, max_depth: u32) -> bool {
        tracing::info!("Starting crawl for {} seed URLs", seed_urls.len());

        let job_id = match self
            .jobs()
            .find_or_create_manual_job(seed_urls, max_pages, max_depth)
        {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Crawl will not be tracked as a job: {}", e);
                None
            }
        };
        self.record(job_id, JobStatus::Running);

        let succeeded = match self.pipeline.run(seed_urls, max_pages, max_depth).await {
            Ok(outcome) if outcome.crawled == 0 || outcome.extracted == 0 => false,
            Ok(outcome) => {
                tracing::info!("Successfully crawled and indexed {} pages", outcome.indexed);
                true
            }
            Err(e) => {
                tracing::error!("Error during crawl and index: {}", e);
                false
            }
        };

        self.record(
            job_id,
            if succeeded {
                JobStatus::Completed
            } else {
                JobStatus::Failed
            },
        );
        succeeded
    }

    /// Searches with the configured ranking setting
    pub fn search(&self, query: &str, limit: usize) -> Vec<RankedResult> {
        self.search_with(query, limit, self.config.search.ranking_enabled)
    }

    /// Searches, optionally re-ranking
    ///
    /// Fetches twice `limit` raw hits so ranking has room to reorder, then
    /// truncates. Query failures are logged and yield an empty list.
    pub fn search_with(&self, query: &str, limit: usize, ranking_enabled: bool) -> Vec<RankedResult> {
        let hits = match self.query.search(query, limit.saturating_mul(2), None) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("Error during search for '{}': {}", query, e);
                return Vec::new();
            }
        };

        let mut results = if ranking_enabled {
            self.ranking.rank(hits, query)
        } else {
            hits.into_iter().map(RankedResult::unranked).collect()
        };
        results.truncate(limit);
        results
    }

    pub fn suggestions(&self, partial_query: &str, limit: usize) -> Vec<String> {
        self.query.suggest(partial_query, limit).unwrap_or_else(|e| {
            tracing::error!("Error generating suggestions for '{}': {}", partial_query, e);
            Vec::new()
        })
    }

    pub fn popular_queries(&self, limit: usize) -> Vec<String> {
        self.query.popular_terms(limit).unwrap_or_else(|e| {
            tracing::error!("Error getting popular queries: {}", e);
            Vec::new()
        })
    }

    /// Adds a scheduled crawl job and returns its id
    pub fn add_crawl_job(
        &self,
        name: &str,
        seed_urls: Vec<String>,
        schedule_type: ScheduleType,
        schedule_time: &str,
        max_pages: usize,
        max_depth: u32,
    ) -> Result<u64, SearchError> {
        Ok(self.jobs().add_job(
            name,
            seed_urls,
            schedule_type,
            schedule_time,
            max_pages,
            max_depth,
        )?)
    }

    pub fn remove_crawl_job(&self, id: u64) -> Result<bool, SearchError> {
        Ok(self.jobs().remove_job(id)?)
    }

    /// Starts a job in the background; false if the id is unknown
    pub fn run_crawl_job(&self, id: u64) -> bool {
        self.scheduler.run_now(id)
    }

    pub fn get_crawl_jobs(&self) -> Vec<CrawlJob> {
        self.jobs().list()
    }

    /// Compacts the index off the async runtime
    pub async fn optimize_index(&self) -> Result<(), SearchError> {
        let index = Arc::clone(&self.index);
        tokio::task::spawn_blocking(move || index.optimize()).await??;
        Ok(())
    }

    pub fn get_index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// Merges the named weights; unknown names reject the whole update
    pub fn update_ranking_weights(
        &self,
        weights: &HashMap<String, f64>,
    ) -> Result<RankingWeights, SearchError> {
        Ok(self.ranking.update_weights(weights)?)
    }

    pub fn get_ranking_weights(&self) -> RankingWeights {
        self.ranking.get_weights()
    }

    pub fn start_scheduler(&self) -> bool {
        self.scheduler.start()
    }

    pub async fn stop_scheduler(&self) {
        self.scheduler.stop().await;
    }

    /// Stops the scheduler, letting in-flight jobs finish within the grace period
    pub async fn shutdown(&self) {
        self.stop_scheduler().await;
        tracing::info!("Search engine shutdown complete");
    }

    fn record(&self, job_id: Option<u64>, status: JobStatus) {
        let Some(id) = job_id else {
            return;
        };
        let last_run = (status == JobStatus::Running).then(|| Local::now().naive_local());
        if let Err(e) = self.jobs().update_status(id, status, last_run, None) {
            tracing::warn!("Failed to record status of job {}: {}", id, e);
        }
    }
}
