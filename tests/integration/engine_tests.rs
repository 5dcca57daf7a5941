//! End-to-end tests for the search engine facade

use ripple_search::config::Config;
use ripple_search::{JobStatus, ScheduleType, SearchEngine};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config.crawler.delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.scheduler.tick_interval_secs = 1;
    config.scheduler.shutdown_grace_secs = 5;
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// A three page site: a home page linking to an API guide and a blog post
async fn start_site() -> MockServer {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <main><p>Welcome to the documentation site.</p>
            <a href="/api-guide">Guide</a>
            <a href="/blog">Blog</a></main>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/api-guide",
        r#"<html><head><title>API Guide</title>
            <meta name="description" content="How to call the API"></head><body>
            <main><h1>Using the API</h1>
            <p>The API accepts JSON requests and returns JSON responses.</p></main>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/blog",
        r#"<html><head><title>Release notes</title></head><body>
            <article><h2>What changed</h2>
            <p>This release mentions the api once among many other words about gardening.</p></article>
        </body></html>"#,
    )
    .await;

    server
}

fn seeds(server: &MockServer) -> Vec<String> {
    vec![format!("{}/", server.uri())]
}

#[tokio::test]
async fn test_crawl_index_and_search() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    assert!(engine.crawl_and_index(&seeds(&server), 10, 2).await);
    assert_eq!(engine.get_index_stats().document_count, 3);

    let results = engine.search("api", 10);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].hit.title, "API Guide");
    assert_eq!(results[0].hit.meta_description, "How to call the API");
    assert!(results[0].ranking_score >= results[1].ranking_score);
    assert!(results[0].score_breakdown.title_score > 0.0);

    // The ad-hoc crawl is tracked as a completed manual job
    let jobs = engine.get_crawl_jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].schedule_type, ScheduleType::Manual);
    assert_eq!(jobs[0].status, JobStatus::Completed);
    assert!(jobs[0].last_run.is_some());
}

#[tokio::test]
async fn test_recrawl_replaces_documents() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    assert!(engine.crawl_and_index(&seeds(&server), 10, 2).await);
    assert!(engine.crawl_and_index(&seeds(&server), 10, 2).await);

    assert_eq!(engine.get_index_stats().document_count, 3);
    assert_eq!(engine.search("json", 10).len(), 1);

    // Same seeds reuse the same manual job
    assert_eq!(engine.get_crawl_jobs().len(), 1);

    engine.optimize_index().await.unwrap();
    assert_eq!(engine.get_index_stats().document_count, 3);
}

#[tokio::test]
async fn test_crawl_with_no_pages_fails() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    assert!(!engine.crawl_and_index(&seeds(&server), 10, 2).await);
    assert_eq!(engine.get_index_stats().document_count, 0);

    let jobs = engine.get_crawl_jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
}

#[tokio::test]
async fn test_search_truncates_to_limit() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();
    assert!(engine.crawl_and_index(&seeds(&server), 10, 2).await);

    assert_eq!(engine.search("api", 1).len(), 1);
    assert!(engine.search("", 10).is_empty());
    assert!(engine.search("nonexistentword", 10).is_empty());

    let unranked = engine.search_with("api", 10, false);
    assert_eq!(unranked.len(), 2);
    assert!(unranked
        .iter()
        .all(|r| r.ranking_score == r.hit.raw_relevance));
}

#[tokio::test]
async fn test_suggestions_and_popular_terms() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();
    assert!(engine.crawl_and_index(&seeds(&server), 10, 2).await);

    assert_eq!(engine.suggestions("ap", 5), vec!["api".to_string()]);
    assert!(engine.suggestions("zz", 5).is_empty());

    let popular = engine.popular_queries(10);
    assert!(popular.contains(&"guide".to_string()));
    assert!(popular.iter().all(|term| term.len() > 3));
}

#[tokio::test]
async fn test_scheduled_job_runs_and_reschedules() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    let id = engine
        .add_crawl_job("Docs", seeds(&server), ScheduleType::Daily, "03:30", 10, 2)
        .unwrap();

    let status = engine.scheduler().execute_job(id).await;
    assert_eq!(status, Some(JobStatus::Scheduled));

    let job = engine
        .get_crawl_jobs()
        .into_iter()
        .find(|job| job.id == id)
        .unwrap();
    assert!(job.last_run.is_some());
    assert!(job.next_run.is_some());
    assert_eq!(engine.search("json", 10).len(), 1);
}

#[tokio::test]
async fn test_run_crawl_job_in_background() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    let id = engine
        .add_crawl_job("Adhoc", seeds(&server), ScheduleType::Manual, "", 10, 2)
        .unwrap();

    assert!(!engine.run_crawl_job(id + 100));
    assert!(engine.run_crawl_job(id));

    let mut status = JobStatus::Scheduled;
    for _ in 0..100 {
        status = engine
            .get_crawl_jobs()
            .into_iter()
            .find(|job| job.id == id)
            .map(|job| job.status)
            .unwrap();
        if status.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status, JobStatus::Completed);
    assert_eq!(engine.get_index_stats().document_count, 3);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_scheduler_start_and_stop() {
    let dir = TempDir::new().unwrap();
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    assert!(engine.start_scheduler());
    assert!(!engine.start_scheduler());
    assert!(engine.scheduler().is_running());

    engine.stop_scheduler().await;
    assert!(!engine.scheduler().is_running());
}

#[tokio::test]
async fn test_jobs_survive_restart() {
    let dir = TempDir::new().unwrap();
    let id = {
        let engine = SearchEngine::new(test_config(&dir)).unwrap();
        engine
            .add_crawl_job(
                "Weekly",
                vec!["https://example.com/".to_string()],
                ScheduleType::Weekly,
                "04:00",
                5,
                1,
            )
            .unwrap()
    };

    let engine = SearchEngine::new(test_config(&dir)).unwrap();
    let jobs = engine.get_crawl_jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, id);
    assert_eq!(jobs[0].schedule_type, ScheduleType::Weekly);

    assert!(engine.remove_crawl_job(id).unwrap());
    assert!(!engine.remove_crawl_job(id).unwrap());
}

#[tokio::test]
async fn test_ranking_weights_update() {
    let dir = TempDir::new().unwrap();
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    let mut update = HashMap::new();
    update.insert("title_match".to_string(), 10.0);
    let weights = engine.update_ranking_weights(&update).unwrap();
    assert_eq!(weights.title_match, 10.0);
    assert_eq!(engine.get_ranking_weights().title_match, 10.0);

    update.insert("bogus".to_string(), 1.0);
    assert!(engine.update_ranking_weights(&update).is_err());
    assert_eq!(engine.get_ranking_weights().title_match, 10.0);
}

#[tokio::test]
async fn test_due_jobs_are_dispatched_once() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    let id = engine
        .add_crawl_job("Nightly", seeds(&server), ScheduleType::Daily, "02:00", 10, 2)
        .unwrap();

    let later = chrono::Local::now().naive_local() + chrono::Duration::days(2);
    assert_eq!(engine.scheduler().dispatch_due(later), 1);
    // Claimed jobs are running and not handed out again
    assert_eq!(engine.scheduler().dispatch_due(later), 0);

    let mut last_run = None;
    for _ in 0..100 {
        let job = engine
            .get_crawl_jobs()
            .into_iter()
            .find(|job| job.id == id)
            .unwrap();
        if job.status == JobStatus::Scheduled && job.last_run.is_some() {
            last_run = job.last_run;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(last_run.is_some());
    assert_eq!(engine.get_index_stats().document_count, 3);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_index_write_failure_marks_crawl_failed() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let config = test_config(&dir);
    let index_dir = config.storage.index_dir();
    let engine = SearchEngine::new(config).unwrap();

    // New segment files cannot be created once the index directory is gone
    std::fs::remove_dir_all(&index_dir).unwrap();

    assert!(!engine.crawl_and_index(&seeds(&server), 10, 2).await);
    assert_eq!(engine.get_index_stats().document_count, 0);
    assert!(engine.search("api", 10).is_empty());

    let jobs = engine.get_crawl_jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
}

#[tokio::test]
async fn test_trigger_loop_runs_overdue_job() {
    let dir = TempDir::new().unwrap();
    let server = start_site().await;
    let engine = SearchEngine::new(test_config(&dir)).unwrap();

    let id = engine
        .add_crawl_job("Hourly", seeds(&server), ScheduleType::Hourly, "", 10, 2)
        .unwrap();
    let overdue = chrono::Local::now().naive_local() - chrono::Duration::minutes(5);
    engine
        .scheduler()
        .store()
        .update_status(id, JobStatus::Scheduled, None, Some(overdue))
        .unwrap();

    assert!(engine.start_scheduler());

    let mut finished = None;
    for _ in 0..100 {
        let job = engine
            .get_crawl_jobs()
            .into_iter()
            .find(|job| job.id == id)
            .unwrap();
        if job.status == JobStatus::Scheduled && job.last_run.is_some() {
            finished = Some(job);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let job = finished.expect("trigger loop never ran the overdue job");
    assert!(job.next_run.unwrap() > overdue);
    assert_eq!(engine.get_index_stats().document_count, 3);

    engine.shutdown().await;
}
