//! Integration tests for the crawler

use ripple_search::config::Config;
use ripple_search::crawler::Crawler;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn crawler() -> Crawler {
    Crawler::new(&Config::default()).expect("Failed to build crawler")
}

fn seed(server: &MockServer) -> Vec<String> {
    vec![format!("{}/", server.uri())]
}

#[tokio::test]
async fn test_max_pages_caps_the_crawl() {
    let server = MockServer::start().await;

    let links: String = (0..50)
        .map(|i| format!(r#"<a href="/page{i}">Page {i}</a>"#))
        .collect();
    mount_page(
        &server,
        "/",
        format!("<html><head><title>Home</title></head><body>{links}</body></html>"),
    )
    .await;

    let pages = crawler().crawl(&seed(&server), 1, 3, Duration::ZERO).await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, format!("{}/", server.uri()));
    assert_eq!(pages[0].depth, 0);
}

#[tokio::test]
async fn test_depth_limit_is_respected() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<html><body><a href="/a">A</a></body></html>"#).await;
    mount_page(&server, "/a", r#"<html><body><a href="/b">B</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<html><body>too deep</body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let pages = crawler().crawl(&seed(&server), 10, 1, Duration::ZERO).await;

    let depths: Vec<(String, u32)> = pages
        .iter()
        .map(|p| (p.url.trim_start_matches(&server.uri()).to_string(), p.depth))
        .collect();
    assert_eq!(depths, vec![("/".to_string(), 0), ("/a".to_string(), 1)]);
}

#[tokio::test]
async fn test_robots_disallow_is_honored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("User-agent: *\nDisallow: /private", "text/plain"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/private/secret">Secret</a><a href="/public">Public</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/public", "<html><body>public page</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<html><body>secret</body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let pages = crawler().crawl(&seed(&server), 10, 2, Duration::ZERO).await;

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(pages.len(), 2);
    assert!(urls.iter().any(|u| u.ends_with("/public")));
    assert!(!urls.iter().any(|u| u.contains("/private")));
}

#[tokio::test]
async fn test_non_html_and_failed_pages_are_skipped() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/data.json">Data</a><a href="/missing">Gone</a><a href="/ok">Ok</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<html><body>fine</body></html>").await;

    let pages = crawler().crawl(&seed(&server), 10, 2, Duration::ZERO).await;

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls[1].ends_with("/ok"));
}

#[tokio::test]
async fn test_each_url_is_fetched_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/a">A</a>
            <a href="/a#section">A again</a>
            <a href="/a?utm_source=feed">A tracked</a>
            <a href="/">Home</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<html><body><a href="/">Back</a></body></html>"#))
        .expect(1)
        .mount(&server)
        .await;

    let pages = crawler().crawl(&seed(&server), 10, 3, Duration::ZERO).await;

    assert_eq!(pages.len(), 2);
}
