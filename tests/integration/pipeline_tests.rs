//! End-to-end scrape pipeline tests
//!
//! The mock server listens on loopback, which URL admission refuses. The
//! [`MirrorSource`] below admits public URLs as usual and then serves them
//! from the mock server, keeping path and query.

use async_trait::async_trait;
use pagesift::config::{Config, FetchConfig};
use pagesift::scrape::CacheStatsBody;
use pagesift::{
    ExtractionError, FetchError, FetchedPage, Fetcher, PageSource, ResultCache, ScrapeError,
    ScrapePipeline,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>  Rust Release Notes  </title>
    <meta name="description" content="What changed this cycle">
    <meta property="og:image" content="/img/cover.png">
</head>
<body>
    <h1>Release</h1>
    <h2>Language</h2>
    <h2>Tooling</h2>
    <p>Short one.</p>
    <p>The borrow checker now accepts more programs than before.</p>
    <p>Cargo gained a handful of quality of life improvements.</p>
    <a href="/notes/1.75">Previous release</a>
    <a href="https://blog.example.org/post">Blog post</a>
    <a href="/notes/1.75">Duplicate</a>
    <a href="mailto:team@example.com">Mail us</a>
    <img src="/img/chart.svg" alt="Chart">
</body>
</html>"#;

/// Serves admitted URLs from a mock server
struct MirrorSource {
    fetcher: Fetcher,
    server: Url,
}

impl MirrorSource {
    fn new(server: &MockServer, config: &FetchConfig) -> Self {
        Self {
            fetcher: Fetcher::new(config).expect("Failed to build fetcher"),
            server: Url::parse(&server.uri()).expect("Failed to parse mock URL"),
        }
    }
}

#[async_trait]
impl PageSource for MirrorSource {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut target = self.server.clone();
        target.set_path(url.path());
        target.set_query(url.query());
        self.fetcher.fetch(&target).await
    }
}

fn create_pipeline(server: &MockServer, ttl: Duration) -> ScrapePipeline<MirrorSource> {
    let config = Config::default();
    ScrapePipeline::new(
        MirrorSource::new(server, &config.fetch),
        Arc::new(ResultCache::new(ttl)),
    )
}

async fn mount_html(server: &MockServer, route: &str, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_and_cache_hit() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/releases/1.76", ARTICLE, 1).await;

    let pipeline = create_pipeline(&mock_server, Duration::from_secs(600));

    let first = pipeline
        .scrape("https://news.example.com/releases/1.76")
        .await
        .expect("Scrape should succeed");
    assert!(!first.from_cache);

    let page = &first.page;
    assert_eq!(page.url(), "https://news.example.com/releases/1.76");
    assert_eq!(page.title(), "Rust Release Notes");
    assert_eq!(page.meta().description, "What changed this cycle");
    assert_eq!(page.meta().og_image, "/img/cover.png");

    let headings: Vec<_> = page.headings().iter().map(|h| h.text.as_str()).collect();
    assert_eq!(headings, vec!["Release", "Language", "Tooling"]);

    assert_eq!(page.paragraphs().len(), 2);
    assert_eq!(page.stats().word_count, 18);

    let links: Vec<_> = page.links().iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://news.example.com/notes/1.75",
            "https://blog.example.org/post"
        ]
    );
    assert_eq!(page.links()[0].text, "Previous release");
    assert_eq!(page.images()[0].src, "https://news.example.com/img/chart.svg");
    assert_eq!(page.stats().total_links, 2);
    assert_eq!(page.stats().total_images, 1);

    // The mock expects exactly one request; this one must come from the cache
    let second = pipeline
        .scrape("https://news.example.com/releases/1.76")
        .await
        .expect("Scrape should succeed");
    assert!(second.from_cache);
    assert_eq!(second.page, first.page);

    let stats = CacheStatsBody::from(pipeline.cache_stats());
    assert_eq!(stats.keys, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!(stats.vsize > 0);
}

#[tokio::test]
async fn test_response_json_shape() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", ARTICLE, 1).await;

    let pipeline = create_pipeline(&mock_server, Duration::from_secs(600));
    let response = pipeline
        .scrape("https://news.example.com")
        .await
        .expect("Scrape should succeed");

    let json = serde_json::to_value(&response).expect("Failed to serialize response");
    assert_eq!(json["url"], "https://news.example.com/");
    assert_eq!(json["title"], "Rust Release Notes");
    assert_eq!(json["fromCache"], false);
    assert_eq!(json["headings"][0]["level"], "h1");
    assert_eq!(json["stats"]["totalHeadings"], 3);
    assert_eq!(json["stats"]["wordCount"], 18);
    assert!(json["scrapedAt"].is_string());
    assert!(json.get("cachedAt").is_none());
}

#[tokio::test]
async fn test_http_errors_surface_and_are_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let pipeline = create_pipeline(&mock_server, Duration::from_secs(600));

    for _ in 0..2 {
        let error = pipeline
            .scrape("https://news.example.com/missing")
            .await
            .expect_err("Scrape should fail");
        assert_eq!(error.status_code(), 404);
        assert_eq!(error.error_body().error, "Page not found");
    }

    let error = pipeline
        .scrape("https://news.example.com/private")
        .await
        .expect_err("Scrape should fail");
    assert_eq!(error.status_code(), 403);
    assert_eq!(error.error_body().error, "Access denied");

    assert_eq!(pipeline.cache_stats().entry_count, 0);
}

#[tokio::test]
async fn test_binary_response_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00])
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;

    let pipeline = create_pipeline(&mock_server, Duration::from_secs(600));
    let error = pipeline
        .scrape("https://news.example.com/logo.png")
        .await
        .expect_err("Scrape should fail");

    assert!(matches!(
        error,
        ScrapeError::Extraction(ExtractionError::BinaryContent)
    ));
    assert_eq!(error.status_code(), 500);
    assert_eq!(pipeline.cache_stats().entry_count, 0);
}

#[tokio::test]
async fn test_refused_urls_never_reach_the_server() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", ARTICLE, 0).await;

    let pipeline = create_pipeline(&mock_server, Duration::from_secs(600));

    for candidate in [
        "http://192.168.1.5/page",
        "http://127.0.0.1/",
        "http://169.254.169.254/latest/meta-data/",
        "http://router.local/",
        "file:///etc/passwd",
        "not a url",
        "   ",
    ] {
        let error = pipeline
            .scrape(candidate)
            .await
            .expect_err("Scrape should be refused");
        assert!(
            matches!(error, ScrapeError::Validation(_)),
            "{}: {:?}",
            candidate,
            error
        );
        assert_eq!(error.status_code(), 400);
    }

    let stats = pipeline.cache_stats();
    assert_eq!(stats.hits + stats.misses, 0);
}

#[tokio::test]
async fn test_expired_entries_are_refetched() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", ARTICLE, 2).await;

    let pipeline = create_pipeline(&mock_server, Duration::from_millis(50));

    let first = pipeline
        .scrape("https://news.example.com/")
        .await
        .expect("Scrape should succeed");
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = pipeline
        .scrape("https://news.example.com/")
        .await
        .expect("Scrape should succeed");

    assert!(!first.from_cache);
    assert!(!second.from_cache);
}

#[tokio::test]
async fn test_from_config_pipeline_refuses_loopback() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", ARTICLE, 0).await;

    let pipeline = ScrapePipeline::from_config(&Config::default()).expect("Failed to build pipeline");
    let error = pipeline
        .scrape(&mock_server.uri())
        .await
        .expect_err("Loopback URLs should be refused");

    assert_eq!(error.status_code(), 400);
    assert_eq!(error.error_body().error, "Invalid URL");
}
