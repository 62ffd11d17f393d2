// tests/fetch_fallback.rs
// Tier fallback behavior of the orchestrator, with stub sources:
// API short-circuit, partial feed failure, and the all-empty outcome.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use news_veracity_analyzer::article::{FetchRequest, RawArticle};
use news_veracity_analyzer::fetch::{FeedSource, FetchError, FetchOrchestrator, StructuredApi};
use news_veracity_analyzer::sources::{FeedMatrix, SourceResolver};

fn raw(title: &str) -> RawArticle {
    RawArticle {
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        source_name: Some("Stub".to_string()),
        ..Default::default()
    }
}

/// API stub returning a fixed batch and counting calls.
struct StubApi {
    articles: Vec<RawArticle>,
    calls: AtomicUsize,
}

impl StubApi {
    fn returning(articles: Vec<RawArticle>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl StructuredApi for StubApi {
    async fn top_headlines(&self, _request: &FetchRequest) -> Result<Vec<RawArticle>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.articles.clone())
    }
}

/// Feed stub: URLs containing "fail" error out, the rest return one entry
/// per URL. Counts every fetch.
struct StubFeeds {
    calls: AtomicUsize,
}

impl StubFeeds {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FeedSource for StubFeeds {
    async fn fetch_feed(
        &self,
        url: &str,
        _max_entries: usize,
    ) -> Result<Vec<RawArticle>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("fail") {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        if url.contains("empty") {
            return Ok(Vec::new());
        }
        Ok(vec![raw(&format!("from {url}"))])
    }
}

fn matrix_with_feeds(urls: &[&str]) -> FeedMatrix {
    let json = serde_json::json!({
        "locales": {},
        "worldwide": { "general": urls }
    });
    serde_json::from_value(json).unwrap()
}

#[tokio::test]
async fn api_success_short_circuits_all_feed_tiers() {
    let api = StubApi::returning(vec![raw("api one"), raw("api two")]);
    let feeds = StubFeeds::new();
    let resolver = SourceResolver::new(matrix_with_feeds(&["https://feeds.test/a"]), true);
    let orch = FetchOrchestrator::new(resolver, Some(api.clone()), feeds.clone());

    let articles = orch
        .fetch(&FetchRequest::new("general", "us", "en", 10))
        .await;

    assert_eq!(articles.len(), 2);
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        feeds.calls.load(Ordering::SeqCst),
        0,
        "no feed request may be issued once the API tier succeeds"
    );
}

#[tokio::test]
async fn empty_api_falls_through_to_feeds() {
    let api = StubApi::returning(Vec::new());
    let feeds = StubFeeds::new();
    let resolver = SourceResolver::new(matrix_with_feeds(&["https://feeds.test/a"]), true);
    let orch = FetchOrchestrator::new(resolver, Some(api.clone()), feeds.clone());

    let articles = orch
        .fetch(&FetchRequest::new("general", "us", "en", 10))
        .await;

    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(feeds.calls.load(Ordering::SeqCst), 1);
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn one_failing_feed_does_not_abort_the_tier() {
    let feeds = StubFeeds::new();
    let resolver = SourceResolver::new(
        matrix_with_feeds(&[
            "https://feeds.test/ok1",
            "https://feeds.test/fail",
            "https://feeds.test/ok2",
        ]),
        false,
    );
    let orch = FetchOrchestrator::new(resolver, None, feeds.clone());

    let articles = orch
        .fetch(&FetchRequest::new("general", "zz", "xx", 10))
        .await;

    assert_eq!(feeds.calls.load(Ordering::SeqCst), 3, "every feed attempted");
    assert_eq!(articles.len(), 2, "union of the successful feeds");
}

#[tokio::test]
async fn all_sources_empty_is_a_valid_empty_result() {
    let feeds = StubFeeds::new();
    let resolver = SourceResolver::new(
        matrix_with_feeds(&["https://feeds.test/empty", "https://feeds.test/fail"]),
        false,
    );
    let orch = FetchOrchestrator::new(resolver, None, feeds);

    let articles = orch
        .fetch(&FetchRequest::new("general", "zz", "xx", 10))
        .await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn results_are_truncated_to_max_articles() {
    let api = StubApi::returning((0..30).map(|i| raw(&format!("a{i}"))).collect());
    let feeds = StubFeeds::new();
    let resolver = SourceResolver::new(matrix_with_feeds(&["https://feeds.test/a"]), true);
    let orch = FetchOrchestrator::new(resolver, Some(api), feeds);

    let articles = orch
        .fetch(&FetchRequest::new("general", "us", "en", 5))
        .await;
    assert_eq!(articles.len(), 5);
}

#[tokio::test]
async fn articles_come_out_normalized() {
    let api = StubApi::returning(vec![RawArticle {
        title: Some("Headline".to_string()),
        content: Some("Headline. Body  text [+99 chars]".to_string()),
        ..Default::default()
    }]);
    let feeds = StubFeeds::new();
    let resolver = SourceResolver::new(matrix_with_feeds(&["https://feeds.test/a"]), true);
    let orch = FetchOrchestrator::new(resolver, Some(api), feeds);

    let articles = orch
        .fetch(&FetchRequest::new("general", "us", "en", 10))
        .await;
    assert_eq!(articles[0].canonical_text, "Body text");
}
