//! Fetch orchestration: executes source tiers in order, short-circuits on the
//! first non-empty tier, and tolerates individual feed failures within a tier.

pub mod feed;
pub mod newsapi;

use std::sync::Arc;

use async_trait::async_trait;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::article::{Article, FetchRequest, RawArticle};
use crate::normalize;
use crate::sources::{SourceKind, SourceResolver, SourceTier};

/// How many feeds of one tier may be in flight at once.
const TIER_CONCURRENCY: usize = 4;

/// Per-source failures. These never cross the orchestrator boundary; each one
/// is logged and treated as that source's empty result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("malformed feed: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::Status(status.as_u16());
        }
        FetchError::Network(e.to_string())
    }
}

/// Tier-0 structured news API.
#[async_trait]
pub trait StructuredApi: Send + Sync {
    async fn top_headlines(&self, request: &FetchRequest) -> Result<Vec<RawArticle>, FetchError>;
}

/// Fetch + parse of a single syndication feed URL.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(
        &self,
        url: &str,
        max_entries: usize,
    ) -> Result<Vec<RawArticle>, FetchError>;
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_articles_total", "Articles returned by fetches.");
        describe_counter!("fetch_api_errors_total", "Structured API fetch errors.");
        describe_counter!("fetch_feed_errors_total", "Feed fetch/parse errors.");
        describe_counter!(
            "fetch_empty_total",
            "Fetches where every tier came back empty."
        );
        describe_histogram!("feed_fetch_ms", "Single feed fetch time in milliseconds.");
        describe_gauge!("fetch_last_run_ts", "Unix ts when a fetch last ran.");
    });
}

/// Executes resolver tiers in order. Holds no per-request state.
pub struct FetchOrchestrator {
    resolver: SourceResolver,
    api: Option<Arc<dyn StructuredApi>>,
    feeds: Arc<dyn FeedSource>,
}

impl FetchOrchestrator {
    pub fn new(
        resolver: SourceResolver,
        api: Option<Arc<dyn StructuredApi>>,
        feeds: Arc<dyn FeedSource>,
    ) -> Self {
        Self {
            resolver,
            api,
            feeds,
        }
    }

    /// Fetch articles for the request. An empty result is a valid outcome,
    /// never an error: every per-source failure is absorbed here.
    pub async fn fetch(&self, request: &FetchRequest) -> Vec<Article> {
        ensure_metrics_described();
        gauge!("fetch_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        let tiers = self
            .resolver
            .resolve(&request.category, &request.country, &request.language);

        for tier in &tiers {
            let raw = match tier.kind {
                SourceKind::StructuredApi => self.try_structured_api(request).await,
                SourceKind::Feed => self.try_feed_tier(tier, request.max_articles).await,
            };
            if !raw.is_empty() {
                let articles: Vec<Article> = raw
                    .iter()
                    .take(request.max_articles)
                    .map(normalize::canonicalize)
                    .collect();
                counter!("fetch_articles_total").increment(articles.len() as u64);
                tracing::info!(
                    tier = ?tier.kind,
                    count = articles.len(),
                    category = %request.category,
                    country = %request.country,
                    "fetch resolved"
                );
                return articles;
            }
        }

        counter!("fetch_empty_total").increment(1);
        tracing::info!(
            category = %request.category,
            country = %request.country,
            language = %request.language,
            "no articles found in any tier"
        );
        Vec::new()
    }

    /// Worldwide breaking-news convenience fetch: API tier first, otherwise
    /// the first three worldwide general feeds, eight articles.
    pub async fn fetch_breaking(&self) -> Vec<Article> {
        ensure_metrics_described();

        let request = FetchRequest::new("general", "worldwide", "en", 8);
        if self.api.is_some() {
            let raw = self.try_structured_api(&request).await;
            if !raw.is_empty() {
                return raw
                    .iter()
                    .take(request.max_articles)
                    .map(normalize::canonicalize)
                    .collect();
            }
        }

        let urls: Vec<String> = self
            .resolver
            .worldwide_feeds("general")
            .into_iter()
            .take(3)
            .collect();
        let raw = self
            .fetch_feeds_concurrently(&urls, request.max_articles)
            .await;
        raw.iter()
            .take(request.max_articles)
            .map(normalize::canonicalize)
            .collect()
    }

    async fn try_structured_api(&self, request: &FetchRequest) -> Vec<RawArticle> {
        let Some(api) = &self.api else {
            return Vec::new();
        };
        match api.top_headlines(request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "structured API error, falling back to feeds");
                counter!("fetch_api_errors_total").increment(1);
                Vec::new()
            }
        }
    }

    async fn try_feed_tier(&self, tier: &SourceTier, max_articles: usize) -> Vec<RawArticle> {
        let urls: Vec<String> = tier
            .candidates
            .iter()
            .map(|c| c.endpoint.clone())
            .collect();
        self.fetch_feeds_concurrently(&urls, max_articles).await
    }

    /// All feeds of one tier, concurrently under a bounded pool. A single
    /// feed's timeout or parse error is logged and skipped; it neither aborts
    /// the tier nor delays its siblings beyond their own completion.
    async fn fetch_feeds_concurrently(
        &self,
        urls: &[String],
        max_per_feed: usize,
    ) -> Vec<RawArticle> {
        let semaphore = Arc::new(Semaphore::new(TIER_CONCURRENCY));
        let mut set = JoinSet::new();

        for url in urls {
            let url = url.clone();
            let feeds = Arc::clone(&self.feeds);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let t0 = std::time::Instant::now();
                let result = feeds.fetch_feed(&url, max_per_feed).await;
                let ms = t0.elapsed().as_secs_f64() * 1_000.0;
                metrics::histogram!("feed_fetch_ms").record(ms);
                (url, result)
            });
        }

        let mut aggregated = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((url, Ok(mut entries))) => {
                    tracing::debug!(feed = %url, count = entries.len(), "feed fetched");
                    aggregated.append(&mut entries);
                }
                Ok((url, Err(e))) => {
                    tracing::warn!(feed = %url, error = %e, "feed error, skipping");
                    counter!("fetch_feed_errors_total").increment(1);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "feed task panicked, skipping");
                    counter!("fetch_feed_errors_total").increment(1);
                }
            }
        }
        aggregated
    }
}
