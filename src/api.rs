use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::activity::{ActivityKind, ActivityStore};
use crate::ai::{self, AiRuntime};
use crate::article::{EnrichedArticle, FetchRequest};
use crate::config::AppConfig;
use crate::enrich::{sentiment, EnrichmentPipeline, SummaryStyle};
use crate::fetch::feed::RssFetcher;
use crate::fetch::newsapi::NewsApiClient;
use crate::fetch::{FetchOrchestrator, StructuredApi};
use crate::normalize;
use crate::rate_limit::{RateLimitSnapshot, RateLimiter};
use crate::sources::{FeedMatrix, SourceResolver};
use crate::verify::{VerificationEngine, VerificationInput, VerificationResult, Verdict};

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<FetchOrchestrator>,
    enrichment: Arc<EnrichmentPipeline>,
    verifier: Arc<VerificationEngine>,
    ai: Arc<AiRuntime>,
    activity: Arc<dyn ActivityStore>,
    news_api_configured: bool,
}

impl AppState {
    /// Wire every component from the config. The AI runtime (backend + one
    /// shared rate-limit window) is constructed once and injected everywhere.
    pub fn from_config(config: &AppConfig, activity: Arc<dyn ActivityStore>) -> Self {
        let limiter = Arc::new(RateLimiter::per_minute(config.ai.requests_per_minute));
        let backend = ai::build_backend(&config.ai);
        let ai = Arc::new(AiRuntime::new(backend, limiter));

        let matrix = FeedMatrix::load_default().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "feed matrix override unusable, using embedded");
            FeedMatrix::embedded()
        });
        let api_client: Option<Arc<dyn StructuredApi>> = config
            .news_api
            .as_ref()
            .map(|c| Arc::new(NewsApiClient::new(&c.api_key)) as Arc<dyn StructuredApi>);
        let news_api_configured = api_client.is_some();
        let resolver = SourceResolver::new(matrix, news_api_configured);
        let orchestrator = Arc::new(FetchOrchestrator::new(
            resolver,
            api_client,
            Arc::new(RssFetcher::new()),
        ));

        Self {
            orchestrator,
            enrichment: Arc::new(EnrichmentPipeline::new(Arc::clone(&ai))),
            verifier: Arc::new(VerificationEngine::new(Arc::clone(&ai))),
            ai,
            activity,
            news_api_configured,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", post(news))
        .route("/breaking", get(breaking))
        .route("/summarize", post(summarize))
        .route("/sentiment", post(sentiment_handler))
        .route("/verify", post(verify))
        .route("/ask", post(ask))
        .route("/catalog", get(catalog))
        .route("/status", get(status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct NewsReq {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    max_articles: Option<usize>,
    #[serde(default)]
    style: Option<SummaryStyle>,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Serialize)]
struct NewsResp {
    articles: Vec<EnrichedArticle>,
    count: usize,
    message: Option<String>,
}

/// Fetch + enrich. Missing request fields fall back to the user's stored
/// preferences (or the defaults for anonymous calls).
async fn news(State(state): State<AppState>, Json(body): Json<NewsReq>) -> Json<NewsResp> {
    let prefs = state
        .activity
        .preferences(body.user.as_deref().unwrap_or(""));

    let request = FetchRequest::new(
        body.category.as_deref().unwrap_or(&prefs.default_category),
        body.country.as_deref().unwrap_or(&prefs.default_country),
        body.language.as_deref().unwrap_or(&prefs.default_language),
        body.max_articles.unwrap_or(10),
    );
    let style = body.style.unwrap_or(prefs.summary_style);

    let articles = state.orchestrator.fetch(&request).await;
    let mut enriched = Vec::with_capacity(articles.len());
    for article in &articles {
        enriched.push(state.enrichment.enrich(article, style).await);
    }

    let message = enriched.is_empty().then(|| "no articles found".to_string());
    Json(NewsResp {
        count: enriched.len(),
        articles: enriched,
        message,
    })
}

async fn breaking(State(state): State<AppState>) -> Json<NewsResp> {
    let articles = state.orchestrator.fetch_breaking().await;
    let mut enriched = Vec::with_capacity(articles.len());
    for article in &articles {
        enriched.push(state.enrichment.enrich(article, SummaryStyle::Concise).await);
    }
    let message = enriched.is_empty().then(|| "no articles found".to_string());
    Json(NewsResp {
        count: enriched.len(),
        articles: enriched,
        message,
    })
}

#[derive(Deserialize)]
struct SummarizeReq {
    text: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    style: Option<SummaryStyle>,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Serialize)]
struct SummarizeResp {
    summary: String,
    style: SummaryStyle,
}

async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<SummarizeReq>,
) -> Json<SummarizeResp> {
    let style = body.style.unwrap_or_default();
    let article = normalize::canonicalize(&crate::article::RawArticle {
        title: body.title.clone(),
        content: Some(body.text.clone()),
        ..Default::default()
    });

    let summary = state.enrichment.summarize(&article, style).await;
    state
        .activity
        .increment(body.user.as_deref().unwrap_or(""), ActivityKind::SummariesGenerated);
    Json(SummarizeResp { summary, style })
}

#[derive(Deserialize)]
struct SentimentReq {
    text: String,
}

#[derive(Serialize)]
struct SentimentResp {
    #[serde(flatten)]
    assessment: sentiment::SentimentAssessment,
    /// Lexical polarity in [-1, 1], reported alongside whichever path
    /// produced the label.
    polarity: f32,
}

async fn sentiment_handler(
    State(state): State<AppState>,
    Json(body): Json<SentimentReq>,
) -> Json<SentimentResp> {
    let assessment = state.enrichment.sentiment(&body.text).await;
    Json(SentimentResp {
        polarity: sentiment::polarity(&body.text),
        assessment,
    })
}

#[derive(Deserialize)]
struct VerifyReq {
    #[serde(default)]
    text: Option<String>,
    /// Base64-encoded PDF bytes.
    #[serde(default)]
    document_base64: Option<String>,
    #[serde(default)]
    document_name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    user: Option<String>,
}

async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyReq>,
) -> Json<VerificationResult> {
    let document = match body.document_base64.as_deref() {
        Some(encoded) => match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(_) => {
                return Json(VerificationResult {
                    verdict: Verdict::Invalid,
                    confidence: 0,
                    explanation: "document_base64 is not valid base64".to_string(),
                    source_info: "invalid document encoding".to_string(),
                })
            }
        },
        None => None,
    };

    let input = VerificationInput {
        text: body.text,
        document,
        document_name: body.document_name,
        url: body.url,
    };
    let result = state.verifier.verify(&input).await;
    state
        .activity
        .increment(body.user.as_deref().unwrap_or(""), ActivityKind::FactChecksPerformed);
    Json(result)
}

#[derive(Deserialize)]
struct AskReq {
    question: String,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Serialize)]
struct AskResp {
    answer: String,
}

async fn ask(State(state): State<AppState>, Json(body): Json<AskReq>) -> Json<AskResp> {
    let answer = ai::answer_question(&state.ai, &body.question, body.context.as_deref()).await;
    Json(AskResp { answer })
}

#[derive(Serialize)]
struct CatalogResp {
    countries: &'static [(&'static str, &'static str)],
    languages: &'static [(&'static str, &'static str)],
    categories: &'static [(&'static str, &'static str)],
}

/// Display-name ↔ code tables for request builders.
async fn catalog() -> Json<CatalogResp> {
    Json(CatalogResp {
        countries: crate::sources::catalog::country_codes(),
        languages: crate::sources::catalog::language_codes(),
        categories: crate::sources::catalog::categories(),
    })
}

#[derive(Serialize)]
struct StatusResp {
    ai_configured: bool,
    ai_provider: &'static str,
    news_api_configured: bool,
    rate_limit: RateLimitSnapshot,
}

async fn status(State(state): State<AppState>) -> Json<StatusResp> {
    Json(StatusResp {
        ai_configured: state.ai.is_available(),
        ai_provider: state.ai.provider_name(),
        news_api_configured: state.news_api_configured,
        rate_limit: state.ai.limiter().snapshot(),
    })
}
