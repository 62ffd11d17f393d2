//! Generative-AI backend: provider abstraction + rate-limited runtime.
//! The concrete provider speaks the Gemini `generateContent` HTTP API; a
//! disabled stand-in covers missing configuration and a mock covers tests.

pub mod reply;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AiConfig;
use crate::rate_limit::{RateLimitExceeded, RateLimiter};

/// Failures of the backend itself.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("AI backend not configured")]
    NotConfigured,
    #[error("backend request failed: {0}")]
    Network(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("empty reply from backend")]
    EmptyReply,
}

/// Failures of a gated call: either the window was full (no request was
/// issued) or the backend itself failed.
#[derive(Debug, Clone, Error)]
pub enum AiCallError {
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error(transparent)]
    Backend(#[from] AiError),
}

/// Low-level provider: performs one real remote call. Separated from the
/// runtime so the rate-limit gating wraps production and test providers alike.
pub trait GenerativeBackend: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>>;

    /// Provider name for diagnostics/status.
    fn name(&self) -> &'static str;

    /// Whether a real call can be issued at all.
    fn is_configured(&self) -> bool {
        true
    }
}

pub type DynBackend = Arc<dyn GenerativeBackend>;

/// Gemini `generateContent` provider. Requires an API key.
pub struct GeminiBackend {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-veracity-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

impl GenerativeBackend for GeminiBackend {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return Err(AiError::NotConfigured);
            }

            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
            }
            #[derive(Deserialize)]
            struct Resp {
                #[serde(default)]
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: RespContent,
            }
            #[derive(Deserialize)]
            struct RespContent {
                #[serde(default)]
                parts: Vec<RespPart>,
            }
            #[derive(Deserialize)]
            struct RespPart {
                #[serde(default)]
                text: String,
            }

            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            };

            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            );
            let resp = self
                .http
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&req)
                .send()
                .await
                .map_err(|e| AiError::Network(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(AiError::Status(resp.status().as_u16()));
            }

            let body: Resp = resp
                .json()
                .await
                .map_err(|e| AiError::Network(e.to_string()))?;
            let text = body
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .map(|p| p.text.trim().to_string())
                .unwrap_or_default();
            if text.is_empty() {
                return Err(AiError::EmptyReply);
            }
            Ok(text)
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Always reports unconfigured; used when no API key is present.
pub struct DisabledBackend;

impl GenerativeBackend for DisabledBackend {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>> {
        Box::pin(async { Err(AiError::NotConfigured) })
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
    fn is_configured(&self) -> bool {
        false
    }
}

/// Fixed-reply provider for tests and local runs.
#[derive(Clone)]
pub struct MockBackend {
    pub reply: String,
}

impl MockBackend {
    pub fn fixed(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

impl GenerativeBackend for MockBackend {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>> {
        let out = self.reply.clone();
        Box::pin(async move { Ok(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build a backend according to config and environment.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock.
/// * Else if no API key is configured, returns the disabled backend.
/// * Else builds the Gemini provider.
pub fn build_backend(config: &AiConfig) -> DynBackend {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockBackend::fixed(
            "RESULT: Uncertain\nCONFIDENCE: 50\nEXPLANATION: mock reply",
        ));
    }

    if !config.enabled || config.api_key.is_empty() {
        return Arc::new(DisabledBackend);
    }

    Arc::new(GeminiBackend::new(&config.api_key, &config.model))
}

/// Backend plus the shared rate-limit window. Constructed once in the
/// entrypoint and injected into every AI-backed component.
#[derive(Clone)]
pub struct AiRuntime {
    backend: DynBackend,
    limiter: Arc<RateLimiter>,
}

impl AiRuntime {
    pub fn new(backend: DynBackend, limiter: Arc<RateLimiter>) -> Self {
        Self { backend, limiter }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_configured()
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// One gated backend call. The configuration check runs first so a
    /// disabled backend never consumes window slots; a granted slot means
    /// the request is actually issued.
    pub async fn ask(&self, prompt: &str) -> Result<String, AiCallError> {
        if !self.backend.is_configured() {
            return Err(AiError::NotConfigured.into());
        }
        self.limiter
            .try_acquire()
            .map_err(|RateLimitExceeded { retry_after_secs }| AiCallError::RateLimited {
                retry_after_secs,
            })?;
        let reply = self.backend.generate(prompt).await?;
        let reply = reply.trim().to_string();
        if reply.is_empty() {
            return Err(AiError::EmptyReply.into());
        }
        Ok(reply)
    }
}

/// Open Q&A with optional context, through the same gated runtime.
/// Always returns user-facing text; failures degrade to explanatory strings.
pub async fn answer_question(ai: &AiRuntime, question: &str, context: Option<&str>) -> String {
    let question = question.trim();
    if question.is_empty() {
        return "Please ask a question.".to_string();
    }

    let prompt = match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ctx) => {
            let ctx: String = ctx.chars().take(1000).collect();
            format!(
                "Based on the following context, answer the question. If the context \
                 doesn't contain enough information, provide a general answer but mention \
                 that more specific information isn't available in the context.\n\n\
                 Context: {ctx}\n\nQuestion: {question}"
            )
        }
        None => format!("Answer the following question clearly and concisely: {question}"),
    };

    match ai.ask(&prompt).await {
        Ok(answer) => answer,
        Err(AiCallError::RateLimited { retry_after_secs }) => {
            format!("Rate limit reached. Please retry in {retry_after_secs} seconds.")
        }
        Err(AiCallError::Backend(AiError::NotConfigured)) => {
            "AI service unavailable. Please check your API configuration.".to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Q&A backend call failed");
            "I'm sorry, I encountered an error while processing your question.".to_string()
        }
    }
}
