//! Enrichment pipeline: summary + sentiment per article, with an AI path and
//! deterministic fallbacks. Holds no state beyond the injected AI runtime.

pub mod sentiment;
pub mod summary;

use std::sync::Arc;

use crate::ai::AiRuntime;
use crate::article::{Article, EnrichedArticle};

pub use summary::SummaryStyle;

pub struct EnrichmentPipeline {
    ai: Arc<AiRuntime>,
}

impl EnrichmentPipeline {
    pub fn new(ai: Arc<AiRuntime>) -> Self {
        Self { ai }
    }

    /// Summarize one article in the given style.
    ///
    /// Content under the minimum word threshold is returned unchanged and no
    /// backend call is issued for it. Otherwise the AI path runs first and
    /// any failure (backend error, timeout, exhausted window) degrades to
    /// the extractive two-sentence path.
    pub async fn summarize(&self, article: &Article, style: SummaryStyle) -> String {
        let text = article.canonical_text.trim();
        if text.is_empty() {
            return "No content available.".to_string();
        }
        if summary::word_count(text) < summary::MIN_SUMMARY_WORDS {
            return text.to_string();
        }

        let excerpt: String = text.chars().take(summary::SUMMARY_INPUT_BUDGET).collect();
        let prompt = format!("{}\n\nArticle: {excerpt}", style.instruction());

        match self.ai.ask(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(error = %e, "AI summary unavailable, using extractive path");
                summary::two_sentence_summary(article)
            }
        }
    }

    /// Produce the enriched article: summary plus the deterministic lexical
    /// sentiment. The AI sentiment path is a separate per-text operation; for
    /// article batches the lexical path keeps enrichment within one window.
    pub async fn enrich(&self, article: &Article, style: SummaryStyle) -> EnrichedArticle {
        let summary = self.summarize(article, style).await;
        let (label, score) = sentiment::classify(&article.canonical_text);
        EnrichedArticle {
            article: article.clone(),
            summary,
            sentiment: label,
            sentiment_score: score,
        }
    }

    /// AI sentiment with lexical fallback, for the dedicated sentiment
    /// operation.
    pub async fn sentiment(&self, text: &str) -> sentiment::SentimentAssessment {
        sentiment::classify_with_ai(&self.ai, text).await
    }
}
