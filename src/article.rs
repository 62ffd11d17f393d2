//! Core value types shared by the fetch, enrichment and verification pipelines.
//! All of these are per-request values; nothing here holds state across requests.

use serde::{Deserialize, Serialize};

/// Upper bound on articles returned by a single fetch.
pub const MAX_ARTICLES: usize = 15;

/// A raw provider record, before normalization. Both the structured news API
/// and the feed parser map their responses into this shape; nothing downstream
/// of the normalizer ever sees it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub source_name: Option<String>,
}

/// The canonical article produced by the normalizer.
///
/// `canonical_text` is never absent: a record with no usable text yields an
/// explicit empty string, so downstream code can rely on the field existing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub raw_content: String,
    pub canonical_text: String,
    pub source_name: String,
    /// Provider timestamp, kept verbatim (ISO-8601-ish or RFC 2822).
    pub published_at: String,
    pub url: String,
}

/// Immutable parameters of one fetch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub category: String,
    pub country: String,
    pub language: String,
    pub max_articles: usize,
}

impl FetchRequest {
    /// Build a request, clamping `max_articles` into `1..=MAX_ARTICLES`.
    pub fn new(category: &str, country: &str, language: &str, max_articles: usize) -> Self {
        Self {
            category: category.to_lowercase(),
            country: country.to_lowercase(),
            language: language.to_lowercase(),
            max_articles: max_articles.clamp(1, MAX_ARTICLES),
        }
    }

    pub fn is_worldwide(&self) -> bool {
        self.country == "worldwide"
    }
}

/// Three-way sentiment domain shared by the lexical and AI paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Article plus enrichment output. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub summary: String,
    pub sentiment: SentimentLabel,
    /// Lexical polarity in [-1, 1]; 0.0 when the AI path produced the label.
    pub sentiment_score: f32,
}
