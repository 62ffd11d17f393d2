//! Sentiment classification: deterministic lexical polarity plus the
//! AI-labeled path with lenient reply parsing.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::ai::reply::{labeled_field, parse_confidence};
use crate::ai::{AiCallError, AiError, AiRuntime};
use crate::article::SentimentLabel;

/// Input budget for sentiment-only backend calls, in characters.
pub const SENTIMENT_INPUT_BUDGET: usize = 1000;

static LEXICON: Lazy<HashMap<String, f32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f32>>(raw).expect("valid sentiment lexicon")
});

/// Polarity in [-1, 1]: mean weight of matched lexicon words, with a
/// negator in the preceding 1..=3 tokens inverting a word's sign.
pub fn polarity(text: &str) -> f32 {
    let tokens: Vec<String> = tokenize(text).collect();
    let mut sum = 0.0f32;
    let mut matched = 0usize;

    for i in 0..tokens.len() {
        let base = match LEXICON.get(tokens[i].as_str()) {
            Some(&w) => w,
            None => continue,
        };
        let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
        sum += if negated { -base } else { base };
        matched += 1;
    }

    if matched == 0 {
        0.0
    } else {
        sum / matched as f32
    }
}

/// Three-way label with a strictly exclusive boundary: the value 0.1 itself
/// is Neutral.
pub fn label_for(polarity: f32) -> SentimentLabel {
    if polarity > 0.1 {
        SentimentLabel::Positive
    } else if polarity < -0.1 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Lexical path: (label, polarity score).
pub fn classify(text: &str) -> (SentimentLabel, f32) {
    let p = polarity(text);
    (label_for(p), p)
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentAssessment {
    pub label: SentimentLabel,
    pub confidence: u8,
    pub explanation: String,
}

/// Deterministic assessment from the lexical path.
pub fn lexical_assessment(text: &str) -> SentimentAssessment {
    let (label, p) = classify(text);
    SentimentAssessment {
        label,
        confidence: (p.abs() * 100.0).min(100.0) as u8,
        explanation: format!(
            "Lexical analysis shows {} sentiment with polarity {:.2}",
            label_name(label).to_lowercase(),
            p
        ),
    }
}

/// AI path with the lexical path as fallback on any backend failure.
pub async fn classify_with_ai(ai: &AiRuntime, text: &str) -> SentimentAssessment {
    let text = text.trim();
    if text.is_empty() {
        return SentimentAssessment {
            label: SentimentLabel::Neutral,
            confidence: 0,
            explanation: "No content to analyze.".to_string(),
        };
    }

    let excerpt: String = text.chars().take(SENTIMENT_INPUT_BUDGET).collect();
    let prompt = format!(
        "Analyze the sentiment of the following text. Respond with:\n\
         - SENTIMENT: Positive/Negative/Neutral\n\
         - CONFIDENCE: (0-100)\n\
         - EXPLANATION: Brief explanation of the sentiment analysis\n\n\
         Text: {excerpt}"
    );

    match ai.ask(&prompt).await {
        Ok(raw) => parse_reply(&raw),
        Err(AiCallError::RateLimited { .. }) | Err(AiCallError::Backend(AiError::NotConfigured)) => {
            lexical_assessment(text)
        }
        Err(e) => {
            tracing::warn!(error = %e, "sentiment backend call failed, using lexical path");
            lexical_assessment(text)
        }
    }
}

/// Best-effort line-based parse of a SENTIMENT/CONFIDENCE/EXPLANATION reply.
/// Defaults: Neutral / 50 / raw reply.
fn parse_reply(raw: &str) -> SentimentAssessment {
    let label = labeled_field(raw, "SENTIMENT")
        .map(|v| parse_label(&v))
        .unwrap_or(SentimentLabel::Neutral);
    let confidence = parse_confidence(labeled_field(raw, "CONFIDENCE").as_deref());
    let explanation = labeled_field(raw, "EXPLANATION").unwrap_or_else(|| raw.to_string());
    SentimentAssessment {
        label,
        confidence,
        explanation,
    }
}

fn parse_label(value: &str) -> SentimentLabel {
    let v = value.trim().to_ascii_lowercase();
    if v.starts_with("positive") {
        SentimentLabel::Positive
    } else if v.starts_with("negative") {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn label_name(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "Positive",
        SentimentLabel::Negative => "Negative",
        SentimentLabel::Neutral => "Neutral",
    }
}

/// Tokenization: alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

// "won"/"can" stay out: after tokenization they collide with the verb "won"
// and plain "can", which are not negations.
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn" | "wasn" | "aren" | "don" | "doesn" | "cannot" | "without"
    )
}
