//! Verification engine: extracts canonical text from one of {raw text, PDF
//! document, URL}, invokes the AI verdict classifier through the shared
//! rate-limit window, and parses the reply leniently.
//!
//! Every path returns a fully-populated [`VerificationResult`]; no failure
//! escapes as an error.

pub mod extract;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::reply::{labeled_field, parse_confidence};
use crate::ai::{AiCallError, AiError, AiRuntime};
use self::extract::TextExtractor;

/// Input budget for the verdict classifier, in characters.
pub const VERIFY_INPUT_BUDGET: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    True,
    False,
    Uncertain,
    Invalid,
    Error,
    RateLimited,
}

/// One verification request. If multiple modalities are supplied, precedence
/// is text > document > url.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationInput {
    pub text: Option<String>,
    pub document: Option<Vec<u8>>,
    pub document_name: Option<String>,
    pub url: Option<String>,
}

impl VerificationInput {
    pub fn text(value: &str) -> Self {
        Self {
            text: Some(value.to_string()),
            ..Default::default()
        }
    }

    pub fn url(value: &str) -> Self {
        Self {
            url: Some(value.to_string()),
            ..Default::default()
        }
    }

    pub fn document(bytes: Vec<u8>, name: Option<String>) -> Self {
        Self {
            document: Some(bytes),
            document_name: name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub verdict: Verdict,
    /// Always in [0, 100].
    pub confidence: u8,
    pub explanation: String,
    /// Audit trail: which modality (and URL/file) supplied the text.
    pub source_info: String,
}

impl VerificationResult {
    fn terminal(verdict: Verdict, explanation: &str, source_info: &str) -> Self {
        Self {
            verdict,
            confidence: 0,
            explanation: explanation.to_string(),
            source_info: source_info.to_string(),
        }
    }
}

pub struct VerificationEngine {
    ai: Arc<AiRuntime>,
    extractor: TextExtractor,
}

impl VerificationEngine {
    pub fn new(ai: Arc<AiRuntime>) -> Self {
        Self {
            ai,
            extractor: TextExtractor::new(),
        }
    }

    pub async fn verify(&self, input: &VerificationInput) -> VerificationResult {
        // 1) Modality selection: text > document > url. Blank strings are
        //    treated as absent.
        let (content, source_info) = if let Some(text) =
            input.text.as_deref().filter(|t| !t.trim().is_empty())
        {
            (text.to_string(), "direct text input".to_string())
        } else if let Some(bytes) = input.document.as_deref() {
            let name = input
                .document_name
                .as_deref()
                .unwrap_or("uploaded document");
            let source_info = format!("PDF file: {name}");
            match TextExtractor::pdf_text(bytes) {
                Ok(text) => (text, source_info),
                Err(e) => {
                    return VerificationResult::terminal(Verdict::Error, &e.to_string(), &source_info)
                }
            }
        } else if let Some(raw_url) = input.url.as_deref().filter(|u| !u.trim().is_empty()) {
            // 2) Syntactic validation before any network attempt.
            if !extract::validate_url(raw_url) {
                return VerificationResult::terminal(
                    Verdict::Invalid,
                    "Please provide a valid URL starting with http:// or https://",
                    "invalid URL",
                );
            }
            let source_info = format!("URL: {raw_url}");
            match self.extractor.url_text(raw_url).await {
                Ok(text) => (text, source_info),
                Err(e) => {
                    return VerificationResult::terminal(Verdict::Error, &e.to_string(), &source_info)
                }
            }
        } else {
            return VerificationResult::terminal(
                Verdict::Invalid,
                "no input provided",
                "no input provided",
            );
        };

        if content.trim().is_empty() {
            return VerificationResult::terminal(
                Verdict::Error,
                "Could not extract content for analysis.",
                &source_info,
            );
        }

        // 3) Operation-specific truncation.
        let excerpt: String = content.chars().take(VERIFY_INPUT_BUDGET).collect();

        // 4)–5) Rate-limited classifier call; lenient parse.
        let prompt = fact_check_prompt(&excerpt);
        match self.ai.ask(&prompt).await {
            Ok(raw) => parse_verdict_reply(&raw, &source_info),
            Err(AiCallError::RateLimited { retry_after_secs }) => VerificationResult::terminal(
                Verdict::RateLimited,
                &format!("Rate limit reached. Retry in {retry_after_secs} seconds."),
                &source_info,
            ),
            Err(AiCallError::Backend(AiError::NotConfigured)) => VerificationResult::terminal(
                Verdict::Error,
                "AI service unavailable. Please check your API configuration.",
                &source_info,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "verdict backend call failed");
                VerificationResult::terminal(
                    Verdict::Error,
                    &format!("Error analyzing content: {e}"),
                    &source_info,
                )
            }
        }
    }
}

fn fact_check_prompt(excerpt: &str) -> String {
    format!(
        "Analyze the following text for factual accuracy. Consider:\n\
         1. Are the claims verifiable?\n\
         2. Do the facts seem consistent with known information?\n\
         3. Are there any obvious signs of misinformation?\n\n\
         Respond with:\n\
         - RESULT: True/False/Uncertain\n\
         - CONFIDENCE: (0-100)\n\
         - EXPLANATION: Brief explanation of your assessment\n\n\
         Text to analyze: {excerpt}"
    )
}

/// Lenient reply parse. Field defaults: verdict Uncertain, confidence 50,
/// explanation the raw reply, so a completely unlabeled reply degrades to
/// Uncertain/50/raw.
fn parse_verdict_reply(raw: &str, source_info: &str) -> VerificationResult {
    let verdict = labeled_field(raw, "RESULT")
        .map(|v| parse_verdict(&v))
        .unwrap_or(Verdict::Uncertain);
    let confidence = parse_confidence(labeled_field(raw, "CONFIDENCE").as_deref());
    let explanation = labeled_field(raw, "EXPLANATION").unwrap_or_else(|| raw.to_string());
    VerificationResult {
        verdict,
        confidence,
        explanation,
        source_info: source_info.to_string(),
    }
}

fn parse_verdict(value: &str) -> Verdict {
    let v = value.trim().to_ascii_lowercase();
    if v.starts_with("true") {
        Verdict::True
    } else if v.starts_with("false") {
        Verdict::False
    } else {
        Verdict::Uncertain
    }
}
