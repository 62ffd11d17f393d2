//! Summarization: five instruction styles for the AI path and the
//! deterministic extractive fallback.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::article::Article;

/// Content below this many words is returned unchanged instead of summarized.
pub const MIN_SUMMARY_WORDS: usize = 30;
/// Two-sentence extraction skips anything shorter than this.
pub const MIN_EXTRACTIVE_WORDS: usize = 10;
/// Sentence fragments at or under this many characters are discarded.
pub const MIN_SENTENCE_CHARS: usize = 10;
/// Input budget submitted to the backend, in characters.
pub const SUMMARY_INPUT_BUDGET: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    #[default]
    Concise,
    Detailed,
    BulletPoints,
    Casual,
    Formal,
}

impl SummaryStyle {
    /// Output bound passed into the instruction template.
    pub fn max_words(self) -> usize {
        match self {
            SummaryStyle::Concise => 60,
            SummaryStyle::Detailed => 120,
            SummaryStyle::BulletPoints => 80,
            SummaryStyle::Casual => 80,
            SummaryStyle::Formal => 100,
        }
    }

    /// Style-specific instruction for the backend.
    pub fn instruction(self) -> String {
        let max_words = self.max_words();
        match self {
            SummaryStyle::Concise => format!(
                "Provide a concise summary of the following news article in {max_words} words or less. \
                 Focus on the key facts and main points:"
            ),
            SummaryStyle::Detailed => format!(
                "Provide a detailed summary of the following news article in {max_words} words or less. \
                 Include background context and important details:"
            ),
            SummaryStyle::BulletPoints => format!(
                "Summarize the following news article as bullet points in {max_words} words or less. \
                 Use • for each point:"
            ),
            SummaryStyle::Casual => format!(
                "Summarize the following news article in a casual, conversational tone in {max_words} words or less:"
            ),
            SummaryStyle::Formal => format!(
                "Provide a formal, professional summary of the following news article in {max_words} words or less:"
            ),
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Deterministic two-sentence summary.
///
/// Splits on terminal punctuation, discards short fragments, and joins the
/// first two qualifying sentences. A single long sentence is split at its
/// midpoint; no qualifying sentences falls back to description, then title.
pub fn two_sentence_summary(article: &Article) -> String {
    let text = article.canonical_text.trim();
    if text.is_empty() {
        return "No content available.".to_string();
    }
    if word_count(text) < MIN_EXTRACTIVE_WORDS {
        return text.to_string();
    }

    let sentences = qualifying_sentences(text);
    match sentences.len() {
        0 => {
            let description = article.description.trim();
            if !description.is_empty() {
                return description.to_string();
            }
            let title = article.title.trim();
            if !title.is_empty() {
                return title.to_string();
            }
            "Summary not available.".to_string()
        }
        1 => {
            let words: Vec<&str> = sentences[0].split_whitespace().collect();
            if words.len() > 15 {
                let mid = words.len() / 2;
                format!("{}. {}.", words[..mid].join(" "), words[mid..].join(" "))
            } else {
                format!("{}.", sentences[0])
            }
        }
        _ => format!("{}. {}.", sentences[0], sentences[1]),
    }
}

fn qualifying_sentences(text: &str) -> Vec<&str> {
    static RE_SENTENCE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_SENTENCE.get_or_init(|| regex::Regex::new(r"[.!?]+").unwrap());
    re.split(text)
        .map(str::trim)
        .filter(|s| s.len() > MIN_SENTENCE_CHARS)
        .collect()
}
