//! Canonical-text extraction for the verification pipeline: web pages and
//! PDF documents.

use std::time::Duration;

use once_cell::sync::OnceCell;
use thiserror::Error;

/// Cap on extracted text, in characters; verification truncates further.
pub const EXTRACT_BUDGET: usize = 3000;

/// Pages are fetched with a realistic client identity; some hosts refuse
/// obvious bot agents outright.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("Error fetching URL: {0}")]
    Fetch(String),
    #[error("Error processing PDF: {0}")]
    Pdf(String),
    #[error("no extractable text in document")]
    EmptyDocument,
}

/// Syntactic URL validation: scheme and host must both be present. Runs
/// before any network attempt.
pub fn validate_url(raw: &str) -> bool {
    url::Url::parse(raw).map(|u| u.has_host()).unwrap_or(false)
}

pub struct TextExtractor {
    http: reqwest::Client,
}

impl TextExtractor {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http }
    }

    /// Fetch a page and reduce it to visible text: script/style content
    /// dropped, tags stripped, entities decoded, whitespace collapsed.
    pub async fn url_text(&self, url: &str) -> Result<String, ExtractError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ExtractError::Fetch(format!(
                "status {} from {url}",
                resp.status().as_u16()
            )));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;
        Ok(truncate_chars(&visible_text(&body), EXTRACT_BUDGET))
    }

    /// Extract text from a PDF page by page, concatenating non-empty pages.
    /// A corrupt file fails as a whole; a single unreadable page is skipped.
    pub fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
        let doc =
            lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

        let mut parts = Vec::new();
        for (&page_no, _) in doc.get_pages().iter() {
            if let Ok(text) = doc.extract_text(&[page_no]) {
                if !text.trim().is_empty() {
                    parts.push(text);
                }
            }
        }
        if parts.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let joined = parts.join("\n");
        Ok(truncate_chars(&collapse_ws(&joined), EXTRACT_BUDGET))
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// HTML → visible text.
pub fn visible_text(html: &str) -> String {
    // script/style bodies first, then the remaining tags
    static RE_SCRIPT: OnceCell<regex::Regex> = OnceCell::new();
    let re_script = RE_SCRIPT
        .get_or_init(|| regex::Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
    let stripped = re_script.replace_all(html, " ");

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&stripped, " ");

    let decoded = html_escape::decode_html_entities(&stripped).to_string();
    collapse_ws(&decoded)
}

fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

fn truncate_chars(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    s.chars().take(budget).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_scheme_and_host() {
        assert!(validate_url("https://example.com/story"));
        assert!(validate_url("http://example.com"));
        assert!(!validate_url("not-a-url"));
        assert!(!validate_url("https://"));
        assert!(!validate_url("example.com/missing-scheme"));
    }

    #[test]
    fn visible_text_drops_script_and_style_bodies() {
        let html = r#"<html><head><style>body { color: red }</style></head>
            <body><script>var x = "hidden";</script><p>Visible  claim.</p></body></html>"#;
        assert_eq!(visible_text(html), "Visible claim.");
    }

    #[test]
    fn visible_text_decodes_entities() {
        assert_eq!(visible_text("<p>cats &amp; dogs</p>"), "cats & dogs");
    }

    #[test]
    fn corrupt_pdf_is_an_error() {
        let err = TextExtractor::pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn truncation_is_character_safe() {
        let s = "é".repeat(10);
        assert_eq!(truncate_chars(&s, 4).chars().count(), 4);
    }
}
