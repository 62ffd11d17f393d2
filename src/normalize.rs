//! Content normalizer: converts a heterogeneous provider record into the
//! canonical [`Article`]. All downstream code depends only on that type.

use once_cell::sync::OnceCell;

use crate::article::{Article, RawArticle};

/// Canonicalize one raw record.
///
/// Text precedence for the canonical body: content > description > title,
/// first non-empty wins. A record with no usable text yields an explicit
/// empty canonical string, never an absent one.
pub fn canonicalize(raw: &RawArticle) -> Article {
    let title = raw.title.clone().unwrap_or_default();
    let description = raw.description.clone().unwrap_or_default();
    let raw_content = raw.content.clone().unwrap_or_default();

    let body = [&raw_content, &description, &title]
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_default();

    // Echo removal only applies when the body came from somewhere other than
    // the title; a title-only record keeps the title as its canonical text.
    let echo_title = if body.trim() == title.trim() { "" } else { &title };

    Article {
        canonical_text: clean_text(&body, echo_title),
        title,
        description,
        raw_content,
        source_name: raw.source_name.clone().unwrap_or_else(|| "Unknown".into()),
        published_at: raw.published_at.clone().unwrap_or_default(),
        url: raw.url.clone().unwrap_or_default(),
    }
}

/// Normalize body text: decode entities, strip tags and provider artifacts,
/// drop a verbatim title echo, collapse whitespace.
pub fn clean_text(body: &str, title: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(body).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Strip bracketed provider annotations, e.g. "[+1200 chars]"
    static RE_BRACKETS: OnceCell<regex::Regex> = OnceCell::new();
    let re_brackets = RE_BRACKETS.get_or_init(|| regex::Regex::new(r"\[[^\]]*\]").unwrap());
    out = re_brackets.replace_all(&out, " ").to_string();

    // 4) Strip paid-plan placeholder phrases (case-insensitive)
    static RE_PAID: OnceCell<regex::Regex> = OnceCell::new();
    let re_paid = RE_PAID.get_or_init(|| {
        regex::Regex::new(r"(?i)only available in paid plans|subscribe to (read|unlock) the full (article|story)")
            .unwrap()
    });
    out = re_paid.replace_all(&out, " ").to_string();

    // 5) Remove a verbatim title echo so summaries don't repeat the headline.
    // Only whole occurrences count: the neighbors of the match must not be
    // alphanumeric, so a short title never eats part of a word.
    let title = title.trim();
    if !title.is_empty() {
        if let Some(idx) = out.find(title) {
            let end = idx + title.len();
            let before_ok = out[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = out[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
            if before_ok && after_ok {
                out.replace_range(idx..end, " ");
            }
        }
    }

    // 6) Collapse whitespace runs (spaces, newlines, tabs) to single spaces
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    // 7) Drop orphaned leading punctuation left behind by the removals
    out.trim_start_matches([' ', '.', ',', ';', ':', '!', '?'])
        .trim()
        .to_string()
}
