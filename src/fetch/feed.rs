//! Syndication feed fetching and parsing (RSS 2.0 over HTTP).

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::article::RawArticle;
use crate::fetch::{FeedSource, FetchError};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Feed timestamps are RFC 2822; align them with the ISO-8601-ish timestamps
/// the structured API uses. Unparseable values are kept verbatim.
fn normalize_pub_date(ts: &str) -> String {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}

/// Parse an RSS document into raw records, newest-first as listed.
/// The channel title becomes the source name; a missing one falls back to
/// the feed host.
pub fn parse_rss(xml: &str, fallback_source: &str, max_entries: usize) -> Result<Vec<RawArticle>, FetchError> {
    let rss: Rss = from_str(xml).map_err(|e| FetchError::Parse(e.to_string()))?;

    let source_name = rss
        .channel
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_source.to_string());

    let mut out = Vec::with_capacity(rss.channel.items.len().min(max_entries));
    for it in rss.channel.items.into_iter().take(max_entries) {
        if it.title.as_deref().unwrap_or_default().trim().is_empty()
            && it
                .description
                .as_deref()
                .unwrap_or_default()
                .trim()
                .is_empty()
        {
            continue;
        }
        out.push(RawArticle {
            title: it.title,
            description: it.description.clone(),
            // Feeds rarely carry a separate body; the description doubles as it.
            content: it.description,
            url: it.link,
            published_at: it.pub_date.as_deref().map(normalize_pub_date),
            source_name: Some(source_name.clone()),
        });
    }
    Ok(out)
}

/// HTTP feed fetcher with a bounded per-feed timeout.
pub struct RssFetcher {
    http: reqwest::Client,
}

impl RssFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-veracity-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

impl Default for RssFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for RssFetcher {
    async fn fetch_feed(
        &self,
        url: &str,
        max_entries: usize,
    ) -> Result<Vec<RawArticle>, FetchError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let fallback = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| format!("RSS Source ({h})")))
            .unwrap_or_else(|| "RSS Source".to_string());
        parse_rss(&body, &fallback, max_entries)
    }
}
