//! Structured news API client (NewsAPI-style `top-headlines` endpoint).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::article::{FetchRequest, RawArticle};
use crate::fetch::{FetchError, StructuredApi};

pub const TOP_HEADLINES_URL: &str = "https://newsapi.org/v2/top-headlines";

/// Provider maximum for `pageSize`; requests are clamped to it.
const PROVIDER_MAX_PAGE_SIZE: usize = 100;

pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-veracity-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<ApiSource>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl From<ApiArticle> for RawArticle {
    fn from(a: ApiArticle) -> Self {
        RawArticle {
            title: a.title,
            description: a.description,
            content: a.content,
            url: a.url,
            published_at: a.published_at,
            source_name: a.source.and_then(|s| s.name),
        }
    }
}

#[async_trait]
impl StructuredApi for NewsApiClient {
    async fn top_headlines(&self, request: &FetchRequest) -> Result<Vec<RawArticle>, FetchError> {
        let page_size = request.max_articles.min(PROVIDER_MAX_PAGE_SIZE).to_string();
        let mut params = vec![
            ("apiKey", self.api_key.as_str()),
            ("category", request.category.as_str()),
            ("language", request.language.as_str()),
            ("pageSize", page_size.as_str()),
            ("sortBy", "publishedAt"),
        ];
        // The provider has no "worldwide" country; omitting the parameter
        // selects global coverage.
        if !request.is_worldwide() {
            params.push(("country", request.country.as_str()));
        }

        let resp = self
            .http
            .get(TOP_HEADLINES_URL)
            .query(&params)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let body: HeadlinesResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(body.articles.into_iter().map(RawArticle::from).collect())
    }
}
