//! Source resolution: maps (category, country, language) to an ordered list
//! of fallback tiers. Tier 0 is the structured news API when a key is
//! configured; feed tiers come from a static locale matrix with a worldwide
//! fallback. Resolution never fails and never returns an empty tier.

pub mod catalog;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

const ENV_MATRIX_PATH: &str = "FEEDS_CONFIG_PATH";

/// category → feed URLs
type CategoryGroups = HashMap<String, Vec<String>>;

/// Static mapping from (country, language) to category-keyed feed lists,
/// plus the worldwide fallback groups.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedMatrix {
    locales: HashMap<String, HashMap<String, CategoryGroups>>,
    worldwide: CategoryGroups,
}

static EMBEDDED_MATRIX: Lazy<FeedMatrix> = Lazy::new(|| {
    let raw = include_str!("../../feeds.json");
    serde_json::from_str(raw).expect("valid embedded feed matrix")
});

impl FeedMatrix {
    /// Built-in matrix compiled into the binary.
    pub fn embedded() -> Self {
        EMBEDDED_MATRIX.clone()
    }

    /// Load the matrix using env override + embedded fallback:
    /// 1) $FEEDS_CONFIG_PATH (TOML or JSON)
    /// 2) the embedded matrix
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_MATRIX_PATH) {
            let pb = std::path::PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("FEEDS_CONFIG_PATH points to non-existent path"));
        }
        Ok(Self::embedded())
    }

    /// Load a matrix from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading feed matrix from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext == "toml" {
            return toml::from_str(&content).context("parsing TOML feed matrix");
        }
        serde_json::from_str(&content).context("parsing JSON feed matrix")
    }

    /// The single feed group for this request, per the fallback rules:
    /// locale hit → category group, else that locale's "general" group;
    /// locale miss → worldwide category group, else worldwide "general".
    /// Groups from different locales are never blended.
    fn feed_group(&self, category: &str, country: &str, language: &str) -> (Vec<String>, bool) {
        if let Some(by_language) = self.locales.get(country) {
            if let Some(groups) = by_language.get(language) {
                if let Some(urls) = non_empty(groups.get(category)) {
                    return (urls, true);
                }
                if let Some(urls) = non_empty(groups.get("general")) {
                    return (urls, true);
                }
            }
        }
        let urls = non_empty(self.worldwide.get(category))
            .or_else(|| non_empty(self.worldwide.get("general")))
            .unwrap_or_default();
        (urls, false)
    }

    pub fn worldwide_group(&self, category: &str) -> Vec<String> {
        non_empty(self.worldwide.get(category))
            .or_else(|| non_empty(self.worldwide.get("general")))
            .unwrap_or_default()
    }
}

fn non_empty(urls: Option<&Vec<String>>) -> Option<Vec<String>> {
    urls.filter(|u| !u.is_empty()).cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    StructuredApi,
    Feed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub country: String,
    pub language: String,
}

/// One candidate source, produced here and consumed once by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    pub kind: SourceKind,
    pub endpoint: String,
    pub locale: Locale,
}

/// One fallback level: either the structured API or a group of feeds.
#[derive(Debug, Clone)]
pub struct SourceTier {
    pub kind: SourceKind,
    pub candidates: Vec<SourceCandidate>,
}

/// Resolves requests against the matrix. Cheap to clone per request.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    matrix: FeedMatrix,
    api_configured: bool,
}

impl SourceResolver {
    pub fn new(matrix: FeedMatrix, api_configured: bool) -> Self {
        Self {
            matrix,
            api_configured,
        }
    }

    /// Ordered tier list for the request. Always returns at least one
    /// non-empty tier; the worldwide "general" group is the floor.
    pub fn resolve(&self, category: &str, country: &str, language: &str) -> Vec<SourceTier> {
        let mut tiers = Vec::with_capacity(2);

        if self.api_configured {
            tiers.push(SourceTier {
                kind: SourceKind::StructuredApi,
                candidates: vec![SourceCandidate {
                    kind: SourceKind::StructuredApi,
                    endpoint: crate::fetch::newsapi::TOP_HEADLINES_URL.to_string(),
                    locale: Locale {
                        country: country.to_string(),
                        language: language.to_string(),
                    },
                }],
            });
        }

        let (urls, locale_hit) = self.matrix.feed_group(category, country, language);
        let locale = if locale_hit {
            Locale {
                country: country.to_string(),
                language: language.to_string(),
            }
        } else {
            Locale {
                country: "worldwide".to_string(),
                language: "en".to_string(),
            }
        };
        tiers.push(SourceTier {
            kind: SourceKind::Feed,
            candidates: urls
                .into_iter()
                .map(|endpoint| SourceCandidate {
                    kind: SourceKind::Feed,
                    endpoint,
                    locale: locale.clone(),
                })
                .collect(),
        });

        tiers
    }

    /// The worldwide group for a category, used by the breaking-news path.
    pub fn worldwide_feeds(&self, category: &str) -> Vec<String> {
        self.matrix.worldwide_group(category)
    }
}
