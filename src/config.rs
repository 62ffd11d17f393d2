//! Application configuration, constructed once in the entrypoint and passed
//! into each component. No module-level key caches.

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_requests_per_minute() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "gemini" (case-insensitive)
    pub provider: String,
    /// "ENV" means: read from GEMINI_API_KEY
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Rolling-window AI-call budget.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "gemini".to_string(),
            api_key: String::new(),
            model: default_model(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AiConfig = serde_json::from_str(&data)?;

        // Normalize provider
        cfg.provider = cfg.provider.to_lowercase();

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "gemini" => env::var("GEMINI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing GEMINI_API_KEY env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        // Sanitize the window budget
        if cfg.requests_per_minute == 0 {
            cfg.requests_per_minute = default_requests_per_minute();
        }

        Ok(cfg)
    }

    /// Env-only configuration: GEMINI_API_KEY, AI_MODEL,
    /// AI_REQUESTS_PER_MINUTE. Placeholder keys count as absent.
    pub fn from_env() -> Self {
        let api_key = real_env_value("GEMINI_API_KEY").unwrap_or_default();
        let requests_per_minute = env::var("AI_REQUESTS_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v: &u32| v > 0)
            .unwrap_or_else(default_requests_per_minute);
        Self {
            enabled: !api_key.is_empty(),
            provider: "gemini".to_string(),
            api_key,
            model: env::var("AI_MODEL").unwrap_or_else(|_| default_model()),
            requests_per_minute,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ai: AiConfig,
    pub news_api: Option<NewsApiConfig>,
    pub bind_addr: String,
    pub activity_store_path: String,
}

impl AppConfig {
    /// Build from the environment: AI config from $AI_CONFIG_PATH when set
    /// (file beats env so deploys can pin it), everything else from env vars.
    pub fn from_env() -> Self {
        let ai = match env::var("AI_CONFIG_PATH") {
            Ok(path) => AiConfig::load_from_file(&path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path, "AI config file unusable, using env");
                AiConfig::from_env()
            }),
            Err(_) => AiConfig::from_env(),
        };

        let news_api = real_env_value("NEWSAPI_KEY").map(|api_key| NewsApiConfig { api_key });

        Self {
            ai,
            news_api,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            activity_store_path: env::var("ACTIVITY_STORE_PATH")
                .unwrap_or_else(|_| "data/user_activity.json".to_string()),
        }
    }
}

/// Env value if present, non-blank, and not an unfilled placeholder such as
/// "your_gemini_api_key_here".
fn real_env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.starts_with("your_"))
}
