//! News Veracity Analyzer — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_veracity_analyzer::activity::{ActivityStore, JsonFileStore};
use news_veracity_analyzer::api::{self, AppState};
use news_veracity_analyzer::config::AppConfig;
use news_veracity_analyzer::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_veracity_analyzer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::from_env();
    tracing::info!(
        ai_enabled = config.ai.enabled,
        news_api = config.news_api.is_some(),
        "configuration loaded"
    );

    let metrics = Metrics::init(config.ai.requests_per_minute);

    let activity: Arc<dyn ActivityStore> =
        Arc::new(JsonFileStore::open(&config.activity_store_path));
    let state = AppState::from_config(&config, activity);
    let router = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
