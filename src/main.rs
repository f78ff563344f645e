//! Crypto News Aggregator — Binary Entrypoint
//! Boots the poll loop and the Axum HTTP server, wiring the owned core
//! state, routes, and middleware.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_aggregator::ingest::config::{load_feeds_default, IngestConfig};
use crypto_news_aggregator::ingest::providers::rss::RssSource;
use crypto_news_aggregator::ingest::scheduler::spawn_poll_loop;
use crypto_news_aggregator::ingest::types::FeedSource;
use crypto_news_aggregator::metrics::Metrics;
use crypto_news_aggregator::{api, NewsState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
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

    let cfg = IngestConfig::from_env();
    let feeds = load_feeds_default().context("loading feed list")?;
    tracing::info!(
        feeds = feeds.len(),
        interval_secs = cfg.interval_secs,
        capacity = cfg.cache_capacity,
        "starting aggregator"
    );

    let metrics = Metrics::init(cfg.cache_capacity);

    let client = reqwest::Client::builder()
        .user_agent(concat!("crypto-news-aggregator/", env!("CARGO_PKG_VERSION")))
        .timeout(cfg.fetch_timeout())
        .build()
        .context("building http client")?;

    let sources: Arc<Vec<Box<dyn FeedSource>>> = Arc::new(
        feeds
            .into_iter()
            .map(|d| Box::new(RssSource::new(d, client.clone())) as Box<dyn FeedSource>)
            .collect(),
    );

    let state = Arc::new(NewsState::new(cfg.cache_capacity));
    let poll_loop = spawn_poll_loop(Arc::clone(&state), sources, cfg.interval());

    let app = api::create_router(Arc::clone(&state)).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding 0.0.0.0:{port}"))?;
    tracing::info!(%port, "listening");

    axum::serve(listener, app).await.context("serving http")?;

    poll_loop.stop();
    Ok(())
}
