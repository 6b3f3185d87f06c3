mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod parsing;
mod routes;
mod scoring;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::academic::{AcademicMarkerExtractor, LlmMarkerExtractor, NoMarkerExtractor};
use crate::scoring::engine::FitEngine;
use crate::scoring::policy::ThresholdGatePolicy;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs embedded migrations)
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Academic-marker fallback: hosted model when a key is configured
    let llm_timeout = Duration::from_secs(config.llm_timeout_secs);
    let extractor: Arc<dyn AcademicMarkerExtractor> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), llm_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmMarkerExtractor(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; academic-marker fallback disabled");
            Arc::new(NoMarkerExtractor)
        }
    };

    let policy = ThresholdGatePolicy {
        auto_score: config.shortlist_auto_score,
        min_score: config.shortlist_min_score,
    };
    info!(
        "Shortlist policy: auto >= {}, borderline >= {}",
        policy.auto_score, policy.min_score
    );

    let engine = Arc::new(FitEngine::new(extractor, Arc::new(policy), llm_timeout));

    // Build app state
    let state = AppState {
        db: db.clone(),
        engine,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("PostgreSQL pool closed, shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
