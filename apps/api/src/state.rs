use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::scoring::engine::FitEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Scoring engine with its academic-marker extractor and shortlist policy
    /// already wired in.
    pub engine: Arc<FitEngine>,
    pub config: Config,
}
