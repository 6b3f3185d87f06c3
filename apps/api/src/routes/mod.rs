pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

/// Uploads carry one JD plus a batch of resume PDFs.
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring
        .route("/api/score", post(handlers::handle_score))
        .route(
            "/api/score_files",
            post(handlers::handle_score_files).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Stored documents and scores
        .route("/api/resumes", get(handlers::handle_list_resumes))
        .route("/api/resumes/:id", delete(handlers::handle_delete_resume))
        .route("/api/resumes/:id/scores", get(handlers::handle_resume_scores))
        .route("/api/scores", get(handlers::handle_list_scores))
        .route("/api/scores/:id", delete(handlers::handle_delete_score))
        .route(
            "/api/job_descriptions",
            get(handlers::handle_list_job_descriptions),
        )
        .route(
            "/api/job_descriptions/:id",
            get(handlers::handle_get_job_description).delete(handlers::handle_delete_job_description),
        )
        // Maintenance
        .route("/api/clear_database", post(handlers::handle_clear_database))
        .route("/api/cleanup_orphans", post(handlers::handle_cleanup_orphans))
        .route("/api/db_status", get(handlers::handle_db_status))
        .route("/api/analytics", get(handlers::handle_analytics))
        .with_state(state)
}
