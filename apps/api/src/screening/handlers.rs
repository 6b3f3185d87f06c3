//! Axum route handlers for the Screening API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{self, NewScore};
use crate::errors::AppError;
use crate::models::profile::{JobProfile, ResumeProfile};
use crate::models::records::{Analytics, DbStatus, JobDescriptionRow, ResumeRow, ScoreRow, TableCounts};
use crate::parsing::job::{parse_job, ParsedJob};
use crate::parsing::pdf::extract_pdf_text;
use crate::parsing::resume::{parse_resume, ParsedResume};
use crate::parsing::ParseError;
use crate::scoring::engine::ScoreRecord;
use crate::state::AppState;

const JD_FIELD: &str = "jd";
const RESUMES_FIELD: &str = "resumes";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume: ResumeProfile,
    pub job: JobProfile,
}

#[derive(Debug, Serialize)]
pub struct CandidateResult {
    pub score_id: Uuid,
    pub resume_id: Uuid,
    pub filename: String,
    pub candidate_name: String,
    pub email: Option<String>,
    #[serde(flatten)]
    pub record: ScoreRecord,
}

#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreFilesResponse {
    pub job_id: Uuid,
    pub job: ParsedJob,
    /// Ranked by overall fit, best first.
    pub results: Vec<CandidateResult>,
    pub failed: Vec<FileFailure>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: TableCounts,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub removed: u64,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// PDF extraction is CPU-bound; keep it off the async workers.
async fn pdf_text(bytes: Bytes) -> Result<String, ParseError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| ParseError::Pdf(e.to_string()))?
}

async fn read_uploads(mut multipart: Multipart) -> Result<(Upload, Vec<Upload>), AppError> {
    let mut jd: Option<Upload> = None;
    let mut resumes = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;

        match name.as_str() {
            JD_FIELD => jd = Some(Upload { filename, bytes }),
            RESUMES_FIELD => resumes.push(Upload { filename, bytes }),
            other => warn!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    let jd = jd.ok_or_else(|| AppError::Validation(format!("Missing '{JD_FIELD}' file")))?;
    if resumes.is_empty() {
        return Err(AppError::Validation(format!(
            "At least one '{RESUMES_FIELD}' file is required"
        )));
    }
    Ok((jd, resumes))
}

fn rank(results: &mut [CandidateResult]) {
    results.sort_by(|a, b| b.record.overall_fit.total_cmp(&a.record.overall_fit));
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/score
///
/// Scores an already-structured resume against an already-structured job.
/// Nothing is persisted.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreRecord>, AppError> {
    let record = state.engine.score(&request.resume, &request.job).await;
    Ok(Json(record))
}

/// POST /api/score_files
///
/// Multipart upload: one `jd` PDF plus one or more `resumes` PDFs. Every
/// document is parsed and stored, each resume is scored against the job, and
/// the results come back ranked. A resume that cannot be read is reported in
/// `failed` without aborting the batch; an unreadable JD fails the request.
pub async fn handle_score_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScoreFilesResponse>, AppError> {
    let (jd_upload, resume_uploads) = read_uploads(multipart).await?;

    let jd_text = pdf_text(jd_upload.bytes).await?;
    let job = parse_job(&jd_text);
    let job_id = db::save_job_description(&state.db, &jd_upload.filename, &job).await?;
    info!(
        "Stored job description {job_id} ({}) from {}",
        job.profile.job_title, jd_upload.filename
    );

    let mut results = Vec::with_capacity(resume_uploads.len());
    let mut failed = Vec::new();

    for upload in resume_uploads {
        let text = match pdf_text(upload.bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping resume {}: {e}", upload.filename);
                failed.push(FileFailure {
                    filename: upload.filename,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let resume: ParsedResume = parse_resume(&text);
        let resume_id = db::save_resume(&state.db, &upload.filename, &resume).await?;
        let record = state.engine.score(&resume.profile, &job.profile).await;

        let score_id = db::save_score(
            &state.db,
            NewScore {
                resume_id,
                job_id,
                resume_filename: &upload.filename,
                jd_filename: &jd_upload.filename,
                candidate_name: &resume.profile.name,
                job_title: &job.profile.job_title,
                record: &record,
            },
        )
        .await?;

        results.push(CandidateResult {
            score_id,
            resume_id,
            filename: upload.filename,
            candidate_name: resume.profile.name,
            email: resume.email,
            record,
        });
    }

    rank(&mut results);
    info!(
        "Scored {} resumes against job {job_id} ({} unreadable)",
        results.len(),
        failed.len()
    );

    Ok(Json(ScoreFilesResponse {
        job_id,
        job,
        results,
        failed,
    }))
}

/// GET /api/resumes
pub async fn handle_list_resumes(State(state): State<AppState>) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(db::list_resumes(&state.db).await?))
}

/// GET /api/scores
pub async fn handle_list_scores(State(state): State<AppState>) -> Result<Json<Vec<ScoreRow>>, AppError> {
    Ok(Json(db::list_scores(&state.db).await?))
}

/// GET /api/job_descriptions
pub async fn handle_list_job_descriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescriptionRow>>, AppError> {
    Ok(Json(db::list_job_descriptions(&state.db).await?))
}

/// GET /api/resumes/:id/scores
pub async fn handle_resume_scores(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ScoreRow>>, AppError> {
    Ok(Json(db::scores_for_resume(&state.db, id).await?))
}

/// GET /api/job_descriptions/:id
pub async fn handle_get_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobDescriptionRow>, AppError> {
    let job = db::get_job_description(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job description {id} not found")))?;
    Ok(Json(job))
}

/// DELETE /api/resumes/:id
///
/// Removes the resume and every score computed from it.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if db::delete_resume(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}

/// DELETE /api/scores/:id
pub async fn handle_delete_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if db::delete_score(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Score {id} not found")))
    }
}

/// DELETE /api/job_descriptions/:id
///
/// Removes the job description and every score computed against it.
pub async fn handle_delete_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if db::delete_job_description(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Job description {id} not found")))
    }
}

/// POST /api/clear_database
pub async fn handle_clear_database(State(state): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let cleared = db::clear_all(&state.db).await?;
    Ok(Json(ClearResponse { cleared }))
}

/// POST /api/cleanup_orphans
pub async fn handle_cleanup_orphans(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let removed = db::cleanup_orphaned_scores(&state.db).await?;
    Ok(Json(CleanupResponse { removed }))
}

/// GET /api/db_status
///
/// Always 200; connectivity problems are reported in the body.
pub async fn handle_db_status(State(state): State<AppState>) -> Json<DbStatus> {
    Json(db::db_status(&state.db).await)
}

/// GET /api/analytics
pub async fn handle_analytics(State(state): State<AppState>) -> Result<Json<Analytics>, AppError> {
    Ok(Json(db::analytics(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, overall: f64) -> CandidateResult {
        let mut record = ScoreRecord::failed("n/a");
        record.overall_fit = overall;
        CandidateResult {
            score_id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            filename: format!("{name}.pdf"),
            candidate_name: name.to_string(),
            email: None,
            record,
        }
    }

    #[test]
    fn test_rank_orders_best_first() {
        let mut results = vec![result("a", 6.1), result("b", 8.4), result("c", 7.2)];
        rank(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_candidate_result_flattens_record() {
        let json = serde_json::to_value(result("a", 7.0)).unwrap();
        assert_eq!(json["overall_fit"], 7.0);
        assert_eq!(json["seniority_level"], "unknown");
        assert_eq!(json["candidate_name"], "a");
    }
}
