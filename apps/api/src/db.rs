use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::records::{
    Analytics, AverageScores, DailyCount, DbStatus, JobDescriptionRow, ResumeRow, RoleCount,
    RoleFit, ScoreRow, SkillCount, TableCounts,
};
use crate::parsing::job::ParsedJob;
use crate::parsing::resume::ParsedResume;
use crate::scoring::engine::ScoreRecord;
use crate::scoring::round_to;

/// Listing endpoints return at most this many rows, newest first.
const LIST_LIMIT: i64 = 100;
const TOP_N: i64 = 10;
const SUBMISSION_WINDOW_DAYS: i32 = 30;

/// Creates the PostgreSQL pool and applies embedded migrations.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("PostgreSQL connection pool established (max {max_connections} connections)");
    Ok(pool)
}

pub async fn save_resume(pool: &PgPool, filename: &str, resume: &ParsedResume) -> Result<Uuid, sqlx::Error> {
    let p = &resume.profile;
    sqlx::query_scalar(
        r#"
        INSERT INTO resumes (filename, name, email, phone, skills, education, experience, projects)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(filename)
    .bind(&p.name)
    .bind(&resume.email)
    .bind(&resume.phone)
    .bind(&p.skills)
    .bind(&p.education)
    .bind(&p.experience)
    .bind(&p.projects)
    .fetch_one(pool)
    .await
}

pub async fn save_job_description(pool: &PgPool, filename: &str, job: &ParsedJob) -> Result<Uuid, sqlx::Error> {
    let p = &job.profile;
    sqlx::query_scalar(
        r#"
        INSERT INTO job_descriptions
            (filename, job_title, company, location, required_skills,
             experience_required, qualifications, responsibilities)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(filename)
    .bind(&p.job_title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(&p.required_skills)
    .bind(&p.experience_required)
    .bind(&p.qualifications)
    .bind(&p.responsibilities)
    .fetch_one(pool)
    .await
}

/// Links a score to the resume and job it was computed from.
pub struct NewScore<'a> {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub resume_filename: &'a str,
    pub jd_filename: &'a str,
    pub candidate_name: &'a str,
    pub job_title: &'a str,
    pub record: &'a ScoreRecord,
}

pub async fn save_score(pool: &PgPool, score: NewScore<'_>) -> Result<Uuid, sqlx::Error> {
    let NewScore {
        resume_id,
        job_id,
        resume_filename,
        jd_filename,
        candidate_name,
        job_title,
        record,
    } = score;

    sqlx::query_scalar(
        r#"
        INSERT INTO scores
            (resume_id, job_id, resume_filename, jd_filename, candidate_name, job_title,
             skills_match, experience_relevance, education_fit, overall_fit,
             is_shortlisted, seniority_level, weights, details, justification)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id
        "#,
    )
    .bind(resume_id)
    .bind(job_id)
    .bind(resume_filename)
    .bind(jd_filename)
    .bind(candidate_name)
    .bind(job_title)
    .bind(record.skills_match)
    .bind(record.experience_relevance)
    .bind(record.education_fit)
    .bind(record.overall_fit)
    .bind(record.is_shortlisted)
    .bind(record.seniority_label())
    .bind(Json(&record.weights))
    .bind(record.details.as_ref().map(Json))
    .bind(&record.justification)
    .fetch_one(pool)
    .await
}

pub async fn list_resumes(pool: &PgPool) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at DESC LIMIT $1")
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await
}

pub async fn list_job_descriptions(pool: &PgPool) -> Result<Vec<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions ORDER BY created_at DESC LIMIT $1",
    )
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn list_scores(pool: &PgPool) -> Result<Vec<ScoreRow>, sqlx::Error> {
    sqlx::query_as::<_, ScoreRow>("SELECT * FROM scores ORDER BY created_at DESC LIMIT $1")
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await
}

pub async fn get_job_description(pool: &PgPool, id: Uuid) -> Result<Option<JobDescriptionRow>, sqlx::Error> {
    sqlx::query_as::<_, JobDescriptionRow>("SELECT * FROM job_descriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn scores_for_resume(pool: &PgPool, resume_id: Uuid) -> Result<Vec<ScoreRow>, sqlx::Error> {
    sqlx::query_as::<_, ScoreRow>(
        "SELECT * FROM scores WHERE resume_id = $1 ORDER BY created_at DESC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await
}

/// Deletes a resume; its scores go with it (ON DELETE CASCADE).
/// Returns false when no such resume exists.
pub async fn delete_resume(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() > 0 {
        info!("Deleted resume {id} and its scores");
    }
    Ok(result.rows_affected() > 0)
}

pub async fn delete_job_description(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM job_descriptions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() > 0 {
        info!("Deleted job description {id} and its scores");
    }
    Ok(result.rows_affected() > 0)
}

pub async fn delete_score(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM scores WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Empties all three tables in one transaction.
pub async fn clear_all(pool: &PgPool) -> Result<TableCounts, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let scores = sqlx::query("DELETE FROM scores").execute(&mut *tx).await?.rows_affected();
    let resumes = sqlx::query("DELETE FROM resumes").execute(&mut *tx).await?.rows_affected();
    let job_descriptions = sqlx::query("DELETE FROM job_descriptions")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;

    info!("Cleared {resumes} resumes, {job_descriptions} job descriptions, {scores} scores");
    Ok(TableCounts {
        resumes: resumes as i64,
        job_descriptions: job_descriptions as i64,
        scores: scores as i64,
    })
}

/// Removes scores whose resume or job description no longer exists.
pub async fn cleanup_orphaned_scores(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let removed = sqlx::query(
        r#"
        DELETE FROM scores s
        WHERE s.resume_id IS NULL
           OR s.job_id IS NULL
           OR NOT EXISTS (SELECT 1 FROM resumes r WHERE r.id = s.resume_id)
           OR NOT EXISTS (SELECT 1 FROM job_descriptions j WHERE j.id = s.job_id)
        "#,
    )
    .execute(pool)
    .await?
    .rows_affected();

    if removed > 0 {
        info!("Cleaned up {removed} orphaned scores");
    }
    Ok(removed)
}

async fn table_counts(pool: &PgPool) -> Result<TableCounts, sqlx::Error> {
    let (resumes, job_descriptions, scores): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM resumes),
            (SELECT COUNT(*) FROM job_descriptions),
            (SELECT COUNT(*) FROM scores)
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(TableCounts {
        resumes,
        job_descriptions,
        scores,
    })
}

/// Ping plus row counts. Connection failures are reported, not returned.
pub async fn db_status(pool: &PgPool) -> DbStatus {
    let ping = sqlx::query("SELECT 1").execute(pool).await;
    let outcome = match ping {
        Ok(_) => table_counts(pool).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(tables) => DbStatus {
            connected: true,
            tables: Some(tables),
            error: None,
        },
        Err(e) => {
            warn!("Database status check failed: {e}");
            DbStatus {
                connected: false,
                tables: None,
                error: Some(e.to_string()),
            }
        }
    }
}

pub async fn analytics(pool: &PgPool) -> Result<Analytics, sqlx::Error> {
    let counts = table_counts(pool).await?;

    let (skills, experience, education, overall): (f64, f64, f64, f64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(AVG(skills_match), 0)::float8,
            COALESCE(AVG(experience_relevance), 0)::float8,
            COALESCE(AVG(education_fit), 0)::float8,
            COALESCE(AVG(overall_fit), 0)::float8
        FROM scores
        "#,
    )
    .fetch_one(pool)
    .await?;

    let top_skills: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT skill, COUNT(*) AS count
        FROM resumes, UNNEST(skills) AS skill
        GROUP BY skill
        ORDER BY count DESC, skill
        LIMIT $1
        "#,
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    let top_roles: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT job_title, COUNT(*) AS count
        FROM job_descriptions
        GROUP BY job_title
        ORDER BY count DESC, job_title
        LIMIT $1
        "#,
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    let per_day: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT to_char(date_trunc('day', created_at), 'YYYY-MM-DD') AS day, COUNT(*) AS count
        FROM scores
        WHERE created_at >= now() - make_interval(days => $1)
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(SUBMISSION_WINDOW_DAYS)
    .fetch_all(pool)
    .await?;

    let fit_by_role: Vec<(String, f64, i64)> = sqlx::query_as(
        r#"
        SELECT job_title, AVG(overall_fit)::float8 AS avg_fit, COUNT(*) AS count
        FROM scores
        GROUP BY job_title
        ORDER BY avg_fit DESC
        LIMIT $1
        "#,
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    Ok(Analytics {
        total_resumes: counts.resumes,
        total_scores: counts.scores,
        average_scores: AverageScores {
            skills_match: round_to(skills, 2),
            experience_relevance: round_to(experience, 2),
            education_fit: round_to(education, 2),
            overall_fit: round_to(overall, 2),
        },
        top_skills: top_skills
            .into_iter()
            .map(|(skill, count)| SkillCount { skill, count })
            .collect(),
        most_requested_roles: top_roles
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect(),
        submissions_over_time: per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        fit_by_role: fit_by_role
            .into_iter()
            .map(|(role, avg_fit, count)| RoleFit {
                role,
                avg_fit: round_to(avg_fit, 2),
                count,
            })
            .collect(),
    })
}
