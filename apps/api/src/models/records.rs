use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub filename: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub education: String,
    pub experience: String,
    pub projects: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobDescriptionRow {
    pub id: Uuid,
    pub filename: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub experience_required: String,
    pub qualifications: Vec<String>,
    pub responsibilities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted `ScoreRecord`. `weights` and `details` are stored as JSONB.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScoreRow {
    pub id: Uuid,
    pub resume_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub resume_filename: String,
    pub jd_filename: String,
    pub candidate_name: String,
    pub job_title: String,
    pub skills_match: f64,
    pub experience_relevance: f64,
    pub education_fit: f64,
    pub overall_fit: f64,
    pub is_shortlisted: bool,
    pub seniority_level: String,
    pub weights: Value,
    pub details: Option<Value>,
    pub justification: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCounts {
    pub resumes: i64,
    pub job_descriptions: i64,
    pub scores: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DbStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<TableCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AverageScores {
    pub skills_match: f64,
    pub experience_relevance: f64,
    pub education_fit: f64,
    pub overall_fit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleFit {
    pub role: String,
    pub avg_fit: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub total_resumes: i64,
    pub total_scores: i64,
    pub average_scores: AverageScores,
    pub top_skills: Vec<SkillCount>,
    pub most_requested_roles: Vec<RoleCount>,
    pub submissions_over_time: Vec<DailyCount>,
    pub fit_by_role: Vec<RoleFit>,
}
