use serde::{Deserialize, Serialize};

/// Structured resume fields consumed by the scoring engine.
///
/// Produced by `parsing::resume` (or supplied directly by API callers).
/// The engine never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
    /// Carried for display and persistence; not used by scoring.
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Structured job-description fields consumed by the scoring engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_title: String,
    /// Order matters: the first entries are the critical-skill candidates.
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub experience_required: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

impl JobProfile {
    /// Lowercased title + experience requirement + responsibilities + qualifications.
    /// Used for seniority keyword counting.
    pub fn seniority_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.job_title, &self.experience_required];
        parts.extend(self.responsibilities.iter().map(String::as_str));
        parts.extend(self.qualifications.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// Lowercased title + responsibilities + qualifications.
    /// Used for critical-skill indicator detection.
    pub fn requirement_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.job_title];
        parts.extend(self.responsibilities.iter().map(String::as_str));
        parts.extend(self.qualifications.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}
