//! Skill Matcher: required-skill coverage with a flat penalty per missing critical skill.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::profile::JobProfile;
use crate::scoring::{round_to, DimensionResult, MAX_SCORE};

/// Words that mark a requirement as must-have when they appear in the JD text.
const CRITICAL_INDICATORS: &[&str] = &[
    "required",
    "must",
    "essential",
    "mandatory",
    "proficient",
    "expert",
];

/// Only the first N required skills are considered for critical status.
const CRITICAL_SCAN_LIMIT: usize = 5;
/// Positional fallback when no skill co-occurs with an indicator.
const CRITICAL_FALLBACK_COUNT: usize = 3;
const CRITICAL_MISSING_PENALTY: f64 = 0.2;
/// Score when the job lists no required skills.
const NEUTRAL_SKILL_SCORE: f64 = 5.0;
const BREAKDOWN_LIMIT: usize = 10;

/// Evidence behind the skills score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillDetails {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub critical_skills: Vec<String>,
    pub critical_missing: Vec<String>,
    pub total_required: usize,
    pub matched_count: usize,
    /// Percentage, one decimal place.
    pub match_ratio: f64,
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Selects the must-have skills for a job.
///
/// A skill among the first five is critical when both the skill and any
/// indicator word appear somewhere in the requirement text. The two need not
/// be adjacent. With no qualifying skill, the first three required skills
/// are used.
pub fn extract_critical_skills(job: &JobProfile) -> Vec<String> {
    let text = job.requirement_text();
    let has_indicator = CRITICAL_INDICATORS.iter().any(|i| text.contains(i));

    let critical: Vec<String> = if has_indicator {
        job.required_skills
            .iter()
            .take(CRITICAL_SCAN_LIMIT)
            .filter(|skill| {
                let needle = normalize(skill);
                !needle.is_empty() && text.contains(&needle)
            })
            .map(|s| s.trim().to_string())
            .collect()
    } else {
        Vec::new()
    };

    if critical.is_empty() {
        job.required_skills
            .iter()
            .take(CRITICAL_FALLBACK_COUNT)
            .map(|s| s.trim().to_string())
            .collect()
    } else {
        critical
    }
}

/// Scores candidate skills against the job's required skills.
pub fn score_skills(candidate_skills: &[String], job: &JobProfile) -> DimensionResult<SkillDetails> {
    let required: Vec<&String> = job
        .required_skills
        .iter()
        .filter(|s| !s.trim().is_empty())
        .collect();

    if required.is_empty() {
        debug!(component = "skills", "no required skills, neutral score");
        return DimensionResult {
            score: NEUTRAL_SKILL_SCORE,
            details: SkillDetails::default(),
        };
    }

    let have: HashSet<String> = candidate_skills.iter().map(|s| normalize(s)).collect();

    let (matched, missing): (Vec<String>, Vec<String>) = required
        .iter()
        .map(|s| s.trim().to_string())
        .partition(|s| have.contains(&normalize(s)));

    let critical_skills = extract_critical_skills(job);
    let critical_missing: Vec<String> = critical_skills
        .iter()
        .filter(|s| !have.contains(&normalize(s)))
        .cloned()
        .collect();

    let ratio = matched.len() as f64 / required.len() as f64;
    let raw = ratio * MAX_SCORE - CRITICAL_MISSING_PENALTY * critical_missing.len() as f64;
    let score = round_to(raw.clamp(0.0, MAX_SCORE), 2);

    debug!(
        component = "skills",
        matched = matched.len(),
        required = required.len(),
        critical_missing = critical_missing.len(),
        "skills scored {score}"
    );

    DimensionResult {
        score,
        details: SkillDetails {
            matched_count: matched.len(),
            total_required: required.len(),
            matched: matched.into_iter().take(BREAKDOWN_LIMIT).collect(),
            missing: missing.into_iter().take(BREAKDOWN_LIMIT).collect(),
            critical_skills,
            critical_missing,
            match_ratio: round_to(ratio * 100.0, 1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn job_with(required: &[&str], responsibilities: &[&str]) -> JobProfile {
        JobProfile {
            job_title: "Software Engineer".to_string(),
            required_skills: strings(required),
            responsibilities: strings(responsibilities),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_required_skills_is_neutral() {
        let result = score_skills(&strings(&["Rust"]), &job_with(&[], &[]));
        assert_eq!(result.score, 5.0);
        assert!(result.details.matched.is_empty());
        assert!(result.details.missing.is_empty());
    }

    #[test]
    fn test_fallback_critical_skills_and_penalty() {
        let job = job_with(&["Python", "React", "AWS"], &["Build features"]);
        let result = score_skills(&strings(&["Python", "React"]), &job);

        assert_eq!(result.details.critical_skills, strings(&["Python", "React", "AWS"]));
        assert_eq!(result.details.critical_missing, strings(&["AWS"]));
        assert_eq!(result.details.match_ratio, 66.7);
        assert_eq!(result.score, 6.47);
    }

    #[test]
    fn test_indicator_marks_mentioned_skills_critical() {
        let job = job_with(
            &["Go", "Kubernetes", "Terraform", "Python"],
            &["Kubernetes experience required", "Terraform a plus"],
        );
        let critical = extract_critical_skills(&job);
        // Indicator need not sit next to the skill.
        assert_eq!(critical, strings(&["Kubernetes", "Terraform"]));
    }

    #[test]
    fn test_only_first_five_skills_scanned() {
        let job = job_with(
            &["A1", "B2", "C3", "D4", "E5", "Rust"],
            &["Rust is mandatory"],
        );
        // Rust is sixth, so positional fallback applies.
        assert_eq!(extract_critical_skills(&job), strings(&["A1", "B2", "C3"]));
    }

    #[test]
    fn test_matching_is_case_and_whitespace_insensitive() {
        let job = job_with(&[" PostgreSQL ", "docker"], &[]);
        let result = score_skills(&strings(&["postgresql", "Docker  "]), &job);
        assert_eq!(result.score, 10.0);
        assert_eq!(result.details.matched, strings(&["PostgreSQL", "docker"]));
    }

    #[test]
    fn test_penalty_cannot_drive_below_zero() {
        let job = job_with(&["Java", "Spring Boot", "AWS"], &[]);
        let result = score_skills(&strings(&["PHP"]), &job);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.details.critical_missing.len(), 3);
    }

    #[test]
    fn test_breakdown_caps_lists_at_ten() {
        let required: Vec<String> = (0..15).map(|i| format!("skill{i}")).collect();
        let job = JobProfile {
            required_skills: required,
            ..Default::default()
        };
        let result = score_skills(&[], &job);
        assert_eq!(result.details.missing.len(), 10);
        assert_eq!(result.details.total_required, 15);
    }
}
