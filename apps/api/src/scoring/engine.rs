//! Fit engine: runs the full pipeline for one resume/job pair.
//!
//! `score` always returns a well-formed `ScoreRecord`. Invariant violations and
//! panics inside the pure pipeline become a failed record (all zeros, not
//! shortlisted, seniority "unknown") whose justification carries the error.
//! A panicking fallback extractor counts as "no marker".

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::profile::{JobProfile, ResumeProfile};
use crate::scoring::academic::{find_academic_marker, AcademicMarkerExtractor};
use crate::scoring::aggregate::{aggregate, DimensionScores};
use crate::scoring::education::{is_unspecified, score_education, EducationDetails, MarkerSource};
use crate::scoring::experience::{score_experience, ExperienceDetails};
use crate::scoring::justification::{generate_justification, JustificationInput};
use crate::scoring::policy::ShortlistPolicy;
use crate::scoring::seniority::{classify_seniority, SeniorityTier, Weights};
use crate::scoring::skills::{score_skills, SkillDetails};
use crate::scoring::MAX_SCORE;

/// Largest tolerated gap between overall_fit and the recomputed weighted sum.
const AGGREGATE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("{dimension} score {value} is outside [0, 10]")]
    OutOfRange { dimension: &'static str, value: f64 },

    #[error("overall fit {overall} does not match weighted sum {expected}")]
    AggregateMismatch { overall: f64, expected: f64 },

    #[error("weights for {tier} sum to {total}, expected 1.0")]
    InvalidWeights { tier: SeniorityTier, total: f64 },

    #[error("scoring pipeline panicked: {0}")]
    Panicked(String),
}

/// Per-dimension evidence, consumed by the justification generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub skills: SkillDetails,
    pub experience: ExperienceDetails,
    pub education: EducationDetails,
}

/// Result of scoring one candidate against one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub skills_match: f64,
    pub experience_relevance: f64,
    pub education_fit: f64,
    pub overall_fit: f64,
    pub is_shortlisted: bool,
    /// `None` serializes as "unknown" (failed scoring).
    #[serde(with = "tier_label")]
    pub seniority_level: Option<SeniorityTier>,
    pub weights: Weights,
    pub details: Option<ScoreDetails>,
    pub justification: String,
}

impl ScoreRecord {
    /// The record returned when the pipeline cannot produce a result.
    pub fn failed(reason: &str) -> Self {
        Self {
            skills_match: 0.0,
            experience_relevance: 0.0,
            education_fit: 0.0,
            overall_fit: 0.0,
            is_shortlisted: false,
            seniority_level: None,
            weights: Weights::NONE,
            details: None,
            justification: format!("Scoring failed: {reason}"),
        }
    }

    pub fn seniority_label(&self) -> &'static str {
        self.seniority_level
            .as_ref()
            .map(SeniorityTier::as_str)
            .unwrap_or("unknown")
    }
}

mod tier_label {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::scoring::seniority::SeniorityTier;

    pub fn serialize<S: Serializer>(tier: &Option<SeniorityTier>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(tier.as_ref().map(SeniorityTier::as_str).unwrap_or("unknown"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SeniorityTier>, D::Error> {
        let label = String::deserialize(d)?;
        Ok(super::parse_tier(&label))
    }
}

pub fn parse_tier(label: &str) -> Option<SeniorityTier> {
    match label {
        "entry" => Some(SeniorityTier::Entry),
        "mid" => Some(SeniorityTier::Mid),
        "senior" => Some(SeniorityTier::Senior),
        _ => None,
    }
}

/// The scoring engine. Shared across requests as `Arc<FitEngine>`.
pub struct FitEngine {
    extractor: Arc<dyn AcademicMarkerExtractor>,
    policy: Arc<dyn ShortlistPolicy>,
    fallback_timeout: Duration,
}

impl FitEngine {
    pub fn new(
        extractor: Arc<dyn AcademicMarkerExtractor>,
        policy: Arc<dyn ShortlistPolicy>,
        fallback_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            policy,
            fallback_timeout,
        }
    }

    /// Scores a resume against a job. Never fails.
    pub async fn score(&self, resume: &ResumeProfile, job: &JobProfile) -> ScoreRecord {
        let marker = self.resolve_marker(&resume.education).await;

        let outcome = catch_unwind(AssertUnwindSafe(|| self.compute(resume, job, marker)))
            .unwrap_or_else(|payload| Err(ScoringError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(record) => {
                info!(
                    component = "engine",
                    candidate = %resume.name,
                    job = %job.job_title,
                    overall = record.overall_fit,
                    shortlisted = record.is_shortlisted,
                    "scored candidate"
                );
                record
            }
            Err(e) => {
                error!(component = "engine", candidate = %resume.name, "scoring failed: {e}");
                ScoreRecord::failed(&e.to_string())
            }
        }
    }

    /// Pattern match first; the injected extractor only when patterns find
    /// nothing. Fallback failures and timeouts count as no marker.
    async fn resolve_marker(&self, education_text: &str) -> MarkerSource {
        if is_unspecified(education_text) {
            return MarkerSource::Absent;
        }
        if let Some(marker) = find_academic_marker(education_text) {
            return MarkerSource::Pattern(marker);
        }

        debug!(
            component = "education",
            backend = self.extractor.backend(),
            "no academic marker in text, consulting fallback"
        );
        let extractor = Arc::clone(&self.extractor);
        let text = education_text.to_string();
        let task = tokio::spawn(async move { extractor.extract(&text).await });
        let abort = task.abort_handle();

        match tokio::time::timeout(self.fallback_timeout, task).await {
            Ok(Ok(Some(marker))) => MarkerSource::Fallback(marker),
            Ok(Ok(None)) => MarkerSource::Absent,
            Ok(Err(e)) => {
                warn!(component = "education", "academic marker fallback failed: {e}");
                MarkerSource::Absent
            }
            Err(_) => {
                abort.abort();
                warn!(
                    component = "education",
                    "academic marker fallback timed out after {:?}", self.fallback_timeout
                );
                MarkerSource::Absent
            }
        }
    }

    /// The synchronous pipeline, given an already-resolved academic marker.
    pub fn compute(
        &self,
        resume: &ResumeProfile,
        job: &JobProfile,
        marker: MarkerSource,
    ) -> Result<ScoreRecord, ScoringError> {
        let (tier, weights) = classify_seniority(job);
        if (weights.total() - 1.0).abs() > 1e-9 {
            return Err(ScoringError::InvalidWeights {
                tier,
                total: weights.total(),
            });
        }

        let skills = score_skills(&resume.skills, job);
        let experience = score_experience(&resume.experience, &job.experience_required, tier);
        let education = score_education(&resume.education, &job.qualifications, marker);

        let scores = DimensionScores {
            skills: skills.score,
            experience: experience.score,
            education: education.score,
        };
        let overall_fit = aggregate(scores, weights);

        check_range("skills_match", scores.skills)?;
        check_range("experience_relevance", scores.experience)?;
        check_range("education_fit", scores.education)?;
        check_range("overall_fit", overall_fit)?;

        let expected = weights.skills * scores.skills
            + weights.experience * scores.experience
            + weights.education * scores.education;
        if (overall_fit - expected).abs() > AGGREGATE_TOLERANCE {
            return Err(ScoringError::AggregateMismatch {
                overall: overall_fit,
                expected,
            });
        }

        let is_shortlisted = self
            .policy
            .decide(overall_fit, &skills.details.critical_missing);

        let details = ScoreDetails {
            skills: skills.details,
            experience: experience.details,
            education: education.details,
        };

        let justification = generate_justification(&JustificationInput {
            details: &details,
            tier,
            overall_fit,
            is_shortlisted,
            minimum_score: self.policy.minimum_score(),
        });

        Ok(ScoreRecord {
            skills_match: scores.skills,
            experience_relevance: scores.experience,
            education_fit: scores.education,
            overall_fit,
            is_shortlisted,
            seniority_level: Some(tier),
            weights,
            details: Some(details),
            justification,
        })
    }
}

fn check_range(dimension: &'static str, value: f64) -> Result<(), ScoringError> {
    if value.is_finite() && (0.0..=MAX_SCORE).contains(&value) {
        Ok(())
    } else {
        Err(ScoringError::OutOfRange { dimension, value })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::scoring::academic::{AcademicMarker, MarkerKind, NoMarkerExtractor};
    use crate::scoring::policy::ThresholdGatePolicy;

    /// Returns a fixed marker and counts calls.
    struct StubExtractor {
        marker: Option<AcademicMarker>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AcademicMarkerExtractor for StubExtractor {
        async fn extract(&self, _education_text: &str) -> Option<AcademicMarker> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.marker
        }

        fn backend(&self) -> &'static str {
            "stub"
        }
    }

    /// Never answers; exercises the timeout path.
    struct HangingExtractor;

    #[async_trait]
    impl AcademicMarkerExtractor for HangingExtractor {
        async fn extract(&self, _education_text: &str) -> Option<AcademicMarker> {
            std::future::pending::<()>().await;
            None
        }

        fn backend(&self) -> &'static str {
            "hanging"
        }
    }

    struct PanickingExtractor;

    #[async_trait]
    impl AcademicMarkerExtractor for PanickingExtractor {
        async fn extract(&self, _education_text: &str) -> Option<AcademicMarker> {
            panic!("extractor exploded")
        }

        fn backend(&self) -> &'static str {
            "panicking"
        }
    }

    struct PanickingPolicy;

    impl ShortlistPolicy for PanickingPolicy {
        fn decide(&self, _overall_fit: f64, _critical_missing: &[String]) -> bool {
            panic!("policy exploded")
        }

        fn minimum_score(&self) -> f64 {
            7.0
        }
    }

    fn engine_with(extractor: Arc<dyn AcademicMarkerExtractor>) -> FitEngine {
        FitEngine::new(
            extractor,
            Arc::new(ThresholdGatePolicy::default()),
            Duration::from_secs(5),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn senior_job() -> JobProfile {
        JobProfile {
            job_title: "Senior Backend Engineer".to_string(),
            required_skills: strings(&["Java", "Spring Boot", "Microservices", "AWS", "Docker", "Kubernetes"]),
            experience_required: "5+ years in backend development".to_string(),
            qualifications: strings(&["Bachelor degree in CS or related field"]),
            responsibilities: strings(&[
                "Lead backend architecture",
                "Mentor junior developers",
                "Design scalable systems",
            ]),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn test_entry_level_candidate_shortlisted() {
        let job = JobProfile {
            job_title: "Junior Software Developer".to_string(),
            required_skills: strings(&["Python", "JavaScript", "React", "HTML", "CSS"]),
            experience_required: "0-1 years".to_string(),
            qualifications: strings(&["Bachelor in Computer Science"]),
            responsibilities: strings(&["Write clean code", "Learn new technologies"]),
        };
        let resume = ResumeProfile {
            name: "John Doe".to_string(),
            skills: strings(&["Python", "JavaScript", "React", "HTML", "CSS", "Git"]),
            experience: "6 months internship at Tech Company".to_string(),
            education: "B.Tech in Computer Science, CGPA: 8.5/10".to_string(),
            projects: vec![],
        };

        let record = engine_with(Arc::new(NoMarkerExtractor)).score(&resume, &job).await;

        assert_eq!(record.seniority_level, Some(SeniorityTier::Entry));
        assert_eq!(record.skills_match, 10.0);
        assert_eq!(record.experience_relevance, 7.0);
        assert_eq!(record.education_fit, 7.5);
        // 0.6·10 + 0.15·7 + 0.25·7.5 = 8.925
        assert!((record.overall_fit - 8.925).abs() <= 0.01);
        assert!(record.is_shortlisted);
        assert!(record.details.unwrap().experience.has_internship);
    }

    #[tokio::test]
    async fn test_senior_qualified_candidate() {
        let resume = ResumeProfile {
            name: "Jane Smith".to_string(),
            skills: strings(&["Java", "Spring Boot", "Microservices", "AWS", "Docker", "Kubernetes", "PostgreSQL"]),
            experience: "7 years of experience in backend development".to_string(),
            education: "Master of Science in Computer Engineering, Percentage: 85%".to_string(),
            projects: vec![],
        };

        let record = engine_with(Arc::new(NoMarkerExtractor)).score(&resume, &senior_job()).await;

        assert_eq!(record.seniority_level, Some(SeniorityTier::Senior));
        assert_eq!(record.weights, SeniorityTier::Senior.weights());
        assert_eq!(record.experience_relevance, 10.0);
        assert_eq!(record.education_fit, 9.75);
        assert!(record.is_shortlisted);
        assert_eq!(record.justification.split("\n\n").count(), 2);
    }

    #[tokio::test]
    async fn test_unqualified_candidate_rejected() {
        let resume = ResumeProfile {
            name: "Bob Johnson".to_string(),
            skills: strings(&["PHP", "jQuery", "MySQL", "HTML", "CSS"]),
            experience: "1 year at small startup".to_string(),
            education: "BCA, 65%".to_string(),
            projects: vec![],
        };

        let record = engine_with(Arc::new(NoMarkerExtractor)).score(&resume, &senior_job()).await;

        assert_eq!(record.skills_match, 0.0);
        assert_eq!(record.experience_relevance, 3.0);
        assert!(!record.is_shortlisted);
        let details = record.details.as_ref().unwrap();
        assert_eq!(details.skills.critical_missing, strings(&["Java", "Spring Boot", "Microservices"]));
        assert!(record.justification.contains("Not shortlisted because"));
        assert!(record.justification.contains("Java, Spring Boot, and Microservices"));
    }

    #[tokio::test]
    async fn test_overall_matches_weighted_sum_and_bounds() {
        let resume = ResumeProfile {
            name: "Alice Williams".to_string(),
            skills: strings(&["React", "Node.js", "MongoDB", "JavaScript"]),
            experience: "4 years at tech companies".to_string(),
            education: "B.Tech in Information Technology, CGPA: 7.8".to_string(),
            projects: vec![],
        };
        let job = JobProfile {
            job_title: "Full Stack Developer".to_string(),
            required_skills: strings(&["React", "Node.js", "MongoDB", "TypeScript", "REST API"]),
            experience_required: "3-5 years".to_string(),
            qualifications: strings(&["Bachelor degree"]),
            responsibilities: strings(&["Develop features", "Code reviews", "Work with team"]),
        };

        let record = engine_with(Arc::new(NoMarkerExtractor)).score(&resume, &job).await;
        let w = record.weights;
        let expected = w.skills * record.skills_match
            + w.experience * record.experience_relevance
            + w.education * record.education_fit;

        assert_eq!(record.seniority_level, Some(SeniorityTier::Mid));
        assert!((record.overall_fit - expected).abs() <= 0.01);
        for score in [
            record.skills_match,
            record.experience_relevance,
            record.education_fit,
            record.overall_fit,
        ] {
            assert!((0.0..=10.0).contains(&score));
        }
        // 0.5·6 + 0.3·10 + 0.2·6.67 ≈ 7.33: borderline, no critical gaps.
        assert!(record.is_shortlisted);
    }

    #[tokio::test]
    async fn test_fallback_used_only_when_patterns_fail() {
        let stub = Arc::new(StubExtractor {
            marker: Some(AcademicMarker {
                value: 9.6,
                kind: MarkerKind::Cgpa,
            }),
            calls: AtomicUsize::new(0),
        });
        let engine = engine_with(stub.clone());
        let job = JobProfile::default();

        let with_pattern = ResumeProfile {
            education: "B.Tech CSE, CGPA 8.0".to_string(),
            ..Default::default()
        };
        let record = engine.score(&with_pattern, &job).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        assert!(!record.details.unwrap().education.llm_assisted);

        let prose_only = ResumeProfile {
            education: "B.Tech CSE, graduated with distinction".to_string(),
            ..Default::default()
        };
        let record = engine.score(&prose_only, &job).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        let education = record.details.unwrap().education;
        assert!(education.llm_assisted);
        assert_eq!(education.academic_score, 10.0);
    }

    #[tokio::test]
    async fn test_absent_fallback_keeps_neutral_default() {
        let stub = Arc::new(StubExtractor {
            marker: None,
            calls: AtomicUsize::new(0),
        });
        let resume = ResumeProfile {
            education: "Bachelor of Engineering, Computer Science".to_string(),
            ..Default::default()
        };
        let record = engine_with(stub.clone()).score(&resume, &JobProfile::default()).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(record.details.unwrap().education.academic_score, 5.0);
        assert_eq!(record.education_fit, 4.17);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_timeout_treated_as_absent() {
        let engine = FitEngine::new(
            Arc::new(HangingExtractor),
            Arc::new(ThresholdGatePolicy::default()),
            Duration::from_secs(3),
        );
        let resume = ResumeProfile {
            education: "Bachelor of Science in Software".to_string(),
            ..Default::default()
        };
        let record = engine.score(&resume, &JobProfile::default()).await;
        assert_eq!(record.details.unwrap().education.academic_score, 5.0);
        assert!(record.seniority_level.is_some());
    }

    #[tokio::test]
    async fn test_panicking_fallback_treated_as_absent() {
        let resume = ResumeProfile {
            education: "Bachelor of Arts".to_string(),
            ..Default::default()
        };
        let record = engine_with(Arc::new(PanickingExtractor))
            .score(&resume, &JobProfile::default())
            .await;

        assert!(record.seniority_level.is_some());
        let education = record.details.unwrap().education;
        assert_eq!(education.academic_score, 5.0);
        assert!(!education.llm_assisted);
        // 5.0 × 0.75 × 1.0 / 1.2
        assert_eq!(record.education_fit, 3.13);
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_record() {
        let engine = FitEngine::new(
            Arc::new(NoMarkerExtractor),
            Arc::new(PanickingPolicy),
            Duration::from_secs(1),
        );
        let record = engine
            .score(&ResumeProfile::default(), &JobProfile::default())
            .await;

        assert_eq!(record.overall_fit, 0.0);
        assert_eq!(record.skills_match, 0.0);
        assert!(!record.is_shortlisted);
        assert_eq!(record.seniority_label(), "unknown");
        assert!(record.justification.contains("policy exploded"));
    }

    #[test]
    fn test_failed_record_serializes_unknown_tier() {
        let json = serde_json::to_value(ScoreRecord::failed("boom")).unwrap();
        assert_eq!(json["seniority_level"], "unknown");
        assert_eq!(json["is_shortlisted"], false);
        assert_eq!(json["weights"]["skills"], 0.0);
        assert_eq!(json["weights"]["experience"], 0.0);
        assert_eq!(json["weights"]["education"], 0.0);

        let back: ScoreRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.seniority_level, None);
    }

    #[test]
    fn test_empty_required_skills_neutral_through_engine() {
        let engine = engine_with(Arc::new(NoMarkerExtractor));
        let record = engine
            .compute(
                &ResumeProfile::default(),
                &JobProfile::default(),
                MarkerSource::Absent,
            )
            .unwrap();
        assert_eq!(record.skills_match, 5.0);
        assert!(close(record.education_fit, 4.0));
        let skills = &record.details.as_ref().unwrap().skills;
        assert!(skills.matched.is_empty() && skills.missing.is_empty());
    }

    #[test]
    fn test_justification_reuses_detail_lists_verbatim() {
        let engine = engine_with(Arc::new(NoMarkerExtractor));
        let resume = ResumeProfile {
            skills: strings(&["Python", "React"]),
            ..Default::default()
        };
        let job = JobProfile {
            job_title: "Frontend Developer".to_string(),
            required_skills: strings(&["Python", "React", "AWS"]),
            ..Default::default()
        };
        let record = engine.compute(&resume, &job, MarkerSource::Absent).unwrap();
        let details = record.details.as_ref().unwrap();

        assert_eq!(record.skills_match, 6.47);
        assert_eq!(details.skills.critical_missing, strings(&["AWS"]));
        assert!(record.justification.contains("Python and React"));
        assert!(record.justification.contains("Critical skills missing: AWS."));
    }
}
