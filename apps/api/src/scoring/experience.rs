//! Experience Scorer: years found in the resume vs. years the job asks for,
//! with a different policy per seniority tier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::seniority::SeniorityTier;
use crate::scoring::{round_to, DimensionResult, MAX_SCORE};

static YEAR_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*\+?\s*(?:-|–|to)\s*(\d+(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)")
        .unwrap()
});

static YEAR_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)").unwrap());

const ENTRY_FLOOR: f64 = 7.0;
const YEAR_MULTIPLIER: f64 = 1.5;
const SENIOR_NEAR_RATIO: f64 = 0.7;
const SENIOR_HALF_RATIO: f64 = 0.5;
const SENIOR_SHORTFALL_FLOOR: f64 = 3.0;
const MID_RATIO_SCALE: f64 = 8.0;
const MID_UNSPECIFIED_BASE: f64 = 5.0;

/// Evidence behind the experience score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceDetails {
    pub resume_years: f64,
    pub required_years: f64,
    pub has_internship: bool,
    pub tier: SeniorityTier,
}

/// Extracts a year count from free text.
///
/// A range ("3-5 years") yields its lower bound; otherwise the first single
/// figure ("5+ years"). No match yields 0.
pub fn extract_years(text: &str) -> f64 {
    if let Some(caps) = YEAR_RANGE.captures(text) {
        return caps[1].parse().unwrap_or(0.0);
    }
    YEAR_SINGLE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

pub fn has_internship(text: &str) -> bool {
    text.to_lowercase().contains("intern")
}

fn tier_score(tier: SeniorityTier, resume_years: f64, required_years: f64) -> f64 {
    match tier {
        SeniorityTier::Entry => (ENTRY_FLOOR + resume_years * YEAR_MULTIPLIER).min(MAX_SCORE),
        SeniorityTier::Senior if required_years > 0.0 => {
            if resume_years >= required_years {
                10.0
            } else if resume_years >= required_years * SENIOR_NEAR_RATIO {
                8.0
            } else if resume_years >= required_years * SENIOR_HALF_RATIO {
                6.0
            } else {
                SENIOR_SHORTFALL_FLOOR.max(resume_years * YEAR_MULTIPLIER)
            }
        }
        SeniorityTier::Senior => (resume_years * YEAR_MULTIPLIER).min(MAX_SCORE),
        SeniorityTier::Mid if required_years > 0.0 => {
            (resume_years / required_years * MID_RATIO_SCALE).min(MAX_SCORE)
        }
        SeniorityTier::Mid => (MID_UNSPECIFIED_BASE + resume_years).min(MAX_SCORE),
    }
}

/// Scores resume experience against the job requirement for the given tier.
pub fn score_experience(
    resume_experience: &str,
    experience_required: &str,
    tier: SeniorityTier,
) -> DimensionResult<ExperienceDetails> {
    let resume_years = extract_years(resume_experience);
    let required_years = extract_years(experience_required);
    let internship = has_internship(resume_experience);

    let score = round_to(tier_score(tier, resume_years, required_years).clamp(0.0, MAX_SCORE), 2);

    debug!(
        component = "experience",
        resume_years,
        required_years,
        internship,
        "experience scored {score} ({tier})"
    );

    DimensionResult {
        score,
        details: ExperienceDetails {
            resume_years,
            required_years,
            has_internship: internship,
            tier,
        },
    }
}
