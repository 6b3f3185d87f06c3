//! Education Scorer: academic result × field multiplier × degree multiplier.
//!
//! The step tables are tuned against `CALIBRATION_DIVISOR`: a bachelor's in a
//! technical field (multiplier product 1.0) scores `academic_score / 1.2`.
//! Change the tables and the divisor together or not at all.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::academic::{AcademicMarker, MarkerKind};
use crate::scoring::{round_to, DimensionResult, MAX_SCORE};

/// Score when the resume states no education at all.
const UNSPECIFIED_EDUCATION_SCORE: f64 = 4.0;
/// Academic score when no CGPA or percentage can be found.
const NEUTRAL_ACADEMIC_SCORE: f64 = 5.0;
const CALIBRATION_DIVISOR: f64 = 1.2;
/// CGPA values at or below this are read as a 4.0 scale.
const FOUR_POINT_SCALE_CEILING: f64 = 4.5;
const TECH_FIELD_MULTIPLIER: f64 = 1.0;
const OTHER_FIELD_MULTIPLIER: f64 = 0.75;
const SOURCE_EXCERPT_CHARS: usize = 100;

/// (minimum CGPA on a 10-point scale, academic score)
const CGPA_STEPS: &[(f64, f64)] = &[
    (9.5, 10.0),
    (9.0, 9.5),
    (8.5, 9.0),
    (8.0, 8.5),
    (7.5, 8.0),
    (7.0, 7.5),
    (6.5, 7.0),
    (6.0, 6.5),
    (5.5, 6.0),
];

/// (minimum percentage, academic score)
const PERCENTAGE_STEPS: &[(f64, f64)] = &[
    (95.0, 10.0),
    (90.0, 9.5),
    (85.0, 9.0),
    (80.0, 8.5),
    (75.0, 8.0),
    (70.0, 7.5),
    (65.0, 7.0),
    (60.0, 6.5),
    (55.0, 6.0),
];

/// Score below the last breakpoint: proportional to the raw value.
const FLOOR_SCORE_AT_BREAKPOINT: f64 = 5.0;

const UNSPECIFIED_MARKERS: &[&str] = &["", "not specified", "unknown", "n/a", "na", "none"];

static TECH_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:computer|software|information technology|engineering|electrical|electronics|it|cs|cse|ece|eee)\b",
    )
    .unwrap()
});

static DOCTORATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:ph\.?\s?d|doctorate|doctor of philosophy|d\.?phil)\b").unwrap());

// Bare "BE" and "ME" are uppercase only; lowercase they are ordinary words.
static MASTERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:masters?\b|m\.?\s?tech\b|m\.\s?sc\b|msc\b|ms\b|m\.\s?s\b|m\.\s?e\b|m\.?\s?eng\b|mca\b|mba\b|post\s?graduate\b)|(?-i:\bME\b)",
    )
    .unwrap()
});

static BACHELORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:bachelors?\b|b\.?\s?tech\b|b\.\s?sc\b|bsc\b|bs\b|b\.\s?s\b|b\.\s?e\b|b\.\s?a\b|b\.?\s?eng\b|b\.\s?com\b|bca\b|bba\b|undergraduate\b)|(?-i:\bBE\b)",
    )
    .unwrap()
});

/// Highest degree detected in the education text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeLevel {
    Doctorate,
    Masters,
    Bachelors,
    Unspecified,
}

impl DegreeLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            DegreeLevel::Doctorate => 1.4,
            DegreeLevel::Masters => 1.3,
            DegreeLevel::Bachelors => 1.0,
            DegreeLevel::Unspecified => 0.6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DegreeLevel::Doctorate => "doctorate",
            DegreeLevel::Masters => "master's degree",
            DegreeLevel::Bachelors => "bachelor's degree",
            DegreeLevel::Unspecified => "unspecified degree",
        }
    }
}

/// Evidence behind the education score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationDetails {
    pub academic_score: f64,
    /// The value as written (before 4.0-scale rescaling or clamping).
    pub raw_value: Option<f64>,
    pub value_kind: Option<MarkerKind>,
    pub llm_assisted: bool,
    pub has_tech_degree: bool,
    pub degree_level: Option<DegreeLevel>,
    pub source_excerpt: String,
    /// Set when the education text is missing.
    pub reason: Option<String>,
}

/// Where the academic marker came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerSource {
    Pattern(AcademicMarker),
    Fallback(AcademicMarker),
    Absent,
}

impl MarkerSource {
    fn marker(&self) -> Option<AcademicMarker> {
        match self {
            MarkerSource::Pattern(m) | MarkerSource::Fallback(m) => Some(*m),
            MarkerSource::Absent => None,
        }
    }
}

pub fn is_unspecified(education_text: &str) -> bool {
    let normalized = education_text.trim().to_lowercase();
    UNSPECIFIED_MARKERS.contains(&normalized.as_str())
}

pub fn detect_degree_level(text: &str) -> DegreeLevel {
    if DOCTORATE.is_match(text) {
        DegreeLevel::Doctorate
    } else if MASTERS.is_match(text) {
        DegreeLevel::Masters
    } else if BACHELORS.is_match(text) {
        DegreeLevel::Bachelors
    } else {
        DegreeLevel::Unspecified
    }
}

pub fn has_tech_field(text: &str) -> bool {
    TECH_FIELD.is_match(text)
}

/// Brings a marker onto a common scale: CGPA out of 10, percentage out of 100.
pub fn normalize_marker(marker: AcademicMarker) -> f64 {
    let value = match marker.kind {
        MarkerKind::Cgpa if marker.value <= FOUR_POINT_SCALE_CEILING => marker.value * (10.0 / 4.0),
        MarkerKind::Cgpa => marker.value.min(10.0),
        MarkerKind::Percentage => marker.value.min(100.0),
    };
    round_to(value.max(0.0), 2)
}

fn lookup(steps: &[(f64, f64)], value: f64) -> f64 {
    if let Some((_, score)) = steps.iter().find(|(min, _)| value >= *min) {
        return *score;
    }
    let last_breakpoint = steps.last().map(|(min, _)| *min).unwrap_or(1.0);
    FLOOR_SCORE_AT_BREAKPOINT * value / last_breakpoint
}

/// Maps a marker to the base academic score (0–10) before multipliers.
pub fn academic_score_for(marker: AcademicMarker) -> f64 {
    let normalized = normalize_marker(marker);
    match marker.kind {
        MarkerKind::Cgpa => lookup(CGPA_STEPS, normalized),
        MarkerKind::Percentage => lookup(PERCENTAGE_STEPS, normalized),
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(SOURCE_EXCERPT_CHARS).collect()
}

/// Scores education text.
///
/// `qualifications` are read for tracing only; they do not move the score.
/// The caller resolves the marker (pattern match first, fallback second).
pub fn score_education(
    education_text: &str,
    qualifications: &[String],
    marker: MarkerSource,
) -> DimensionResult<EducationDetails> {
    if is_unspecified(education_text) {
        debug!(component = "education", "education not specified");
        return DimensionResult {
            score: UNSPECIFIED_EDUCATION_SCORE,
            details: EducationDetails {
                reason: Some("Education not specified".to_string()),
                ..Default::default()
            },
        };
    }

    let academic_score = marker
        .marker()
        .map(academic_score_for)
        .unwrap_or(NEUTRAL_ACADEMIC_SCORE);

    let has_tech_degree = has_tech_field(education_text);
    let field_multiplier = if has_tech_degree {
        TECH_FIELD_MULTIPLIER
    } else {
        OTHER_FIELD_MULTIPLIER
    };
    let degree_level = detect_degree_level(education_text);

    let raw = academic_score * field_multiplier * degree_level.multiplier() / CALIBRATION_DIVISOR;
    let score = round_to(raw.clamp(0.0, MAX_SCORE), 2);

    debug!(
        component = "education",
        academic_score,
        has_tech_degree,
        degree = degree_level.label(),
        qualifications = qualifications.len(),
        "education scored {score}"
    );

    DimensionResult {
        score,
        details: EducationDetails {
            academic_score: round_to(academic_score, 2),
            raw_value: marker.marker().map(|m| m.value),
            value_kind: marker.marker().map(|m| m.kind),
            llm_assisted: matches!(marker, MarkerSource::Fallback(_)),
            has_tech_degree,
            degree_level: Some(degree_level),
            source_excerpt: excerpt(education_text),
            reason: None,
        },
    }
}
