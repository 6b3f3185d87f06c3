//! Seniority Classifier: infers the role tier from keyword density in the JD.
//!
//! The tier drives both the experience scoring policy and the weight triple
//! used for aggregation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::profile::JobProfile;

/// Role seniority inferred from the job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeniorityTier {
    Entry,
    Mid,
    Senior,
}

impl SeniorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeniorityTier::Entry => "entry",
            SeniorityTier::Mid => "mid",
            SeniorityTier::Senior => "senior",
        }
    }

    /// Fixed dimension weights for this tier. Each triple sums to 1.0.
    pub fn weights(&self) -> Weights {
        match self {
            SeniorityTier::Entry => Weights {
                skills: 0.60,
                experience: 0.15,
                education: 0.25,
            },
            SeniorityTier::Mid => Weights {
                skills: 0.50,
                experience: 0.30,
                education: 0.20,
            },
            SeniorityTier::Senior => Weights {
                skills: 0.40,
                experience: 0.45,
                education: 0.15,
            },
        }
    }
}

impl std::fmt::Display for SeniorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension weights applied by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Weights {
    /// Carried by failed records, where no tier was applied.
    pub const NONE: Weights = Weights {
        skills: 0.0,
        experience: 0.0,
        education: 0.0,
    };

    pub fn total(&self) -> f64 {
        self.skills + self.experience + self.education
    }
}

const ENTRY_KEYWORDS: &[&str] = &[
    "intern",
    "junior",
    "fresher",
    "entry level",
    "entry-level",
    "graduate",
    "trainee",
    "apprentice",
    "0-1 year",
    "0-2 year",
];

const MID_KEYWORDS: &[&str] = &[
    "mid-level",
    "mid level",
    "intermediate",
    "associate",
    "2+ year",
    "3+ year",
    "2-4 year",
    "3-5 year",
];

const SENIOR_KEYWORDS: &[&str] = &[
    "senior",
    "lead",
    "principal",
    "staff engineer",
    "architect",
    "mentor",
    "head of",
    "5+ year",
    "7+ year",
    "8+ year",
    "10+ year",
];

/// Keyword hit counts per tier, kept for tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub entry: usize,
    pub mid: usize,
    pub senior: usize,
}

fn count_occurrences(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().map(|kw| text.matches(kw).count()).sum()
}

pub fn count_tier_keywords(text: &str) -> TierCounts {
    TierCounts {
        entry: count_occurrences(text, ENTRY_KEYWORDS),
        mid: count_occurrences(text, MID_KEYWORDS),
        senior: count_occurrences(text, SENIOR_KEYWORDS),
    }
}

/// Tie-break: senior if strictly ahead of both, else entry if strictly ahead
/// of both, else mid (whether or not any mid keyword was seen).
pub fn resolve_tier(counts: TierCounts) -> SeniorityTier {
    if counts.senior > counts.entry && counts.senior > counts.mid {
        SeniorityTier::Senior
    } else if counts.entry > counts.senior && counts.entry > counts.mid {
        SeniorityTier::Entry
    } else {
        SeniorityTier::Mid
    }
}

/// Classifies the job and returns the tier with its weight triple.
pub fn classify_seniority(job: &JobProfile) -> (SeniorityTier, Weights) {
    let counts = count_tier_keywords(&job.seniority_text());
    let tier = resolve_tier(counts);
    debug!(
        component = "seniority",
        entry = counts.entry,
        mid = counts.mid,
        senior = counts.senior,
        "classified role as {tier}"
    );
    (tier, tier.weights())
}
