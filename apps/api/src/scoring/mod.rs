// Candidate–job fit scoring engine.
// Seniority → (skills, experience, education) → aggregate → shortlist policy → justification.
// Only `academic` may reach the network, and only through an injected extractor.

pub mod academic;
pub mod aggregate;
pub mod education;
pub mod engine;
pub mod experience;
pub mod justification;
pub mod policy;
pub mod prompts;
pub mod seniority;
pub mod skills;

use serde::{Deserialize, Serialize};

/// Upper bound for every dimension and overall score.
pub const MAX_SCORE: f64 = 10.0;

/// One dimension's score (0–10) plus the evidence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult<D> {
    pub score: f64,
    pub details: D,
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
