//! Score Aggregator: weighted sum of the three dimension scores.

use serde::{Deserialize, Serialize};

use crate::scoring::seniority::Weights;
use crate::scoring::{round_to, MAX_SCORE};

/// The three dimension scores that feed aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

/// overall = w_skills·skills + w_experience·experience + w_education·education,
/// rounded to two decimals and kept within [0, 10].
pub fn aggregate(scores: DimensionScores, weights: Weights) -> f64 {
    let overall = weights.skills * scores.skills
        + weights.experience * scores.experience
        + weights.education * scores.education;
    round_to(overall.clamp(0.0, MAX_SCORE), 2)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::scoring::seniority::SeniorityTier;
    use proptest::prelude::*;

    fn any_tier() -> impl Strategy<Value = SeniorityTier> {
        prop_oneof![
            Just(SeniorityTier::Entry),
            Just(SeniorityTier::Mid),
            Just(SeniorityTier::Senior),
        ]
    }

    proptest! {
        #[test]
        fn overall_tracks_weighted_sum(
            skills in 0.0..=10.0f64,
            experience in 0.0..=10.0f64,
            education in 0.0..=10.0f64,
            tier in any_tier(),
        ) {
            let weights = tier.weights();
            let overall = aggregate(DimensionScores { skills, experience, education }, weights);
            let expected = weights.skills * skills
                + weights.experience * experience
                + weights.education * education;
            prop_assert!((0.0..=MAX_SCORE).contains(&overall));
            prop_assert!((overall - expected).abs() <= 0.01);
        }
    }
}
