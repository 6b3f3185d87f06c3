//! Shortlisting policy: the pass/fail decision over an already-computed overall score.
//!
//! Kept apart from the scoring math so thresholds can change without touching
//! any dimension scorer. `FitEngine` holds an `Arc<dyn ShortlistPolicy>`.

/// Overall fit at or above this is shortlisted unconditionally.
pub const SHORTLIST_AUTO_SCORE: f64 = 7.5;
/// Overall fit below this is never shortlisted.
pub const SHORTLIST_MIN_SCORE: f64 = 7.0;

pub trait ShortlistPolicy: Send + Sync {
    fn decide(&self, overall_fit: f64, critical_missing: &[String]) -> bool;

    /// Lowest overall score that can possibly be shortlisted. Used when
    /// explaining a rejection.
    fn minimum_score(&self) -> f64;
}

/// Strict score gate with one qualitative override:
/// - overall ≥ auto ⇒ shortlisted
/// - min ≤ overall < auto ⇒ shortlisted only with no critical skill missing
/// - overall < min ⇒ rejected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdGatePolicy {
    pub auto_score: f64,
    pub min_score: f64,
}

impl Default for ThresholdGatePolicy {
    fn default() -> Self {
        Self {
            auto_score: SHORTLIST_AUTO_SCORE,
            min_score: SHORTLIST_MIN_SCORE,
        }
    }
}

impl ShortlistPolicy for ThresholdGatePolicy {
    fn decide(&self, overall_fit: f64, critical_missing: &[String]) -> bool {
        if overall_fit >= self.auto_score {
            true
        } else if overall_fit >= self.min_score {
            critical_missing.is_empty()
        } else {
            false
        }
    }

    fn minimum_score(&self) -> f64 {
        self.min_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_shortlist_ignores_critical_gaps() {
        let policy = ThresholdGatePolicy::default();
        assert!(policy.decide(7.5, &["AWS".to_string()]));
        assert!(policy.decide(9.9, &["AWS".to_string(), "Go".to_string()]));
    }

    #[test]
    fn test_borderline_blocked_by_critical_gap() {
        let policy = ThresholdGatePolicy::default();
        assert!(policy.decide(7.2, &[]));
        assert!(!policy.decide(7.2, &["Kubernetes".to_string()]));
        assert!(policy.decide(7.0, &[]));
    }

    #[test]
    fn test_below_minimum_never_shortlisted() {
        let policy = ThresholdGatePolicy::default();
        assert!(!policy.decide(6.99, &[]));
        assert!(!policy.decide(0.0, &[]));
    }

    #[test]
    fn test_custom_thresholds() {
        let policy = ThresholdGatePolicy {
            auto_score: 8.0,
            min_score: 6.0,
        };
        assert!(policy.decide(6.5, &[]));
        assert!(!policy.decide(7.9, &["Rust".to_string()]));
        assert_eq!(policy.minimum_score(), 6.0);
    }
}
