//! Score classification
//!
//! Clamps a raw model score into 0-100 and buckets it into a severity level.
//! Lower bounds are inclusive: 40 is Moderate, 70 is High.

use crate::types::{ScoreResult, StressLevel};

/// Lowest possible displayed score
pub const MIN_SCORE: f64 = 0.0;

/// Highest possible displayed score
pub const MAX_SCORE: f64 = 100.0;

/// Scores at or above this are Moderate
pub const MODERATE_THRESHOLD: f64 = 40.0;

/// Scores at or above this are High
pub const HIGH_THRESHOLD: f64 = 70.0;

/// Classifier for raw stress scores
pub struct ScoreClassifier;

impl ScoreClassifier {
    /// Clamp and bucket a raw score. No rounding is applied.
    pub fn classify(raw_score: f64) -> ScoreResult {
        let clamped_score = raw_score.clamp(MIN_SCORE, MAX_SCORE);

        ScoreResult {
            raw_score,
            clamped_score,
            level: level_for(clamped_score),
        }
    }
}

fn level_for(score: f64) -> StressLevel {
    if score < MODERATE_THRESHOLD {
        StressLevel::Low
    } else if score < HIGH_THRESHOLD {
        StressLevel::Moderate
    } else {
        StressLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_scores_clamp_to_zero() {
        for raw in [0.0, -0.5, -40.0, -1e9] {
            let result = ScoreClassifier::classify(raw);
            assert_eq!(result.clamped_score, 0.0);
            assert_eq!(result.level, StressLevel::Low);
            assert_eq!(result.raw_score, raw);
        }
    }

    #[test]
    fn test_large_scores_clamp_to_hundred() {
        for raw in [100.0, 100.01, 250.0, 1e9] {
            let result = ScoreClassifier::classify(raw);
            assert_eq!(result.clamped_score, 100.0);
            assert_eq!(result.level, StressLevel::High);
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(ScoreClassifier::classify(39.999).level, StressLevel::Low);
        assert_eq!(ScoreClassifier::classify(40.0).level, StressLevel::Moderate);
        assert_eq!(ScoreClassifier::classify(69.999).level, StressLevel::Moderate);
        assert_eq!(ScoreClassifier::classify(70.0).level, StressLevel::High);
    }

    #[test]
    fn test_no_rounding() {
        let result = ScoreClassifier::classify(52.8374);
        assert!((result.clamped_score - 52.8374).abs() < 1e-12);
        assert_eq!(result.level, StressLevel::Moderate);
    }
}
