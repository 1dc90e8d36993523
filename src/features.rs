//! Feature vector construction
//!
//! This module turns raw inputs into the numeric vector the scoring model
//! consumes:
//! - Categorical labels replaced by their encoding table codes
//! - Fields laid out in training order ([`FEATURE_NAMES`](crate::types::FEATURE_NAMES))
//! - Vector length checked against the model's declared input count

use crate::encoding::EncodingTable;
use crate::error::AdvisorError;
use crate::model::ScoringFunction;
use crate::types::{FeatureVector, RawInputs};

/// Builder for model feature vectors
pub struct FeatureVectorBuilder;

impl FeatureVectorBuilder {
    /// Encode raw inputs into a feature vector.
    ///
    /// Numeric fields are passed through without range checks. Unknown
    /// categorical labels fail with [`AdvisorError::UnknownLabel`].
    pub fn build(
        raw: &RawInputs,
        sleep_table: &EncodingTable,
        junk_table: &EncodingTable,
    ) -> Result<FeatureVector, AdvisorError> {
        let sleep_quality = sleep_table.encode(&raw.sleep_quality)?;
        let junk_food_frequency = junk_table.encode(&raw.junk_food_frequency)?;

        Ok(FeatureVector::new(vec![
            f64::from(raw.sleep_hours),
            sleep_quality as f64,
            f64::from(raw.study_hours),
            f64::from(raw.attendance_percent),
            f64::from(raw.deadlines_per_week),
            f64::from(raw.exercise_hours_per_week),
            f64::from(raw.caffeine_cups_per_day),
            f64::from(raw.screen_time_hours),
            f64::from(raw.social_media_hours),
            f64::from(raw.family_support),
            f64::from(raw.peer_pressure),
            f64::from(raw.financial_concerns),
            junk_food_frequency as f64,
        ]))
    }

    /// Refuse vectors whose length disagrees with the model's declared input
    /// count. Models that declare nothing always pass.
    pub fn check_arity(
        features: &FeatureVector,
        model: &dyn ScoringFunction,
    ) -> Result<(), AdvisorError> {
        match model.expected_input_count() {
            Some(expected) if expected != features.len() => {
                Err(AdvisorError::FeatureArityMismatch {
                    expected,
                    actual: features.len(),
                })
            }
            _ => Ok(()),
        }
    }
}
