//! Pipeline orchestration
//!
//! This module provides the public API for Stress Advisor. Two independent
//! branches run off the same raw inputs:
//!
//! 1. FeatureVectorBuilder -> arity check -> ScoringFunction -> ScoreClassifier
//! 2. SuggestionEngine
//!
//! The loaded bundle is shared read-only behind an `Arc`, so one advisor can be
//! cloned into as many concurrent request handlers as needed.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::bundle::ModelBundle;
use crate::classifier::ScoreClassifier;
use crate::encoder::ReportEncoder;
use crate::error::AdvisorError;
use crate::features::FeatureVectorBuilder;
use crate::model::ScoringFunction;
use crate::suggestions::SuggestionEngine;
use crate::types::{Assessment, AssessmentReport, RawInputs, ScoreResult, Tip};

/// Scoring and advice over one loaded bundle
#[derive(Debug, Clone)]
pub struct StressAdvisor {
    bundle: Arc<ModelBundle>,
}

impl StressAdvisor {
    pub fn new(bundle: ModelBundle) -> Self {
        Self {
            bundle: Arc::new(bundle),
        }
    }

    /// Share an already loaded bundle
    pub fn from_shared(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    /// Load the bundle at `path`. Failure here is a startup error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AdvisorError> {
        Ok(Self::new(ModelBundle::from_path(path)?))
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Score raw inputs.
    ///
    /// The model is never invoked when the built vector disagrees with its
    /// declared input count.
    pub fn predict_stress(&self, raw: &RawInputs) -> Result<ScoreResult, AdvisorError> {
        self.score_with(raw, self.bundle.model())
    }

    fn score_with(
        &self,
        raw: &RawInputs,
        model: &dyn ScoringFunction,
    ) -> Result<ScoreResult, AdvisorError> {
        let bundle = &*self.bundle;
        let features =
            FeatureVectorBuilder::build(raw, bundle.sleep_quality(), bundle.junk_frequency())?;
        FeatureVectorBuilder::check_arity(&features, model)?;

        let raw_score = model.predict(&features);
        let result = ScoreClassifier::classify(raw_score);

        debug!(
            raw_score,
            clamped_score = result.clamped_score,
            level = result.level.as_str(),
            "scored inputs"
        );
        Ok(result)
    }

    /// Rule-based tips for raw inputs, in rule order
    pub fn suggestions(&self, raw: &RawInputs) -> Result<Vec<Tip>, AdvisorError> {
        SuggestionEngine::suggest(
            raw,
            self.bundle.sleep_quality(),
            self.bundle.junk_frequency(),
        )
    }

    /// Score and tips together. Scoring errors abort the whole assessment.
    pub fn assess(&self, raw: &RawInputs) -> Result<Assessment, AdvisorError> {
        let score = self.predict_stress(raw)?;
        let tips = self.suggestions(raw)?;
        Ok(Assessment { score, tips })
    }

    /// Assess and wrap the result with provenance
    pub fn assess_report(
        &self,
        raw: &RawInputs,
        encoder: &ReportEncoder,
    ) -> Result<AssessmentReport, AdvisorError> {
        let assessment = self.assess(raw)?;
        Ok(encoder.encode(
            assessment,
            self.bundle.bundle_version(),
            self.bundle.model().kind(),
        ))
    }

    /// Assess a JSON-encoded [`RawInputs`] object
    pub fn assess_json(&self, json: &str) -> Result<Assessment, AdvisorError> {
        let raw: RawInputs = serde_json::from_str(json)?;
        self.assess(&raw)
    }

    /// Sleep quality labels a form should offer, in code order
    pub fn sleep_quality_labels(&self) -> Vec<&str> {
        self.bundle.sleep_quality().labels()
    }

    /// Junk food frequency labels a form should offer, in code order
    pub fn junk_frequency_labels(&self) -> Vec<&str> {
        self.bundle.junk_frequency().labels()
    }
}
