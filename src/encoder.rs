//! Report encoding
//!
//! This module wraps assessments with provenance so downstream consumers can
//! tell which engine build and which bundle produced a score.

use crate::error::AdvisorError;
use crate::types::{Assessment, AssessmentReport, ReportProducer, ReportProvenance};
use crate::{ADVISOR_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Encoder for assessment reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap an assessment, stamped with the current time
    pub fn encode(
        &self,
        assessment: Assessment,
        bundle_version: Option<&str>,
        model_kind: &str,
    ) -> AssessmentReport {
        self.encode_at(assessment, bundle_version, model_kind, Utc::now())
    }

    /// Wrap an assessment with an explicit computation time
    pub fn encode_at(
        &self,
        assessment: Assessment,
        bundle_version: Option<&str>,
        model_kind: &str,
        computed_at: DateTime<Utc>,
    ) -> AssessmentReport {
        AssessmentReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ADVISOR_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                bundle_version: bundle_version.map(str::to_string),
                model_kind: model_kind.to_string(),
                computed_at_utc: computed_at.to_rfc3339(),
            },
            assessment,
        }
    }

    /// Encode to pretty JSON
    pub fn encode_to_json(
        &self,
        assessment: Assessment,
        bundle_version: Option<&str>,
        model_kind: &str,
    ) -> Result<String, AdvisorError> {
        let report = self.encode(assessment, bundle_version, model_kind);
        serde_json::to_string_pretty(&report).map_err(AdvisorError::JsonError)
    }
}
