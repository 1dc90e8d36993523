//! Model bundle loading
//!
//! A bundle is one versioned JSON artifact holding the scoring model and the two
//! encoding tables it was trained against. It is loaded once at startup and is
//! read-only afterwards; any failure here is fatal.

use crate::encoding::{EncodingTable, JUNK_FREQUENCY_TABLE, POOR_SLEEP_LABEL, SLEEP_QUALITY_TABLE};
use crate::error::BundleLoadError;
use crate::model::ScoringModel;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Default bundle file name looked up by the CLI
pub const DEFAULT_BUNDLE_FILE: &str = "stress_model.json";

const MODEL_KEY: &str = "model";
const SLEEP_KEYS: [&str; 2] = ["sleep_map", "sleep_quality_encoding"];
const JUNK_KEYS: [&str; 2] = ["junk_map", "junk_frequency_encoding"];

/// Scoring model plus its encoding tables
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    bundle_version: Option<String>,
    features: Option<Vec<String>>,
    model: ScoringModel,
    sleep_quality: EncodingTable,
    junk_frequency: EncodingTable,
}

impl ModelBundle {
    /// Assemble a bundle from parts already in memory
    pub fn new(
        model: ScoringModel,
        sleep_quality: EncodingTable,
        junk_frequency: EncodingTable,
    ) -> Self {
        Self {
            bundle_version: None,
            features: None,
            model,
            sleep_quality,
            junk_frequency,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.bundle_version = Some(version.into());
        self
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = Some(features);
        self
    }

    /// Load a bundle from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BundleLoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| BundleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            version = bundle.bundle_version.as_deref().unwrap_or("unversioned"),
            model = bundle.model.kind(),
            "loaded model bundle"
        );
        Ok(bundle)
    }

    /// Parse and validate a bundle from JSON text
    pub fn from_json(json: &str) -> Result<Self, BundleLoadError> {
        let value: Value = serde_json::from_str(json)?;
        let root = value
            .as_object()
            .ok_or_else(|| BundleLoadError::Malformed("bundle root must be an object".to_string()))?;

        let model_value = required(root, &[MODEL_KEY])?;
        let model: ScoringModel = serde_json::from_value(model_value.clone())
            .map_err(|e| BundleLoadError::InvalidModel(e.to_string()))?;
        model.validate()?;

        let sleep_quality = parse_table(SLEEP_QUALITY_TABLE, required(root, &SLEEP_KEYS)?)?;
        // The sleep hygiene tip compares against this code; it has no fallback
        if sleep_quality.code(POOR_SLEEP_LABEL).is_none() {
            return Err(BundleLoadError::MissingKey(format!(
                "{}.{}",
                SLEEP_KEYS[0], POOR_SLEEP_LABEL
            )));
        }
        let junk_frequency = parse_table(JUNK_FREQUENCY_TABLE, required(root, &JUNK_KEYS)?)?;

        let bundle_version = root
            .get("bundle_version")
            .or_else(|| root.get("version"))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        let features = match root.get("features") {
            Some(Value::Null) | None => None,
            Some(v) => Some(
                serde_json::from_value::<Vec<String>>(v.clone())
                    .map_err(|e| BundleLoadError::Malformed(format!("features: {e}")))?,
            ),
        };

        Ok(Self {
            bundle_version,
            features,
            model,
            sleep_quality,
            junk_frequency,
        })
    }

    pub fn bundle_version(&self) -> Option<&str> {
        self.bundle_version.as_deref()
    }

    /// Training column names, when the bundle records them
    pub fn features(&self) -> Option<&[String]> {
        self.features.as_deref()
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    /// Feature count the model was trained on
    pub fn expected_input_count(&self) -> usize {
        self.model.n_features()
    }

    pub fn sleep_quality(&self) -> &EncodingTable {
        &self.sleep_quality
    }

    pub fn junk_frequency(&self) -> &EncodingTable {
        &self.junk_frequency
    }
}

/// First present key among `keys` (canonical name first, then aliases)
fn required<'a>(root: &'a Map<String, Value>, keys: &[&str]) -> Result<&'a Value, BundleLoadError> {
    keys.iter()
        .find_map(|key| root.get(*key).filter(|v| !v.is_null()))
        .ok_or_else(|| BundleLoadError::MissingKey(keys.first().copied().unwrap_or_default().to_string()))
}

fn parse_table(name: &str, value: &Value) -> Result<EncodingTable, BundleLoadError> {
    let codes: BTreeMap<String, i64> = serde_json::from_value(value.clone())
        .map_err(|e| BundleLoadError::Malformed(format!("{name} table: {e}")))?;
    if codes.is_empty() {
        return Err(BundleLoadError::EmptyTable(name.to_string()));
    }
    Ok(EncodingTable::new(name, codes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEMO_BUNDLE: &str = include_str!("../demos/stress_model.json");

    #[test]
    fn test_load_demo_bundle() {
        let bundle = ModelBundle::from_json(DEMO_BUNDLE).unwrap();
        assert_eq!(bundle.bundle_version(), Some("2024.09-linear-1"));
        assert_eq!(bundle.expected_input_count(), 13);
        assert_eq!(bundle.features().map(|f| f.len()), Some(13));
        assert_eq!(bundle.model().kind(), "linear");
        assert_eq!(bundle.sleep_quality().code("Poor"), Some(0));
        assert_eq!(bundle.junk_frequency().code("Often"), Some(3));
    }

    #[test]
    fn test_accepts_long_table_names() {
        let json = r#"{
            "model": { "kind": "linear", "intercept": 1.0, "coefficients": [0.5, 2.0] },
            "sleep_quality_encoding": { "Poor": 0 },
            "junk_frequency_encoding": { "Never": 0 }
        }"#;
        let bundle = ModelBundle::from_json(json).unwrap();
        assert_eq!(bundle.sleep_quality().len(), 1);
        assert_eq!(bundle.expected_input_count(), 2);
        assert_eq!(bundle.bundle_version(), None);
        assert!(bundle.features().is_none());
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let json = r#"{
            "model": { "kind": "linear", "intercept": 1.0, "coefficients": [1.0] },
            "sleep_map": { "Poor": 0 }
        }"#;
        match ModelBundle::from_json(json) {
            Err(BundleLoadError::MissingKey(key)) => assert_eq!(key, "junk_map"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let json = r#"{ "sleep_map": { "Poor": 0 }, "junk_map": { "Never": 0 } }"#;
        assert!(matches!(
            ModelBundle::from_json(json),
            Err(BundleLoadError::MissingKey(key)) if key == "model"
        ));
    }

    #[test]
    fn test_unknown_model_kind() {
        let json = r#"{
            "model": { "kind": "neural_net" },
            "sleep_map": { "Poor": 0 },
            "junk_map": { "Never": 0 }
        }"#;
        assert!(matches!(
            ModelBundle::from_json(json),
            Err(BundleLoadError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_empty_table() {
        let json = r#"{
            "model": { "kind": "linear", "intercept": 1.0, "coefficients": [1.0] },
            "sleep_map": {},
            "junk_map": { "Never": 0 }
        }"#;
        assert!(matches!(
            ModelBundle::from_json(json),
            Err(BundleLoadError::EmptyTable(name)) if name == "sleep_quality"
        ));
    }

    #[test]
    fn test_sleep_table_without_poor_is_fatal() {
        let json = r#"{
            "model": { "kind": "linear", "intercept": 1.0, "coefficients": [1.0] },
            "sleep_map": { "Bad": 0, "Excellent": 3 },
            "junk_map": { "Never": 0 }
        }"#;
        match ModelBundle::from_json(json) {
            Err(BundleLoadError::MissingKey(key)) => assert_eq!(key, "sleep_map.Poor"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_linear_model_is_fatal() {
        let json = r#"{
            "model": { "kind": "linear", "intercept": 1.0, "coefficients": [] },
            "sleep_map": { "Poor": 0 },
            "junk_map": { "Never": 0 }
        }"#;
        assert!(matches!(
            ModelBundle::from_json(json),
            Err(BundleLoadError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_corrupt_json() {
        assert!(matches!(
            ModelBundle::from_json("\u{0}pickle"),
            Err(BundleLoadError::Json(_))
        ));
        assert!(matches!(
            ModelBundle::from_json("[1, 2]"),
            Err(BundleLoadError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ModelBundle::from_path("/nonexistent/stress_model.json");
        assert!(matches!(result, Err(BundleLoadError::Io { .. })));
    }
}
