//! Categorical encoding tables
//!
//! The scoring model was trained on integer codes for the two categorical
//! inputs (sleep quality and junk food frequency). Each table maps the closed
//! set of labels a student can choose to the code the model expects. Tables are
//! loaded with the model bundle and never change afterwards.

use crate::error::AdvisorError;
use std::collections::BTreeMap;

/// Table name used for the sleep quality encoding
pub const SLEEP_QUALITY_TABLE: &str = "sleep_quality";

/// Table name used for the junk food frequency encoding
pub const JUNK_FREQUENCY_TABLE: &str = "junk_food_frequency";

/// Sleep quality label that triggers the sleep hygiene tip
pub const POOR_SLEEP_LABEL: &str = "Poor";

/// Junk food label at or above which the nutrition tip fires
pub const OFTEN_JUNK_LABEL: &str = "Often";

/// Code assumed for [`OFTEN_JUNK_LABEL`] when the junk table does not define it.
///
/// Only the nutrition rule uses this fallback. Feature encoding never defaults.
pub const JUNK_OFTEN_FALLBACK_CODE: i64 = 3;

/// Immutable label -> code mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingTable {
    name: String,
    codes: BTreeMap<String, i64>,
}

impl EncodingTable {
    pub fn new(name: impl Into<String>, codes: BTreeMap<String, i64>) -> Self {
        Self {
            name: name.into(),
            codes,
        }
    }

    /// Build a table from `(label, code)` pairs
    pub fn from_pairs<'a>(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Self {
        let codes = pairs
            .into_iter()
            .map(|(label, code)| (label.to_string(), code))
            .collect();
        Self::new(name, codes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Code for `label`, if the table defines it
    pub fn code(&self, label: &str) -> Option<i64> {
        self.codes.get(label).copied()
    }

    /// Code for `label`, or `default` when the table does not define it
    pub fn code_or(&self, label: &str, default: i64) -> i64 {
        self.code(label).unwrap_or(default)
    }

    /// Encode a user-selected label, failing if it is not in the table
    pub fn encode(&self, label: &str) -> Result<i64, AdvisorError> {
        self.code(label).ok_or_else(|| AdvisorError::UnknownLabel {
            table: self.name.clone(),
            label: label.to_string(),
        })
    }

    /// Labels ordered by code (ties broken by label), the order a selection
    /// widget should offer them in
    pub fn labels(&self) -> Vec<&str> {
        let mut entries: Vec<(&str, i64)> = self
            .codes
            .iter()
            .map(|(label, code)| (label.as_str(), *code))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter().map(|(label, _)| label).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.codes.iter().map(|(label, code)| (label.as_str(), *code))
    }
}
