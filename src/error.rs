//! Error types for Stress Advisor

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the model bundle.
///
/// These are startup failures: a process that cannot load its bundle has
/// nothing to score with and should exit.
#[derive(Debug, Error)]
pub enum BundleLoadError {
    #[error("Cannot read bundle file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bundle is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed bundle: {0}")]
    Malformed(String),

    #[error("Bundle is missing required key: {0}")]
    MissingKey(String),

    #[error("Invalid model in bundle: {0}")]
    InvalidModel(String),

    #[error("Encoding table '{0}' is empty")]
    EmptyTable(String),
}

/// Errors that can occur while scoring or advising
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Bundle load failed: {0}")]
    BundleLoad(#[from] BundleLoadError),

    #[error("Unknown label '{label}' for {table}")]
    UnknownLabel { table: String, label: String },

    #[error("Feature count mismatch: model expects {expected} features, app is sending {actual}")]
    FeatureArityMismatch { expected: usize, actual: usize },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
