//! Stress Advisor - On-device student stress scoring and lifestyle advice
//!
//! Stress Advisor turns thirteen self-reported lifestyle inputs into a 0-100
//! stress score, a severity level, and a list of rule-based tips through a
//! deterministic pipeline: categorical encoding → feature vector → pre-built
//! scoring model → score classification, alongside an independent suggestion
//! rule battery.
//!
//! ## Modules
//!
//! - **Bundle**: Load the versioned model + encoding tables artifact once at startup
//! - **Scoring**: Build features, evaluate the model, classify the score
//! - **Suggestions**: Evaluate the fixed tip rules against raw inputs

pub mod bundle;
pub mod classifier;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod suggestions;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use bundle::ModelBundle;
pub use error::{AdvisorError, BundleLoadError};
pub use model::{ScoringFunction, ScoringModel};
pub use pipeline::StressAdvisor;
pub use types::{Assessment, RawInputs, ScoreResult, StressLevel, Tip, WELL_BALANCED_MESSAGE};

/// Stress Advisor version embedded in all reports
pub const ADVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "stress-advisor";
