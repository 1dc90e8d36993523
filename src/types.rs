//! Core types for the Stress Advisor engine
//!
//! This module defines the values that flow through each stage: raw lifestyle
//! inputs, the encoded feature vector, the classified score, and advice tips.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Number of fields in [`RawInputs`] and therefore in every [`FeatureVector`]
pub const FEATURE_COUNT: usize = 13;

/// Feature names in the order the scoring model was trained against
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "sleep_hours",
    "sleep_quality",
    "study_hours",
    "attendance_percent",
    "deadlines_per_week",
    "exercise_hours_per_week",
    "caffeine_cups_per_day",
    "screen_time_hours",
    "social_media_hours",
    "family_support",
    "peer_pressure",
    "financial_concerns",
    "junk_food_frequency",
];

/// Self-reported lifestyle inputs for one student, before any encoding.
///
/// Numeric domains are enforced by whoever collects the inputs; the engine
/// trusts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInputs {
    /// Sleep per day (hours, 0-12)
    pub sleep_hours: u32,
    /// Sleep quality label (e.g. "Poor" .. "Excellent")
    pub sleep_quality: String,
    /// Study per day (hours, 0-12)
    pub study_hours: u32,
    /// Class attendance (percent, 50-100)
    pub attendance_percent: u32,
    /// Assignment deadlines per week (0-10)
    #[serde(alias = "deadlines")]
    pub deadlines_per_week: u32,
    /// Exercise per week (hours, 0-14)
    #[serde(alias = "exercise_hours")]
    pub exercise_hours_per_week: u32,
    /// Caffeine intake (cups per day, 0-8)
    #[serde(alias = "caffeine")]
    pub caffeine_cups_per_day: u32,
    /// Screen time per day (hours, 0-14)
    #[serde(alias = "screen_time")]
    pub screen_time_hours: u32,
    /// Social media per day (hours, 0-8)
    #[serde(alias = "social_media")]
    pub social_media_hours: u32,
    /// Family support (1-5)
    pub family_support: u32,
    /// Peer pressure (1-5)
    pub peer_pressure: u32,
    /// Financial concerns (1-5)
    pub financial_concerns: u32,
    /// Junk food frequency label (e.g. "Never" .. "Daily")
    #[serde(alias = "junk_freq")]
    pub junk_food_frequency: String,
}

/// Fully numeric model input, one value per entry of [`FEATURE_NAMES`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value at `index`, if present
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

/// Severity bucket for a clamped stress score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressLevel {
    Low,
    Moderate,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Moderate => "Moderate",
            StressLevel::High => "High",
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified stress score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Score as returned by the model, unclamped
    pub raw_score: f64,
    /// Score clamped to 0-100, unrounded
    pub clamped_score: f64,
    /// Severity bucket of the clamped score
    pub level: StressLevel,
}

/// Fixed catalog of advice tips, in rule evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tip {
    SleepDuration,
    SleepHygiene,
    Attendance,
    Deadlines,
    Exercise,
    Caffeine,
    ScreenTime,
    SupportNetwork,
    PeerPressure,
    Finances,
    Nutrition,
}

impl Tip {
    /// Every tip, in the order the suggestion rules are evaluated
    pub const ALL: [Tip; 11] = [
        Tip::SleepDuration,
        Tip::SleepHygiene,
        Tip::Attendance,
        Tip::Deadlines,
        Tip::Exercise,
        Tip::Caffeine,
        Tip::ScreenTime,
        Tip::SupportNetwork,
        Tip::PeerPressure,
        Tip::Finances,
        Tip::Nutrition,
    ];

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            Tip::SleepDuration => "sleep_duration",
            Tip::SleepHygiene => "sleep_hygiene",
            Tip::Attendance => "attendance",
            Tip::Deadlines => "deadlines",
            Tip::Exercise => "exercise",
            Tip::Caffeine => "caffeine",
            Tip::ScreenTime => "screen_time",
            Tip::SupportNetwork => "support_network",
            Tip::PeerPressure => "peer_pressure",
            Tip::Finances => "finances",
            Tip::Nutrition => "nutrition",
        }
    }

    /// Advice text shown to the student
    pub fn message(&self) -> &'static str {
        match self {
            Tip::SleepDuration => "💤 Aim for 7–8 hours of sleep.",
            Tip::SleepHygiene => "😴 Improve sleep hygiene (no screens before bed).",
            Tip::Attendance => "🏫 Improve attendance; routine lowers stress.",
            Tip::Deadlines => "🗓️ Break assignments into smaller chunks; plan earlier.",
            Tip::Exercise => "🏃 Add 20–30 mins activity 3×/week.",
            Tip::Caffeine => "☕ Cut caffeine after 2pm.",
            Tip::ScreenTime => "📱 Reduce non-essential screen time.",
            Tip::SupportNetwork => "👥 Lean on friends/mentors; schedule check-ins.",
            Tip::PeerPressure => "🧭 Set boundaries; focus on your pace.",
            Tip::Finances => "💰 Use budgeting apps; seek student aid support.",
            Tip::Nutrition => "🥗 Swap junk snacks for fruit/nuts.",
        }
    }
}

impl std::fmt::Display for Tip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Tip {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Tip", 2)?;
        state.serialize_field("id", self.id())?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

/// Message a presentation layer shows when no tip fires
pub const WELL_BALANCED_MESSAGE: &str = "✅ Your habits look well balanced!";

/// Score and advice for one set of inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub score: ScoreResult,
    pub tips: Vec<Tip>,
}

/// Producer metadata attached to every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where a report's numbers came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub bundle_version: Option<String>,
    pub model_kind: String,
    pub computed_at_utc: String,
}

/// Assessment wrapped with provenance, as emitted by the CLI and FFI
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub assessment: Assessment,
}
