//! Rule-based suggestions
//!
//! A fixed battery of eleven independent threshold rules over the raw inputs.
//! Every rule is evaluated on every call and each contributes at most one tip;
//! tips come back in rule order. An empty result means nothing needs
//! attention. Substituting a "well balanced" message for it is up to the caller.

use crate::encoding::{EncodingTable, JUNK_OFTEN_FALLBACK_CODE, OFTEN_JUNK_LABEL, POOR_SLEEP_LABEL};
use crate::error::AdvisorError;
use crate::types::{RawInputs, Tip};
use tracing::debug;

/// Raw inputs with the two categorical fields resolved to codes
struct RuleContext<'a> {
    raw: &'a RawInputs,
    sleep_quality: i64,
    junk_food_frequency: i64,
    /// Code of "Poor" in the sleep table
    poor_sleep: i64,
    /// Code of "Often" in the junk table, falling back to 3
    often_junk: i64,
}

type Rule = fn(&RuleContext<'_>) -> bool;

/// The rule battery, in evaluation order
const RULES: [(Tip, Rule); 11] = [
    (Tip::SleepDuration, |c| c.raw.sleep_hours < 6),
    (Tip::SleepHygiene, |c| c.sleep_quality == c.poor_sleep),
    (Tip::Attendance, |c| c.raw.attendance_percent < 75),
    (Tip::Deadlines, |c| c.raw.deadlines_per_week >= 5),
    (Tip::Exercise, |c| c.raw.exercise_hours_per_week < 2),
    (Tip::Caffeine, |c| c.raw.caffeine_cups_per_day >= 3),
    (Tip::ScreenTime, |c| {
        c.raw.screen_time_hours > 6 || c.raw.social_media_hours > 3
    }),
    (Tip::SupportNetwork, |c| c.raw.family_support <= 2),
    (Tip::PeerPressure, |c| c.raw.peer_pressure >= 4),
    (Tip::Finances, |c| c.raw.financial_concerns >= 4),
    (Tip::Nutrition, |c| c.junk_food_frequency >= c.often_junk),
];

/// Engine producing ordered advice from raw inputs
pub struct SuggestionEngine;

impl SuggestionEngine {
    /// Evaluate every rule and collect the tips that fire, in rule order.
    ///
    /// Fails when a categorical label is not in its encoding table, or when
    /// the sleep table lacks "Poor" (loaded bundles always carry it).
    pub fn suggest(
        raw: &RawInputs,
        sleep_table: &EncodingTable,
        junk_table: &EncodingTable,
    ) -> Result<Vec<Tip>, AdvisorError> {
        let context = RuleContext {
            raw,
            sleep_quality: sleep_table.encode(&raw.sleep_quality)?,
            junk_food_frequency: junk_table.encode(&raw.junk_food_frequency)?,
            poor_sleep: sleep_table.encode(POOR_SLEEP_LABEL)?,
            often_junk: junk_table.code_or(OFTEN_JUNK_LABEL, JUNK_OFTEN_FALLBACK_CODE),
        };

        let tips: Vec<Tip> = RULES
            .iter()
            .filter(|(_, rule)| rule(&context))
            .map(|(tip, _)| *tip)
            .collect();

        debug!(fired = tips.len(), "evaluated suggestion rules");
        Ok(tips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{JUNK_FREQUENCY_TABLE, SLEEP_QUALITY_TABLE};
    use pretty_assertions::assert_eq;

    fn sleep_table() -> EncodingTable {
        EncodingTable::from_pairs(
            SLEEP_QUALITY_TABLE,
            [("Poor", 0), ("Fair", 1), ("Good", 2), ("Excellent", 3)],
        )
    }

    fn junk_table() -> EncodingTable {
        EncodingTable::from_pairs(
            JUNK_FREQUENCY_TABLE,
            [("Never", 0), ("Rarely", 1), ("Sometimes", 2), ("Often", 3), ("Daily", 4)],
        )
    }

    fn balanced_inputs() -> RawInputs {
        RawInputs {
            sleep_hours: 8,
            sleep_quality: "Excellent".to_string(),
            study_hours: 4,
            attendance_percent: 95,
            deadlines_per_week: 1,
            exercise_hours_per_week: 5,
            caffeine_cups_per_day: 0,
            screen_time_hours: 2,
            social_media_hours: 1,
            family_support: 5,
            peer_pressure: 1,
            financial_concerns: 1,
            junk_food_frequency: "Rarely".to_string(),
        }
    }

    fn stressed_inputs() -> RawInputs {
        RawInputs {
            sleep_hours: 3,
            sleep_quality: "Poor".to_string(),
            study_hours: 1,
            attendance_percent: 50,
            deadlines_per_week: 7,
            exercise_hours_per_week: 0,
            caffeine_cups_per_day: 4,
            screen_time_hours: 10,
            social_media_hours: 5,
            family_support: 1,
            peer_pressure: 5,
            financial_concerns: 5,
            junk_food_frequency: "Often".to_string(),
        }
    }

    fn suggest(raw: &RawInputs) -> Vec<Tip> {
        SuggestionEngine::suggest(raw, &sleep_table(), &junk_table()).unwrap()
    }

    #[test]
    fn test_balanced_inputs_yield_no_tips() {
        assert!(suggest(&balanced_inputs()).is_empty());
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        assert_eq!(suggest(&stressed_inputs()), Tip::ALL.to_vec());
    }

    #[test]
    fn test_deterministic() {
        let inputs = stressed_inputs();
        assert_eq!(suggest(&inputs), suggest(&inputs));
    }

    #[test]
    fn test_exercise_rule_is_independent() {
        let mut inputs = stressed_inputs();
        let with_exercise_tip = suggest(&inputs);

        inputs.exercise_hours_per_week = 2;
        let without = suggest(&inputs);

        let expected: Vec<Tip> = with_exercise_tip
            .into_iter()
            .filter(|tip| *tip != Tip::Exercise)
            .collect();
        assert_eq!(without, expected);

        let mut balanced = balanced_inputs();
        balanced.exercise_hours_per_week = 1;
        assert_eq!(suggest(&balanced), vec![Tip::Exercise]);
    }

    #[test]
    fn test_thresholds_at_boundaries() {
        let mut inputs = balanced_inputs();
        inputs.sleep_hours = 6;
        inputs.attendance_percent = 75;
        inputs.deadlines_per_week = 5;
        inputs.caffeine_cups_per_day = 3;
        inputs.screen_time_hours = 6;
        inputs.social_media_hours = 3;
        inputs.family_support = 2;
        inputs.peer_pressure = 4;
        inputs.financial_concerns = 4;
        inputs.junk_food_frequency = "Sometimes".to_string();

        assert_eq!(
            suggest(&inputs),
            vec![
                Tip::Deadlines,
                Tip::Caffeine,
                Tip::SupportNetwork,
                Tip::PeerPressure,
                Tip::Finances,
            ]
        );
    }

    #[test]
    fn test_screen_rule_fires_on_either_field() {
        let mut inputs = balanced_inputs();
        inputs.social_media_hours = 4;
        assert_eq!(suggest(&inputs), vec![Tip::ScreenTime]);

        let mut inputs = balanced_inputs();
        inputs.screen_time_hours = 7;
        assert_eq!(suggest(&inputs), vec![Tip::ScreenTime]);
    }

    #[test]
    fn test_nutrition_uses_fallback_when_often_missing() {
        let junk = EncodingTable::from_pairs(
            JUNK_FREQUENCY_TABLE,
            [("Never", 0), ("Rarely", 1), ("Weekly", 2), ("Daily", 3)],
        );
        let mut inputs = balanced_inputs();

        inputs.junk_food_frequency = "Weekly".to_string();
        assert!(SuggestionEngine::suggest(&inputs, &sleep_table(), &junk)
            .unwrap()
            .is_empty());

        inputs.junk_food_frequency = "Daily".to_string();
        assert_eq!(
            SuggestionEngine::suggest(&inputs, &sleep_table(), &junk).unwrap(),
            vec![Tip::Nutrition]
        );
    }

    #[test]
    fn test_hygiene_rule_requires_poor_label() {
        let sleep = EncodingTable::from_pairs(SLEEP_QUALITY_TABLE, [("Bad", 0), ("Excellent", 3)]);
        let mut inputs = balanced_inputs();
        inputs.sleep_quality = "Bad".to_string();

        match SuggestionEngine::suggest(&inputs, &sleep, &junk_table()) {
            Err(AdvisorError::UnknownLabel { table, label }) => {
                assert_eq!(table, SLEEP_QUALITY_TABLE);
                assert_eq!(label, POOR_SLEEP_LABEL);
            }
            other => panic!("expected UnknownLabel, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let mut inputs = balanced_inputs();
        inputs.sleep_quality = "Dreamy".to_string();
        assert!(matches!(
            SuggestionEngine::suggest(&inputs, &sleep_table(), &junk_table()),
            Err(AdvisorError::UnknownLabel { .. })
        ));
    }
}
