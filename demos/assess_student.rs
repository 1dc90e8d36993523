//! Assess one student profile against the demo bundle

use stress_advisor::{RawInputs, StressAdvisor, WELL_BALANCED_MESSAGE};

fn main() {
    let advisor = match StressAdvisor::from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/demos/stress_model.json"
    )) {
        Ok(advisor) => advisor,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    let inputs = RawInputs {
        sleep_hours: 5,
        sleep_quality: "Fair".to_string(),
        study_hours: 6,
        attendance_percent: 80,
        deadlines_per_week: 5,
        exercise_hours_per_week: 1,
        caffeine_cups_per_day: 3,
        screen_time_hours: 8,
        social_media_hours: 3,
        family_support: 4,
        peer_pressure: 2,
        financial_concerns: 3,
        junk_food_frequency: "Sometimes".to_string(),
    };

    match advisor.assess(&inputs) {
        Ok(assessment) => {
            println!(
                "Stress Level: {} ({:.1})",
                assessment.score.level, assessment.score.clamped_score
            );
            if assessment.tips.is_empty() {
                println!("{WELL_BALANCED_MESSAGE}");
            }
            for tip in &assessment.tips {
                println!("- {tip}");
            }
        }
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
