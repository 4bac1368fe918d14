//! Action creators.
//!
//! Creators that need the clock read it here, so the same action always
//! reduces to the same state.

use chrono::{Local, NaiveDate, SecondsFormat, Utc};

use super::{Action, ActionKind};
use crate::models::{
    AppState, CustomFood, DailyPlan, ExerciseHistoryEntry, MealEntry, MeasurementEntry,
};

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn set_weight(weight: f64) -> Action {
    ActionKind::SetWeight(weight).into()
}

/// Sets the current weight and records it in the weight history.
pub fn save_weight(weight: f64, date: NaiveDate) -> Action {
    ActionKind::SaveWeight {
        weight,
        date: date_key(date),
    }
    .into()
}

pub fn set_fuel_date(date: Option<NaiveDate>) -> Action {
    ActionKind::SetFuelDate(date.map(date_key)).into()
}

pub fn add_meal(meal: MealEntry, date: NaiveDate) -> Action {
    ActionKind::AddMeal {
        meal,
        date: date_key(date),
    }
    .into()
}

pub fn delete_meal(index: usize, date: NaiveDate) -> Action {
    ActionKind::DeleteMeal {
        index,
        date: date_key(date),
    }
    .into()
}

pub fn add_custom_food(food: CustomFood) -> Action {
    ActionKind::AddCustomFood(food).into()
}

pub fn set_daily_plan(plan: DailyPlan) -> Action {
    ActionKind::SetDailyPlan(Some(plan)).into()
}

pub fn toggle_task(task_id: impl Into<String>, date: NaiveDate) -> Action {
    ActionKind::ToggleTask {
        task_id: task_id.into(),
        date: date_key(date),
    }
    .into()
}

/// Logs a completed set, stamped with the current time.
pub fn log_set(
    task_id: impl Into<String>,
    set_index: usize,
    weight: f64,
    reps: f64,
    date: NaiveDate,
) -> Action {
    ActionKind::LogSet {
        task_id: task_id.into(),
        set_index,
        weight,
        reps,
        date: date_key(date),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
    .into()
}

pub fn save_exercise_history(
    exercise_id: impl Into<String>,
    entry: ExerciseHistoryEntry,
) -> Action {
    ActionKind::SaveExerciseHistory {
        exercise_id: exercise_id.into(),
        entry,
    }
    .into()
}

pub fn complete_mental_phase(phase: u8) -> Action {
    ActionKind::CompleteMentalPhase(phase).into()
}

pub fn record_daily_practice(date: NaiveDate, done: bool) -> Action {
    ActionKind::RecordDailyPractice {
        date: date_key(date),
        done,
    }
    .into()
}

/// Saves today's body measurements.
pub fn save_body_measurements(measurements: MeasurementEntry) -> Action {
    ActionKind::SaveBodyMeasurements {
        measurements,
        date: date_key(today()),
    }
    .into()
}

pub fn update_streak(count: u32, last_date: Option<NaiveDate>) -> Action {
    ActionKind::UpdateStreak {
        count,
        last_date: last_date.map(date_key),
    }
    .into()
}

pub fn set_sleep(hours: f64, date: NaiveDate) -> Action {
    ActionKind::SetSleep {
        hours,
        date: date_key(date),
    }
    .into()
}

pub fn add_water(cups: f64, date: NaiveDate) -> Action {
    ActionKind::AddWater {
        cups,
        date: date_key(date),
    }
    .into()
}

pub fn set_active_tab(tab: impl Into<String>) -> Action {
    ActionKind::SetActiveTab(tab.into()).into()
}

pub fn set_selected_muscle(muscle: Option<String>) -> Action {
    ActionKind::SetSelectedMuscle(muscle).into()
}

pub fn set_last_backup(date: NaiveDate) -> Action {
    ActionKind::SetLastBackup(Some(date_key(date))).into()
}

pub fn reset_state() -> Action {
    ActionKind::ResetState.into()
}

pub fn restore_state(state: AppState) -> Action {
    ActionKind::RestoreState(Box::new(state)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize_timestamp_string;
    use serde_json::json;

    #[test]
    fn test_dates_formatted_as_keys() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            add_water(2.0, date).kind,
            ActionKind::AddWater {
                cups: 2.0,
                date: "2024-01-05".into()
            }
        );
    }

    #[test]
    fn test_log_set_timestamp_is_valid() {
        let action = log_set("pushup", 0, 0.0, 12.0, today());
        match action.kind {
            ActionKind::LogSet { timestamp, .. } => {
                assert_eq!(sanitize_timestamp_string(&json!(timestamp)), timestamp);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }
}
