//! Slice reducers.
//!
//! Each reducer takes the state by value and returns it, changed or not.
//! Actions a slice does not handle pass through unchanged, and
//! [`root_reducer`] threads every action through every slice in order.

use serde_json::Value;

use super::{Action, ActionKind, ReducerError};
use crate::models::{AppState, Streak, WorkoutSetEntry, MAX_SETS_PER_EXERCISE};
use crate::sanitize::{CUSTOM_FOODS_CAP, EXERCISE_HISTORY_CAP};

pub type ReducerResult = Result<AppState, ReducerError>;

pub fn weight(mut state: AppState, action: &Action) -> ReducerResult {
    match &action.kind {
        ActionKind::SetWeight(weight) => state.weight = *weight,
        ActionKind::SaveWeight { weight, date } => {
            state.weight = *weight;
            state.weight_history.insert(date.clone(), *weight);
        }
        _ => {}
    }
    Ok(state)
}

pub fn meal(mut state: AppState, action: &Action) -> ReducerResult {
    match &action.kind {
        ActionKind::AddMeal { meal, date } => {
            state.meals.entry(date.clone()).or_default().push(meal.clone());
        }
        ActionKind::DeleteMeal { index, date } => {
            let meals = state.meals.entry(date.clone()).or_default();
            if *index < meals.len() {
                meals.remove(*index);
            }
        }
        ActionKind::SetMeals { date, meals } => {
            state.meals.insert(date.clone(), meals.clone());
        }
        ActionKind::AddCustomFood(food) => {
            state.custom_foods.push(food.clone());
            let overflow = state.custom_foods.len().saturating_sub(CUSTOM_FOODS_CAP);
            state.custom_foods.drain(..overflow);
        }
        ActionKind::RemoveCustomFood(index) => {
            if *index < state.custom_foods.len() {
                state.custom_foods.remove(*index);
            }
        }
        ActionKind::SetCustomFoods(foods) => state.custom_foods = foods.clone(),
        ActionKind::SetDailyPlan(plan) => state.daily_plan = plan.clone(),
        _ => {}
    }
    Ok(state)
}

pub fn workout(mut state: AppState, action: &Action) -> ReducerResult {
    match &action.kind {
        ActionKind::SetWorkoutTasks { date, tasks } => {
            state.workout_tasks.insert(date.clone(), tasks.clone());
        }
        ActionKind::ToggleTask { task_id, date } => {
            let tasks = state.workout_tasks.entry(date.clone()).or_default();
            if let Some(pos) = tasks.iter().position(|t| t == task_id) {
                tasks.remove(pos);
            } else {
                tasks.push(task_id.clone());
            }
        }
        ActionKind::LogSet {
            task_id,
            set_index,
            weight,
            reps,
            date,
            timestamp,
        } => {
            if *set_index >= MAX_SETS_PER_EXERCISE {
                return Err(ReducerError::SetIndexOutOfRange {
                    index: *set_index,
                    max: MAX_SETS_PER_EXERCISE,
                });
            }
            let sets = state
                .workout_data
                .entry(date.clone())
                .or_default()
                .entry(task_id.clone())
                .or_default();
            if sets.len() <= *set_index {
                sets.resize(
                    *set_index + 1,
                    WorkoutSetEntry {
                        timestamp: timestamp.clone(),
                        ..WorkoutSetEntry::default()
                    },
                );
            }
            sets[*set_index] = WorkoutSetEntry::completed(*weight, *reps, timestamp.clone());
        }
        ActionKind::SetWorkoutData { date, data } => {
            state.workout_data.insert(date.clone(), data.clone());
        }
        ActionKind::SaveExerciseHistory { exercise_id, entry } => {
            let history = state.exercise_history.entry(exercise_id.clone()).or_default();
            history.push(entry.clone());
            let overflow = history.len().saturating_sub(EXERCISE_HISTORY_CAP);
            history.drain(..overflow);
        }
        ActionKind::SetExerciseHistory(history) => state.exercise_history = history.clone(),
        _ => {}
    }
    Ok(state)
}

pub fn mental(mut state: AppState, action: &Action) -> ReducerResult {
    let progress = &mut state.mental_progress;
    match &action.kind {
        ActionKind::CompleteMentalPhase(phase) => {
            if !progress.completed_phases.contains(phase) {
                progress.completed_phases.push(*phase);
            }
        }
        ActionKind::RecordDailyPractice { date, done } => {
            progress.daily_practice.insert(date.clone(), *done);
            progress.last_practice_date = Some(date.clone());
        }
        ActionKind::UpdateMentalProgress(patch) => {
            if let Some(phases) = &patch.completed_phases {
                progress.completed_phases = phases.clone();
            }
            if let Some(practice) = &patch.daily_practice {
                progress.daily_practice = practice.clone();
            }
            if let Some(date) = &patch.last_practice_date {
                progress.last_practice_date = Some(date.clone());
            }
        }
        _ => {}
    }
    Ok(state)
}

pub fn stats(mut state: AppState, action: &Action) -> ReducerResult {
    match &action.kind {
        ActionKind::SaveBodyMeasurements { measurements, date } => {
            state.body_measurements = state.body_measurements.record(measurements.clone(), date);
        }
        ActionKind::SetBodyMeasurements(measurements) => {
            state.body_measurements = measurements.clone();
        }
        ActionKind::UpdateStreak { count, last_date } => {
            state.streak = Streak {
                count: *count,
                last_date: last_date.clone(),
            };
        }
        ActionKind::SetStreak(streak) => state.streak = streak.clone(),
        ActionKind::SetSleep { hours, date } => {
            state.sleep_data.insert(date.clone(), *hours);
        }
        ActionKind::AddWater { cups, date } => {
            *state.water_data.entry(date.clone()).or_insert(0.0) += *cups;
        }
        ActionKind::SetWater { cups, date } => {
            state.water_data.insert(date.clone(), *cups);
        }
        _ => {}
    }
    Ok(state)
}

pub fn ui(mut state: AppState, action: &Action) -> ReducerResult {
    match &action.kind {
        ActionKind::SetActiveTab(tab) => state.active_tab = tab.clone(),
        ActionKind::SetSelectedMuscle(muscle) => state.selected_muscle = muscle.clone(),
        _ => {}
    }
    Ok(state)
}

pub fn system(state: AppState, action: &Action) -> ReducerResult {
    match &action.kind {
        ActionKind::SetFuelDate(date) => Ok(AppState {
            fuel_date: date.clone(),
            ..state
        }),
        ActionKind::SetLastBackup(date) => Ok(AppState {
            last_backup: date.clone(),
            ..state
        }),
        ActionKind::ResetState => Ok(AppState::default()),
        ActionKind::RestoreState(restored) => Ok(restored.as_ref().clone()),
        ActionKind::ImportData(fields) => merge_fields(state, fields, action),
        _ => Ok(state),
    }
}

fn merge_fields(
    state: AppState,
    fields: &serde_json::Map<String, Value>,
    action: &Action,
) -> ReducerResult {
    let invalid = |e: serde_json::Error| ReducerError::InvalidState {
        action: action.kind_name().to_string(),
        message: e.to_string(),
    };
    let mut value = serde_json::to_value(&state).map_err(invalid)?;
    if let Value::Object(object) = &mut value {
        for (key, field) in fields {
            object.insert(key.clone(), field.clone());
        }
    }
    serde_json::from_value(value).map_err(invalid)
}

/// Runs every slice reducer in turn.
pub fn root_reducer(state: &AppState, action: &Action) -> ReducerResult {
    let state = weight(state.clone(), action)?;
    let state = meal(state, action)?;
    let state = workout(state, action)?;
    let state = mental(state, action)?;
    let state = stats(state, action)?;
    let state = ui(state, action)?;
    system(state, action)
}
