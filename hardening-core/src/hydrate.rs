//! Loading [`AppState`] from storage and writing it back.
//!
//! Every stored value passes through its sanitizer on the way in, so a
//! hand-edited or corrupt store still yields a valid state.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::keys::StorageKey;
use crate::models::AppState;
use crate::sanitize::{self, is_valid_iso_date, SanitizeContext};
use crate::storage::{Result, StorageAdapter, StorageError};

/// Reads every registered key into a sanitized [`AppState`].
///
/// Absent keys keep their initial-state defaults. Dated keys whose suffix is
/// not a valid date are ignored.
pub async fn load_state<S>(storage: &S, ctx: &SanitizeContext) -> Result<AppState>
where
    S: StorageAdapter + ?Sized,
{
    let mut state = AppState {
        weight: ctx.default_weight,
        ..AppState::default()
    };

    if let Some(v) = storage.get(StorageKey::Weight.key()).await? {
        state.weight = sanitize::weight(&v, ctx.default_weight);
    }
    if let Some(v) = storage.get(StorageKey::Fuel.key()).await? {
        state.fuel_date = sanitize::fuel_date(&v);
    }
    if let Some(v) = storage.get(StorageKey::Measure.key()).await? {
        state.body_measurements = sanitize::body_measurements(&v);
    }
    if let Some(v) = storage.get(StorageKey::WeightHistory.key()).await? {
        state.weight_history = sanitize::weight_history(&v);
    }
    if let Some(v) = storage.get(StorageKey::CustomFoods.key()).await? {
        state.custom_foods = sanitize::custom_foods(&v);
    }
    if let Some(v) = storage.get(StorageKey::DailyPlan.key()).await? {
        state.daily_plan = Some(sanitize::daily_plan(&v, ctx));
    }
    if let Some(v) = storage.get(StorageKey::Streak.key()).await? {
        state.streak = sanitize::streak(&v);
    }
    if let Some(v) = storage.get(StorageKey::Backup.key()).await? {
        state.last_backup = Some(sanitize::backup_date(&v, ctx));
    }
    if let Some(v) = storage.get(StorageKey::ExerciseHistory.key()).await? {
        state.exercise_history = sanitize::exercise_history(&v, &ctx.catalog);
    }
    if let Some(v) = storage.get(StorageKey::MentalProgress.key()).await? {
        state.mental_progress = sanitize::mental_progress(&v);
    }

    for raw in storage.keys().await? {
        let Some(family) = StorageKey::classify(&raw).filter(StorageKey::is_prefix) else {
            continue;
        };
        let Some(date) = family.date_suffix(&raw).filter(|d| is_valid_iso_date(d)) else {
            continue;
        };
        let Some(value) = storage.get(&raw).await? else {
            continue;
        };
        let date = date.to_string();
        match family {
            StorageKey::Meal => {
                state.meals.insert(date, sanitize::meal_log(&value));
            }
            StorageKey::Workout => {
                state
                    .workout_tasks
                    .insert(date, sanitize::workout_log(&value, &ctx.catalog));
            }
            StorageKey::WorkoutData => {
                let day = sanitize::workout_data(&value, ctx);
                if !day.is_empty() {
                    state.workout_data.insert(date, day);
                }
            }
            StorageKey::Sleep => {
                state.sleep_data.insert(date, sanitize::sleep_hours(&value));
            }
            StorageKey::Water => {
                state.water_data.insert(date, sanitize::water_cups(&value));
            }
            _ => {}
        }
    }

    tracing::debug!(
        meal_days = state.meals.len(),
        workout_days = state.workout_data.len(),
        "Loaded state from storage"
    );
    Ok(state)
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| StorageError::Serialize(key.to_string(), e))
}

async fn put<S, T>(storage: &S, key: &str, value: &T) -> Result<()>
where
    S: StorageAdapter + ?Sized,
    T: Serialize,
{
    storage.set(key, &encode(key, value)?).await?;
    Ok(())
}

async fn put_dated<S, T>(
    storage: &S,
    family: StorageKey,
    by_date: &BTreeMap<String, T>,
) -> Result<()>
where
    S: StorageAdapter + ?Sized,
    T: Serialize,
{
    for (date, value) in by_date {
        put(storage, &format!("{}{}", family.key(), date), value).await?;
    }
    Ok(())
}

async fn put_optional<S, T>(storage: &S, key: StorageKey, value: Option<&T>) -> Result<()>
where
    S: StorageAdapter + ?Sized,
    T: Serialize,
{
    match value {
        Some(value) => put(storage, key.key(), value).await,
        None => storage.remove(key.key()).await.map(|_| ()),
    }
}

/// Writes every persisted slice of `state` under its storage key.
///
/// UI-only fields (`activeTab`, `selectedMuscle`) are not stored.
pub async fn save_state<S>(storage: &S, state: &AppState) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    put(storage, StorageKey::Weight.key(), &state.weight).await?;
    put_optional(storage, StorageKey::Fuel, state.fuel_date.as_ref()).await?;
    put(storage, StorageKey::Measure.key(), &state.body_measurements).await?;
    put(storage, StorageKey::WeightHistory.key(), &state.weight_history).await?;
    put(storage, StorageKey::CustomFoods.key(), &state.custom_foods).await?;
    put_optional(storage, StorageKey::DailyPlan, state.daily_plan.as_ref()).await?;
    put(storage, StorageKey::Streak.key(), &state.streak).await?;
    put_optional(storage, StorageKey::Backup, state.last_backup.as_ref()).await?;
    put(storage, StorageKey::ExerciseHistory.key(), &state.exercise_history).await?;
    put(storage, StorageKey::MentalProgress.key(), &state.mental_progress).await?;

    put_dated(storage, StorageKey::Meal, &state.meals).await?;
    put_dated(storage, StorageKey::Workout, &state.workout_tasks).await?;
    put_dated(storage, StorageKey::WorkoutData, &state.workout_data).await?;
    put_dated(storage, StorageKey::Sleep, &state.sleep_data).await?;
    put_dated(storage, StorageKey::Water, &state.water_data).await?;

    tracing::debug!("Saved state to storage");
    Ok(())
}
