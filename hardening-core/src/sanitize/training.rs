use serde_json::Value;
use std::collections::BTreeMap;

use super::{
    field, keep_tail, optional_date, safe_number_opt, sanitize_timestamp_string, to_safe_number,
    SanitizeContext,
};
use crate::catalog::ExerciseCatalog;
use crate::models::{ExerciseHistoryEntry, WorkoutDay, WorkoutSetEntry, MAX_SETS_PER_EXERCISE};

/// Completed task ids kept per day.
pub const WORKOUT_LOG_CAP: usize = 128;

/// History entries kept per exercise, most recent last.
pub const EXERCISE_HISTORY_CAP: usize = 100;

/// Completed task ids for one day. Ids outside the catalog are dropped.
pub fn workout_log(value: &Value, catalog: &ExerciseCatalog) -> Vec<String> {
    value
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .filter(|id| catalog.contains(id))
                .take(WORKOUT_LOG_CAP)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A set with a missing or malformed timestamp gets the context's now.
pub fn workout_set_entry(value: &Value, ctx: &SanitizeContext) -> Option<WorkoutSetEntry> {
    if !value.is_object() {
        return None;
    }
    let timestamp = sanitize_timestamp_string(field(value, "timestamp"));
    Some(WorkoutSetEntry {
        weight: to_safe_number(field(value, "weight"), 0.0, 0.0, 1000.0),
        reps: to_safe_number(field(value, "reps"), 0.0, 0.0, 1000.0),
        duration: to_safe_number(field(value, "duration"), 0.0, 0.0, 86_400.0),
        timestamp: if timestamp.is_empty() {
            ctx.now_str()
        } else {
            timestamp
        },
        completed: field(value, "completed").as_bool() == Some(true),
    })
}

/// Sets for one day keyed by exercise id.
///
/// Unknown exercises and non-list values are dropped, each exercise keeps
/// its first [`MAX_SETS_PER_EXERCISE`] sets and exercises left with no sets
/// are removed.
pub fn workout_data(value: &Value, ctx: &SanitizeContext) -> WorkoutDay {
    let mut out = WorkoutDay::new();
    let Some(map) = value.as_object() else {
        return out;
    };
    for (task_id, entries) in map {
        if !ctx.catalog.contains(task_id) {
            continue;
        }
        let Some(entries) = entries.as_array() else {
            continue;
        };
        let sets: Vec<WorkoutSetEntry> = entries
            .iter()
            .filter_map(|e| workout_set_entry(e, ctx))
            .take(MAX_SETS_PER_EXERCISE)
            .collect();
        if !sets.is_empty() {
            out.insert(task_id.clone(), sets);
        }
    }
    out
}

/// Keeps whichever fields are readable; `None` when nothing is.
///
/// A provided volume wins over `weight * reps`.
pub fn exercise_history_entry(value: &Value) -> Option<ExerciseHistoryEntry> {
    if !value.is_object() {
        return None;
    }
    let weight = safe_number_opt(field(value, "weight"), 0.0, 1000.0);
    let reps = safe_number_opt(field(value, "reps"), 0.0, 1000.0);
    let volume =
        safe_number_opt(field(value, "volume"), 0.0, 1_000_000.0).or(match (weight, reps) {
            (Some(w), Some(r)) => Some(w * r),
            _ => None,
        });
    let timestamp =
        Some(sanitize_timestamp_string(field(value, "timestamp"))).filter(|t| !t.is_empty());

    let entry = ExerciseHistoryEntry {
        weight,
        reps,
        volume,
        date: optional_date(field(value, "date")),
        timestamp,
    };
    (!entry.is_empty()).then_some(entry)
}

pub fn exercise_history(
    value: &Value,
    catalog: &ExerciseCatalog,
) -> BTreeMap<String, Vec<ExerciseHistoryEntry>> {
    let mut out = BTreeMap::new();
    let Some(map) = value.as_object() else {
        return out;
    };
    for (exercise_id, entries) in map {
        if !catalog.contains(exercise_id) {
            continue;
        }
        let Some(entries) = entries.as_array() else {
            continue;
        };
        let history = keep_tail(
            entries.iter().filter_map(exercise_history_entry).collect(),
            EXERCISE_HISTORY_CAP,
        );
        if !history.is_empty() {
            out.insert(exercise_id.clone(), history);
        }
    }
    out
}
