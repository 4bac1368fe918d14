use serde_json::Value;

use super::{
    field, is_truthy, is_valid_iso_date, keep_tail, optional_date, safe_number_opt, to_safe_number,
    SanitizeContext,
};
use crate::models::{
    BodyMeasurements, MeasurementEntry, MentalProgress, Streak, WeightHistory,
    MEASUREMENT_HISTORY_CAP, MENTAL_PHASES,
};

const MIN_WEIGHT: f64 = 20.0;
const MAX_WEIGHT: f64 = 500.0;

pub fn weight(value: &Value, default_weight: f64) -> f64 {
    to_safe_number(value, default_weight, MIN_WEIGHT, MAX_WEIGHT)
}

/// Daily weights keyed by date. Invalid dates and unreadable weights are dropped.
pub fn weight_history(value: &Value) -> WeightHistory {
    let mut out = WeightHistory::new();
    if let Some(map) = value.as_object() {
        for (date, raw) in map {
            if !is_valid_iso_date(date) {
                continue;
            }
            if let Some(w) = safe_number_opt(raw, MIN_WEIGHT, MAX_WEIGHT) {
                out.insert(date.clone(), w);
            }
        }
    }
    out
}

pub fn streak(value: &Value) -> Streak {
    if !value.is_object() {
        return Streak::default();
    }
    Streak {
        count: to_safe_number(field(value, "count"), 0.0, 0.0, 10_000.0).trunc() as u32,
        last_date: optional_date(field(value, "lastDate")),
    }
}

pub fn mental_progress(value: &Value) -> MentalProgress {
    let mut out = MentalProgress::default();
    if !value.is_object() {
        return out;
    }

    if let Some(phases) = field(value, "completedPhases").as_array() {
        for raw in phases {
            let Some(phase) = safe_number_opt(raw, 1.0, f64::from(MENTAL_PHASES)) else {
                continue;
            };
            let phase = phase.trunc() as u8;
            if !out.completed_phases.contains(&phase) {
                out.completed_phases.push(phase);
            }
        }
    }

    if let Some(practice) = field(value, "dailyPractice").as_object() {
        for (date, done) in practice {
            if is_valid_iso_date(date) {
                out.daily_practice
                    .insert(date.clone(), done.as_bool() == Some(true));
            }
        }
    }

    out.last_practice_date = optional_date(field(value, "lastPracticeDate"));
    out
}

pub fn measure_entry(value: &Value) -> Option<MeasurementEntry> {
    if !value.is_object() {
        return None;
    }
    let circumference = |name: &str| safe_number_opt(field(value, name), 0.0, 300.0);
    Some(MeasurementEntry {
        chest: circumference("chest"),
        arm: circumference("arm"),
        waist: circumference("waist"),
        leg: circumference("leg"),
        saved_at: optional_date(field(value, "savedAt")),
        date: optional_date(field(value, "date")),
    })
}

/// Current measurement plus history.
///
/// An object with neither `current` nor `history` is the legacy flat shape
/// and is read as the current measurement.
pub fn body_measurements(value: &Value) -> BodyMeasurements {
    if !value.is_object() {
        return BodyMeasurements::default();
    }

    let current = field(value, "current");
    let history = field(value, "history");
    if !is_truthy(current) && !is_truthy(history) {
        return BodyMeasurements {
            current: measure_entry(value).unwrap_or_default(),
            history: Vec::new(),
        };
    }

    let history = history
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(measure_entry)
                .filter(MeasurementEntry::has_measurement)
                .collect()
        })
        .unwrap_or_default();

    BodyMeasurements {
        current: measure_entry(current).unwrap_or_default(),
        history: keep_tail(history, MEASUREMENT_HISTORY_CAP),
    }
}

pub fn sleep_hours(value: &Value) -> f64 {
    to_safe_number(value, 0.0, 0.0, 24.0)
}

pub fn water_cups(value: &Value) -> f64 {
    to_safe_number(value, 0.0, 0.0, 50.0)
}

pub fn fuel_date(value: &Value) -> Option<String> {
    optional_date(value)
}

/// The backup date, or today when it is unreadable.
pub fn backup_date(value: &Value, ctx: &SanitizeContext) -> String {
    optional_date(value).unwrap_or_else(|| ctx.today_str())
}
