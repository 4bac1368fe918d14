//! Total sanitizers for untrusted JSON.
//!
//! Every function here accepts any [`Value`] and returns a value that is
//! valid for its entity. Malformed input degrades to a default; nothing
//! panics and nothing returns an error. Sanitizers are idempotent: feeding
//! a sanitized value back in returns it unchanged.

mod nutrition;
mod progress;
mod training;

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

use crate::catalog::ExerciseCatalog;
use crate::keys::StorageKey;
use crate::models::DEFAULT_WEIGHT;

pub use nutrition::{
    custom_food, custom_food_option, custom_foods, daily_plan, daily_plan_meal, meal_entry,
    meal_log, CUSTOM_FOODS_CAP,
};
pub use progress::{
    backup_date, body_measurements, fuel_date, measure_entry, mental_progress, sleep_hours,
    streak, water_cups, weight, weight_history,
};
pub use training::{
    exercise_history, exercise_history_entry, workout_data, workout_log, workout_set_entry,
    EXERCISE_HISTORY_CAP, WORKOUT_LOG_CAP,
};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:[T ][0-9:.+\-Z]+)?$").expect("valid timestamp regex")
});

/// Longest timestamp string accepted.
pub const MAX_TIMESTAMP_LEN: usize = 40;

/// Inputs a sanitizer needs besides the value itself.
#[derive(Debug, Clone)]
pub struct SanitizeContext {
    /// Exercise ids accepted by the workout sanitizers.
    pub catalog: ExerciseCatalog,
    /// Fallback date for plans and backup dates.
    pub today: NaiveDate,
    /// Fallback timestamp for logged sets.
    pub now: DateTime<Utc>,
    /// Weight used when a stored weight is unreadable.
    pub default_weight: f64,
}

impl SanitizeContext {
    /// A context for the current moment, with today in local time.
    pub fn new(catalog: ExerciseCatalog) -> Self {
        Self {
            today: Local::now().date_naive(),
            ..Self::at(catalog, Utc::now())
        }
    }

    /// A context pinned to `now`.
    pub fn at(catalog: ExerciseCatalog, now: DateTime<Utc>) -> Self {
        Self {
            catalog,
            today: now.date_naive(),
            now,
            default_weight: DEFAULT_WEIGHT,
        }
    }

    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    pub fn today_str(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    pub fn now_str(&self) -> String {
        self.now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for SanitizeContext {
    fn default() -> Self {
        Self::new(ExerciseCatalog::any())
    }
}

/// Coerces `value` to a finite number clamped into `[min, max]`.
///
/// Numbers and trimmed, non-empty numeric strings are accepted. Anything
/// else, including a non-finite parse, yields `fallback` unclamped.
pub fn to_safe_number(value: &Value, fallback: f64, min: f64, max: f64) -> f64 {
    safe_number_opt(value, min, max).unwrap_or(fallback)
}

/// Like [`to_safe_number`] but reports unreadable input as `None`.
pub fn safe_number_opt(value: &Value, min: f64, max: f64) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }?;
    if !parsed.is_finite() {
        return None;
    }
    // max/min rather than clamp: clamp panics when min > max
    Some(parsed.max(min).min(max))
}

/// Returns `value` truncated to `max_chars` characters, or `fallback` when
/// it is not a string.
pub fn safe_string(value: &Value, max_chars: usize, fallback: &str) -> String {
    match value.as_str() {
        Some(s) => s.chars().take(max_chars).collect(),
        None => fallback.to_string(),
    }
}

/// True for a `YYYY-MM-DD` string naming a real calendar day.
pub fn is_valid_iso_date(value: &str) -> bool {
    ISO_DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// The trimmed date, or an empty string when `value` is not a valid date.
pub fn sanitize_date_string(value: &Value) -> String {
    match value.as_str().map(str::trim) {
        Some(s) if is_valid_iso_date(s) => s.to_string(),
        _ => String::new(),
    }
}

/// The trimmed timestamp, or an empty string when `value` is not a date
/// optionally followed by a time part, or is longer than
/// [`MAX_TIMESTAMP_LEN`].
pub fn sanitize_timestamp_string(value: &Value) -> String {
    match value.as_str().map(str::trim) {
        Some(s) if s.len() <= MAX_TIMESTAMP_LEN && TIMESTAMP.is_match(s) => s.to_string(),
        _ => String::new(),
    }
}

/// `Some(date)` for a valid date, `None` otherwise.
pub(crate) fn optional_date(value: &Value) -> Option<String> {
    Some(sanitize_date_string(value)).filter(|s| !s.is_empty())
}

/// Truthiness as the stored documents were written: null, false, zero and
/// the empty string count as absent.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn field<'a>(value: &'a Value, name: &str) -> &'a Value {
    value.get(name).unwrap_or(&Value::Null)
}

/// Keeps the last `cap` elements.
pub(crate) fn keep_tail<T>(mut items: Vec<T>, cap: usize) -> Vec<T> {
    let overflow = items.len().saturating_sub(cap);
    items.drain(..overflow);
    items
}

fn to_json<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Runs `value` through the sanitizer registered for `key`.
///
/// Keys outside the registry are returned unchanged. Sanitizers that reject
/// their input outright produce `Value::Null`.
pub fn sanitize_entry(key: &str, value: &Value, ctx: &SanitizeContext) -> Value {
    let Some(kind) = StorageKey::classify(key) else {
        return value.clone();
    };
    match kind {
        StorageKey::Weight => to_json(weight(value, ctx.default_weight)),
        StorageKey::Fuel => to_json(fuel_date(value)),
        StorageKey::Workout => to_json(workout_log(value, &ctx.catalog)),
        StorageKey::WorkoutData => to_json(workout_data(value, ctx)),
        StorageKey::Meal => to_json(meal_log(value)),
        StorageKey::Measure => to_json(body_measurements(value)),
        StorageKey::WeightHistory => to_json(weight_history(value)),
        StorageKey::CustomFoods => to_json(custom_foods(value)),
        StorageKey::DailyPlan => to_json(daily_plan(value, ctx)),
        StorageKey::Streak => to_json(streak(value)),
        StorageKey::Backup => to_json(backup_date(value, ctx)),
        StorageKey::Sleep => to_json(sleep_hours(value)),
        StorageKey::Water => to_json(water_cups(value)),
        StorageKey::ExerciseHistory => to_json(exercise_history(value, &ctx.catalog)),
        StorageKey::MentalProgress => to_json(mental_progress(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    pub(crate) fn ctx() -> SanitizeContext {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        SanitizeContext::at(ExerciseCatalog::any(), now)
    }

    #[test]
    fn test_to_safe_number_finite_clamps() {
        assert_eq!(to_safe_number(&json!(50), 0.0, 0.0, 100.0), 50.0);
        assert_eq!(to_safe_number(&json!(-5), 0.0, 0.0, 100.0), 0.0);
        assert_eq!(to_safe_number(&json!(1e9), 0.0, 0.0, 100.0), 100.0);
        assert_eq!(to_safe_number(&json!(" 72.5 "), 0.0, 20.0, 500.0), 72.5);
    }

    #[test]
    fn test_to_safe_number_non_numeric_yields_fallback() {
        for value in [
            json!("abc"),
            json!(""),
            json!("   "),
            json!("NaN"),
            json!("inf"),
            json!("-Infinity"),
            json!(null),
            json!(true),
            json!([1]),
            json!({ "n": 1 }),
        ] {
            assert_eq!(to_safe_number(&value, 7.0, 0.0, 5.0), 7.0, "{}", value);
        }
    }

    #[test]
    fn test_to_safe_number_inverted_bounds_does_not_panic() {
        assert_eq!(to_safe_number(&json!(5), 0.0, 10.0, 1.0), 1.0);
    }

    #[test]
    fn test_safe_string() {
        assert_eq!(safe_string(&json!("héllo"), 2, "x"), "hé");
        assert_eq!(safe_string(&json!(12), 2, "x"), "x");
    }

    #[test]
    fn test_iso_date_validation() {
        assert!(is_valid_iso_date("2024-02-29"));
        assert!(!is_valid_iso_date("2023-02-29"));
        assert!(!is_valid_iso_date("2024-13-01"));
        assert!(!is_valid_iso_date("2024-1-5"));
        assert!(!is_valid_iso_date("2024-01-05T00:00:00Z"));
        assert_eq!(sanitize_date_string(&json!(" 2024-01-05 ")), "2024-01-05");
        assert_eq!(sanitize_date_string(&json!(20240105)), "");
    }

    #[test]
    fn test_timestamp_validation() {
        assert_eq!(
            sanitize_timestamp_string(&json!("2024-01-15T10:30:00.000Z")),
            "2024-01-15T10:30:00.000Z"
        );
        assert_eq!(sanitize_timestamp_string(&json!("2024-01-15")), "2024-01-15");
        assert_eq!(sanitize_timestamp_string(&json!("yesterday")), "");
        let long = format!("2024-01-15T{}", "1".repeat(40));
        assert_eq!(sanitize_timestamp_string(&json!(long)), "");
    }

    #[test]
    fn test_context_strings() {
        let ctx = ctx();
        assert_eq!(ctx.today_str(), "2024-01-15");
        assert_eq!(ctx.now_str(), "2024-01-15T10:30:00.000Z");
        assert_eq!(sanitize_timestamp_string(&json!(ctx.now_str())), ctx.now_str());
    }

    #[test]
    fn test_keep_tail() {
        assert_eq!(keep_tail(vec![1, 2, 3, 4, 5], 3), vec![3, 4, 5]);
        assert_eq!(keep_tail(vec![1, 2], 3), vec![1, 2]);
    }

    #[test]
    fn test_sanitize_entry_routes_by_key() {
        let ctx = ctx();
        assert_eq!(sanitize_entry("monk_weight", &json!("bad"), &ctx), json!(45.0));
        assert_eq!(sanitize_entry("monk_weight", &json!(900), &ctx), json!(500.0));
        assert_eq!(sanitize_entry("monk_sleep_log_2024-01-15", &json!(30), &ctx), json!(24.0));
        assert_eq!(sanitize_entry("monk_water_2024-01-15", &json!(-1), &ctx), json!(0.0));
        assert_eq!(sanitize_entry("monk_fuel_date", &json!("nope"), &ctx), json!(null));
        assert_eq!(
            sanitize_entry("monk_last_backup_date", &json!(null), &ctx),
            json!("2024-01-15")
        );
        assert_eq!(sanitize_entry("monk_meal_log_2024-01-15", &json!("x"), &ctx), json!([]));
    }

    #[test]
    fn test_sanitize_entry_passes_unknown_keys() {
        let value = json!({ "anything": [1, 2, 3] });
        assert_eq!(sanitize_entry("unknownKey", &value, &ctx()), value);
    }

    #[test]
    fn test_sanitize_entry_is_idempotent() {
        let ctx = ctx();
        let samples = [
            ("monk_weight", json!("80.456")),
            ("monk_fuel_date", json!("2024-01-10")),
            ("monk_workout_log_2024-01-15", json!(["pushup", 3, "squat"])),
            (
                "monk_workout_data_2024-01-15",
                json!({ "pushup": [{ "weight": 0, "reps": "12", "completed": true }, null] }),
            ),
            (
                "monk_meal_log_2024-01-15",
                json!([{ "name": "Oats", "cal": "350", "amount": 80, "unit": "g" }, 4]),
            ),
            (
                "monk_body_stats",
                json!({ "chest": 100, "waist": "85", "savedAt": "2024-01-01" }),
            ),
            ("monk_weight_history", json!({ "2024-01-01": 80, "bad": 70, "2024-01-02": 5 })),
            (
                "monk_custom_foods",
                json!([{ "id": 3.7, "name": "Bar", "type": "piece" }, { "name": "" }]),
            ),
            ("monk_daily_plan", json!({ "breakfast": { "text": "Eggs", "kcal": 300 } })),
            ("monk_streak_data", json!({ "count": 5.9, "lastDate": "2024-01-01" })),
            ("monk_last_backup_date", json!("2024-01-01")),
            ("monk_sleep_log_2024-01-15", json!("7.5")),
            ("monk_water_2024-01-15", json!(8)),
            (
                "monk_exercise_history",
                json!({ "squat": [{ "weight": 100, "reps": 5 }, {}, "junk"] }),
            ),
            (
                "monk_mental_progress",
                json!({
                    "completedPhases": [1, 1, 2.5, 9, "3"],
                    "dailyPractice": { "2024-01-01": 1 }
                }),
            ),
        ];
        for (key, raw) in samples {
            let once = sanitize_entry(key, &raw, &ctx);
            let twice = sanitize_entry(key, &once, &ctx);
            assert_eq!(once, twice, "{} is not a fixed point", key);
        }
    }
}
