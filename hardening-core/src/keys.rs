//! Storage key registry.
//!
//! Every value the app persists lives under one of these keys. Keys ending in
//! `_` are prefix families: the full storage key is the prefix followed by an
//! ISO date (`monk_meal_log_2024-01-15`).

use chrono::NaiveDate;

/// A registered storage key or key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Weight,
    Fuel,
    Workout,
    WorkoutData,
    Meal,
    Measure,
    WeightHistory,
    CustomFoods,
    DailyPlan,
    Streak,
    Backup,
    Sleep,
    Water,
    ExerciseHistory,
    MentalProgress,
}

impl StorageKey {
    pub const ALL: [StorageKey; 15] = [
        StorageKey::Weight,
        StorageKey::Fuel,
        StorageKey::Workout,
        StorageKey::WorkoutData,
        StorageKey::Meal,
        StorageKey::Measure,
        StorageKey::WeightHistory,
        StorageKey::CustomFoods,
        StorageKey::DailyPlan,
        StorageKey::Streak,
        StorageKey::Backup,
        StorageKey::Sleep,
        StorageKey::Water,
        StorageKey::ExerciseHistory,
        StorageKey::MentalProgress,
    ];

    /// Returns the raw key (or prefix, for date families).
    pub fn key(&self) -> &'static str {
        match self {
            StorageKey::Weight => "monk_weight",
            StorageKey::Fuel => "monk_fuel_date",
            StorageKey::Workout => "monk_workout_log_",
            StorageKey::WorkoutData => "monk_workout_data_",
            StorageKey::Meal => "monk_meal_log_",
            StorageKey::Measure => "monk_body_stats",
            StorageKey::WeightHistory => "monk_weight_history",
            StorageKey::CustomFoods => "monk_custom_foods",
            StorageKey::DailyPlan => "monk_daily_plan",
            StorageKey::Streak => "monk_streak_data",
            StorageKey::Backup => "monk_last_backup_date",
            StorageKey::Sleep => "monk_sleep_log_",
            StorageKey::Water => "monk_water_",
            StorageKey::ExerciseHistory => "monk_exercise_history",
            StorageKey::MentalProgress => "monk_mental_progress",
        }
    }

    /// True for date-prefixed key families.
    pub fn is_prefix(&self) -> bool {
        self.key().ends_with('_')
    }

    /// Builds the dated storage key for a prefix family.
    ///
    /// Returns `None` for exact keys.
    pub fn dated(&self, date: NaiveDate) -> Option<String> {
        if self.is_prefix() {
            Some(format!("{}{}", self.key(), date.format("%Y-%m-%d")))
        } else {
            None
        }
    }

    /// Returns the date suffix of a key in this family.
    pub fn date_suffix<'a>(&self, raw: &'a str) -> Option<&'a str> {
        if self.is_prefix() {
            raw.strip_prefix(self.key())
        } else {
            None
        }
    }

    /// Maps a raw storage key to the registered key it belongs to.
    pub fn classify(raw: &str) -> Option<StorageKey> {
        Self::ALL.into_iter().find(|k| {
            if k.is_prefix() {
                raw.starts_with(k.key())
            } else {
                raw == k.key()
            }
        })
    }

    /// Returns true if the key is app-owned and must be cleared before an import.
    ///
    /// Matching is by registered key with its trailing `_` stripped, so any key
    /// sharing a registered stem is treated as ours.
    pub fn owns(raw: &str) -> bool {
        Self::ALL
            .iter()
            .any(|k| raw.starts_with(k.key().trim_end_matches('_')))
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
