use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    BodyMeasurements, CustomFood, DailyPlan, ExerciseHistoryEntry, MealEntry, MentalProgress,
    Streak, WeightHistory, WorkoutDay,
};

/// Body weight a fresh install starts from, in kg.
pub const DEFAULT_WEIGHT: f64 = 45.0;

/// The whole in-memory application state.
///
/// Owned by the [`Store`](crate::state::Store) and only changed by reducers.
/// Date-keyed maps use `YYYY-MM-DD` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub weight: f64,
    pub fuel_date: Option<String>,
    pub custom_foods: Vec<CustomFood>,
    pub meals: BTreeMap<String, Vec<MealEntry>>,
    pub daily_plan: Option<DailyPlan>,
    pub selected_muscle: Option<String>,
    pub active_tab: String,
    pub workout_data: BTreeMap<String, WorkoutDay>,
    pub workout_tasks: BTreeMap<String, Vec<String>>,
    pub exercise_history: BTreeMap<String, Vec<ExerciseHistoryEntry>>,
    pub mental_progress: MentalProgress,
    pub body_measurements: BodyMeasurements,
    pub streak: Streak,
    pub weight_history: WeightHistory,
    pub sleep_data: BTreeMap<String, f64>,
    pub water_data: BTreeMap<String, f64>,
    pub last_backup: Option<String>,
    pub data_version: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            fuel_date: None,
            custom_foods: Vec::new(),
            meals: BTreeMap::new(),
            daily_plan: None,
            selected_muscle: None,
            active_tab: "dashboard".to_string(),
            workout_data: BTreeMap::new(),
            workout_tasks: BTreeMap::new(),
            exercise_history: BTreeMap::new(),
            mental_progress: MentalProgress::default(),
            body_measurements: BodyMeasurements::default(),
            streak: Streak::default(),
            weight_history: WeightHistory::new(),
            sleep_data: BTreeMap::new(),
            water_data: BTreeMap::new(),
            last_backup: None,
            data_version: None,
        }
    }
}

impl AppState {
    pub fn meals_on(&self, date: &str) -> &[MealEntry] {
        self.meals.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tasks_on(&self, date: &str) -> &[String] {
        self.workout_tasks
            .get(date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
