mod app_state;
mod custom_food;
mod daily_plan;
mod exercise_history;
mod meal;
mod measurement;
mod mental;
mod streak;
mod workout;

use std::collections::BTreeMap;

pub use app_state::{AppState, DEFAULT_WEIGHT};
pub use custom_food::{CustomFood, FoodKind, PortionOption};
pub use daily_plan::{DailyPlan, MealSlot, PlannedMeal};
pub use exercise_history::{personal_best, ExerciseHistoryEntry};
pub use meal::{daily_totals, FoodValues, MealEntry};
pub use measurement::{BodyMeasurements, MeasurementEntry, MEASUREMENT_HISTORY_CAP};
pub use mental::{MentalProgress, MENTAL_PHASES};
pub use streak::Streak;
pub use workout::{WorkoutDay, WorkoutSetEntry, MAX_SETS_PER_EXERCISE};

/// Date-keyed (`YYYY-MM-DD`) body weight in kg.
pub type WeightHistory = BTreeMap<String, f64>;
