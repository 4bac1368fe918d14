use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::StateError;
use crate::models::{
    AppState, BodyMeasurements, CustomFood, DailyPlan, ExerciseHistoryEntry, MealEntry,
    MeasurementEntry, Streak, WorkoutDay,
};

/// Fields of [`MentalProgress`](crate::models::MentalProgress) to overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentalProgressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_phases: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_practice: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_practice_date: Option<String>,
}

/// Every action the root reducer understands.
///
/// On the wire an action is `{ "type": "ADD_MEAL", "payload": { ... } }`.
/// Dates are `YYYY-MM-DD` strings. Timestamps are captured when the action
/// is created so reducers never read the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ActionKind {
    SetWeight(f64),
    SaveWeight {
        weight: f64,
        date: String,
    },
    SetFuelDate(Option<String>),

    AddMeal {
        meal: MealEntry,
        date: String,
    },
    DeleteMeal {
        index: usize,
        date: String,
    },
    SetMeals {
        date: String,
        meals: Vec<MealEntry>,
    },
    AddCustomFood(CustomFood),
    /// Removes the custom food at this index.
    RemoveCustomFood(usize),
    SetCustomFoods(Vec<CustomFood>),
    SetDailyPlan(Option<DailyPlan>),

    SetWorkoutTasks {
        date: String,
        tasks: Vec<String>,
    },
    ToggleTask {
        task_id: String,
        date: String,
    },
    LogSet {
        task_id: String,
        set_index: usize,
        weight: f64,
        reps: f64,
        date: String,
        timestamp: String,
    },
    SetWorkoutData {
        date: String,
        data: WorkoutDay,
    },
    SaveExerciseHistory {
        exercise_id: String,
        entry: ExerciseHistoryEntry,
    },
    SetExerciseHistory(BTreeMap<String, Vec<ExerciseHistoryEntry>>),

    UpdateMentalProgress(MentalProgressPatch),
    CompleteMentalPhase(u8),
    RecordDailyPractice {
        date: String,
        done: bool,
    },

    SaveBodyMeasurements {
        measurements: MeasurementEntry,
        date: String,
    },
    SetBodyMeasurements(BodyMeasurements),
    UpdateStreak {
        count: u32,
        last_date: Option<String>,
    },
    SetStreak(Streak),
    SetSleep {
        hours: f64,
        date: String,
    },
    AddWater {
        cups: f64,
        date: String,
    },
    SetWater {
        cups: f64,
        date: String,
    },

    SetActiveTab(String),
    SetSelectedMuscle(Option<String>),

    /// Overwrites the named top-level state fields.
    ImportData(Map<String, Value>),
    ResetState,
    RestoreState(Box<AppState>),
    SetLastBackup(Option<String>),
}

impl ActionKind {
    /// Every wire type name, in declaration order.
    pub const TYPES: [&'static str; 32] = [
        "SET_WEIGHT",
        "SAVE_WEIGHT",
        "SET_FUEL_DATE",
        "ADD_MEAL",
        "DELETE_MEAL",
        "SET_MEALS",
        "ADD_CUSTOM_FOOD",
        "REMOVE_CUSTOM_FOOD",
        "SET_CUSTOM_FOODS",
        "SET_DAILY_PLAN",
        "SET_WORKOUT_TASKS",
        "TOGGLE_TASK",
        "LOG_SET",
        "SET_WORKOUT_DATA",
        "SAVE_EXERCISE_HISTORY",
        "SET_EXERCISE_HISTORY",
        "UPDATE_MENTAL_PROGRESS",
        "COMPLETE_MENTAL_PHASE",
        "RECORD_DAILY_PRACTICE",
        "SAVE_BODY_MEASUREMENTS",
        "SET_BODY_MEASUREMENTS",
        "UPDATE_STREAK",
        "SET_STREAK",
        "SET_SLEEP",
        "ADD_WATER",
        "SET_WATER",
        "SET_ACTIVE_TAB",
        "SET_SELECTED_MUSCLE",
        "IMPORT_DATA",
        "RESET_STATE",
        "RESTORE_STATE",
        "SET_LAST_BACKUP",
    ];

    /// The wire type name.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::SetWeight(_) => "SET_WEIGHT",
            ActionKind::SaveWeight { .. } => "SAVE_WEIGHT",
            ActionKind::SetFuelDate(_) => "SET_FUEL_DATE",
            ActionKind::AddMeal { .. } => "ADD_MEAL",
            ActionKind::DeleteMeal { .. } => "DELETE_MEAL",
            ActionKind::SetMeals { .. } => "SET_MEALS",
            ActionKind::AddCustomFood(_) => "ADD_CUSTOM_FOOD",
            ActionKind::RemoveCustomFood(_) => "REMOVE_CUSTOM_FOOD",
            ActionKind::SetCustomFoods(_) => "SET_CUSTOM_FOODS",
            ActionKind::SetDailyPlan(_) => "SET_DAILY_PLAN",
            ActionKind::SetWorkoutTasks { .. } => "SET_WORKOUT_TASKS",
            ActionKind::ToggleTask { .. } => "TOGGLE_TASK",
            ActionKind::LogSet { .. } => "LOG_SET",
            ActionKind::SetWorkoutData { .. } => "SET_WORKOUT_DATA",
            ActionKind::SaveExerciseHistory { .. } => "SAVE_EXERCISE_HISTORY",
            ActionKind::SetExerciseHistory(_) => "SET_EXERCISE_HISTORY",
            ActionKind::UpdateMentalProgress(_) => "UPDATE_MENTAL_PROGRESS",
            ActionKind::CompleteMentalPhase(_) => "COMPLETE_MENTAL_PHASE",
            ActionKind::RecordDailyPractice { .. } => "RECORD_DAILY_PRACTICE",
            ActionKind::SaveBodyMeasurements { .. } => "SAVE_BODY_MEASUREMENTS",
            ActionKind::SetBodyMeasurements(_) => "SET_BODY_MEASUREMENTS",
            ActionKind::UpdateStreak { .. } => "UPDATE_STREAK",
            ActionKind::SetStreak(_) => "SET_STREAK",
            ActionKind::SetSleep { .. } => "SET_SLEEP",
            ActionKind::AddWater { .. } => "ADD_WATER",
            ActionKind::SetWater { .. } => "SET_WATER",
            ActionKind::SetActiveTab(_) => "SET_ACTIVE_TAB",
            ActionKind::SetSelectedMuscle(_) => "SET_SELECTED_MUSCLE",
            ActionKind::ImportData(_) => "IMPORT_DATA",
            ActionKind::ResetState => "RESET_STATE",
            ActionKind::RestoreState(_) => "RESTORE_STATE",
            ActionKind::SetLastBackup(_) => "SET_LAST_BACKUP",
        }
    }
}

/// Dispatch hints read by middleware.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionMeta {
    /// `Some(false)` makes the batch middleware run the action immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    pub meta: ActionMeta,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            meta: ActionMeta::default(),
        }
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.meta.batch = Some(batch);
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Parses a `{ type, payload, meta }` object.
    pub fn from_json(value: Value) -> Result<Action, StateError> {
        let Value::Object(mut object) = value else {
            return Err(StateError::MissingType);
        };
        let action_type = match object.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => return Err(StateError::MissingType),
        };
        if !ActionKind::TYPES.contains(&action_type.as_str()) {
            return Err(StateError::UnknownAction(action_type));
        }

        let meta = match object.remove("meta") {
            Some(Value::Null) | None => ActionMeta::default(),
            Some(raw) => serde_json::from_value(raw).map_err(|e| StateError::InvalidPayload {
                action: action_type.clone(),
                message: format!("meta: {}", e),
            })?,
        };

        let mut tagged = Map::new();
        tagged.insert("type".to_string(), Value::String(action_type.clone()));
        tagged.insert(
            "payload".to_string(),
            object.remove("payload").unwrap_or(Value::Null),
        );
        let kind = serde_json::from_value(Value::Object(tagged)).map_err(|e| {
            StateError::InvalidPayload {
                action: action_type,
                message: e.to_string(),
            }
        })?;

        Ok(Action { kind, meta })
    }

    /// The `{ type, payload, meta }` form.
    pub fn to_json(&self) -> Value {
        let mut value = serde_json::to_value(&self.kind).unwrap_or(Value::Null);
        if let (Value::Object(object), Some(batch)) = (&mut value, self.meta.batch) {
            object.insert("meta".to_string(), serde_json::json!({ "batch": batch }));
        }
        value
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Action::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_wire_shape() {
        let action = Action::from_json(json!({
            "type": "TOGGLE_TASK",
            "payload": { "taskId": "pushup", "date": "2024-01-15" }
        }))
        .unwrap();
        assert_eq!(
            action.kind,
            ActionKind::ToggleTask {
                task_id: "pushup".into(),
                date: "2024-01-15".into()
            }
        );
        assert_eq!(action.kind_name(), "TOGGLE_TASK");
        assert_eq!(action.meta, ActionMeta::default());
    }

    #[test]
    fn test_from_json_without_payload() {
        let reset = Action::from_json(json!({ "type": "RESET_STATE" })).unwrap();
        assert_eq!(reset.kind, ActionKind::ResetState);

        let fuel = Action::from_json(json!({ "type": "SET_FUEL_DATE" })).unwrap();
        assert_eq!(fuel.kind, ActionKind::SetFuelDate(None));
    }

    #[test]
    fn test_from_json_reads_meta() {
        let action = Action::from_json(json!({
            "type": "SET_WEIGHT",
            "payload": 70,
            "meta": { "batch": false }
        }))
        .unwrap();
        assert_eq!(action.meta.batch, Some(false));
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            Action::from_json(json!({ "payload": 1 })),
            Err(StateError::MissingType)
        ));
        assert!(matches!(
            Action::from_json(json!({ "type": 5 })),
            Err(StateError::MissingType)
        ));
        assert!(matches!(
            Action::from_json(json!("SET_WEIGHT")),
            Err(StateError::MissingType)
        ));
        assert!(matches!(
            Action::from_json(json!({ "type": "FLY" })),
            Err(StateError::UnknownAction(t)) if t == "FLY"
        ));
        assert!(matches!(
            Action::from_json(json!({ "type": "SET_WEIGHT", "payload": "heavy" })),
            Err(StateError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_to_json_round_trips() {
        let action = Action::new(ActionKind::AddWater {
            cups: 2.0,
            date: "2024-01-15".into(),
        })
        .with_batch(false);
        let value = action.to_json();
        assert_eq!(value["type"], "ADD_WATER");
        assert_eq!(value["payload"]["cups"], 2.0);
        assert_eq!(Action::from_json(value).unwrap(), action);
    }

    #[test]
    fn test_names_are_registered() {
        let samples = [
            ActionKind::SetWeight(70.0),
            ActionKind::ResetState,
            ActionKind::CompleteMentalPhase(1),
            ActionKind::ImportData(Map::new()),
        ];
        for kind in samples {
            let value = serde_json::to_value(&kind).unwrap();
            assert_eq!(value["type"], kind.name());
            assert!(ActionKind::TYPES.contains(&kind.name()));
        }
    }
}
