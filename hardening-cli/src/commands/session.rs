use hardening_core::models::{AppState, MENTAL_PHASES};
use hardening_core::state::{Action, ActionKind, LoggingMiddleware, Store, ValidationMiddleware};
use hardening_core::{load_state, save_state, ExerciseCatalog, FileStorage, SanitizeContext};

use crate::config::Config;

/// State loaded from the data directory, changed through a [`Store`] and
/// written back with [`Session::save`].
pub struct Session {
    storage: FileStorage,
    store: Store,
}

impl Session {
    pub async fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = FileStorage::new(config.data_dir.value.clone());
        let catalog = config.catalog();
        let ctx = SanitizeContext::new(catalog.clone())
            .with_default_weight(config.default_weight.value);
        let state = load_state(&storage, &ctx).await?;
        tracing::debug!(data_dir = %config.data_dir.value.display(), "Loaded state");

        let store = Store::with_root_reducer(state);
        store
            .add_middleware(LoggingMiddleware)
            .add_middleware(validation(catalog));
        Ok(Self { storage, store })
    }

    pub fn dispatch(&self, action: Action) -> Result<(), Box<dyn std::error::Error>> {
        self.store.dispatch(action)?;
        Ok(())
    }

    pub fn state(&self) -> AppState {
        self.store.get_state()
    }

    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        save_state(&self.storage, &self.store.get_state()).await?;
        tracing::debug!(data_dir = %self.storage.data_dir().display(), "Saved state");
        Ok(())
    }
}

fn in_range(value: f64, min: f64, max: f64, what: &str) -> Result<(), String> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be between {} and {}, got {}", what, min, max, value))
    }
}

/// Rejects user input the sanitizers would otherwise clamp or drop.
fn validation(catalog: ExerciseCatalog) -> ValidationMiddleware {
    let tasks = catalog.clone();
    ValidationMiddleware::new()
        .rule("SAVE_WEIGHT", |action, _| match &action.kind {
            ActionKind::SaveWeight { weight, .. } => {
                in_range(*weight, 20.0, 500.0, "Weight").map(|_| action)
            }
            _ => Ok(action),
        })
        .rule("SET_SLEEP", |action, _| match &action.kind {
            ActionKind::SetSleep { hours, .. } => {
                in_range(*hours, 0.0, 24.0, "Sleep hours").map(|_| action)
            }
            _ => Ok(action),
        })
        .rule("ADD_WATER", |action, state| match &action.kind {
            ActionKind::AddWater { cups, date } => {
                let total = state.water_data.get(date).copied().unwrap_or(0.0) + cups;
                in_range(*cups, 0.0, 50.0, "Cups")?;
                in_range(total, 0.0, 50.0, "Daily water").map(|_| action)
            }
            _ => Ok(action),
        })
        .rule("ADD_MEAL", |action, _| match &action.kind {
            ActionKind::AddMeal { meal, .. } if meal.name.trim().is_empty() => {
                Err("Meal name cannot be empty".to_string())
            }
            ActionKind::AddMeal { meal, .. } => {
                in_range(meal.cal, 0.0, 20_000.0, "Calories").map(|_| action)
            }
            _ => Ok(action),
        })
        .rule("TOGGLE_TASK", move |action, _| match &action.kind {
            ActionKind::ToggleTask { task_id, .. } if !tasks.contains(task_id) => {
                Err(format!("Unknown exercise '{}'", task_id))
            }
            _ => Ok(action),
        })
        .rule("LOG_SET", move |action, _| match &action.kind {
            ActionKind::LogSet { task_id, .. } if !catalog.contains(task_id) => {
                Err(format!("Unknown exercise '{}'", task_id))
            }
            ActionKind::LogSet { reps, weight, .. } => {
                in_range(*reps, 1.0, 10_000.0, "Reps")?;
                in_range(*weight, 0.0, 10_000.0, "Weight").map(|_| action)
            }
            _ => Ok(action),
        })
        .rule("COMPLETE_MENTAL_PHASE", |action, _| match &action.kind {
            ActionKind::CompleteMentalPhase(phase) if !(1..=MENTAL_PHASES).contains(phase) => {
                Err(format!("Phase must be between 1 and {}", MENTAL_PHASES))
            }
            _ => Ok(action),
        })
}
