//! System Hardening Core Library
//!
//! Data model, sanitizers, storage and state management for the System
//! Hardening Protocol tracker.

pub mod backup;
pub mod catalog;
pub mod hydrate;
pub mod keys;
pub mod models;
pub mod sanitize;
pub mod state;
pub mod storage;

pub use backup::{
    BackupError, BackupExport, BackupService, BackupStatus, ImportOutcome, ImportValidation,
    BACKUP_WARNING_DAYS, DEFAULT_USER,
};
pub use catalog::ExerciseCatalog;
pub use hydrate::{load_state, save_state};
pub use keys::StorageKey;
pub use models::{
    AppState, BodyMeasurements, CustomFood, DailyPlan, ExerciseHistoryEntry, FoodKind, FoodValues,
    MealEntry, MeasurementEntry, MentalProgress, Streak, WorkoutDay, WorkoutSetEntry,
};
pub use sanitize::{sanitize_entry, SanitizeContext};
pub use state::{Action, ActionKind, Dispatched, StateError, Store};
pub use storage::{FileStorage, MemoryStorage, StorageAdapter, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
