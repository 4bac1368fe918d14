use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum logged sets per exercise per day.
pub const MAX_SETS_PER_EXERCISE: usize = 64;

/// One logged set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutSetEntry {
    pub weight: f64,
    pub reps: f64,
    /// Seconds, for timed exercises.
    pub duration: f64,
    pub timestamp: String,
    pub completed: bool,
}

impl WorkoutSetEntry {
    pub fn completed(weight: f64, reps: f64, timestamp: impl Into<String>) -> Self {
        Self {
            weight,
            reps,
            duration: 0.0,
            timestamp: timestamp.into(),
            completed: true,
        }
    }

    pub fn volume(&self) -> f64 {
        self.weight * self.reps
    }
}

/// Sets logged on one day, keyed by exercise id.
pub type WorkoutDay = BTreeMap<String, Vec<WorkoutSetEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_set() {
        let set = WorkoutSetEntry::completed(60.0, 8.0, "2024-01-15T10:00:00Z");
        assert!(set.completed);
        assert_eq!(set.volume(), 480.0);
        assert_eq!(set.duration, 0.0);
    }
}
