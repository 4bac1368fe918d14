use serde::{Deserialize, Serialize};

/// One recorded lift for an exercise. At least one field is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseHistoryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ExerciseHistoryEntry {
    pub fn new(
        weight: f64,
        reps: f64,
        date: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            weight: Some(weight),
            reps: Some(reps),
            volume: Some(weight * reps),
            date: Some(date.into()),
            timestamp: Some(timestamp.into()),
        }
    }

    /// Stored volume, or weight × reps when none was stored.
    pub fn effective_volume(&self) -> Option<f64> {
        self.volume.or(match (self.weight, self.reps) {
            (Some(w), Some(r)) => Some(w * r),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.reps.is_none()
            && self.volume.is_none()
            && self.date.is_none()
            && self.timestamp.is_none()
    }
}

/// Returns the highest-volume record, with its volume filled in.
pub fn personal_best(history: &[ExerciseHistoryEntry]) -> Option<ExerciseHistoryEntry> {
    let mut best: Option<(f64, &ExerciseHistoryEntry)> = None;
    for entry in history {
        if let Some(volume) = entry.effective_volume() {
            if volume > best.map(|(v, _)| v).unwrap_or(0.0) {
                best = Some((volume, entry));
            }
        }
    }
    best.map(|(volume, entry)| ExerciseHistoryEntry {
        volume: Some(volume),
        ..entry.clone()
    })
}
