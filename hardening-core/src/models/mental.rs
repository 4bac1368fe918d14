use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of phases in the mental programme.
pub const MENTAL_PHASES: u8 = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MentalProgress {
    /// Completed phase numbers (1..=8), unique, in completion order.
    pub completed_phases: Vec<u8>,
    pub daily_practice: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_practice_date: Option<String>,
}

impl MentalProgress {
    pub fn is_phase_complete(&self, phase: u8) -> bool {
        self.completed_phases.contains(&phase)
    }

    /// Fraction of phases completed, 0.0..=1.0.
    pub fn completion(&self) -> f64 {
        self.completed_phases.len() as f64 / f64::from(MENTAL_PHASES)
    }
}
