use serde::{Deserialize, Serialize};

/// Number of past measurements kept.
pub const MEASUREMENT_HISTORY_CAP: usize = 30;

/// Body circumferences in cm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl MeasurementEntry {
    /// True if at least one circumference is present.
    pub fn has_measurement(&self) -> bool {
        self.chest.is_some() || self.arm.is_some() || self.waist.is_some() || self.leg.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyMeasurements {
    pub current: MeasurementEntry,
    pub history: Vec<MeasurementEntry>,
}

impl BodyMeasurements {
    /// Saves `entry` as the current measurement on `today`.
    ///
    /// The previous current measurement moves into history when it has a
    /// chest value and was saved on an earlier day.
    pub fn record(&self, entry: MeasurementEntry, today: &str) -> BodyMeasurements {
        let mut history = self.history.clone();
        let previous = &self.current;

        if previous.chest.is_some() && previous.saved_at.as_deref() != Some(today) {
            let last_date = history.last().and_then(|h| h.date.as_deref());
            if last_date != Some(today) {
                history.push(MeasurementEntry {
                    date: Some(previous.saved_at.clone().unwrap_or_else(|| today.to_string())),
                    saved_at: None,
                    ..previous.clone()
                });
            }
        }

        let overflow = history.len().saturating_sub(MEASUREMENT_HISTORY_CAP);
        history.drain(..overflow);

        BodyMeasurements {
            current: MeasurementEntry {
                saved_at: Some(today.to_string()),
                date: None,
                ..entry
            },
            history,
        }
    }
}
