use serde::{Deserialize, Serialize};

use super::meal::FoodValues;

/// A labelled serving size for portion-based foods. `ratio` scales `vals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortionOption {
    pub label: String,
    pub ratio: f64,
}

impl PortionOption {
    pub fn new(label: impl Into<String>, ratio: f64) -> Self {
        Self {
            label: label.into(),
            ratio,
        }
    }

    /// Option injected when a portion food has none.
    pub fn single_portion() -> Self {
        Self::new("1 Portion", 1.0)
    }
}

/// How a custom food is measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FoodKind {
    Portion {
        options: Vec<PortionOption>,
    },
    Piece {
        #[serde(rename = "unitName")]
        unit_name: String,
    },
    Custom {
        unit: String,
    },
}

impl FoodKind {
    pub fn name(&self) -> &'static str {
        match self {
            FoodKind::Portion { .. } => "portion",
            FoodKind::Piece { .. } => "piece",
            FoodKind::Custom { .. } => "custom",
        }
    }
}

/// A user-defined food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFood {
    pub id: u64,
    pub cat: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: FoodKind,
    pub vals: FoodValues,
}

impl CustomFood {
    pub fn new(id: u64, name: impl Into<String>, kind: FoodKind, vals: FoodValues) -> Self {
        Self {
            id,
            cat: "CUSTOM".to_string(),
            name: name.into(),
            kind,
            vals,
        }
    }
}
