use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Meal slots of a daily plan, in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Fuel,
    Lunch,
    PreWorkout,
    Dinner,
    Night,
}

impl MealSlot {
    pub const ALL: [MealSlot; 6] = [
        MealSlot::Breakfast,
        MealSlot::Fuel,
        MealSlot::Lunch,
        MealSlot::PreWorkout,
        MealSlot::Dinner,
        MealSlot::Night,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Fuel => "fuel",
            MealSlot::Lunch => "lunch",
            MealSlot::PreWorkout => "pre_workout",
            MealSlot::Dinner => "dinner",
            MealSlot::Night => "night",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub text: String,
    pub kcal: f64,
}

/// The meal plan generated for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: String,
    pub plan: BTreeMap<MealSlot, PlannedMeal>,
}

impl DailyPlan {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            plan: BTreeMap::new(),
        }
    }

    pub fn with_meal(mut self, slot: MealSlot, text: impl Into<String>, kcal: f64) -> Self {
        self.plan.insert(
            slot,
            PlannedMeal {
                text: text.into(),
                kcal,
            },
        );
        self
    }

    pub fn total_kcal(&self) -> f64 {
        self.plan.values().map(|m| m.kcal).sum()
    }
}
