use serde::{Deserialize, Serialize};
use std::fmt;

/// Energy and macro values. Calories in kcal, macros in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodValues {
    pub cal: f64,
    pub prot: f64,
    pub carb: f64,
    pub fat: f64,
}

impl std::ops::Add for FoodValues {
    type Output = FoodValues;

    fn add(self, rhs: FoodValues) -> FoodValues {
        FoodValues {
            cal: self.cal + rhs.cal,
            prot: self.prot + rhs.prot,
            carb: self.carb + rhs.carb,
            fat: self.fat + rhs.fat,
        }
    }
}

/// A logged meal. Stored as a list per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealEntry {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub portion_label: String,
    pub cal: f64,
    pub prot: f64,
    pub carb: f64,
    pub fat: f64,
}

impl MealEntry {
    pub fn new(name: impl Into<String>, values: FoodValues) -> Self {
        Self {
            name: name.into(),
            amount: 1.0,
            unit: "custom".to_string(),
            portion_label: String::new(),
            cal: values.cal,
            prot: values.prot,
            carb: values.carb,
            fat: values.fat,
        }
    }

    pub fn with_amount(mut self, amount: f64, unit: impl Into<String>) -> Self {
        self.amount = amount;
        self.unit = unit.into();
        self
    }

    pub fn with_portion_label(mut self, label: impl Into<String>) -> Self {
        self.portion_label = label.into();
        self
    }

    pub fn values(&self) -> FoodValues {
        FoodValues {
            cal: self.cal,
            prot: self.prot,
            carb: self.carb,
            fat: self.fat,
        }
    }
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}) - {:.0} kcal | P {:.0}g | C {:.0}g | F {:.0}g",
            self.name, self.amount, self.unit, self.cal, self.prot, self.carb, self.fat
        )
    }
}

/// Sums the values of a day's meals.
pub fn daily_totals(meals: &[MealEntry]) -> FoodValues {
    meals
        .iter()
        .fold(FoodValues::default(), |acc, meal| acc + meal.values())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(cal: f64, prot: f64, carb: f64, fat: f64) -> FoodValues {
        FoodValues {
            cal,
            prot,
            carb,
            fat,
        }
    }

    #[test]
    fn test_meal_entry_new() {
        let meal = MealEntry::new("Oats", values(300.0, 10.0, 50.0, 5.0));
        assert_eq!(meal.name, "Oats");
        assert_eq!(meal.cal, 300.0);
        assert_eq!(meal.unit, "custom");
    }

    #[test]
    fn test_daily_totals() {
        let meals = vec![
            MealEntry::new("A", values(300.0, 20.0, 30.0, 10.0)),
            MealEntry::new("B", values(200.0, 5.0, 40.0, 2.0)),
        ];
        assert_eq!(daily_totals(&meals), values(500.0, 25.0, 70.0, 12.0));
        assert_eq!(daily_totals(&[]), FoodValues::default());
    }

    #[test]
    fn test_meal_entry_wire_names() {
        let meal = MealEntry::new("Rice", values(100.0, 2.0, 22.0, 0.0))
            .with_portion_label("1 cup");
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["portionLabel"], "1 cup");
        assert!(json.get("portion_label").is_none());
    }

    #[test]
    fn test_meal_entry_display() {
        let meal = MealEntry::new("Test", values(300.0, 20.0, 30.0, 10.0));
        let output = format!("{}", meal);
        assert!(output.contains("Test"));
        assert!(output.contains("300 kcal"));
    }
}
