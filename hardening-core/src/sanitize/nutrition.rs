use serde_json::Value;

use super::{
    field, keep_tail, safe_number_opt, safe_string, sanitize_date_string, to_safe_number,
    SanitizeContext,
};
use crate::models::{
    CustomFood, DailyPlan, FoodKind, FoodValues, MealEntry, MealSlot, PlannedMeal, PortionOption,
};

/// Number of custom foods kept, most recent last.
pub const CUSTOM_FOODS_CAP: usize = 300;

const MAX_PORTION_OPTIONS: usize = 8;
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn food_values(value: &Value) -> FoodValues {
    FoodValues {
        cal: to_safe_number(field(value, "cal"), 0.0, 0.0, 20_000.0),
        prot: to_safe_number(field(value, "prot"), 0.0, 0.0, 1000.0),
        carb: to_safe_number(field(value, "carb"), 0.0, 0.0, 1000.0),
        fat: to_safe_number(field(value, "fat"), 0.0, 0.0, 1000.0),
    }
}

pub fn meal_entry(value: &Value) -> Option<MealEntry> {
    if !value.is_object() {
        return None;
    }
    let values = food_values(value);
    Some(MealEntry {
        name: safe_string(field(value, "name"), 120, ""),
        amount: to_safe_number(field(value, "amount"), 0.0, 0.0, 10_000.0),
        unit: safe_string(field(value, "unit"), 32, "custom"),
        portion_label: safe_string(field(value, "portionLabel"), 80, ""),
        cal: values.cal,
        prot: values.prot,
        carb: values.carb,
        fat: values.fat,
    })
}

pub fn meal_log(value: &Value) -> Vec<MealEntry> {
    value
        .as_array()
        .map(|entries| entries.iter().filter_map(meal_entry).collect())
        .unwrap_or_default()
}

/// A portion option needs a label and a ratio in `0.01..=100`.
pub fn custom_food_option(value: &Value) -> Option<PortionOption> {
    if !value.is_object() {
        return None;
    }
    let label = safe_string(field(value, "label"), 80, "");
    let ratio = safe_number_opt(field(value, "ratio"), 0.01, 100.0)?;
    if label.is_empty() {
        return None;
    }
    Some(PortionOption { label, ratio })
}

fn food_kind(value: &Value) -> FoodKind {
    match field(value, "type").as_str() {
        Some("portion") => {
            let mut options: Vec<PortionOption> = field(value, "options")
                .as_array()
                .map(|raw| raw.iter().filter_map(custom_food_option).collect())
                .unwrap_or_default();
            options.truncate(MAX_PORTION_OPTIONS);
            if options.is_empty() {
                options.push(PortionOption::single_portion());
            }
            FoodKind::Portion { options }
        }
        Some("piece") => FoodKind::Piece {
            unit_name: safe_string(field(value, "unitName"), 24, "Piece"),
        },
        _ => FoodKind::Custom {
            unit: safe_string(field(value, "unit"), 16, "custom"),
        },
    }
}

/// Returns `None` for non-objects and for foods without a name.
pub fn custom_food(value: &Value) -> Option<CustomFood> {
    if !value.is_object() {
        return None;
    }
    let name = safe_string(field(value, "name"), 120, "");
    if name.is_empty() {
        return None;
    }
    Some(CustomFood {
        id: to_safe_number(field(value, "id"), 0.0, 0.0, MAX_SAFE_INTEGER).trunc() as u64,
        cat: safe_string(field(value, "cat"), 24, "CUSTOM"),
        name,
        kind: food_kind(value),
        vals: food_values(field(value, "vals")),
    })
}

pub fn custom_foods(value: &Value) -> Vec<CustomFood> {
    let foods = value
        .as_array()
        .map(|raw| raw.iter().filter_map(custom_food).collect())
        .unwrap_or_default();
    keep_tail(foods, CUSTOM_FOODS_CAP)
}

/// A planned meal needs text or a non-zero calorie count.
pub fn daily_plan_meal(value: &Value) -> Option<PlannedMeal> {
    if !value.is_object() {
        return None;
    }
    let text = safe_string(field(value, "text"), 140, "");
    let kcal = to_safe_number(field(value, "kcal"), 0.0, 0.0, 5000.0);
    if text.is_empty() && kcal == 0.0 {
        return None;
    }
    Some(PlannedMeal { text, kcal })
}

/// Accepts both `{date, plan: {slot: meal}}` and a bare `{slot: meal}` map.
/// The date falls back to the context's today.
pub fn daily_plan(value: &Value, ctx: &SanitizeContext) -> DailyPlan {
    let source = match value.get("plan") {
        Some(plan) if plan.is_object() => plan,
        _ => value,
    };
    let date = Some(sanitize_date_string(field(value, "date")))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| ctx.today_str());

    let mut plan = DailyPlan::new(date);
    for slot in MealSlot::ALL {
        if let Some(meal) = daily_plan_meal(field(source, slot.key())) {
            plan.plan.insert(slot, meal);
        }
    }
    plan
}
