use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::nutrition::catalog::{require, FoodLookup};
use crate::nutrition::model::{Diet, Food, FoodOverride, Meal, MealFoodEntry};
use crate::nutrition::quantity::{parse_quantity, scale_quantity, ParsedQuantity, Unit};
use crate::nutrition::vector::calculate_equivalent_grams;

impl FoodOverride {
    /// Swap `original` (at `original_grams`) for `new_food`, keeping the energy.
    pub fn swap(
        diet_id: Uuid,
        meal_index: usize,
        food_index: usize,
        original: &Food,
        original_grams: f64,
        new_food: &Food,
    ) -> EngineResult<Self> {
        let new_grams = calculate_equivalent_grams(original, original_grams, new_food)?;
        let o = Self {
            diet_id,
            meal_index,
            food_index,
            original_food_id: Some(original.id.clone()),
            new_food_id: new_food.id.clone(),
            new_grams,
        };
        o.validate()?;
        Ok(o)
    }
}

fn grams_quantity(grams: f64) -> String {
    let q = ParsedQuantity {
        amount: grams,
        unit: Unit::Grams,
        token: "g".into(),
    };
    q.to_string()
}

fn swap_entry(entry: &MealFoodEntry, o: &FoodOverride) -> EngineResult<MealFoodEntry> {
    let quantity = if entry.grams.is_finite() && entry.grams > 0.0 {
        let parsed = parse_quantity(&entry.quantity)?;
        scale_quantity(&parsed, o.new_grams / entry.grams)
    } else {
        grams_quantity(o.new_grams)
    };
    Ok(MealFoodEntry {
        food_id: o.new_food_id.clone(),
        quantity,
        grams: o.new_grams,
        active: entry.active,
    })
}

/// Applies the swaps recorded for `meal_index` onto `meal`.
///
/// Overrides whose entry no longer exists are skipped: the meal may have been
/// edited after the swap was recorded, and old swaps must keep loading.
pub fn apply_food_overrides(
    meal: &Meal,
    meal_index: usize,
    overrides: &[FoodOverride],
) -> EngineResult<Meal> {
    // Later records replace earlier ones for the same slot.
    let mut latest: BTreeMap<usize, &FoodOverride> = BTreeMap::new();
    for o in overrides.iter().filter(|o| o.meal_index == meal_index) {
        o.validate()?;
        latest.insert(o.food_index, o);
    }

    let mut out = meal.clone();
    out.totals = None;
    for (food_index, o) in latest {
        let Some(entry) = out.entries.get_mut(food_index) else {
            debug!(
                meal_index,
                food_index,
                entries = meal.entries.len(),
                "ignoring food override for missing entry"
            );
            continue;
        };
        *entry = swap_entry(entry, o)?;
    }
    Ok(out)
}

/// Builds the override that swaps one slot of `diet` to `new_food_id`,
/// starting from the slot as currently overridden.
pub fn plan_food_swap<L: FoodLookup + ?Sized>(
    diet: &Diet,
    existing: &[FoodOverride],
    meal_index: usize,
    food_index: usize,
    new_food_id: &str,
    foods: &L,
) -> EngineResult<FoodOverride> {
    let meal = diet.meals.get(meal_index).ok_or_else(|| {
        EngineError::validation(format!("diet has no meal {meal_index}"))
    })?;
    let current = apply_food_overrides(meal, meal_index, existing)?;
    let entry = current
        .entries
        .get(food_index)
        .filter(|e| e.active)
        .ok_or_else(|| {
            EngineError::validation(format!("meal {meal_index} has no entry {food_index}"))
        })?;

    let original = require(foods, &entry.food_id, meal_index, food_index)?;
    let new_food = require(foods, new_food_id, meal_index, food_index)?;
    FoodOverride::swap(diet.id, meal_index, food_index, original, entry.grams, new_food)
}
