use crate::error::{EngineError, EngineResult};
use crate::nutrition::model::{Meal, MealEdit, MealFoodEntry, MealOverride};
use crate::nutrition::quantity::parse_quantity;

fn add_entry(food_id: &str, quantity: &str, grams: Option<f64>) -> EngineResult<MealFoodEntry> {
    let parsed = parse_quantity(quantity)?;
    let grams = if parsed.unit.is_mass() {
        parsed.to_grams(None)?
    } else {
        match grams {
            Some(g) if g.is_finite() && g > 0.0 => g,
            _ => {
                return Err(EngineError::validation(format!(
                    "added food {food_id:?} with quantity {quantity:?} needs its weight in grams"
                )))
            }
        }
    };
    Ok(MealFoodEntry::new(food_id, parsed.to_string(), grams))
}

fn modify_entry(entry: &MealFoodEntry, quantity: &str) -> EngineResult<MealFoodEntry> {
    let parsed = parse_quantity(quantity)?;
    let grams_per_unit = parse_quantity(&entry.quantity)
        .ok()
        .filter(|old| old.unit == parsed.unit && old.amount > 0.0)
        .map(|old| entry.grams / old.amount);
    Ok(MealFoodEntry {
        food_id: entry.food_id.clone(),
        quantity: parsed.to_string(),
        grams: parsed.to_grams(grams_per_unit)?,
        active: entry.active,
    })
}

fn slot<'a>(
    meal: &'a mut Meal,
    meal_index: usize,
    food_index: usize,
) -> EngineResult<&'a mut MealFoodEntry> {
    meal.entries.get_mut(food_index).ok_or_else(|| {
        EngineError::validation(format!(
            "meal {meal_index} has no entry {food_index} to edit"
        ))
    })
}

/// Applies structural edits on top of an already swapped meal.
///
/// Removed entries stay in place, flagged inactive, so swap overrides keyed by
/// later indices still point at the same food. Cached totals are dropped.
pub fn apply_meal_overrides(meal: &Meal, meal_override: &MealOverride) -> EngineResult<Meal> {
    let meal_index = meal_override.meal_index;
    let mut out = meal.clone();
    out.totals = None;

    for record in &meal_override.edits {
        match MealEdit::try_from(record)? {
            MealEdit::Add {
                food_id,
                quantity,
                grams,
            } => out.entries.push(add_entry(&food_id, &quantity, grams)?),
            MealEdit::Remove { food_index } => {
                slot(&mut out, meal_index, food_index)?.active = false;
            }
            MealEdit::Modify {
                food_index,
                quantity,
            } => {
                let entry = slot(&mut out, meal_index, food_index)?;
                if !entry.active {
                    return Err(EngineError::validation(format!(
                        "meal {meal_index} entry {food_index} was removed and cannot be modified"
                    )));
                }
                *entry = modify_entry(entry, &quantity)?;
            }
        }
    }
    Ok(out)
}
