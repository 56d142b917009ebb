use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::nutrition::catalog::{require, FoodLookup};
use crate::nutrition::food_override::apply_food_overrides;
use crate::nutrition::meal_override::apply_meal_overrides;
use crate::nutrition::model::{Diet, FoodOverride, Meal, MealOverride};
use crate::nutrition::vector::{
    scale_macros, scale_micronutrients, MacroVector, MicronutrientVector,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveEntry {
    /// Slot in the stored meal; removed slots leave gaps.
    pub food_index: usize,
    pub food_id: String,
    pub food_name: String,
    pub quantity: String,
    pub grams: f64,
    pub macros: MacroVector,
    pub micronutrients: MicronutrientVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveMeal {
    pub meal_index: usize,
    pub name: String,
    pub time: Option<String>,
    pub entries: Vec<EffectiveEntry>,
    pub totals: MacroVector,
    pub micronutrients: MicronutrientVector,
    #[serde(skip)]
    pub(crate) raw_totals: MacroVector,
    #[serde(skip)]
    pub(crate) raw_micronutrients: MicronutrientVector,
}

impl EffectiveMeal {
    /// Unrounded totals, for further aggregation.
    pub fn raw_totals(&self) -> MacroVector {
        self.raw_totals
    }

    pub fn raw_micronutrients(&self) -> MicronutrientVector {
        self.raw_micronutrients
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationResult {
    pub diet_id: Uuid,
    pub meals: Vec<EffectiveMeal>,
    pub totals: MacroVector,
    pub micronutrients: MicronutrientVector,
    #[serde(skip)]
    pub(crate) raw_totals: MacroVector,
    #[serde(skip)]
    pub(crate) raw_micronutrients: MicronutrientVector,
}

impl RecalculationResult {
    pub fn raw_totals(&self) -> MacroVector {
        self.raw_totals
    }

    pub fn raw_micronutrients(&self) -> MicronutrientVector {
        self.raw_micronutrients
    }
}

fn check_diet(diet_id: Uuid, other: Uuid, what: &str, meal_index: usize) -> EngineResult<()> {
    if diet_id != other {
        return Err(EngineError::validation(format!(
            "{what} for meal {meal_index} belongs to diet {other}, not {diet_id}"
        )));
    }
    Ok(())
}

/// Sums a meal whose overrides are already applied.
pub fn summarize_meal<L: FoodLookup + ?Sized>(
    meal: &Meal,
    meal_index: usize,
    foods: &L,
) -> EngineResult<EffectiveMeal> {
    let mut entries = Vec::with_capacity(meal.entries.len());
    let mut raw_totals = MacroVector::ZERO;
    let mut raw_micronutrients = MicronutrientVector::ZERO;

    for (food_index, entry) in meal.entries.iter().enumerate() {
        if !entry.active {
            continue;
        }
        let food = require(foods, &entry.food_id, meal_index, food_index)?;
        if !entry.grams.is_finite() || entry.grams < 0.0 {
            return Err(EngineError::validation(format!(
                "meal {meal_index} entry {food_index} has invalid grams {}",
                entry.grams
            )));
        }
        let macros = scale_macros(food, entry.grams);
        let micros = scale_micronutrients(food, entry.grams);
        raw_totals += macros;
        raw_micronutrients += micros;
        entries.push(EffectiveEntry {
            food_index,
            food_id: food.id.clone(),
            food_name: food.name.clone(),
            quantity: entry.quantity.clone(),
            grams: entry.grams,
            macros: macros.rounded(),
            micronutrients: micros.rounded(),
        });
    }

    Ok(EffectiveMeal {
        meal_index,
        name: meal.name.clone(),
        time: meal.time.clone(),
        entries,
        totals: raw_totals.rounded(),
        micronutrients: raw_micronutrients.rounded(),
        raw_totals,
        raw_micronutrients,
    })
}

/// Produces the current version of every meal in `diet`.
///
/// Swaps are applied first, then structural edits, then every active entry is
/// priced from its food. Totals are summed unrounded and rounded once. The
/// diet itself is only borrowed, so this can run on every read or to preview
/// edits that are not persisted yet.
#[instrument(skip_all, fields(diet_id = %diet.id, meals = diet.meals.len()))]
pub fn recalculate_meals<L: FoodLookup + ?Sized>(
    diet: &Diet,
    food_overrides: &[FoodOverride],
    meal_overrides: &[MealOverride],
    foods: &L,
) -> EngineResult<RecalculationResult> {
    for o in food_overrides {
        check_diet(diet.id, o.diet_id, "food override", o.meal_index)?;
    }
    for o in meal_overrides {
        check_diet(diet.id, o.diet_id, "meal override", o.meal_index)?;
        if o.meal_index >= diet.meals.len() {
            debug!(meal_index = o.meal_index, "ignoring meal override for missing meal");
        }
    }

    let mut meals = Vec::with_capacity(diet.meals.len());
    let mut raw_totals = MacroVector::ZERO;
    let mut raw_micronutrients = MicronutrientVector::ZERO;

    for (meal_index, meal) in diet.meals.iter().enumerate() {
        let swapped = apply_food_overrides(meal, meal_index, food_overrides)?;
        let edited = match meal_overrides.iter().rev().find(|o| o.meal_index == meal_index) {
            Some(o) => apply_meal_overrides(&swapped, o)?,
            None => swapped,
        };
        let effective = summarize_meal(&edited, meal_index, foods)?;
        raw_totals += effective.raw_totals;
        raw_micronutrients += effective.raw_micronutrients;
        meals.push(effective);
    }

    debug!(calories = raw_totals.calories, "diet recalculated");
    Ok(RecalculationResult {
        diet_id: diet.id,
        meals,
        totals: raw_totals.rounded(),
        micronutrients: raw_micronutrients.rounded(),
        raw_totals,
        raw_micronutrients,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::nutrition::catalog::FoodCatalog;
    use crate::nutrition::model::tests::{edit, food};
    use crate::nutrition::model::{DietStatus, MealEditRecord, MealFoodEntry};
    use time::macros::datetime;

    pub(crate) fn diet_id() -> Uuid {
        Uuid::from_u128(0x6f1c_1f9e_8a3e_4a53_9df4_1f0f_0ad0_b001)
    }

    pub(crate) fn catalog() -> FoodCatalog {
        let mut vit_c = food("laranja", 47.0);
        vit_c.micronutrients.vitamin_c = 53.0;
        [food("a", 200.0), food("b", 150.0), food("c", 250.0), vit_c]
            .into_iter()
            .collect()
    }

    pub(crate) fn diet() -> Diet {
        Diet {
            id: diet_id(),
            owner_id: Uuid::nil(),
            generated_at: datetime!(2024-03-01 08:00 UTC),
            status: DietStatus::Active,
            meals: vec![
                Meal {
                    name: "Almoço".into(),
                    time: Some("12:00".into()),
                    entries: vec![
                        MealFoodEntry::new("a", "100g", 100.0),
                        MealFoodEntry::new("b", "50g", 50.0),
                    ],
                    totals: Some(MacroVector {
                        calories: 9999.0,
                        ..MacroVector::ZERO
                    }),
                },
                Meal {
                    name: "Lanche".into(),
                    time: Some("16:00".into()),
                    entries: vec![MealFoodEntry::new("laranja", "1 unidade", 150.0)],
                    totals: None,
                },
            ],
            totals: None,
        }
    }

    fn swap_a_to_c() -> FoodOverride {
        FoodOverride {
            diet_id: diet_id(),
            meal_index: 0,
            food_index: 0,
            original_food_id: Some("a".into()),
            new_food_id: "c".into(),
            new_grams: 80.0,
        }
    }

    #[test]
    fn raw_totals_without_overrides() {
        let r = recalculate_meals(&diet(), &[], &[], &catalog()).unwrap();
        assert_eq!(r.meals[0].totals.calories, 275.0);
        // 150g of orange at 47 kcal/100g is 70.5 kcal
        assert_eq!(r.meals[1].totals.calories, 71.0);
        assert!((r.raw_totals().calories - 345.5).abs() < 1e-9);
        assert_eq!(r.totals.calories, 346.0);
        assert!((r.micronutrients.vitamin_c - 79.5).abs() < 1e-9);
    }

    #[test]
    fn swap_preserves_meal_calories() {
        let r = recalculate_meals(&diet(), &[swap_a_to_c()], &[], &catalog()).unwrap();
        let lunch = &r.meals[0];
        assert_eq!(lunch.entries[0].food_id, "c");
        assert_eq!(lunch.entries[0].quantity, "80g");
        assert_eq!(lunch.entries[0].macros.calories, 200.0);
        assert_eq!(lunch.totals.calories, 275.0);
    }

    #[test]
    fn meal_edits_apply_after_swaps() {
        let remove_b = MealOverride {
            diet_id: diet_id(),
            meal_index: 0,
            edits: vec![MealEditRecord {
                food_index: Some(1),
                ..edit("REMOVE")
            }],
        };
        let r = recalculate_meals(&diet(), &[swap_a_to_c()], &[remove_b], &catalog()).unwrap();
        let lunch = &r.meals[0];
        assert_eq!(lunch.entries.len(), 1);
        assert_eq!(lunch.entries[0].food_index, 0);
        assert_eq!(lunch.totals.calories, 200.0);
    }

    #[test]
    fn unknown_food_fails_with_its_id() {
        let mut d = diet();
        d.meals[1].entries.push(MealFoodEntry::new("kiwi", "1 unidade", 70.0));
        let err = recalculate_meals(&d, &[], &[], &catalog()).unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                food_id: "kiwi".into(),
                meal_index: 1,
                food_index: 1
            }
        );
    }

    #[test]
    fn removed_entries_do_not_need_a_known_food() {
        let mut d = diet();
        let mut gone = MealFoodEntry::new("kiwi", "1 unidade", 70.0);
        gone.active = false;
        d.meals[1].entries.push(gone);
        assert!(recalculate_meals(&d, &[], &[], &catalog()).is_ok());
    }

    #[test]
    fn overrides_from_another_diet_are_rejected() {
        let mut o = swap_a_to_c();
        o.diet_id = Uuid::nil();
        let err = recalculate_meals(&diet(), &[o], &[], &catalog()).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn input_diet_is_not_mutated_and_output_is_deterministic() {
        let d = diet();
        let before = d.clone();
        let a = recalculate_meals(&d, &[swap_a_to_c()], &[], &catalog()).unwrap();
        let b = recalculate_meals(&d, &[swap_a_to_c()], &[], &catalog()).unwrap();
        assert_eq!(d, before);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn stored_totals_are_ignored() {
        let r = recalculate_meals(&diet(), &[], &[], &catalog()).unwrap();
        assert_ne!(r.meals[0].totals.calories, 9999.0);
    }

    #[test]
    fn rounding_happens_once_at_the_boundary() {
        let mut d = diet();
        d.meals[0].entries = vec![
            MealFoodEntry::new("b", "33g", 33.0),
            MealFoodEntry::new("b", "33g", 33.0),
            MealFoodEntry::new("b", "33g", 33.0),
        ];
        let r = recalculate_meals(&d, &[], &[], &catalog()).unwrap();
        let lunch = &r.meals[0];
        // 49.5 kcal per entry displays as 50, but the meal is 148.5 -> 149, not 150.
        assert_eq!(lunch.entries[0].macros.calories, 50.0);
        assert_eq!(lunch.totals.calories, 149.0);
    }
}
