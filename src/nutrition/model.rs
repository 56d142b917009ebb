use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::nutrition::vector::{MacroVector, MicronutrientVector};

/// Reference food, as seeded into the catalog. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: String,
    pub name: String,
    pub calories_per_100g: f64,
    #[serde(default)]
    pub protein_per_100g: f64,
    #[serde(default)]
    pub carbs_per_100g: f64,
    #[serde(default)]
    pub fat_per_100g: f64,
    #[serde(default)]
    pub fiber_per_100g: f64,
    #[serde(default)]
    pub micronutrients: MicronutrientVector,
    #[serde(default)]
    pub category: String,
}

impl Food {
    pub fn per_100g(&self) -> MacroVector {
        MacroVector {
            calories: self.calories_per_100g,
            protein: self.protein_per_100g,
            carbs: self.carbs_per_100g,
            fat: self.fat_per_100g,
            fiber: self.fiber_per_100g,
        }
    }
}

fn active_default() -> bool {
    true
}

/// A food line inside a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodEntry {
    pub food_id: String,
    pub quantity: String,
    /// Grams equivalent of `quantity`.
    pub grams: f64,
    #[serde(default = "active_default")]
    pub active: bool,
}

impl MealFoodEntry {
    pub fn new(food_id: impl Into<String>, quantity: impl Into<String>, grams: f64) -> Self {
        Self {
            food_id: food_id.into(),
            quantity: quantity.into(),
            grams,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    #[serde(default)]
    pub time: Option<String>,
    pub entries: Vec<MealFoodEntry>,
    /// Totals as persisted; the recalculator never trusts them.
    #[serde(default)]
    pub totals: Option<MacroVector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DietStatus {
    #[default]
    Active,
    Superseded,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diet {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    #[serde(default)]
    pub status: DietStatus,
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub totals: Option<MacroVector>,
}

/// A food swap on one slot of one meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodOverride {
    pub diet_id: Uuid,
    pub meal_index: usize,
    pub food_index: usize,
    #[serde(default)]
    pub original_food_id: Option<String>,
    pub new_food_id: String,
    pub new_grams: f64,
}

impl FoodOverride {
    pub fn key(&self) -> (usize, usize) {
        (self.meal_index, self.food_index)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.new_grams.is_finite() || self.new_grams <= 0.0 {
            return Err(EngineError::validation(format!(
                "override for meal {} entry {} has invalid grams {}",
                self.meal_index, self.food_index, self.new_grams
            )));
        }
        if self.new_food_id.trim().is_empty() {
            return Err(EngineError::validation(format!(
                "override for meal {} entry {} has no food id",
                self.meal_index, self.food_index
            )));
        }
        Ok(())
    }
}

/// Edit record as persisted. `kind` is kept loose so unknown kinds surface as
/// validation failures instead of deserialization errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEditRecord {
    pub kind: String,
    #[serde(default)]
    pub food_index: Option<usize>,
    #[serde(default)]
    pub food_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub grams: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MealEdit {
    Add {
        food_id: String,
        quantity: String,
        grams: Option<f64>,
    },
    Remove {
        food_index: usize,
    },
    Modify {
        food_index: usize,
        quantity: String,
    },
}

impl TryFrom<&MealEditRecord> for MealEdit {
    type Error = EngineError;

    fn try_from(r: &MealEditRecord) -> EngineResult<Self> {
        let missing = |field: &str| {
            EngineError::validation(format!("{} edit is missing {field}", r.kind))
        };
        match r.kind.to_ascii_uppercase().as_str() {
            "ADD" => Ok(MealEdit::Add {
                food_id: r.food_id.clone().ok_or_else(|| missing("foodId"))?,
                quantity: r.quantity.clone().ok_or_else(|| missing("quantity"))?,
                grams: r.grams,
            }),
            "REMOVE" => Ok(MealEdit::Remove {
                food_index: r.food_index.ok_or_else(|| missing("foodIndex"))?,
            }),
            "MODIFY" => Ok(MealEdit::Modify {
                food_index: r.food_index.ok_or_else(|| missing("foodIndex"))?,
                quantity: r.quantity.clone().ok_or_else(|| missing("quantity"))?,
            }),
            other => Err(EngineError::validation(format!(
                "unknown meal edit kind {other:?}"
            ))),
        }
    }
}

/// Structural edits on one meal, applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealOverride {
    pub diet_id: Uuid,
    pub meal_index: usize,
    pub edits: Vec<MealEditRecord>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn food(id: &str, kcal: f64) -> Food {
        Food {
            id: id.to_string(),
            name: id.to_string(),
            calories_per_100g: kcal,
            protein_per_100g: kcal / 20.0,
            carbs_per_100g: kcal / 10.0,
            fat_per_100g: kcal / 50.0,
            fiber_per_100g: 1.0,
            micronutrients: MicronutrientVector::ZERO,
            category: "test".into(),
        }
    }

    pub(crate) fn edit(kind: &str) -> MealEditRecord {
        MealEditRecord {
            kind: kind.to_string(),
            food_index: None,
            food_id: None,
            quantity: None,
            grams: None,
        }
    }

    #[test]
    fn diet_deserializes_from_document_json() {
        let diet: Diet = serde_json::from_value(serde_json::json!({
            "id": "6f1c1f9e-8a3e-4a53-9df4-1f0f0ad0b001",
            "ownerId": "6f1c1f9e-8a3e-4a53-9df4-1f0f0ad0b002",
            "generatedAt": "2024-03-01T08:00:00Z",
            "meals": [{
                "name": "Café da manhã",
                "time": "07:30",
                "entries": [{ "foodId": "pao", "quantity": "2 fatias", "grams": 50 }]
            }]
        }))
        .unwrap();
        assert_eq!(diet.status, DietStatus::Active);
        assert!(diet.meals[0].entries[0].active);
        assert_eq!(diet.meals[0].totals, None);
    }

    #[test]
    fn edit_records_validate_into_typed_edits() {
        let mut r = edit("remove");
        r.food_index = Some(2);
        assert_eq!(MealEdit::try_from(&r).unwrap(), MealEdit::Remove { food_index: 2 });

        let mut r = edit("MODIFY");
        r.food_index = Some(0);
        let err = MealEdit::try_from(&r).unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn unknown_edit_kind_is_a_validation_error() {
        let err = MealEdit::try_from(&edit("RENAME")).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn override_validation_rejects_bad_grams() {
        let o = FoodOverride {
            diet_id: Uuid::nil(),
            meal_index: 0,
            food_index: 0,
            original_food_id: None,
            new_food_id: "x".into(),
            new_grams: f64::NAN,
        };
        assert!(o.validate().is_err());
        assert!(FoodOverride { new_grams: 10.0, ..o }.validate().is_ok());
    }
}
