use std::collections::{BTreeMap, HashMap};

use crate::error::{EngineError, EngineResult};
use crate::nutrition::model::Food;

/// Synchronous food resolution used while recalculating.
pub trait FoodLookup {
    fn food(&self, id: &str) -> Option<&Food>;
}

impl FoodLookup for HashMap<String, Food> {
    fn food(&self, id: &str) -> Option<&Food> {
        self.get(id)
    }
}

impl FoodLookup for BTreeMap<String, Food> {
    fn food(&self, id: &str) -> Option<&Food> {
        self.get(id)
    }
}

/// In-memory set of foods, typically prefetched for one diet.
#[derive(Debug, Clone, Default)]
pub struct FoodCatalog {
    foods: BTreeMap<String, Food>,
}

impl FoodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, food: Food) {
        self.foods.insert(food.id.clone(), food);
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl FromIterator<Food> for FoodCatalog {
    fn from_iter<I: IntoIterator<Item = Food>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for food in iter {
            catalog.insert(food);
        }
        catalog
    }
}

impl FoodLookup for FoodCatalog {
    fn food(&self, id: &str) -> Option<&Food> {
        self.foods.get(id)
    }
}

pub(crate) fn require<'a, L: FoodLookup + ?Sized>(
    foods: &'a L,
    food_id: &str,
    meal_index: usize,
    food_index: usize,
) -> EngineResult<&'a Food> {
    foods.food(food_id).ok_or_else(|| EngineError::NotFound {
        food_id: food_id.to_string(),
        meal_index,
        food_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::model::tests::food;

    #[test]
    fn catalog_resolves_by_id_and_last_insert_wins() {
        let mut catalog: FoodCatalog = [food("arroz", 130.0), food("feijao", 76.0)]
            .into_iter()
            .collect();
        catalog.insert(food("arroz", 128.0));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.food("arroz").unwrap().calories_per_100g, 128.0);
        assert!(catalog.food("batata").is_none());
    }

    #[test]
    fn require_names_missing_food() {
        let catalog = FoodCatalog::new();
        let err = require(&catalog, "tofu", 2, 3).unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                food_id: "tofu".into(),
                meal_index: 2,
                food_index: 3
            }
        );
    }
}
