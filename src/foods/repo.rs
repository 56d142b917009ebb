use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use tracing::debug;

use crate::nutrition::{Food, MicronutrientVector};

/// Source of reference foods. Fetching is async; the engine only ever sees the
/// prefetched result.
#[async_trait]
pub trait FoodStore: Send + Sync {
    /// Returns the foods found among `ids`; missing ids are simply absent.
    async fn fetch_many(&self, ids: &[String]) -> anyhow::Result<Vec<Food>>;
}

#[derive(Debug, FromRow)]
struct FoodRow {
    id: String,
    name: String,
    calories_per_100g: f64,
    protein_per_100g: f64,
    carbs_per_100g: f64,
    fat_per_100g: f64,
    fiber_per_100g: f64,
    micronutrients: Json<MicronutrientVector>,
    category: String,
}

impl From<FoodRow> for Food {
    fn from(r: FoodRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            calories_per_100g: r.calories_per_100g,
            protein_per_100g: r.protein_per_100g,
            carbs_per_100g: r.carbs_per_100g,
            fat_per_100g: r.fat_per_100g,
            fiber_per_100g: r.fiber_per_100g,
            micronutrients: r.micronutrients.0,
            category: r.category,
        }
    }
}

#[derive(Clone)]
pub struct PgFoodStore {
    db: PgPool,
}

impl PgFoodStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FoodStore for PgFoodStore {
    async fn fetch_many(&self, ids: &[String]) -> anyhow::Result<Vec<Food>> {
        let rows = sqlx::query_as::<_, FoodRow>(
            r#"
            SELECT id, name, calories_per_100g, protein_per_100g, carbs_per_100g,
                   fat_per_100g, fiber_per_100g, micronutrients, category
            FROM foods
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.db)
        .await
        .context("fetch foods")?;
        debug!(requested = ids.len(), found = rows.len(), "foods fetched");
        Ok(rows.into_iter().map(Food::from).collect())
    }
}

/// Fixed set of foods held in memory.
#[derive(Clone, Default)]
pub struct InMemoryFoodStore {
    foods: BTreeMap<String, Food>,
}

impl InMemoryFoodStore {
    pub fn new(foods: impl IntoIterator<Item = Food>) -> Self {
        Self {
            foods: foods.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }
}

#[async_trait]
impl FoodStore for InMemoryFoodStore {
    async fn fetch_many(&self, ids: &[String]) -> anyhow::Result<Vec<Food>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.foods.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: &str) -> Food {
        Food {
            id: id.into(),
            name: id.into(),
            calories_per_100g: 100.0,
            protein_per_100g: 0.0,
            carbs_per_100g: 0.0,
            fat_per_100g: 0.0,
            fiber_per_100g: 0.0,
            micronutrients: MicronutrientVector::ZERO,
            category: String::new(),
        }
    }

    #[tokio::test]
    async fn in_memory_store_returns_only_known_ids() {
        let store = InMemoryFoodStore::new([food("arroz"), food("feijao")]);
        let found = store
            .fetch_many(&["feijao".into(), "tofu".into()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "feijao");
    }

    #[test]
    fn row_maps_to_food() {
        let row = FoodRow {
            id: "ovo".into(),
            name: "Ovo cozido".into(),
            calories_per_100g: 146.0,
            protein_per_100g: 13.3,
            carbs_per_100g: 0.6,
            fat_per_100g: 9.5,
            fiber_per_100g: 0.0,
            micronutrients: Json(MicronutrientVector {
                vitamin_b12: 1.1,
                ..MicronutrientVector::ZERO
            }),
            category: "proteina".into(),
        };
        let f = Food::from(row);
        assert_eq!(f.name, "Ovo cozido");
        assert_eq!(f.micronutrients.vitamin_b12, 1.1);
    }
}
