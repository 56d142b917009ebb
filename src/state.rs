use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;
use crate::foods::{FoodStore, InMemoryFoodStore, PgFoodStore};
use crate::nutrition::{Food, MicronutrientVector};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub foods: Arc<dyn FoodStore>,
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

impl AppState {
    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            config,
            foods: Arc::new(PgFoodStore::new(db)) as Arc<dyn FoodStore>,
        }
    }

    /// State backed by a small in-memory catalog instead of Postgres.
    pub fn fake() -> Self {
        fn food(id: &str, name: &str, kcal: f64, p: f64, c: f64, f: f64, fiber: f64) -> Food {
            Food {
                id: id.into(),
                name: name.into(),
                calories_per_100g: kcal,
                protein_per_100g: p,
                carbs_per_100g: c,
                fat_per_100g: f,
                fiber_per_100g: fiber,
                micronutrients: MicronutrientVector::ZERO,
                category: "test".into(),
            }
        }

        let mut laranja = food("laranja", "Laranja", 47.0, 0.9, 11.8, 0.1, 2.4);
        laranja.micronutrients.vitamin_c = 53.0;

        let store = InMemoryFoodStore::new([
            food("arroz", "Arroz branco cozido", 130.0, 2.5, 28.1, 0.2, 1.6),
            food("feijao", "Feijão carioca cozido", 76.0, 4.8, 13.6, 0.5, 8.5),
            food("frango", "Peito de frango grelhado", 160.0, 32.0, 0.0, 2.5, 0.0),
            food("batata_doce", "Batata-doce cozida", 80.0, 0.6, 18.4, 0.1, 2.2),
            food("agua", "Água", 0.0, 0.0, 0.0, 0.0, 0.0),
            laranja,
        ]);

        Self {
            config: Arc::new(AppConfig::for_tests()),
            foods: Arc::new(store) as Arc<dyn FoodStore>,
        }
    }
}
