pub mod repo;

use std::collections::BTreeSet;

use crate::nutrition::FoodCatalog;

pub use repo::{FoodStore, InMemoryFoodStore, PgFoodStore};

/// Prefetches `ids` into a catalog the engine can resolve synchronously.
pub async fn load_catalog(
    store: &dyn FoodStore,
    ids: &BTreeSet<String>,
) -> anyhow::Result<FoodCatalog> {
    let ids: Vec<String> = ids.iter().cloned().collect();
    let foods = store.fetch_many(&ids).await?;
    Ok(foods.into_iter().collect())
}
