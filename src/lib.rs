pub mod app;
pub mod config;
pub mod diets;
pub mod error;
pub mod foods;
pub mod nutrition;
pub mod state;

pub use error::{ApiError, EngineError, EngineResult};
