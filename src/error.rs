use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures raised by the nutrition engine.
///
/// Every variant carries the identifier that caused it so callers can point
/// the user at the offending quantity, food or meal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("cannot parse quantity {input:?}")]
    Parse { input: String },

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("food {food_id:?} not found (meal {meal_index}, entry {food_index})")]
    NotFound {
        food_id: String,
        meal_index: usize,
        food_index: usize,
    },

    // Only raised by the persistence side; the engine itself never conflicts.
    #[error("conflict: {message}")]
    Conflict { message: String },
}

impl EngineError {
    pub fn parse(input: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Parse { .. } | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Handler-level error: either a typed engine failure or an infrastructure one.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Engine(e) => (e.status(), e.to_string()),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_client_statuses() {
        assert_eq!(EngineError::parse("abc").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            EngineError::validation("bad kind").status(),
            StatusCode::BAD_REQUEST
        );
        let nf = EngineError::NotFound {
            food_id: "arroz".into(),
            meal_index: 1,
            food_index: 2,
        };
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert!(nf.to_string().contains("arroz"));
    }

    #[test]
    fn internal_errors_hide_details() {
        let res = ApiError::Internal(anyhow::anyhow!("db exploded")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
