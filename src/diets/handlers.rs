use axum::{extract::State, routing::post, Json, Router};
use tracing::{instrument, warn};

use crate::diets::dto::{
    CheckInSummaryRequest, EnergyTargetsRequest, EnergyTargetsResponse, RecalculateRequest,
    RecalculateResponse, SwapRequest, SwapResponse,
};
use crate::diets::services;
use crate::error::ApiError;
use crate::nutrition::CheckInSummary;
use crate::state::AppState;

pub fn diet_routes() -> Router<AppState> {
    Router::new()
        .route("/diets/recalculate", post(recalculate))
        .route("/diets/swap", post(swap_food))
        .route("/checkins/summary", post(checkin_summary))
}

pub fn energy_routes() -> Router<AppState> {
    Router::new().route("/energy/targets", post(energy_targets))
}

fn log_rejection(e: ApiError) -> ApiError {
    if let ApiError::Engine(inner) = &e {
        warn!(error = %inner, "request rejected");
    }
    e
}

/// POST /diets/recalculate: effective diet for a set of overrides, not persisted.
#[instrument(skip(state, body), fields(diet_id = %body.diet.id))]
pub async fn recalculate(
    State(state): State<AppState>,
    Json(body): Json<RecalculateRequest>,
) -> Result<Json<RecalculateResponse>, ApiError> {
    services::recalculate(&state, body)
        .await
        .map(Json)
        .map_err(log_rejection)
}

/// POST /diets/swap: builds the override for a food swap plus a preview.
#[instrument(skip(state, body), fields(diet_id = %body.diet.id))]
pub async fn swap_food(
    State(state): State<AppState>,
    Json(body): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, ApiError> {
    services::plan_swap(&state, body)
        .await
        .map(Json)
        .map_err(log_rejection)
}

#[instrument(skip(state, body), fields(diet_id = %body.diet.id))]
pub async fn checkin_summary(
    State(state): State<AppState>,
    Json(body): Json<CheckInSummaryRequest>,
) -> Result<Json<CheckInSummary>, ApiError> {
    services::checkin_summary(&state, body)
        .await
        .map(Json)
        .map_err(log_rejection)
}

#[instrument(skip(body))]
pub async fn energy_targets(
    Json(body): Json<EnergyTargetsRequest>,
) -> Result<Json<EnergyTargetsResponse>, ApiError> {
    services::energy_targets(&body)
        .map(Json)
        .map_err(|e| log_rejection(e.into()))
}
