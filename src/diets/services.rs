use std::collections::BTreeSet;

use tracing::info;

use crate::diets::dto::{
    CheckInSummaryRequest, EnergyTargetsRequest, EnergyTargetsResponse, RecalculateRequest,
    RecalculateResponse, SwapRequest, SwapResponse,
};
use crate::error::{ApiError, EngineResult};
use crate::foods::load_catalog;
use crate::nutrition::{
    adjust_for_goal, calculate_bmr, calculate_daily_tdee, calculate_weekly_avg_tdee,
    get_micro_alerts, plan_food_swap, rda_report, recalculate_meals, summarize_checkin,
    CheckInSummary, Diet, FoodCatalog, FoodOverride, MealOverride,
};
use crate::state::AppState;

/// Every food id the recalculation may need to resolve.
pub(crate) fn referenced_food_ids(
    diet: &Diet,
    food_overrides: &[FoodOverride],
    meal_overrides: &[MealOverride],
) -> BTreeSet<String> {
    let mut ids: BTreeSet<String> = diet
        .meals
        .iter()
        .flat_map(|m| m.entries.iter().map(|e| e.food_id.clone()))
        .collect();
    ids.extend(food_overrides.iter().map(|o| o.new_food_id.clone()));
    ids.extend(
        meal_overrides
            .iter()
            .flat_map(|o| o.edits.iter().filter_map(|e| e.food_id.clone())),
    );
    ids
}

async fn catalog_for(
    state: &AppState,
    diet: &Diet,
    food_overrides: &[FoodOverride],
    meal_overrides: &[MealOverride],
    extra: Option<&str>,
) -> anyhow::Result<FoodCatalog> {
    let mut ids = referenced_food_ids(diet, food_overrides, meal_overrides);
    if let Some(id) = extra {
        ids.insert(id.to_string());
    }
    load_catalog(state.foods.as_ref(), &ids).await
}

pub async fn recalculate(
    state: &AppState,
    req: RecalculateRequest,
) -> Result<RecalculateResponse, ApiError> {
    let foods = catalog_for(state, &req.diet, &req.food_overrides, &req.meal_overrides, None).await?;
    let result = recalculate_meals(&req.diet, &req.food_overrides, &req.meal_overrides, &foods)?;
    let rda = &state.config.rda;
    Ok(RecalculateResponse {
        rda: rda_report(&result.raw_micronutrients(), rda),
        alerts: get_micro_alerts(&result.raw_micronutrients(), rda),
        result,
    })
}

pub async fn plan_swap(state: &AppState, req: SwapRequest) -> Result<SwapResponse, ApiError> {
    let foods = catalog_for(
        state,
        &req.diet,
        &req.food_overrides,
        &req.meal_overrides,
        Some(&req.new_food_id),
    )
    .await?;

    let food_override = plan_food_swap(
        &req.diet,
        &req.food_overrides,
        req.meal_index,
        req.food_index,
        &req.new_food_id,
        &foods,
    )?;

    let mut overrides = req.food_overrides;
    overrides.push(food_override.clone());
    let preview = recalculate_meals(&req.diet, &overrides, &req.meal_overrides, &foods)?;

    info!(
        diet_id = %req.diet.id,
        meal_index = req.meal_index,
        food_index = req.food_index,
        new_food_id = %food_override.new_food_id,
        new_grams = food_override.new_grams,
        "food swap planned"
    );
    Ok(SwapResponse {
        food_override,
        preview,
    })
}

pub async fn checkin_summary(
    state: &AppState,
    req: CheckInSummaryRequest,
) -> Result<CheckInSummary, ApiError> {
    let foods = catalog_for(state, &req.diet, &req.food_overrides, &req.meal_overrides, None).await?;
    let effective = recalculate_meals(&req.diet, &req.food_overrides, &req.meal_overrides, &foods)?;
    Ok(summarize_checkin(&effective, &req.checkin, req.target_calories)?)
}

pub fn energy_targets(req: &EnergyTargetsRequest) -> EngineResult<EnergyTargetsResponse> {
    let bmr = calculate_bmr(req.weight_kg, req.height_cm, req.age, req.sex)?;
    let daily_tdee = calculate_daily_tdee(bmr, req.exercise_calories_today)?;
    let weekly_avg_tdee = calculate_weekly_avg_tdee(bmr, req.weight_kg, &req.routines)?;
    Ok(EnergyTargetsResponse {
        bmr,
        daily_tdee: daily_tdee.round(),
        weekly_avg_tdee: weekly_avg_tdee.round(),
        target_calories: adjust_for_goal(weekly_avg_tdee, req.goal).round(),
        today_target_calories: adjust_for_goal(daily_tdee, req.goal).round(),
    })
}
