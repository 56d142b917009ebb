use serde::{Deserialize, Serialize};

use crate::nutrition::{
    CheckIn, Diet, ExerciseRoutine, FoodOverride, Goal, MealOverride, MicroAlert,
    RecalculationResult, Sex,
};
use crate::nutrition::micros::RdaReportEntry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    pub diet: Diet,
    #[serde(default)]
    pub food_overrides: Vec<FoodOverride>,
    #[serde(default)]
    pub meal_overrides: Vec<MealOverride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateResponse {
    #[serde(flatten)]
    pub result: RecalculationResult,
    pub rda: Vec<RdaReportEntry>,
    pub alerts: Vec<MicroAlert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub diet: Diet,
    #[serde(default)]
    pub food_overrides: Vec<FoodOverride>,
    #[serde(default)]
    pub meal_overrides: Vec<MealOverride>,
    pub meal_index: usize,
    pub food_index: usize,
    pub new_food_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    #[serde(rename = "override")]
    pub food_override: FoodOverride,
    pub preview: RecalculationResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInSummaryRequest {
    pub diet: Diet,
    #[serde(default)]
    pub food_overrides: Vec<FoodOverride>,
    #[serde(default)]
    pub meal_overrides: Vec<MealOverride>,
    pub checkin: CheckIn,
    #[serde(default)]
    pub target_calories: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyTargetsRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub goal: Goal,
    #[serde(default)]
    pub exercise_calories_today: f64,
    #[serde(default)]
    pub routines: Vec<ExerciseRoutine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyTargetsResponse {
    pub bmr: f64,
    pub daily_tdee: f64,
    pub weekly_avg_tdee: f64,
    pub target_calories: f64,
    pub today_target_calories: f64,
}
