//! Pure nutrition arithmetic: quantities, nutrient vectors, override
//! resolution and diet recalculation. Nothing in here performs I/O.

pub mod catalog;
pub mod checkin;
pub mod food_override;
pub mod meal_override;
pub mod micros;
pub mod model;
pub mod quantity;
pub mod recalc;
pub mod tdee;
pub mod vector;

pub use catalog::{FoodCatalog, FoodLookup};
pub use checkin::{summarize_checkin, CheckIn, CheckInSummary, MealCheck, MealStatus};
pub use food_override::{apply_food_overrides, plan_food_swap};
pub use meal_override::apply_meal_overrides;
pub use micros::{
    calculate_rda_percentages, get_micro_alerts, rda_report, AlertSeverity, MicroAlert, RdaTable,
};
pub use model::{
    Diet, DietStatus, Food, FoodOverride, Meal, MealEdit, MealEditRecord, MealFoodEntry,
    MealOverride,
};
pub use quantity::{parse_quantity, scale_quantity, ParsedQuantity, Unit};
pub use recalc::{recalculate_meals, EffectiveEntry, EffectiveMeal, RecalculationResult};
pub use tdee::{
    adjust_for_goal, calculate_bmr, calculate_daily_tdee, calculate_exercise_calories,
    calculate_weekly_avg_tdee, ExerciseRoutine, Goal, Sex,
};
pub use vector::{
    calculate_equivalent_grams, calculate_food_macros, scale_macros, sum_micronutrients,
    MacroVector, Micronutrient, MicronutrientVector,
};
