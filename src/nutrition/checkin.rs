use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::nutrition::recalc::RecalculationResult;
use crate::nutrition::vector::MacroVector;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MealStatus {
    Completed,
    Partial { fraction: f64 },
    Skipped,
}

impl MealStatus {
    fn fraction(self) -> EngineResult<f64> {
        match self {
            MealStatus::Completed => Ok(1.0),
            MealStatus::Skipped => Ok(0.0),
            MealStatus::Partial { fraction } if (0.0..=1.0).contains(&fraction) => Ok(fraction),
            MealStatus::Partial { fraction } => Err(EngineError::validation(format!(
                "partial meal fraction {fraction} must be between 0 and 1"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealCheck {
    pub meal_index: usize,
    #[serde(flatten)]
    pub status: MealStatus,
}

/// What the user reported eating on one day of a diet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub diet_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meals: Vec<MealCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInSummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub planned: MacroVector,
    pub consumed: MacroVector,
    /// Consumed calories as a percentage of planned calories.
    pub adherence: f64,
    /// Consumed minus target calories, when a target is known.
    pub target_delta: Option<f64>,
}

/// Compares a check-in against the effective diet. Meals without a check are
/// counted as skipped.
pub fn summarize_checkin(
    effective: &RecalculationResult,
    checkin: &CheckIn,
    target_calories: Option<f64>,
) -> EngineResult<CheckInSummary> {
    if checkin.diet_id != effective.diet_id {
        return Err(EngineError::validation(format!(
            "check-in for diet {} compared against diet {}",
            checkin.diet_id, effective.diet_id
        )));
    }

    let mut fractions = vec![0.0; effective.meals.len()];
    for check in &checkin.meals {
        let slot = fractions.get_mut(check.meal_index).ok_or_else(|| {
            EngineError::validation(format!(
                "check-in references meal {} but the diet has {}",
                check.meal_index,
                effective.meals.len()
            ))
        })?;
        *slot = check.status.fraction()?;
    }

    let planned = effective.raw_totals();
    let consumed: MacroVector = effective
        .meals
        .iter()
        .zip(&fractions)
        .map(|(meal, f)| meal.raw_totals().scale(*f))
        .sum();

    let adherence = if planned.calories > 0.0 {
        consumed.calories * 100.0 / planned.calories
    } else {
        0.0
    };

    Ok(CheckInSummary {
        date: checkin.date,
        planned: planned.rounded(),
        consumed: consumed.rounded(),
        adherence: (adherence * 10.0).round() / 10.0,
        target_delta: target_calories.map(|t| (consumed.calories - t).round()),
    })
}
