//! Energy expenditure and calorie targets.
//!
//! BMR uses the Mifflin-St Jeor equation (Mifflin et al., 1990):
//! `10 * weight_kg + 6.25 * height_cm - 5 * age + s`, where `s` is +5 for men
//! and -161 for women. Exercise burn uses the MET formula
//! `MET * 3.5 * weight_kg / 200` kcal per minute.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const MSJ_WEIGHT_COEF: f64 = 10.0;
const MSJ_HEIGHT_COEF: f64 = 6.25;
const MSJ_AGE_COEF: f64 = 5.0;
const MSJ_MALE_CONSTANT: f64 = 5.0;
const MSJ_FEMALE_CONSTANT: f64 = -161.0;

/// Non-exercise activity on top of BMR for a sedentary day.
pub const SEDENTARY_FACTOR: f64 = 1.2;

pub const LOSE_WEIGHT_FACTOR: f64 = 0.8;
pub const GAIN_MUSCLE_SURPLUS_KCAL: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

/// A recurring weekly exercise habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRoutine {
    #[serde(default)]
    pub name: Option<String>,
    pub met: f64,
    pub duration_minutes: f64,
    pub days_per_week: u8,
}

fn positive(value: f64, what: &str) -> EngineResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::validation(format!("{what} must be positive, got {value}")))
    }
}

fn non_negative(value: f64, what: &str) -> EngineResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::validation(format!("{what} must not be negative, got {value}")))
    }
}

pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> EngineResult<f64> {
    let weight_kg = positive(weight_kg, "weight")?;
    let height_cm = positive(height_cm, "height")?;
    if age == 0 || age > 120 {
        return Err(EngineError::validation(format!("age {age} is out of range")));
    }
    let constant = match sex {
        Sex::Male => MSJ_MALE_CONSTANT,
        Sex::Female => MSJ_FEMALE_CONSTANT,
    };
    Ok(MSJ_WEIGHT_COEF * weight_kg + MSJ_HEIGHT_COEF * height_cm - MSJ_AGE_COEF * f64::from(age)
        + constant)
}

pub fn calculate_exercise_calories(
    met: f64,
    duration_minutes: f64,
    weight_kg: f64,
) -> EngineResult<f64> {
    let met = non_negative(met, "MET")?;
    let duration_minutes = non_negative(duration_minutes, "duration")?;
    let weight_kg = positive(weight_kg, "weight")?;
    Ok(met * 3.5 * weight_kg / 200.0 * duration_minutes)
}

pub fn calculate_daily_tdee(bmr: f64, exercise_calories_today: f64) -> EngineResult<f64> {
    let bmr = positive(bmr, "BMR")?;
    let exercise = non_negative(exercise_calories_today, "exercise calories")?;
    Ok(bmr * SEDENTARY_FACTOR + exercise)
}

/// TDEE with the weekly exercise volume spread evenly over seven days.
pub fn calculate_weekly_avg_tdee(
    bmr: f64,
    weight_kg: f64,
    routines: &[ExerciseRoutine],
) -> EngineResult<f64> {
    let mut weekly = 0.0;
    for r in routines {
        if r.days_per_week > 7 {
            return Err(EngineError::validation(format!(
                "routine {:?} repeats {} days per week",
                r.name.as_deref().unwrap_or("unnamed"),
                r.days_per_week
            )));
        }
        let session = calculate_exercise_calories(r.met, r.duration_minutes, weight_kg)?;
        weekly += session * f64::from(r.days_per_week);
    }
    calculate_daily_tdee(bmr, weekly / 7.0)
}

pub fn adjust_for_goal(tdee: f64, goal: Goal) -> f64 {
    match goal {
        Goal::LoseWeight => tdee * LOSE_WEIGHT_FACTOR,
        Goal::Maintain => tdee,
        Goal::GainMuscle => tdee + GAIN_MUSCLE_SURPLUS_KCAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_matches_mifflin_st_jeor() {
        // 700 + 1093.75 - 150 + 5
        assert_eq!(calculate_bmr(70.0, 175.0, 30, Sex::Male).unwrap(), 1648.75);
        // 600 + 1031.25 - 125 - 161
        assert_eq!(calculate_bmr(60.0, 165.0, 25, Sex::Female).unwrap(), 1345.25);
    }

    #[test]
    fn bmr_rejects_invalid_body_data() {
        assert!(calculate_bmr(0.0, 175.0, 30, Sex::Male).is_err());
        assert!(calculate_bmr(70.0, f64::NAN, 30, Sex::Male).is_err());
        assert!(calculate_bmr(70.0, 175.0, 0, Sex::Female).is_err());
    }

    #[test]
    fn exercise_calories_follow_met_formula() {
        // 8 MET * 3.5 * 70 / 200 = 9.8 kcal/min
        let kcal = calculate_exercise_calories(8.0, 30.0, 70.0).unwrap();
        assert!((kcal - 294.0).abs() < 1e-9);
        assert_eq!(calculate_exercise_calories(8.0, 0.0, 70.0).unwrap(), 0.0);
        assert!(calculate_exercise_calories(-1.0, 30.0, 70.0).is_err());
    }

    #[test]
    fn daily_tdee_adds_exercise_to_sedentary_baseline() {
        let tdee = calculate_daily_tdee(1500.0, 300.0).unwrap();
        assert!((tdee - 2100.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_average_spreads_sessions_over_seven_days() {
        let routines = [
            ExerciseRoutine {
                name: Some("corrida".into()),
                met: 8.0,
                duration_minutes: 30.0,
                days_per_week: 3,
            },
            ExerciseRoutine {
                name: None,
                met: 4.0,
                duration_minutes: 60.0,
                days_per_week: 1,
            },
        ];
        // (3 * 294 + 294) / 7 = 168
        let tdee = calculate_weekly_avg_tdee(1500.0, 70.0, &routines).unwrap();
        assert!((tdee - (1800.0 + 168.0)).abs() < 1e-9);

        assert!((calculate_weekly_avg_tdee(1500.0, 70.0, &[]).unwrap() - 1800.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_average_rejects_impossible_frequency() {
        let routines = [ExerciseRoutine {
            name: Some("natação".into()),
            met: 6.0,
            duration_minutes: 45.0,
            days_per_week: 8,
        }];
        let err = calculate_weekly_avg_tdee(1500.0, 70.0, &routines).unwrap_err();
        assert!(err.to_string().contains("natação"));
    }

    #[test]
    fn goal_adjustments() {
        assert_eq!(adjust_for_goal(2000.0, Goal::LoseWeight), 1600.0);
        assert_eq!(adjust_for_goal(2000.0, Goal::Maintain), 2000.0);
        assert_eq!(adjust_for_goal(2000.0, Goal::GainMuscle), 2300.0);
        let goal: Goal = serde_json::from_str("\"GAIN_MUSCLE\"").unwrap();
        assert_eq!(goal, Goal::GainMuscle);
    }
}
