use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::nutrition::model::Food;

/// Closed set of tracked micronutrients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Micronutrient {
    VitaminA,
    VitaminC,
    VitaminD,
    VitaminE,
    VitaminB12,
    Folate,
    Calcium,
    Iron,
    Magnesium,
    Potassium,
    Zinc,
    Sodium,
}

impl Micronutrient {
    pub const ALL: [Micronutrient; 12] = [
        Micronutrient::VitaminA,
        Micronutrient::VitaminC,
        Micronutrient::VitaminD,
        Micronutrient::VitaminE,
        Micronutrient::VitaminB12,
        Micronutrient::Folate,
        Micronutrient::Calcium,
        Micronutrient::Iron,
        Micronutrient::Magnesium,
        Micronutrient::Potassium,
        Micronutrient::Zinc,
        Micronutrient::Sodium,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Micronutrient::VitaminA
            | Micronutrient::VitaminD
            | Micronutrient::VitaminB12
            | Micronutrient::Folate => "µg",
            _ => "mg",
        }
    }
}

/// One amount per [`Micronutrient`]. Missing keys deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicronutrientVector {
    pub vitamin_a: f64,
    pub vitamin_c: f64,
    pub vitamin_d: f64,
    pub vitamin_e: f64,
    pub vitamin_b12: f64,
    pub folate: f64,
    pub calcium: f64,
    pub iron: f64,
    pub magnesium: f64,
    pub potassium: f64,
    pub zinc: f64,
    pub sodium: f64,
}

impl MicronutrientVector {
    pub const ZERO: MicronutrientVector = MicronutrientVector {
        vitamin_a: 0.0,
        vitamin_c: 0.0,
        vitamin_d: 0.0,
        vitamin_e: 0.0,
        vitamin_b12: 0.0,
        folate: 0.0,
        calcium: 0.0,
        iron: 0.0,
        magnesium: 0.0,
        potassium: 0.0,
        zinc: 0.0,
        sodium: 0.0,
    };

    pub fn get(&self, key: Micronutrient) -> f64 {
        match key {
            Micronutrient::VitaminA => self.vitamin_a,
            Micronutrient::VitaminC => self.vitamin_c,
            Micronutrient::VitaminD => self.vitamin_d,
            Micronutrient::VitaminE => self.vitamin_e,
            Micronutrient::VitaminB12 => self.vitamin_b12,
            Micronutrient::Folate => self.folate,
            Micronutrient::Calcium => self.calcium,
            Micronutrient::Iron => self.iron,
            Micronutrient::Magnesium => self.magnesium,
            Micronutrient::Potassium => self.potassium,
            Micronutrient::Zinc => self.zinc,
            Micronutrient::Sodium => self.sodium,
        }
    }

    pub fn get_mut(&mut self, key: Micronutrient) -> &mut f64 {
        match key {
            Micronutrient::VitaminA => &mut self.vitamin_a,
            Micronutrient::VitaminC => &mut self.vitamin_c,
            Micronutrient::VitaminD => &mut self.vitamin_d,
            Micronutrient::VitaminE => &mut self.vitamin_e,
            Micronutrient::VitaminB12 => &mut self.vitamin_b12,
            Micronutrient::Folate => &mut self.folate,
            Micronutrient::Calcium => &mut self.calcium,
            Micronutrient::Iron => &mut self.iron,
            Micronutrient::Magnesium => &mut self.magnesium,
            Micronutrient::Potassium => &mut self.potassium,
            Micronutrient::Zinc => &mut self.zinc,
            Micronutrient::Sodium => &mut self.sodium,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Micronutrient) -> f64) -> Self {
        let mut out = Self::ZERO;
        for key in Micronutrient::ALL {
            *out.get_mut(key) = f(key);
        }
        out
    }

    pub fn scale(&self, ratio: f64) -> Self {
        Self::from_fn(|k| self.get(k) * ratio)
    }

    /// Rounded to one decimal place for display.
    pub fn rounded(&self) -> Self {
        Self::from_fn(|k| (self.get(k) * 10.0).round() / 10.0)
    }
}

impl Add for MicronutrientVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        sum_micronutrients(&self, &rhs)
    }
}

impl AddAssign for MicronutrientVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Key-wise sum over the full micronutrient set.
pub fn sum_micronutrients(a: &MicronutrientVector, b: &MicronutrientVector) -> MicronutrientVector {
    MicronutrientVector::from_fn(|k| a.get(k) + b.get(k))
}

/// Energy plus macronutrients, either per 100g or for an actual portion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroVector {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl MacroVector {
    pub const ZERO: MacroVector = MacroVector {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: 0.0,
    };

    pub fn scale(&self, ratio: f64) -> Self {
        Self {
            calories: self.calories * ratio,
            protein: self.protein * ratio,
            carbs: self.carbs * ratio,
            fat: self.fat * ratio,
            fiber: self.fiber * ratio,
        }
    }

    /// Whole-unit values shown to users.
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: self.protein.round(),
            carbs: self.carbs.round(),
            fat: self.fat.round(),
            fiber: self.fiber.round(),
        }
    }
}

impl Add for MacroVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
        }
    }
}

impl AddAssign for MacroVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for MacroVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Unrounded macros for `grams` of `food`; use this when aggregating.
pub fn scale_macros(food: &Food, grams: f64) -> MacroVector {
    let per_100g = food.per_100g();
    MacroVector {
        calories: per_100g.calories * grams / 100.0,
        protein: per_100g.protein * grams / 100.0,
        carbs: per_100g.carbs * grams / 100.0,
        fat: per_100g.fat * grams / 100.0,
        fiber: per_100g.fiber * grams / 100.0,
    }
}

/// Display macros for `grams` of `food`, rounded to whole units.
pub fn calculate_food_macros(food: &Food, grams: f64) -> MacroVector {
    scale_macros(food, grams).rounded()
}

pub fn scale_micronutrients(food: &Food, grams: f64) -> MicronutrientVector {
    food.micronutrients.scale(grams / 100.0)
}

/// Grams of `new_food` carrying the same energy as `original_grams` of `original`.
pub fn calculate_equivalent_grams(
    original: &Food,
    original_grams: f64,
    new_food: &Food,
) -> EngineResult<f64> {
    let divisor = new_food.calories_per_100g;
    if !divisor.is_finite() || divisor <= 0.0 {
        return Err(EngineError::validation(format!(
            "food {:?} has no calories; cannot compute an equivalent portion",
            new_food.id
        )));
    }
    if !original_grams.is_finite() || original_grams < 0.0 {
        return Err(EngineError::validation(format!(
            "invalid portion of {original_grams}g for food {:?}",
            original.id
        )));
    }
    let original_calories = original.calories_per_100g * original_grams / 100.0;
    Ok(original_calories * 100.0 / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::model::tests::food;

    #[test]
    fn food_macros_round_calories_of_scaled_portion() {
        let f = food("arroz", 130.0);
        for g in [0.0, 1.0, 33.0, 80.0, 150.0, 217.5] {
            assert_eq!(calculate_food_macros(&f, g).calories, (130.0 * g / 100.0).round());
        }
    }

    #[test]
    fn scale_macros_keeps_precision() {
        let f = food("aveia", 394.0);
        let m = scale_macros(&f, 33.0);
        assert!((m.calories - 130.02).abs() < 1e-9);
        assert_eq!(m.rounded().calories, 130.0);
    }

    #[test]
    fn equivalent_grams_preserve_calories() {
        let a = food("a", 200.0);
        let c = food("c", 250.0);
        let grams = calculate_equivalent_grams(&a, 100.0, &c).unwrap();
        assert!((grams - 80.0).abs() < 1e-9);

        for (orig, new, g) in [(120.0, 37.0, 150.0), (884.0, 52.0, 10.0), (61.0, 389.0, 75.0)] {
            let o = food("o", orig);
            let n = food("n", new);
            let eq = calculate_equivalent_grams(&o, g, &n).unwrap();
            let diff = calculate_food_macros(&n, eq).calories - calculate_food_macros(&o, g).calories;
            assert!(diff.abs() <= 1.0, "diff {diff}");
        }
    }

    #[test]
    fn equivalent_grams_rejects_zero_calorie_target() {
        let a = food("a", 200.0);
        let water = food("agua", 0.0);
        let err = calculate_equivalent_grams(&a, 100.0, &water).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
        assert!(err.to_string().contains("agua"));
    }

    #[test]
    fn zero_is_identity_for_micronutrient_sum() {
        let v = MicronutrientVector {
            vitamin_c: 12.5,
            iron: 3.0,
            sodium: 410.0,
            ..MicronutrientVector::ZERO
        };
        assert_eq!(sum_micronutrients(&MicronutrientVector::ZERO, &v), v);
        assert_eq!(sum_micronutrients(&v, &MicronutrientVector::ZERO), v);
    }

    #[test]
    fn micronutrient_sum_is_keywise() {
        let a = MicronutrientVector::from_fn(|_| 1.0);
        let b = MicronutrientVector::from_fn(|k| k as usize as f64);
        let s = a + b;
        for k in Micronutrient::ALL {
            assert_eq!(s.get(k), 1.0 + k as usize as f64);
        }
    }

    #[test]
    fn partial_micronutrient_json_is_zero_filled() {
        let v: MicronutrientVector =
            serde_json::from_str(r#"{"vitaminC": 30, "iron": 1.5}"#).unwrap();
        assert_eq!(v.vitamin_c, 30.0);
        assert_eq!(v.iron, 1.5);
        assert_eq!(v.calcium, 0.0);
    }
}
