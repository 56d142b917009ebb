use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::nutrition::vector::{Micronutrient, MicronutrientVector};

/// Below this share of the RDA a nutrient is flagged as low.
pub const LOW_RDA_THRESHOLD: f64 = 50.0;
/// Above this share of the RDA a nutrient is flagged as high.
pub const HIGH_RDA_THRESHOLD: f64 = 200.0;

/// Recommended daily amount per micronutrient, in each nutrient's unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RdaTable(pub MicronutrientVector);

impl Default for RdaTable {
    // Adult reference values.
    fn default() -> Self {
        Self(MicronutrientVector {
            vitamin_a: 900.0,
            vitamin_c: 90.0,
            vitamin_d: 15.0,
            vitamin_e: 15.0,
            vitamin_b12: 2.4,
            folate: 400.0,
            calcium: 1000.0,
            iron: 18.0,
            magnesium: 400.0,
            potassium: 3400.0,
            zinc: 11.0,
            sodium: 2000.0,
        })
    }
}

impl RdaTable {
    /// Loads a JSON object keyed by nutrient. Keys left out keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read RDA table {}", path.display()))?;
        let overrides: BTreeMap<Micronutrient, f64> = serde_json::from_str(&raw)
            .with_context(|| format!("parse RDA table {}", path.display()))?;

        let mut table = Self::default();
        for (nutrient, value) in overrides {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("RDA for {nutrient:?} must be a non-negative number");
            }
            *table.0.get_mut(nutrient) = value;
        }
        Ok(table)
    }

    pub fn get(&self, nutrient: Micronutrient) -> f64 {
        self.0.get(nutrient)
    }
}

/// Share of the RDA covered by `totals`, unclamped. Nutrients without an RDA
/// are left out.
pub fn calculate_rda_percentages(
    totals: &MicronutrientVector,
    rda: &RdaTable,
) -> BTreeMap<Micronutrient, f64> {
    Micronutrient::ALL
        .into_iter()
        .filter(|n| rda.get(*n) > 0.0)
        .map(|n| (n, totals.get(n) * 100.0 / rda.get(n)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RdaReportEntry {
    pub nutrient: Micronutrient,
    pub unit: &'static str,
    pub amount: f64,
    pub rda: f64,
    pub percentage: f64,
    /// `percentage` capped at 100 for progress bars.
    pub display_percentage: f64,
}

pub fn rda_report(totals: &MicronutrientVector, rda: &RdaTable) -> Vec<RdaReportEntry> {
    calculate_rda_percentages(totals, rda)
        .into_iter()
        .map(|(nutrient, percentage)| RdaReportEntry {
            nutrient,
            unit: nutrient.unit(),
            amount: totals.get(nutrient),
            rda: rda.get(nutrient),
            percentage,
            display_percentage: percentage.min(100.0),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroAlert {
    pub nutrient: Micronutrient,
    pub percentage: f64,
    pub severity: AlertSeverity,
}

/// Flags each nutrient outside the [`LOW_RDA_THRESHOLD`, `HIGH_RDA_THRESHOLD`] band.
pub fn get_micro_alerts(totals: &MicronutrientVector, rda: &RdaTable) -> Vec<MicroAlert> {
    calculate_rda_percentages(totals, rda)
        .into_iter()
        .filter_map(|(nutrient, percentage)| {
            let severity = if percentage < LOW_RDA_THRESHOLD {
                AlertSeverity::Low
            } else if percentage > HIGH_RDA_THRESHOLD {
                AlertSeverity::High
            } else {
                return None;
            };
            Some(MicroAlert {
                nutrient,
                percentage,
                severity,
            })
        })
        .collect()
}
