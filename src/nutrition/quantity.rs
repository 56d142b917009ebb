use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// Unit family recognised in a free-form quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Grams,
    Kilograms,
    Milligrams,
    Millilitres,
    Unit,
    Slice,
    Spoon,
    Cup,
    Custom,
}

impl Unit {
    /// Mass-like units convert to grams without any per-food reference.
    pub fn is_mass(self) -> bool {
        matches!(
            self,
            Unit::Grams | Unit::Kilograms | Unit::Milligrams | Unit::Millilitres
        )
    }

    fn grams_factor(self) -> Option<f64> {
        match self {
            Unit::Grams => Some(1.0),
            Unit::Kilograms => Some(1000.0),
            Unit::Milligrams => Some(0.001),
            // Density assumed to be 1 g/ml.
            Unit::Millilitres => Some(1.0),
            _ => None,
        }
    }

    fn suffix(self) -> Option<&'static str> {
        match self {
            Unit::Grams => Some("g"),
            Unit::Kilograms => Some("kg"),
            Unit::Milligrams => Some("mg"),
            Unit::Millilitres => Some("ml"),
            _ => None,
        }
    }

    fn forms(self) -> Option<(&'static str, &'static str)> {
        match self {
            Unit::Unit => Some(("unidade", "unidades")),
            Unit::Slice => Some(("fatia", "fatias")),
            Unit::Spoon => Some(("colher", "colheres")),
            Unit::Cup => Some(("xícara", "xícaras")),
            _ => None,
        }
    }
}

/// A quantity string split into magnitude and unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuantity {
    pub amount: f64,
    pub unit: Unit,
    /// Unit word as written (lowercased), empty for bare numbers.
    pub token: String,
}

lazy_static! {
    static ref QUANTITY_RE: Regex = Regex::new(
        r"^\s*(?P<whole>\d+(?:[.,]\d+)?)(?:\s*/\s*(?P<den>\d+)|\s+(?P<num>\d+)\s*/\s*(?P<mden>\d+))?\s*(?P<unit>\p{L}[\p{L}.]*)?"
    )
    .unwrap();
}

fn classify(token: &str) -> Unit {
    match token.trim_end_matches('.') {
        "" | "g" | "gr" | "grs" | "grama" | "gramas" => Unit::Grams,
        "kg" | "quilo" | "quilos" => Unit::Kilograms,
        "mg" => Unit::Milligrams,
        "ml" => Unit::Millilitres,
        "un" | "und" | "unid" | "unidade" | "unidades" => Unit::Unit,
        "fatia" | "fatias" => Unit::Slice,
        "colher" | "colheres" => Unit::Spoon,
        "xícara" | "xicara" | "xícaras" | "xicaras" => Unit::Cup,
        _ => Unit::Custom,
    }
}

fn number(s: &str) -> Option<f64> {
    s.replace(',', ".").parse::<f64>().ok()
}

/// Parses strings such as `"150g"`, `"2 unidades"`, `"1,5 xícara"` or `"1/2 fatia"`.
pub fn parse_quantity(raw: &str) -> EngineResult<ParsedQuantity> {
    let caps = QUANTITY_RE
        .captures(raw)
        .ok_or_else(|| EngineError::parse(raw))?;

    let whole = caps
        .name("whole")
        .and_then(|m| number(m.as_str()))
        .ok_or_else(|| EngineError::parse(raw))?;

    let amount = match (caps.name("den"), caps.name("num"), caps.name("mden")) {
        (Some(den), _, _) => {
            let den = number(den.as_str()).unwrap_or(0.0);
            if den == 0.0 {
                return Err(EngineError::parse(raw));
            }
            whole / den
        }
        (None, Some(num), Some(mden)) => {
            let num = number(num.as_str()).unwrap_or(0.0);
            let mden = number(mden.as_str()).unwrap_or(0.0);
            if mden == 0.0 {
                return Err(EngineError::parse(raw));
            }
            whole + num / mden
        }
        _ => whole,
    };

    if !amount.is_finite() {
        return Err(EngineError::parse(raw));
    }

    let token = caps
        .name("unit")
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();

    Ok(ParsedQuantity {
        amount,
        unit: classify(&token),
        token,
    })
}

impl ParsedQuantity {
    /// Grams represented by this quantity. Count units need the weight of one
    /// unit, usually derived from the entry's previously cached grams.
    pub fn to_grams(&self, grams_per_unit: Option<f64>) -> EngineResult<f64> {
        if let Some(factor) = self.unit.grams_factor() {
            return Ok(self.amount * factor);
        }
        grams_per_unit
            .filter(|g| g.is_finite() && *g > 0.0)
            .map(|g| self.amount * g)
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "quantity \"{}\" has no known weight per {}",
                    self,
                    self.token
                ))
            })
    }

    fn render(&self, amount: f64) -> String {
        let amount = round_display(amount);
        let number = format_amount(amount);
        if let Some(suffix) = self.unit.suffix() {
            return format!("{number}{suffix}");
        }
        let word = match self.unit.forms() {
            // Abbreviations such as "un" are kept as written.
            Some((singular, plural)) if !matches!(self.token.as_str(), "un" | "und" | "unid") => {
                if amount >= 2.0 {
                    plural
                } else {
                    singular
                }
            }
            _ => self.token.as_str(),
        };
        format!("{number} {word}")
    }
}

impl fmt::Display for ParsedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.amount))
    }
}

/// Re-renders `original` multiplied by `ratio`, keeping its unit.
pub fn scale_quantity(original: &ParsedQuantity, ratio: f64) -> String {
    original.render((original.amount * ratio).max(0.0))
}

fn round_display(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn format_amount(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}
