//! Drinking-water guideline table (WHO / national health ministry).
//!
//! Advisory only: shown next to the form, never fed to the classifier.

use serde::Serialize;

use super::fields::Field;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guideline {
    pub field: Field,
    /// Lower bound of the safe range, if any
    pub safe_min: Option<f64>,
    /// Upper bound of the safe range
    pub safe_max: f64,
    pub safe_range: &'static str,
    pub risk: &'static str,
}

impl Guideline {
    pub fn is_within(&self, value: f64) -> bool {
        self.safe_min.map_or(true, |min| value >= min) && value <= self.safe_max
    }
}

pub const GUIDELINES: &[Guideline] = &[
    Guideline {
        field: Field::Ph,
        safe_min: Some(6.5),
        safe_max: 8.5,
        safe_range: "6.5 - 8.5",
        risk: "< 6 (acidic) or > 8.5 (alkaline)",
    },
    Guideline {
        field: Field::Hardness,
        safe_min: None,
        safe_max: 300.0,
        safe_range: "< 300",
        risk: "Too high (scale deposits)",
    },
    Guideline {
        field: Field::Solids,
        safe_min: None,
        safe_max: 1000.0,
        safe_range: "< 500 - 1000",
        risk: "Cloudy water / off taste",
    },
    Guideline {
        field: Field::Chloramines,
        safe_min: None,
        safe_max: 4.0,
        safe_range: "< 4.0",
        risk: "Strong chlorine odour",
    },
    Guideline {
        field: Field::Sulfate,
        safe_min: None,
        safe_max: 250.0,
        safe_range: "< 250",
        risk: "Bitter taste / diarrhoea",
    },
    Guideline {
        field: Field::Turbidity,
        safe_min: None,
        safe_max: 5.0,
        safe_range: "< 5.0",
        risk: "Visibly murky water",
    },
];

pub fn guideline_for(field: Field) -> Option<&'static Guideline> {
    GUIDELINES.iter().find(|g| g.field == field)
}
