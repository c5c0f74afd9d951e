//! Field Specs - the nine form inputs
//!
//! Ranges are inclusive. Defaults describe a known-safe reference sample
//! and are what the form shows on first display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

/// One of the nine measurements, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Ph,
    Hardness,
    Solids,
    Chloramines,
    Sulfate,
    Conductivity,
    OrganicCarbon,
    Trihalomethanes,
    Turbidity,
}

impl Field {
    /// All fields in layout order
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::Ph,
        Field::Hardness,
        Field::Solids,
        Field::Chloramines,
        Field::Sulfate,
        Field::Conductivity,
        Field::OrganicCarbon,
        Field::Trihalomethanes,
        Field::Turbidity,
    ];

    /// Position in the feature vector
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column name the artifacts were fitted with
    pub fn layout_name(self) -> &'static str {
        FEATURE_LAYOUT[self.index()]
    }

    /// Snake-case key used by the form and the JSON API
    pub const fn key(self) -> &'static str {
        match self {
            Field::Ph => "ph",
            Field::Hardness => "hardness",
            Field::Solids => "solids",
            Field::Chloramines => "chloramines",
            Field::Sulfate => "sulfate",
            Field::Conductivity => "conductivity",
            Field::OrganicCarbon => "organic_carbon",
            Field::Trihalomethanes => "trihalomethanes",
            Field::Turbidity => "turbidity",
        }
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self.index()]
    }

    /// Resolve a field from its key, layout name or display label
    /// (case-insensitive).
    pub fn from_name(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL.into_iter().find(|f| {
            f.key().eq_ignore_ascii_case(name)
                || f.layout_name().eq_ignore_ascii_case(name)
                || f.spec().label.eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_name(s).ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Declared range, default and display metadata for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub field: Field,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Input step for the form control
    pub step: f64,
    pub help: Option<&'static str>,
}

impl FieldSpec {
    /// Inclusive range check
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Label with unit, e.g. "Hardness (mg/L)"
    pub fn display_label(&self) -> String {
        match self.unit {
            Some(unit) => format!("{} ({})", self.label, unit),
            None => self.label.to_string(),
        }
    }
}

/// Field table in layout order
pub const FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        field: Field::Ph,
        label: "pH",
        unit: None,
        min: 0.0,
        max: 14.0,
        default: 7.08,
        step: 0.01,
        help: Some("Neutral: 7.0. Safe: 6.5-8.5"),
    },
    FieldSpec {
        field: Field::Hardness,
        label: "Hardness",
        unit: Some("mg/L"),
        min: 0.0,
        max: 400.0,
        default: 196.0,
        step: 0.1,
        help: Some("Calcium and magnesium salts"),
    },
    FieldSpec {
        field: Field::Solids,
        label: "Solids",
        unit: Some("ppm"),
        min: 0.0,
        max: 60000.0,
        default: 22000.0,
        step: 1.0,
        help: Some("Total dissolved solids"),
    },
    FieldSpec {
        field: Field::Chloramines,
        label: "Chloramines",
        unit: Some("ppm"),
        min: 0.0,
        max: 14.0,
        default: 7.10,
        step: 0.01,
        help: None,
    },
    FieldSpec {
        field: Field::Sulfate,
        label: "Sulfate",
        unit: Some("mg/L"),
        min: 0.0,
        max: 500.0,
        default: 333.0,
        step: 0.1,
        help: None,
    },
    FieldSpec {
        field: Field::Conductivity,
        label: "Conductivity",
        unit: Some("μS/cm"),
        min: 0.0,
        max: 800.0,
        default: 426.0,
        step: 0.1,
        help: None,
    },
    FieldSpec {
        field: Field::OrganicCarbon,
        label: "Organic Carbon",
        unit: Some("ppm"),
        min: 0.0,
        max: 30.0,
        default: 14.0,
        step: 0.01,
        help: None,
    },
    FieldSpec {
        field: Field::Trihalomethanes,
        label: "Trihalomethanes",
        unit: Some("μg/L"),
        min: 0.0,
        max: 125.0,
        default: 66.0,
        step: 0.01,
        help: None,
    },
    FieldSpec {
        field: Field::Turbidity,
        label: "Turbidity",
        unit: Some("NTU"),
        min: 0.0,
        max: 7.0,
        default: 3.96,
        step: 0.01,
        help: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_follow_layout_order() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(field.layout_name(), FEATURE_LAYOUT[i]);
            assert_eq!(FIELD_SPECS[i].field, *field);
        }
    }

    #[test]
    fn test_defaults_within_range() {
        for spec in &FIELD_SPECS {
            assert!(spec.contains(spec.default), "{} default out of range", spec.label);
            assert!(spec.min < spec.max);
        }
    }

    #[test]
    fn test_ph_bounds_inclusive() {
        let ph = Field::Ph.spec();
        assert!(ph.contains(0.0));
        assert!(ph.contains(14.0));
        assert!(!ph.contains(14.01));
        assert!(!ph.contains(-0.01));
        assert_eq!(ph.clamp(14.01), 14.0);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Field::from_name("ph"), Some(Field::Ph));
        assert_eq!(Field::from_name("pH"), Some(Field::Ph));
        assert_eq!(Field::from_name("Organic_carbon"), Some(Field::OrganicCarbon));
        assert_eq!(Field::from_name("organic carbon"), Some(Field::OrganicCarbon));
        assert_eq!(Field::from_name(" turbidity "), Some(Field::Turbidity));
        assert_eq!(Field::from_name("lead"), None);
        assert!("lead".parse::<Field>().is_err());
    }

    #[test]
    fn test_display_label() {
        assert_eq!(Field::Hardness.spec().display_label(), "Hardness (mg/L)");
        assert_eq!(Field::Ph.spec().display_label(), "pH");
    }
}
