//! Field descriptions for `/api/v1/fields`

use serde::Serialize;

use potability_core::logic::features::{guideline_for, Guideline};
use potability_core::{Field, FIELD_SPECS};

#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub name: &'static str,
    pub layout_name: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    pub help: Option<&'static str>,
    pub guideline: Option<&'static Guideline>,
}

impl FieldInfo {
    pub fn for_field(field: Field) -> Self {
        let spec = field.spec();
        Self {
            name: field.key(),
            layout_name: field.layout_name(),
            label: spec.label,
            unit: spec.unit,
            min: spec.min,
            max: spec.max,
            default: spec.default,
            step: spec.step,
            help: spec.help,
            guideline: guideline_for(field),
        }
    }

    /// All fields, layout order
    pub fn all() -> Vec<Self> {
        FIELD_SPECS.iter().map(|s| Self::for_field(s.field)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_nine_fields_in_layout_order() {
        let fields = FieldInfo::all();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[0].name, "ph");
        assert_eq!(fields[6].layout_name, "Organic_carbon");
        assert!(fields[0].guideline.is_some());
        assert!(fields[5].guideline.is_none());
    }
}
