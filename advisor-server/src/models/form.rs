//! Form state for the HTML page

use std::collections::HashMap;

use potability_core::logic::features::FEATURE_COUNT;
use potability_core::{Field, InputCollector, InputError, WaterSample};

/// One form control: what the user typed and why it was refused
#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry {
    pub field: Field,
    pub raw: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    entries: Vec<FormEntry>,
}

impl FormState {
    /// Every control pre-filled with its default
    pub fn defaults() -> Self {
        Self::from_sample(&WaterSample::defaults())
    }

    pub fn from_sample(sample: &WaterSample) -> Self {
        let entries = sample
            .named_values()
            .map(|(field, value)| FormEntry {
                field,
                raw: value.to_string(),
                error: None,
            })
            .collect();
        Self { entries }
    }

    /// Parse a urlencoded submission. The sample is returned only when
    /// every field parsed and passed its range check; unknown keys are
    /// ignored.
    pub fn from_submission(form: &HashMap<String, String>) -> (Self, Option<WaterSample>) {
        let mut collector = InputCollector::empty();
        let mut entries = Vec::with_capacity(FEATURE_COUNT);

        for field in Field::ALL {
            let raw = form
                .get(field.key())
                .map(|v| v.trim().to_string())
                .unwrap_or_default();

            let error = if raw.is_empty() {
                Some(InputError::Missing { field }.to_string())
            } else {
                match raw.parse::<f64>() {
                    Ok(value) => collector.set(field, value).err().map(|e| e.to_string()),
                    Err(_) => Some(format!("{} must be a number", field)),
                }
            };

            entries.push(FormEntry { field, raw, error });
        }

        let state = Self { entries };
        let sample = if state.has_errors() {
            None
        } else {
            collector.sample().ok()
        };
        (state, sample)
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.error.is_some())
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| e.error.as_deref())
    }
}
