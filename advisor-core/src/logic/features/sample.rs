//! Water Sample - the nine named measurements of one check
//!
//! Values are held by name. The positional vector the artifacts consume
//! is only ever produced by [`WaterSample::to_vector`], which walks the
//! layout table, so the order fields were entered in never matters.

use serde::Serialize;

use super::fields::Field;
use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};

/// A complete set of in-range measurements. Outside this crate the only
/// ways to obtain one are [`WaterSample::defaults`] and
/// [`InputCollector::sample`](super::collector::InputCollector::sample).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterSample {
    ph: f64,
    hardness: f64,
    solids: f64,
    chloramines: f64,
    sulfate: f64,
    conductivity: f64,
    organic_carbon: f64,
    trihalomethanes: f64,
    turbidity: f64,
}

impl WaterSample {
    /// The reference sample made of every field's default
    pub fn defaults() -> Self {
        let mut sample = Self::zeroed();
        for field in Field::ALL {
            sample.set(field, field.spec().default);
        }
        sample
    }

    fn zeroed() -> Self {
        Self {
            ph: 0.0,
            hardness: 0.0,
            solids: 0.0,
            chloramines: 0.0,
            sulfate: 0.0,
            conductivity: 0.0,
            organic_carbon: 0.0,
            trihalomethanes: 0.0,
            turbidity: 0.0,
        }
    }

    /// Build from (field, value) pairs in any order.
    ///
    /// Returns `None` unless every field appears. Later pairs overwrite
    /// earlier ones for the same field.
    pub(crate) fn from_named<I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Field, f64)>,
    {
        let mut seen = [false; FEATURE_COUNT];
        let mut sample = Self::zeroed();
        for (field, value) in pairs {
            sample.set(field, value);
            seen[field.index()] = true;
        }
        seen.iter().all(|s| *s).then_some(sample)
    }

    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Ph => self.ph,
            Field::Hardness => self.hardness,
            Field::Solids => self.solids,
            Field::Chloramines => self.chloramines,
            Field::Sulfate => self.sulfate,
            Field::Conductivity => self.conductivity,
            Field::OrganicCarbon => self.organic_carbon,
            Field::Trihalomethanes => self.trihalomethanes,
            Field::Turbidity => self.turbidity,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Ph => &mut self.ph,
            Field::Hardness => &mut self.hardness,
            Field::Solids => &mut self.solids,
            Field::Chloramines => &mut self.chloramines,
            Field::Sulfate => &mut self.sulfate,
            Field::Conductivity => &mut self.conductivity,
            Field::OrganicCarbon => &mut self.organic_carbon,
            Field::Trihalomethanes => &mut self.trihalomethanes,
            Field::Turbidity => &mut self.turbidity,
        };
        *slot = value;
    }

    /// Assemble the model input in layout order
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        let mut vector = [0.0; FEATURE_COUNT];
        for field in Field::ALL {
            vector[field.index()] = self.get(field);
        }
        vector
    }

    /// (field, value) pairs in layout order, for the echo table
    pub fn named_values(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": FEATURE_VERSION,
            "layout_hash": layout_hash(),
            "values": self.to_vector(),
        })
    }
}

impl Default for WaterSample {
    fn default() -> Self {
        Self::defaults()
    }
}
