//! Check request/response (JSON API)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use potability_core::{
    ClassProbabilities, Field, InputCollector, InputError, Label, Verdict, WaterSample,
};

/// Nine measurements; ranges mirror the field table
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CheckRequest {
    #[validate(required, range(min = 0.0, max = 14.0))]
    pub ph: Option<f64>,
    #[validate(required, range(min = 0.0, max = 400.0))]
    pub hardness: Option<f64>,
    #[validate(required, range(min = 0.0, max = 60000.0))]
    pub solids: Option<f64>,
    #[validate(required, range(min = 0.0, max = 14.0))]
    pub chloramines: Option<f64>,
    #[validate(required, range(min = 0.0, max = 500.0))]
    pub sulfate: Option<f64>,
    #[validate(required, range(min = 0.0, max = 800.0))]
    pub conductivity: Option<f64>,
    #[validate(required, range(min = 0.0, max = 30.0))]
    pub organic_carbon: Option<f64>,
    #[validate(required, range(min = 0.0, max = 125.0))]
    pub trihalomethanes: Option<f64>,
    #[validate(required, range(min = 0.0, max = 7.0))]
    pub turbidity: Option<f64>,
}

impl CheckRequest {
    fn slot(&mut self, field: Field) -> &mut Option<f64> {
        match field {
            Field::Ph => &mut self.ph,
            Field::Hardness => &mut self.hardness,
            Field::Solids => &mut self.solids,
            Field::Chloramines => &mut self.chloramines,
            Field::Sulfate => &mut self.sulfate,
            Field::Conductivity => &mut self.conductivity,
            Field::OrganicCarbon => &mut self.organic_carbon,
            Field::Trihalomethanes => &mut self.trihalomethanes,
            Field::Turbidity => &mut self.turbidity,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        *self.slot(field) = value;
    }

    pub fn from_sample(sample: &WaterSample) -> Self {
        let mut request = Self::default();
        for (field, value) in sample.named_values() {
            request.set(field, Some(value));
        }
        request
    }

    /// Hand the values to the input collector, which owns range rules
    pub fn into_sample(mut self) -> Result<WaterSample, InputError> {
        let mut collector = InputCollector::empty();
        for field in Field::ALL {
            if let Some(value) = self.slot(field).take() {
                collector.set(field, value)?;
            }
        }
        collector.sample()
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub check_id: Uuid,
    pub label: Label,
    pub potable: bool,
    pub headline: &'static str,
    pub conclusion: &'static str,
    pub confidence: f64,
    pub confidence_display: String,
    pub progress: u8,
    pub probabilities: ClassProbabilities,
    pub sample: WaterSample,
    pub checked_at: DateTime<Utc>,
}

impl From<Verdict> for CheckResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            check_id: Uuid::new_v4(),
            label: verdict.label,
            potable: verdict.is_potable(),
            headline: verdict.headline(),
            conclusion: verdict.conclusion(),
            confidence: verdict.confidence,
            confidence_display: verdict.confidence_display(),
            progress: verdict.progress(),
            probabilities: verdict.probabilities,
            sample: verdict.sample,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_ranges_match_field_table() {
        for field in Field::ALL {
            let spec = field.spec();

            let mut at_min = CheckRequest::from_sample(&WaterSample::defaults());
            at_min.set(field, Some(spec.min));
            assert!(at_min.validate().is_ok(), "{} min rejected", field);

            let mut at_max = CheckRequest::from_sample(&WaterSample::defaults());
            at_max.set(field, Some(spec.max));
            assert!(at_max.validate().is_ok(), "{} max rejected", field);

            let mut above = CheckRequest::from_sample(&WaterSample::defaults());
            above.set(field, Some(spec.max + 0.01));
            assert!(above.validate().is_err(), "{} above max accepted", field);

            let mut below = CheckRequest::from_sample(&WaterSample::defaults());
            below.set(field, Some(spec.min - 0.01));
            assert!(below.validate().is_err(), "{} below min accepted", field);
        }
    }

    #[test]
    fn missing_field_fails_validation() {
        let mut request = CheckRequest::from_sample(&WaterSample::defaults());
        request.set(Field::Sulfate, None);
        assert!(request.validate().is_err());
        assert_eq!(
            request.into_sample().unwrap_err(),
            InputError::Missing { field: Field::Sulfate }
        );
    }

    #[test]
    fn into_sample_round_trips_defaults() {
        let request = CheckRequest::from_sample(&WaterSample::defaults());
        assert_eq!(request.into_sample().unwrap(), WaterSample::defaults());
    }
}
