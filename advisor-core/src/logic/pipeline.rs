//! Verdict Pipeline - sample → scaler → classifier → verdict
//!
//! No bypass: every prediction goes through the scaler. A vector of the
//! wrong length, or an artifact misbehaving, is an internal defect and is
//! reported as [`PipelineError`], never padded, truncated or reinterpreted.

use std::fmt;

use serde::Serialize;

use crate::logic::features::layout::FEATURE_COUNT;
use crate::logic::features::sample::WaterSample;
use crate::logic::model::classifier::{ClassProbabilities, Classifier, InferenceError, Label};
use crate::logic::model::scaler::FeatureScaler;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transform,
    Predict,
    PredictProba,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transform => f.write_str("transform"),
            Stage::Predict => f.write_str("predict"),
            Stage::PredictProba => f.write_str("predict_proba"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("feature vector has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{stage} failed: {source}")]
    Internal {
        stage: Stage,
        #[source]
        source: InferenceError,
    },
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(InferenceError) -> Self {
        move |source| PipelineError::Internal { stage, source }
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Label, probabilities and confidence for one vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub probabilities: ClassProbabilities,
    /// Probability of `label`, as a percentage in [0, 100]
    pub confidence: f64,
}

/// Result of one check. Built fresh each time, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub probabilities: ClassProbabilities,
    pub sample: WaterSample,
}

impl Verdict {
    pub fn new(prediction: Prediction, sample: WaterSample) -> Self {
        Self {
            label: prediction.label,
            confidence: prediction.confidence,
            probabilities: prediction.probabilities,
            sample,
        }
    }

    pub fn is_potable(&self) -> bool {
        self.label.is_potable()
    }

    pub fn headline(&self) -> &'static str {
        match self.label {
            Label::Potable => "STATUS: WATER IS SAFE TO DRINK (POTABLE)",
            Label::NotPotable => "STATUS: WATER IS NOT SAFE TO DRINK (NOT POTABLE)",
        }
    }

    pub fn conclusion(&self) -> &'static str {
        match self.label {
            Label::Potable => {
                "Water parameters are within normal limits and the water is SAFE to consume."
            }
            Label::NotPotable => {
                "Chemical indicators were found that are HARMFUL to health."
            }
        }
    }

    /// Confidence with one decimal, e.g. "72.5%"
    pub fn confidence_display(&self) -> String {
        format!("{:.1}%", self.confidence)
    }

    /// Whole-percent value for the progress indicator (truncated)
    pub fn progress(&self) -> u8 {
        self.confidence.clamp(0.0, 100.0) as u8
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Run the full pipeline on a validated sample
pub fn evaluate(
    sample: &WaterSample,
    scaler: &dyn FeatureScaler,
    classifier: &dyn Classifier,
) -> Result<Verdict, PipelineError> {
    let prediction = evaluate_vector(&sample.to_vector(), scaler, classifier)?;
    Ok(Verdict::new(prediction, *sample))
}

/// Run the pipeline on a raw vector in layout order
pub fn evaluate_vector(
    values: &[f64],
    scaler: &dyn FeatureScaler,
    classifier: &dyn Classifier,
) -> Result<Prediction, PipelineError> {
    if values.len() != FEATURE_COUNT {
        return Err(PipelineError::ShapeMismatch {
            expected: FEATURE_COUNT,
            actual: values.len(),
        });
    }

    let scaled = scaler
        .transform(values)
        .map_err(PipelineError::at(Stage::Transform))?;
    if scaled.len() != FEATURE_COUNT {
        return Err(PipelineError::Internal {
            stage: Stage::Transform,
            source: InferenceError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: scaled.len(),
            },
        });
    }

    let label = classifier
        .predict(&scaled)
        .map_err(PipelineError::at(Stage::Predict))?;
    let probabilities = classifier
        .predict_proba(&scaled)
        .map_err(PipelineError::at(Stage::PredictProba))?;

    let confidence = (probabilities.get(label) * 100.0).clamp(0.0, 100.0);

    log::debug!(
        "Prediction: {} ({:.1}%) from scaled {:?}",
        label,
        confidence,
        scaled
    );

    Ok(Prediction {
        label,
        probabilities,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::fields::Field;
    use crate::logic::features::collector::InputCollector;

    /// Multiplies by 0.5
    struct HalfScaler;

    impl FeatureScaler for HalfScaler {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(features.iter().map(|x| x * 0.5).collect())
        }

        fn kind(&self) -> &'static str {
            "half"
        }
    }

    /// Returns one value too few
    struct TruncatingScaler;

    impl FeatureScaler for TruncatingScaler {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(features[1..].to_vec())
        }

        fn kind(&self) -> &'static str {
            "truncating"
        }
    }

    /// Potable when scaled pH (index 0) is above 3.0; records nothing
    struct PhRule;

    impl Classifier for PhRule {
        fn predict(&self, features: &[f64]) -> Result<Label, InferenceError> {
            Ok(self.predict_proba(features)?.most_likely())
        }

        fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError> {
            if features.len() != FEATURE_COUNT {
                return Err(InferenceError::ShapeMismatch {
                    expected: FEATURE_COUNT,
                    actual: features.len(),
                });
            }
            let p = if features[0] > 3.0 { 0.875 } else { 0.25 };
            ClassProbabilities::from_pairs([(1, p), (0, 1.0 - p)])
        }

        fn kind(&self) -> &'static str {
            "ph_rule"
        }
    }

    #[test]
    fn test_defaults_potable() {
        let verdict = evaluate(&WaterSample::defaults(), &HalfScaler, &PhRule).unwrap();
        assert_eq!(verdict.label, Label::Potable);
        assert_eq!(verdict.confidence, 87.5);
        assert_eq!(verdict.confidence_display(), "87.5%");
        assert_eq!(verdict.progress(), 87);
        assert_eq!(verdict.sample, WaterSample::defaults());
        assert!(verdict.headline().contains("POTABLE"));
    }

    #[test]
    fn test_confidence_is_mass_of_predicted_label() {
        let mut collector = InputCollector::new();
        collector.set(Field::Ph, 2.0).unwrap();
        let verdict = evaluate(&collector.sample().unwrap(), &HalfScaler, &PhRule).unwrap();
        assert_eq!(verdict.label, Label::NotPotable);
        assert_eq!(verdict.confidence, 75.0);
        assert!(verdict.headline().contains("NOT POTABLE"));
    }

    #[test]
    fn test_deterministic() {
        let sample = WaterSample::defaults();
        let a = evaluate(&sample, &HalfScaler, &PhRule).unwrap();
        let b = evaluate(&sample, &HalfScaler, &PhRule).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_vector_is_internal_error() {
        let err = evaluate_vector(&[7.0; 8], &HalfScaler, &PhRule).unwrap_err();
        assert_eq!(err, PipelineError::ShapeMismatch { expected: 9, actual: 8 });
    }

    #[test]
    fn test_long_vector_is_internal_error() {
        assert!(evaluate_vector(&[7.0; 10], &HalfScaler, &PhRule).is_err());
    }

    #[test]
    fn test_scaler_shape_defect() {
        let err = evaluate(&WaterSample::defaults(), &TruncatingScaler, &PhRule).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Internal {
                stage: Stage::Transform,
                ..
            }
        ));
    }

    #[test]
    fn test_progress_truncates() {
        let verdict = Verdict {
            label: Label::Potable,
            confidence: 99.96,
            probabilities: ClassProbabilities {
                not_potable: 0.0004,
                potable: 0.9996,
            },
            sample: WaterSample::defaults(),
        };
        assert_eq!(verdict.progress(), 99);
        assert_eq!(verdict.confidence_display(), "100.0%");
    }
}
