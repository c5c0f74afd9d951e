//! ONNX Classifier - ONNX Runtime Integration
//!
//! For classifiers exported with skl2onnx (`zipmap=False`): output 0 is
//! the label tensor (`i64`), output 1 the probability tensor
//! (`f32`, shape `[1, n_classes]`). The class order of the probability
//! columns is supplied by configuration.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::classifier::{
    check_shape, labels_for_classes, ClassProbabilities, Classifier, InferenceError, Label,
};
use crate::logic::features::layout::FEATURE_COUNT;

/// ONNX session wrapped behind the [`Classifier`] capability.
///
/// Running a session needs `&mut`, so it sits behind a mutex; checks are
/// short and never overlap in practice.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    labels: Vec<Label>,
    label_output: String,
    proba_output: String,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path, classes: &[i64]) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        let labels = labels_for_classes(classes)?;

        let session = Session::builder()
            .map_err(|e| InferenceError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::InvalidArtifact(format!("Failed to load model: {}", e)))?;

        let mut names = session.outputs.iter().map(|o| o.name.clone());
        let (Some(label_output), Some(proba_output)) = (names.next(), names.next()) else {
            return Err(InferenceError::InvalidArtifact(
                "model must expose label and probability outputs".to_string(),
            ));
        };

        log::info!(
            "ONNX model loaded (outputs: {}, {})",
            label_output,
            proba_output
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            label_output,
            proba_output,
        })
    }

    /// Run the graph once: (label class value, probability row)
    fn run(&self, features: &[f64]) -> Result<(i64, Vec<f32>), InferenceError> {
        check_shape(features, FEATURE_COUNT)?;

        let input: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), input)
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let label = outputs
            .get(&self.label_output)
            .ok_or_else(|| InferenceError::Runtime("No label output".to_string()))?
            .try_extract_tensor::<i64>()
            .map_err(|e| InferenceError::Runtime(format!("Extract error: {}", e)))?
            .1
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Runtime("Empty label output".to_string()))?;

        let probabilities = outputs
            .get(&self.proba_output)
            .ok_or_else(|| InferenceError::Runtime("No probability output".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("Extract error: {}", e)))?
            .1
            .to_vec();

        Ok((label, probabilities))
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f64]) -> Result<Label, InferenceError> {
        let (class, _) = self.run(features)?;
        Label::from_class(class)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities, InferenceError> {
        let (_, probabilities) = self.run(features)?;
        if probabilities.len() != self.labels.len() {
            return Err(InferenceError::InvalidDistribution(format!(
                "{} probabilities for {} classes",
                probabilities.len(),
                self.labels.len()
            )));
        }
        ClassProbabilities::from_pairs(
            self.labels
                .iter()
                .map(|l| l.class_value())
                .zip(probabilities.into_iter().map(f64::from)),
        )
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
