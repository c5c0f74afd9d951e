//! Water Potability Advisor - Core
//!
//! Loads a fitted feature scaler and classifier once, collects the nine
//! water-quality measurements with range checks, and turns a sample into
//! a potability verdict with a confidence percentage.
//!
//! ```text
//! InputCollector ──► WaterSample ──► scaler.transform ──► classifier
//!                                                          │
//!                                   Verdict ◄── predict + predict_proba
//! ```

pub mod constants;
pub mod logic;

pub use logic::advisor::PotabilityAdvisor;
pub use logic::features::{Field, FieldSpec, InputCollector, InputError, WaterSample, FIELD_SPECS};
pub use logic::model::{
    ArtifactPaths, Artifacts, ClassProbabilities, Classifier, EngineStatus, FeatureScaler,
    InferenceError, Label, LoadError, ResourceLoader,
};
pub use logic::pipeline::{evaluate, evaluate_vector, PipelineError, Prediction, Verdict};
