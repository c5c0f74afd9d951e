//! Model Module - fitted artifacts and inference
//!
//! - `scaler` / `classifier` - the two capabilities the pipeline consumes
//! - `forest` - JSON tree-ensemble classifier
//! - `onnx` - ONNX Runtime classifier (feature `onnx`)
//! - `loader` - load-once artifact loading with checksums

pub mod classifier;
pub mod forest;
pub mod loader;
pub mod scaler;
pub mod stats;

#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use classifier::{ClassProbabilities, Classifier, InferenceError, Label};
pub use forest::{ModelArtifact, TreeEnsemble};
pub use loader::{
    ArtifactInfo, ArtifactKind, ArtifactPaths, Artifacts, EnsembleShape, LoadError, ResourceLoader,
};
pub use scaler::{FeatureScaler, ScalerArtifact};
pub use stats::{EngineStatus, InferenceStats};

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
