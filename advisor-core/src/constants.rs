//! Central Configuration Constants
//!
//! Single source of truth for artifact locations and format versions.

/// App name
pub const APP_NAME: &str = "Water Potability Advisor";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the JSON artifact formats this build reads
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Directory holding the fitted artifacts
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// Fitted classifier file name
pub const DEFAULT_MODEL_FILE: &str = "model_random_forest.json";

/// Fitted scaler file name
pub const DEFAULT_SCALER_FILE: &str = "minmax_scaler.json";

/// Column order of an ONNX model's probability output
pub const DEFAULT_MODEL_CLASSES: [i64; 2] = [0, 1];
