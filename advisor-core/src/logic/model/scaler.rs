//! Feature Scaler - fitted normalization applied before every prediction
//!
//! Parameters come from training (sklearn `MinMaxScaler` or
//! `StandardScaler`) and are serialized as JSON next to the model.

use serde::{Deserialize, Serialize};

use super::classifier::{check_shape, InferenceError};
use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::logic::features::layout::{validate_feature_names, FEATURE_COUNT};

/// Fitted transform: same dimensionality in and out, deterministic
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    fn kind(&self) -> &'static str;
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// Serialized scaler as written by the export script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    #[serde(flatten)]
    pub params: ScalerParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    MinMax(MinMaxParams),
    Standard(StandardParams),
}

/// Min-max normalization parameters from training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxParams {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    #[serde(default)]
    pub clip: bool,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerArtifact {
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(json)
            .map_err(|e| InferenceError::InvalidArtifact(format!("scaler JSON: {}", e)))
    }

    /// Validate and turn into a ready-to-use scaler
    pub fn build(self) -> Result<Box<dyn FeatureScaler>, InferenceError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(InferenceError::InvalidArtifact(format!(
                "unsupported scaler format version {}",
                self.format_version
            )));
        }
        validate_feature_names(&self.feature_names)
            .map_err(|e| InferenceError::InvalidArtifact(e.to_string()))?;

        match self.params {
            ScalerParams::MinMax(params) => Ok(Box::new(MinMaxScaler::new(params)?)),
            ScalerParams::Standard(params) => Ok(Box::new(StandardScaler::new(params)?)),
        }
    }
}

fn check_param_len(name: &str, values: &[f64]) -> Result<(), InferenceError> {
    if values.len() != FEATURE_COUNT {
        return Err(InferenceError::InvalidArtifact(format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            FEATURE_COUNT
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::InvalidArtifact(format!("{} contains non-finite values", name)));
    }
    Ok(())
}

/// Zero-width ranges scale by 1 instead of dividing by zero
fn handle_zero(range: f64) -> f64 {
    if range.abs() < f64::EPSILON {
        1.0
    } else {
        range
    }
}

// ============================================================================
// MIN-MAX
// ============================================================================

/// `x * scale + offset`, optionally clipped into the feature range
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    scale: Vec<f64>,
    offset: Vec<f64>,
    feature_range: (f64, f64),
    clip: bool,
}

impl MinMaxScaler {
    pub fn new(params: MinMaxParams) -> Result<Self, InferenceError> {
        check_param_len("data_min", &params.data_min)?;
        check_param_len("data_max", &params.data_max)?;

        let (low, high) = params.feature_range;
        if !(low < high) {
            return Err(InferenceError::InvalidArtifact(format!(
                "feature_range ({}, {}) is empty",
                low, high
            )));
        }

        let scale: Vec<f64> = params
            .data_min
            .iter()
            .zip(&params.data_max)
            .map(|(min, max)| (high - low) / handle_zero(max - min))
            .collect();
        let offset = params
            .data_min
            .iter()
            .zip(&scale)
            .map(|(min, s)| low - min * s)
            .collect();

        Ok(Self {
            scale,
            offset,
            feature_range: params.feature_range,
            clip: params.clip,
        })
    }
}

impl FeatureScaler for MinMaxScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_shape(features, FEATURE_COUNT)?;

        let (low, high) = self.feature_range;
        Ok(features
            .iter()
            .zip(self.scale.iter().zip(&self.offset))
            .map(|(x, (s, o))| {
                let v = x * s + o;
                if self.clip {
                    v.clamp(low, high)
                } else {
                    v
                }
            })
            .collect())
    }

    fn kind(&self) -> &'static str {
        "min_max"
    }
}

// ============================================================================
// STANDARD
// ============================================================================

/// `(x - mean) / scale`
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(params: StandardParams) -> Result<Self, InferenceError> {
        check_param_len("mean", &params.mean)?;
        check_param_len("scale", &params.scale)?;
        Ok(Self {
            mean: params.mean,
            scale: params.scale.into_iter().map(handle_zero).collect(),
        })
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_shape(features, FEATURE_COUNT)?;

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    fn kind(&self) -> &'static str {
        "standard"
    }
}
