//! Resource Loader - fitted artifacts, loaded once per process
//!
//! Missing, unreadable or malformed artifacts are a deployment defect:
//! the loader reports [`LoadError::ResourceUnavailable`] and the caller
//! halts. There is no retry and no fallback model.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::classifier::{Classifier, InferenceError};
use super::forest::ModelArtifact;
use super::scaler::{FeatureScaler, ScalerArtifact};
use crate::constants::{
    DEFAULT_ARTIFACT_DIR, DEFAULT_MODEL_CLASSES, DEFAULT_MODEL_FILE, DEFAULT_SCALER_FILE,
};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Model,
    Scaler,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Model => f.write_str("model"),
            ArtifactKind::Scaler => f.write_str("scaler"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{artifact} artifact unavailable at {}: {reason}", path.display())]
    ResourceUnavailable {
        artifact: ArtifactKind,
        path: PathBuf,
        reason: String,
    },
}

impl LoadError {
    fn unavailable(artifact: ArtifactKind, path: &Path, reason: impl fmt::Display) -> Self {
        LoadError::ResourceUnavailable {
            artifact,
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn artifact(&self) -> ArtifactKind {
        match self {
            LoadError::ResourceUnavailable { artifact, .. } => *artifact,
        }
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// Where the artifacts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    /// Probability column order for ONNX models (JSON models carry their own)
    pub model_classes: Vec<i64>,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(DEFAULT_MODEL_FILE),
            scaler: dir.join(DEFAULT_SCALER_FILE),
            model_classes: DEFAULT_MODEL_CLASSES.to_vec(),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_ARTIFACT_DIR)
    }
}

// ============================================================================
// LOADED ARTIFACTS
// ============================================================================

/// Provenance of one loaded file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactInfo {
    pub artifact: ArtifactKind,
    pub path: String,
    /// Format reported by the artifact (e.g. "random_forest", "min_max")
    pub format: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub loaded_at: DateTime<Utc>,
    /// Tree count and depth, for tree-ensemble models only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ensemble: Option<EnsembleShape>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnsembleShape {
    pub n_trees: usize,
    pub max_depth: usize,
}

/// Scaler and classifier, immutable for the process lifetime.
/// Share it behind an `Arc`.
pub struct Artifacts {
    scaler: Box<dyn FeatureScaler>,
    classifier: Box<dyn Classifier>,
    info: Vec<ArtifactInfo>,
}

impl Artifacts {
    /// Assemble from already-built capabilities (test doubles, embedding)
    pub fn from_parts(scaler: Box<dyn FeatureScaler>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            scaler,
            classifier,
            info: Vec::new(),
        }
    }

    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Provenance of the loaded files (empty for [`from_parts`](Self::from_parts))
    pub fn info(&self) -> &[ArtifactInfo] {
        &self.info
    }
}

impl fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifacts")
            .field("scaler", &self.scaler.kind())
            .field("classifier", &self.classifier.kind())
            .field("info", &self.info)
            .finish()
    }
}

// ============================================================================
// LOADER
// ============================================================================

pub struct ResourceLoader {
    paths: ArtifactPaths,
}

impl ResourceLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Load both artifacts. Either one failing fails the whole load.
    pub fn load(&self) -> Result<Artifacts, LoadError> {
        let (scaler, scaler_info) = self.load_scaler()?;
        let (classifier, model_info) = self.load_model()?;

        log::info!(
            "Artifacts loaded: {} classifier ({}), {} scaler ({})",
            classifier.kind(),
            short_digest(&model_info.sha256),
            scaler.kind(),
            short_digest(&scaler_info.sha256)
        );

        Ok(Artifacts {
            scaler,
            classifier,
            info: vec![model_info, scaler_info],
        })
    }

    fn load_scaler(&self) -> Result<(Box<dyn FeatureScaler>, ArtifactInfo), LoadError> {
        let path = &self.paths.scaler;
        let kind = ArtifactKind::Scaler;
        log::info!("Loading scaler from: {}", path.display());

        let bytes = read_artifact(kind, path)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| LoadError::unavailable(kind, path, e))?;
        let scaler = ScalerArtifact::from_json(text)
            .and_then(ScalerArtifact::build)
            .map_err(|e| LoadError::unavailable(kind, path, e))?;

        let info = artifact_info(kind, path, scaler.kind(), &bytes);
        Ok((scaler, info))
    }

    fn load_model(&self) -> Result<(Box<dyn Classifier>, ArtifactInfo), LoadError> {
        let path = &self.paths.model;
        let kind = ArtifactKind::Model;
        log::info!("Loading model from: {}", path.display());

        let bytes = read_artifact(kind, path)?;
        let built = if is_onnx(path) {
            self.build_onnx(path).map(|c| (c, None))
        } else {
            std::str::from_utf8(&bytes)
                .map_err(|e| InferenceError::InvalidArtifact(e.to_string()))
                .and_then(ModelArtifact::from_json)
                .and_then(ModelArtifact::build)
                .map(|m| {
                    let shape = EnsembleShape {
                        n_trees: m.n_trees(),
                        max_depth: m.max_depth(),
                    };
                    (Box::new(m) as Box<dyn Classifier>, Some(shape))
                })
        };
        let (classifier, ensemble) = built.map_err(|e| LoadError::unavailable(kind, path, e))?;

        if let Some(shape) = ensemble {
            log::info!("{} trees, max depth {}", shape.n_trees, shape.max_depth);
        }

        let mut info = artifact_info(kind, path, classifier.kind(), &bytes);
        info.ensemble = ensemble;
        Ok((classifier, info))
    }

    #[cfg(feature = "onnx")]
    fn build_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>, InferenceError> {
        super::onnx::OnnxClassifier::load(path, &self.paths.model_classes)
            .map(|m| Box::new(m) as Box<dyn Classifier>)
    }

    #[cfg(not(feature = "onnx"))]
    fn build_onnx(&self, _path: &Path) -> Result<Box<dyn Classifier>, InferenceError> {
        Err(InferenceError::InvalidArtifact(
            "ONNX support not compiled in (enable the `onnx` feature)".to_string(),
        ))
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("onnx"))
}

fn read_artifact(kind: ArtifactKind, path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|e| LoadError::unavailable(kind, path, e))
}

/// Hex SHA-256 of an artifact file
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

fn artifact_info(kind: ArtifactKind, path: &Path, format: &str, bytes: &[u8]) -> ArtifactInfo {
    ArtifactInfo {
        artifact: kind,
        path: path.display().to_string(),
        format: format.to_string(),
        sha256: sha256_hex(bytes),
        size_bytes: bytes.len() as u64,
        loaded_at: Utc::now(),
        ensemble: None,
    }
}
