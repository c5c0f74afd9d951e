//! Configuration module

use std::env;
use std::path::PathBuf;

use potability_core::constants::{
    DEFAULT_ARTIFACT_DIR, DEFAULT_MODEL_CLASSES, DEFAULT_MODEL_FILE, DEFAULT_SCALER_FILE,
};
use potability_core::ArtifactPaths;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Fitted classifier (.json or .onnx)
    pub model_path: PathBuf,

    /// Fitted scaler (.json)
    pub scaler_path: PathBuf,

    /// Probability column order of an ONNX model
    pub model_classes: Vec<i64>,

    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let artifact_dir = PathBuf::from(
            env::var("ARTIFACT_DIR").unwrap_or_else(|_| DEFAULT_ARTIFACT_DIR.to_string()),
        );

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8501),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| artifact_dir.join(DEFAULT_MODEL_FILE)),

            scaler_path: env::var("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| artifact_dir.join(DEFAULT_SCALER_FILE)),

            model_classes: env::var("MODEL_CLASSES")
                .ok()
                .and_then(|c| parse_classes(&c))
                .unwrap_or_else(|| DEFAULT_MODEL_CLASSES.to_vec()),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            scaler: self.scaler_path.clone(),
            model_classes: self.model_classes.clone(),
        }
    }
}

/// "0,1" → [0, 1]; `None` if any entry isn't an integer
fn parse_classes(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(|c| c.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classes_accepts_list() {
        assert_eq!(parse_classes("1, 0"), Some(vec![1, 0]));
        assert_eq!(parse_classes("0,x"), None);
    }

    #[test]
    fn artifact_paths_follow_config() {
        let config = Config {
            port: 8501,
            environment: "production".to_string(),
            model_path: PathBuf::from("/srv/model.onnx"),
            scaler_path: PathBuf::from("/srv/scaler.json"),
            model_classes: vec![1, 0],
            log_json: false,
        };
        let paths = config.artifact_paths();
        assert_eq!(paths.model, PathBuf::from("/srv/model.onnx"));
        assert_eq!(paths.model_classes, vec![1, 0]);
        assert!(config.is_production());
    }
}
