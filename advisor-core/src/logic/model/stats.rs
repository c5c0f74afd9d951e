//! Inference counters and engine status for the status endpoint

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::loader::{ArtifactInfo, Artifacts};
use crate::logic::features::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};

/// Latency and outcome counters, updated after every check
#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    failure_count: AtomicU64,
}

impl InferenceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inference_count(&self) -> u64 {
        self.inference_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Mean latency of successful checks, in milliseconds
    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count();
        if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        }
    }
}

/// Engine Status for the UI / status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub classifier: String,
    pub scaler: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,
    pub artifacts: Vec<ArtifactInfo>,
    pub inference_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: f32,
}

impl EngineStatus {
    pub fn collect(artifacts: &Artifacts, stats: &InferenceStats) -> Self {
        Self {
            model_loaded: true,
            classifier: artifacts.classifier().kind().to_string(),
            scaler: artifacts.scaler().kind().to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            artifacts: artifacts.info().to_vec(),
            inference_count: stats.inference_count(),
            failure_count: stats.failure_count(),
            avg_latency_ms: stats.avg_latency_ms(),
        }
    }
}
