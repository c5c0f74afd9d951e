//! Potability Advisor - loaded artifacts + pipeline + counters
//!
//! Constructed once at startup and passed down explicitly; holds no
//! mutable state besides the atomic counters.

use std::sync::Arc;
use std::time::Instant;

use crate::logic::features::sample::WaterSample;
use crate::logic::model::loader::{ArtifactPaths, Artifacts, LoadError, ResourceLoader};
use crate::logic::model::stats::{EngineStatus, InferenceStats};
use crate::logic::pipeline::{self, PipelineError, Verdict};

pub struct PotabilityAdvisor {
    artifacts: Arc<Artifacts>,
    stats: InferenceStats,
}

impl PotabilityAdvisor {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self {
            artifacts,
            stats: InferenceStats::new(),
        }
    }

    /// Load artifacts from disk and build the advisor
    pub fn load(paths: ArtifactPaths) -> Result<Self, LoadError> {
        let artifacts = ResourceLoader::new(paths).load()?;
        Ok(Self::new(Arc::new(artifacts)))
    }

    pub fn artifacts(&self) -> &Arc<Artifacts> {
        &self.artifacts
    }

    /// Run one check on a validated sample
    pub fn check(&self, sample: &WaterSample) -> Result<Verdict, PipelineError> {
        let start = Instant::now();

        let result = pipeline::evaluate(
            sample,
            self.artifacts.scaler(),
            self.artifacts.classifier(),
        );

        match &result {
            Ok(verdict) => {
                self.stats.record(start.elapsed().as_micros() as u64);
                log::debug!(
                    "Check: {} ({}) for {}",
                    verdict.label,
                    verdict.confidence_display(),
                    sample.to_log_entry()
                );
            }
            Err(e) => {
                self.stats.record_failure();
                log::error!("Check failed: {}", e);
            }
        }

        result
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus::collect(&self.artifacts, &self.stats)
    }
}

impl std::fmt::Debug for PotabilityAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PotabilityAdvisor")
            .field("artifacts", &self.artifacts)
            .field("stats", &self.stats)
            .finish()
    }
}
