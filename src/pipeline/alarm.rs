//! Process-wide alarm pipeline
//!
//! One `annotate` call turns one image path into one annotation:
//! continuity check, decode, object detection, then the optional stage chain.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::chain::{ChainStage, StageChain, StageKind};
use super::continuity::{ContinuityState, FrameKey};
use crate::config::Config;
use crate::engine::preprocess::load_image;
use crate::engine::{DetectionAdapter, ModelKind, OpenVinoRuntime};
use crate::error::{DetectError, DetectResult};
use crate::types::Annotation;

/// Process-wide pipeline. Built once at startup and shared by every call.
pub struct AlarmPipeline {
    detector: DetectionAdapter,
    chain: Option<StageChain>,
    skip_count: u64,
    mount_point: PathBuf,
}

impl AlarmPipeline {
    pub fn new(
        detector: DetectionAdapter,
        chain: Option<StageChain>,
        skip_count: u64,
        mount_point: PathBuf,
    ) -> Self {
        Self {
            detector,
            chain,
            skip_count,
            mount_point,
        }
    }

    /// Load every configured model on the configured device.
    pub fn load(config: &Config) -> Result<Self> {
        let mut runtime = OpenVinoRuntime::new(&config.device)?;

        let labels = config.load_label_map()?;
        let engine = runtime.load(ModelKind::Objects, &config.model_path)?;
        let detector = DetectionAdapter::new(
            ModelKind::Objects,
            Box::new(engine),
            labels,
            config.detector_input(),
            config.min_score,
        );

        let chain = if config.stages.is_empty() {
            None
        } else {
            let mut stages = Vec::with_capacity(config.stages.len());
            for stage in &config.stages {
                let kind = match stage.kind {
                    StageKind::Locate => ModelKind::FaceLocator,
                    StageKind::Classify => ModelKind::Classifier,
                };
                let labels = stage
                    .load_label_map()
                    .with_context(|| format!("{} stage label map", stage.kind.as_str()))?;
                let engine = runtime.load(kind, &stage.model_path)?;
                stages.push(ChainStage {
                    kind: stage.kind,
                    adapter: DetectionAdapter::new(
                        kind,
                        Box::new(engine),
                        labels,
                        stage.input_spec(),
                        stage.min_score,
                    ),
                    min_confidence: stage.min_confidence,
                });
            }
            info!(
                "Stage chain for {}: {}",
                config.trigger_class.as_str(),
                stages.iter().map(|s| s.kind.as_str()).collect::<Vec<_>>().join(" -> ")
            );
            Some(StageChain::new(config.trigger_class.clone(), stages))
        };

        Ok(Self::new(
            detector,
            chain,
            config.skip_count,
            config.mount_point.clone(),
        ))
    }

    pub fn has_chain(&self) -> bool {
        self.chain.is_some()
    }

    /// Filesystem location of an image path, re-rooted under the mount point.
    pub fn resolve(&self, image: &str) -> PathBuf {
        if self.mount_point.as_os_str().is_empty() {
            PathBuf::from(image)
        } else {
            self.mount_point.join(image.trim_start_matches('/'))
        }
    }

    /// Annotate one image of a call. Per-image problems give an empty
    /// annotation; only engine failures are returned as errors.
    pub fn annotate(&self, image: &str, state: &mut ContinuityState) -> DetectResult<Annotation> {
        let key = match FrameKey::parse(image) {
            Ok(key) => key,
            Err(e) => {
                warn!("{}", e);
                return Ok(Annotation::empty(image));
            }
        };

        if let Some(labels) = state.reuse(&key, self.skip_count) {
            return Ok(Annotation::new(image, labels.to_vec()));
        }

        let decoded = match load_image(&self.resolve(image)) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("{}", e);
                return Ok(Annotation::empty(image));
            }
        };

        let mut labels = match self.detector.detect(&decoded) {
            Ok(labels) => labels,
            Err(e) if e.is_call_fatal() => return Err(e),
            Err(e) => {
                warn!("{}", e);
                return Ok(Annotation::empty(image));
            }
        };

        if let Some(chain) = &self.chain {
            chain.apply(&decoded, &mut labels)?;
        }

        debug!("{}: {} labels", image, labels.len());
        state.record(key, labels.clone());
        Ok(Annotation::new(image, labels))
    }

    /// Run the stage chain on an annotation computed upstream.
    pub fn classify(&self, mut annotation: Annotation) -> DetectResult<Annotation> {
        let chain = self
            .chain
            .as_ref()
            .ok_or_else(|| DetectError::config("no person classification stages are configured"))?;

        if !chain.triggers(&annotation.labels) {
            return Ok(annotation);
        }

        match load_image(&self.resolve(&annotation.image)) {
            Ok(decoded) => chain.apply(&decoded, &mut annotation.labels)?,
            Err(e) => {
                warn!("{}", e);
                chain.clear(&mut annotation.labels);
            }
        }
        Ok(annotation)
    }

    /// Loaded state of every model role.
    pub fn models(&self) -> HashMap<String, bool> {
        let stages = self.chain.as_ref().map(|c| c.stages()).unwrap_or_default();
        [ModelKind::Objects, ModelKind::FaceLocator, ModelKind::Classifier]
            .into_iter()
            .map(|kind| {
                let loaded = self.detector.kind() == kind
                    || stages.iter().any(|s| s.adapter.kind() == kind);
                (kind.as_str().to_string(), loaded)
            })
            .collect()
    }
}
