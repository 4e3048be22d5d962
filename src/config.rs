//! Detection service configuration
//!
//! Loaded once at startup from a JSON file and read-only afterwards.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::api::endpoint::RpcEndpoint;
use crate::engine::{ColorOrder, InputSpec, LabelMap, LabelMapSource, Normalization, TensorLayout};
use crate::error::{DetectError, DetectResult};
use crate::pipeline::chain::{StageKind, TriggerClass};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Object detection model artifact
    pub model_path: PathBuf,
    pub label_map: LabelMapSource,
    pub num_classes: usize,
    pub min_score: f32,
    /// Consecutive frames of one monitor that reuse the previous labels; 0 disables
    pub skip_count: u64,
    /// Object detector input size
    pub crop_width: u32,
    pub crop_height: u32,
    pub heartbeat_ms: u64,
    pub rpc_endpoint: String,
    /// Prefix that re-roots image paths before they are read; may be empty
    pub mount_point: PathBuf,

    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub trigger_class: TriggerClass,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// Tensor conventions a model was trained with.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    #[serde(default)]
    pub color_order: ColorOrder,
    #[serde(default)]
    pub layout: TensorLayout,
    #[serde(default)]
    pub normalization: Normalization,
}

impl InputConfig {
    pub fn spec(&self, width: u32, height: u32) -> InputSpec {
        InputSpec {
            width,
            height,
            color_order: self.color_order,
            layout: self.layout,
            normalization: self.normalization,
        }
    }
}

/// One chained stage run on trigger-class regions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    pub kind: StageKind,
    pub model_path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
    #[serde(default)]
    pub label_map: Option<LabelMapSource>,
    /// Adapter-level filter
    #[serde(default)]
    pub min_score: f32,
    /// Results below this are recorded as no match
    pub min_confidence: f32,
    #[serde(default)]
    pub input: InputConfig,
}

fn default_device() -> String {
    "CPU".to_string()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> DetectResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DetectError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> DetectResult<Self> {
        let config: Config = serde_json::from_str(content).map_err(DetectError::config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.json"
    }

    pub fn validate(&self) -> DetectResult<()> {
        if self.crop_width == 0 || self.crop_height == 0 {
            return Err(DetectError::config("cropWidth and cropHeight must be positive"));
        }
        if self.num_classes == 0 {
            return Err(DetectError::config("numClasses must be positive"));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(DetectError::config("minScore must be within [0, 1]"));
        }
        if self.heartbeat_ms == 0 {
            return Err(DetectError::config("heartbeatMs must be positive"));
        }
        self.endpoint()?;

        if let Some((last, rest)) = self.stages.split_last() {
            if last.kind != StageKind::Classify {
                return Err(DetectError::config("the last chained stage must be a classify stage"));
            }
            if rest.iter().any(|s| s.kind == StageKind::Classify) {
                return Err(DetectError::config("only the last chained stage may classify"));
            }
        }
        for stage in &self.stages {
            if stage.input_width == 0 || stage.input_height == 0 {
                return Err(DetectError::config(format!(
                    "{} stage input size must be positive",
                    stage.kind.as_str()
                )));
            }
            if stage.kind == StageKind::Classify && stage.label_map.is_none() {
                return Err(DetectError::config("classify stage requires a labelMap"));
            }
        }
        Ok(())
    }

    pub fn endpoint(&self) -> DetectResult<RpcEndpoint> {
        self.rpc_endpoint.parse()
    }

    /// Object detector input format.
    pub fn detector_input(&self) -> InputSpec {
        self.input.spec(self.crop_width, self.crop_height)
    }

    /// Load the object detector's label map and check it covers the model.
    pub fn load_label_map(&self) -> DetectResult<LabelMap> {
        let labels = LabelMap::load(&self.label_map)?;
        labels.validate_covers(self.num_classes)?;
        Ok(labels)
    }
}

impl StageConfig {
    pub fn input_spec(&self) -> InputSpec {
        self.input.spec(self.input_width, self.input_height)
    }

    /// Locators without a label map report a single `face` class.
    pub fn load_label_map(&self) -> DetectResult<LabelMap> {
        match &self.label_map {
            Some(source) => LabelMap::load(source),
            None => Ok(LabelMap::from_names(&["background", "face"])),
        }
    }
}
