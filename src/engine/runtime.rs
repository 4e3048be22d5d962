//! OpenVINO-backed inference engine
//!
//! Models are read and compiled once at startup. Each compiled model is owned
//! by exactly one `OpenVinoEngine`, which the adapter serializes behind a lock.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use ndarray::Array4;
use openvino::{CompiledModel, Core, ElementType, Shape, Tensor};
use tracing::info;

use super::adapter::{InferenceEngine, ModelKind, RawDetection};
use crate::error::{DetectError, DetectResult};

/// How to read a model's output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// SSD `DetectionOutput`: `[1, 1, N, 7]` rows of
    /// `[image_id, label, confidence, xmin, ymin, xmax, ymax]`.
    DetectionOutput,
    /// Class probabilities: `[1, C]`.
    Classification,
}

impl From<ModelKind> for OutputFormat {
    fn from(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Objects | ModelKind::FaceLocator => OutputFormat::DetectionOutput,
            ModelKind::Classifier => OutputFormat::Classification,
        }
    }
}

/// Reads and compiles model artifacts on one device.
pub struct OpenVinoRuntime {
    core: Core,
    device: String,
}

impl OpenVinoRuntime {
    pub fn new(device: &str) -> Result<Self> {
        let core = Core::new().context("Failed to initialize OpenVINO runtime")?;
        Ok(Self {
            core,
            device: device.to_string(),
        })
    }

    /// Load and compile one model artifact.
    pub fn load(&mut self, kind: ModelKind, path: &Path) -> Result<OpenVinoEngine> {
        let path_str = path
            .to_str()
            .with_context(|| format!("Model path {} is not valid UTF-8", path.display()))?;

        info!("Loading model: {} from {}", kind.as_str(), path_str);
        let start = Instant::now();

        let model = self
            .core
            .read_model_from_file(path_str, "")
            .with_context(|| format!("Failed to read model {}", path_str))?;
        let compiled = self
            .core
            .compile_model(&model, self.device.as_str().into())
            .with_context(|| format!("Failed to compile model {} for {}", path_str, self.device))?;

        info!("Model {} loaded in {:?}", kind.as_str(), start.elapsed());

        Ok(OpenVinoEngine {
            compiled,
            format: kind.into(),
        })
    }
}

pub struct OpenVinoEngine {
    compiled: CompiledModel,
    format: OutputFormat,
}

// SAFETY: the compiled model is only reached through `&mut self`, and the
// adapter holds each engine behind a mutex, so it is never used from two
// threads at once.
unsafe impl Send for OpenVinoEngine {}

impl InferenceEngine for OpenVinoEngine {
    fn infer(&mut self, tensor: &Array4<f32>) -> DetectResult<Vec<RawDetection>> {
        let dims: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let shape = Shape::new(&dims).map_err(DetectError::inference)?;
        let mut input = Tensor::new(ElementType::F32, &shape).map_err(DetectError::inference)?;

        {
            let bytes = input.get_raw_data_mut().map_err(DetectError::inference)?;
            if bytes.len() != tensor.len() * 4 {
                return Err(DetectError::inference(format!(
                    "input tensor holds {} bytes, expected {}",
                    bytes.len(),
                    tensor.len() * 4
                )));
            }
            for (chunk, value) in bytes.chunks_exact_mut(4).zip(tensor.iter()) {
                chunk.copy_from_slice(&value.to_ne_bytes());
            }
        }

        let mut request = self
            .compiled
            .create_infer_request()
            .map_err(DetectError::inference)?;
        request.set_input_tensor(&input).map_err(DetectError::inference)?;
        request.infer().map_err(DetectError::inference)?;

        let output = request
            .get_output_tensor_by_index(0)
            .map_err(DetectError::inference)?;
        let output_dims = output
            .get_shape()
            .map_err(DetectError::inference)?
            .get_dimensions()
            .to_vec();
        let values = read_f32(&output)?;

        match self.format {
            OutputFormat::DetectionOutput => parse_detection_output(&output_dims, &values),
            OutputFormat::Classification => Ok(parse_classification(&values)),
        }
    }
}

fn read_f32(tensor: &Tensor) -> DetectResult<Vec<f32>> {
    let bytes = tensor.get_raw_data().map_err(DetectError::inference)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decode `[1, 1, N, 7]` SSD rows. A negative image id ends the list.
pub fn parse_detection_output(dims: &[i64], values: &[f32]) -> DetectResult<Vec<RawDetection>> {
    if dims.last() != Some(&7) || values.len() % 7 != 0 {
        return Err(DetectError::inference(format!(
            "unexpected detection output shape {:?}",
            dims
        )));
    }

    Ok(values
        .chunks_exact(7)
        .take_while(|row| row[0] >= 0.0)
        .map(|row| RawDetection {
            class_id: row[1] as i32,
            score: row[2],
            bbox: [row[4], row[3], row[6], row[5]],
        })
        .collect())
}

/// One whole-input result per class.
pub fn parse_classification(values: &[f32]) -> Vec<RawDetection> {
    values
        .iter()
        .enumerate()
        .map(|(class_id, &score)| RawDetection::whole(class_id as i32, score))
        .collect()
}
