//! Inference engine module
//!
//! Provides:
//! - The `InferenceEngine` seam and the adapter enforcing score filtering and label mapping
//! - OpenVINO model loading, once per process
//! - Image decoding, area resize and tensor layout

pub mod adapter;
pub mod labels;
pub mod runtime;
pub mod preprocess;

pub use adapter::{DetectionAdapter, InferenceEngine, ModelKind, RawDetection};
pub use labels::{LabelMap, LabelMapSource};
pub use runtime::{OpenVinoEngine, OpenVinoRuntime, OutputFormat};
pub use preprocess::{ColorOrder, InputSpec, Normalization, TensorLayout};
