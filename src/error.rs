//! Error kinds of the detection pipeline
//!
//! Per-image and per-label kinds (`PathParse`, `ImageRead`, `EmptyRoi`) are
//! degraded into empty or partial annotations by the pipeline. `Inference`
//! aborts the current call and `Config` aborts startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("could not derive frame number and monitor from image path {0}")]
    PathParse(String),

    #[error("failed to read image {path}: {reason}")]
    ImageRead { path: String, reason: String },

    #[error("region of interest has zero area")]
    EmptyRoi,

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("server is shutting down")]
    ShuttingDown,
}

pub type DetectResult<T> = Result<T, DetectError>;

impl DetectError {
    pub fn image_read(path: impl Into<String>, reason: impl ToString) -> Self {
        DetectError::ImageRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl ToString) -> Self {
        DetectError::Inference(reason.to_string())
    }

    pub fn config(reason: impl ToString) -> Self {
        DetectError::Config(reason.to_string())
    }

    /// True for errors that end the whole call rather than one image.
    pub fn is_call_fatal(&self) -> bool {
        matches!(
            self,
            DetectError::Inference(_) | DetectError::Config(_) | DetectError::ShuttingDown
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_split() {
        assert!(!DetectError::PathParse("/garbage".into()).is_call_fatal());
        assert!(!DetectError::image_read("/a.jpg", "missing").is_call_fatal());
        assert!(!DetectError::EmptyRoi.is_call_fatal());
        assert!(DetectError::inference("boom").is_call_fatal());
        assert!(DetectError::ShuttingDown.is_call_fatal());
    }

    #[test]
    fn test_display_includes_path() {
        let err = DetectError::image_read("/cam1/1-capture.jpg", "not found");
        assert_eq!(
            err.to_string(),
            "failed to read image /cam1/1-capture.jpg: not found"
        );
    }
}
