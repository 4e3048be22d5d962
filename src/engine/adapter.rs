//! Inference engine adapter
//!
//! One adapter wraps one loaded model for the lifetime of the process. It
//! prepares images, invokes the engine, drops weak detections and maps class
//! ids to names and fractional boxes to original-image pixels.

use image::DynamicImage;
use ndarray::Array4;
use parking_lot::Mutex;
use tracing::debug;

use super::labels::LabelMap;
use super::preprocess::{prepare, InputSpec};
use crate::error::{DetectError, DetectResult};
use crate::types::{BoundingBox, Label};

/// Model roles in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Objects,
    FaceLocator,
    Classifier,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Objects => "objects",
            ModelKind::FaceLocator => "face_locator",
            ModelKind::Classifier => "classifier",
        }
    }
}

/// One raw engine result. `bbox` is fractional `(ymin, xmin, ymax, xmax)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub class_id: i32,
    pub score: f32,
    pub bbox: [f32; 4],
}

impl RawDetection {
    /// A whole-input result, as produced by classifiers.
    pub fn whole(class_id: i32, score: f32) -> Self {
        Self {
            class_id,
            score,
            bbox: [0.0, 0.0, 1.0, 1.0],
        }
    }
}

/// A loaded model that turns an input tensor into raw detections.
pub trait InferenceEngine: Send {
    fn infer(&mut self, tensor: &Array4<f32>) -> DetectResult<Vec<RawDetection>>;
}

pub struct DetectionAdapter {
    kind: ModelKind,
    engine: Mutex<Box<dyn InferenceEngine>>,
    labels: LabelMap,
    input: InputSpec,
    min_score: f32,
}

impl DetectionAdapter {
    pub fn new(
        kind: ModelKind,
        engine: Box<dyn InferenceEngine>,
        labels: LabelMap,
        input: InputSpec,
        min_score: f32,
    ) -> Self {
        Self {
            kind,
            engine: Mutex::new(engine),
            labels,
            input,
            min_score,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Run the model on a tensor and keep detections scoring above `min_score`.
    pub fn infer(&self, tensor: &Array4<f32>) -> DetectResult<Vec<RawDetection>> {
        let raw = self.engine.lock().infer(tensor)?;

        Ok(raw
            .into_iter()
            .filter(|d| d.score > self.min_score)
            .collect())
    }

    /// Detect in a decoded image. Boxes are in that image's pixel space.
    pub fn detect(&self, image: &DynamicImage) -> DetectResult<Vec<Label>> {
        let prepared = prepare(image, &self.input)?;
        let raw = self.infer(&prepared.tensor)?;

        let labels = raw
            .into_iter()
            .map(|d| {
                let name = self.labels.name(d.class_id).ok_or_else(|| {
                    DetectError::inference(format!(
                        "{} model returned class id {} missing from the label map",
                        self.kind.as_str(),
                        d.class_id
                    ))
                })?;
                Ok(Label::new(
                    d.class_id,
                    name,
                    d.score,
                    BoundingBox::from_normalized(d.bbox, prepared.original_width, prepared.original_height),
                ))
            })
            .collect::<DetectResult<Vec<_>>>()?;

        debug!("{} model kept {} detections", self.kind.as_str(), labels.len());
        Ok(labels)
    }

    /// Highest-scoring detection, if any survives `min_score`.
    pub fn detect_best(&self, image: &DynamicImage) -> DetectResult<Option<Label>> {
        let labels = self.detect(image)?;
        Ok(labels
            .into_iter()
            .fold(None, |best: Option<Label>, label| match best {
                Some(b) if b.score >= label.score => Some(b),
                _ => Some(label),
            }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory engines for pipeline tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Returns the same detections on every call and counts invocations.
    pub struct ScriptedEngine {
        pub detections: Vec<RawDetection>,
        pub calls: Arc<AtomicUsize>,
    }

    impl ScriptedEngine {
        pub fn new(detections: Vec<RawDetection>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    detections,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl InferenceEngine for ScriptedEngine {
        fn infer(&mut self, _tensor: &Array4<f32>) -> DetectResult<Vec<RawDetection>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.detections.clone())
        }
    }

    /// Always fails, like an engine whose device went away.
    pub struct FailingEngine;

    impl InferenceEngine for FailingEngine {
        fn infer(&mut self, _tensor: &Array4<f32>) -> DetectResult<Vec<RawDetection>> {
            Err(DetectError::inference("device lost"))
        }
    }

    pub fn adapter(
        kind: ModelKind,
        engine: impl InferenceEngine + 'static,
        names: &[&str],
        min_score: f32,
    ) -> DetectionAdapter {
        DetectionAdapter::new(
            kind,
            Box::new(engine),
            LabelMap::from_names(names),
            InputSpec::new(8, 8),
            min_score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use image::RgbImage;

    fn frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    #[test]
    fn test_model_kind_as_str() {
        assert_eq!(ModelKind::Objects.as_str(), "objects");
        assert_eq!(ModelKind::FaceLocator.as_str(), "face_locator");
        assert_eq!(ModelKind::Classifier.as_str(), "classifier");
    }

    #[test]
    fn test_min_score_is_exclusive() {
        let scores = [0.1, 0.5, 0.50001, 0.9, 0.49999, 1.0];
        let detections = scores
            .iter()
            .map(|&s| RawDetection::whole(0, s))
            .collect();
        let (engine, _) = ScriptedEngine::new(detections);
        let adapter = adapter(ModelKind::Objects, engine, &["person"], 0.5);

        let kept = adapter.detect(&frame(10, 10)).unwrap();
        let kept_scores: Vec<f32> = kept.iter().map(|l| l.score).collect();
        assert_eq!(kept_scores, vec![0.50001, 0.9, 1.0]);
        assert!(kept.iter().all(|l| l.score > 0.5));
    }

    #[test]
    fn test_boxes_use_original_image_size() {
        let (engine, _) = ScriptedEngine::new(vec![RawDetection {
            class_id: 1,
            score: 0.9,
            bbox: [0.25, 0.1, 0.75, 0.9],
        }]);
        let adapter = adapter(ModelKind::Objects, engine, &["background", "person"], 0.0);

        // 200 wide, 400 high; the model input is 8x8
        let labels = adapter.detect(&frame(200, 400)).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name, "person");
        assert_eq!(
            labels[0].bbox,
            BoundingBox { ymin: 100.0, xmin: 20.0, ymax: 300.0, xmax: 180.0 }
        );
    }

    #[test]
    fn test_unknown_class_is_inference_error() {
        let (engine, _) = ScriptedEngine::new(vec![RawDetection::whole(7, 0.9)]);
        let adapter = adapter(ModelKind::Objects, engine, &["person"], 0.0);
        assert!(matches!(
            adapter.detect(&frame(4, 4)),
            Err(DetectError::Inference(_))
        ));
    }

    #[test]
    fn test_detect_best_runs_once() {
        let (engine, calls) = ScriptedEngine::new(vec![
            RawDetection::whole(0, 0.6),
            RawDetection::whole(1, 0.8),
            RawDetection::whole(0, 0.7),
        ]);
        let adapter = adapter(ModelKind::Classifier, engine, &["alice", "bob"], 0.0);

        let best = adapter.detect_best(&frame(4, 4)).unwrap().unwrap();
        assert_eq!(best.name, "bob");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let adapter = adapter(ModelKind::Objects, FailingEngine, &["person"], 0.0);
        assert!(adapter.detect(&frame(4, 4)).unwrap_err().is_call_fatal());
    }
}
