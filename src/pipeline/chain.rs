//! Pipeline stage chaining
//!
//! Runs the configured stages on every trigger-class label: an optional face
//! locator narrows the person box to a face, and the final classifier names it.

use image::{DynamicImage, GenericImageView};
use serde::Deserialize;
use tracing::debug;

use crate::engine::preprocess::crop_roi;
use crate::engine::DetectionAdapter;
use crate::error::{DetectError, DetectResult};
use crate::types::{Label, PixelRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Find the best sub-region and pass it on
    Locate,
    /// Name the region; always the last stage
    Classify,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Locate => "locate",
            StageKind::Classify => "classify",
        }
    }
}

/// Object class whose labels are handed to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TriggerClass {
    #[default]
    Person,
    Other(String),
}

impl From<String> for TriggerClass {
    fn from(name: String) -> Self {
        if name == "person" {
            TriggerClass::Person
        } else {
            TriggerClass::Other(name)
        }
    }
}

impl TriggerClass {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerClass::Person => "person",
            TriggerClass::Other(name) => name,
        }
    }

    pub fn matches(&self, label: &Label) -> bool {
        label.name == self.as_str()
    }
}

pub struct ChainStage {
    pub kind: StageKind,
    pub adapter: DetectionAdapter,
    /// Best results scoring below this are recorded as no match
    pub min_confidence: f32,
}

pub struct StageChain {
    trigger: TriggerClass,
    stages: Vec<ChainStage>,
}

impl StageChain {
    pub fn new(trigger: TriggerClass, stages: Vec<ChainStage>) -> Self {
        Self { trigger, stages }
    }

    pub fn stages(&self) -> &[ChainStage] {
        &self.stages
    }

    /// True if any label would be handed to the chain.
    pub fn triggers(&self, labels: &[Label]) -> bool {
        labels.iter().any(|l| self.trigger.matches(l))
    }

    /// Fill `face`/`faceConfidence` of every trigger label found in `image`.
    ///
    /// Zero-area regions and empty stage results mark the label and move on;
    /// only engine failures end the call.
    pub fn apply(&self, image: &DynamicImage, labels: &mut [Label]) -> DetectResult<()> {
        for label in labels.iter_mut().filter(|l| self.trigger.matches(l)) {
            match self.run_label(image, label) {
                Ok(()) => {}
                Err(DetectError::EmptyRoi) => {
                    debug!("Zero-area region for {} at {:?}", label.name, label.bbox);
                    label.clear_face();
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Mark every trigger label as checked without a result, used when the
    /// image itself could not be read.
    pub fn clear(&self, labels: &mut [Label]) {
        for label in labels.iter_mut().filter(|l| self.trigger.matches(l)) {
            label.clear_face();
        }
    }

    fn run_label(&self, image: &DynamicImage, label: &mut Label) -> DetectResult<()> {
        let (width, height) = image.dimensions();
        let mut roi = label.bbox.clamp(width, height).ok_or(DetectError::EmptyRoi)?;
        let mut region = crop_roi(image, &roi);

        for stage in &self.stages {
            let best = stage.adapter.detect_best(&region)?;

            match stage.kind {
                StageKind::Locate => {
                    let Some(found) = best.filter(|b| b.score >= stage.min_confidence) else {
                        label.clear_face();
                        return Ok(());
                    };
                    roi = narrow(&roi, &found, width, height)?;
                    region = crop_roi(image, &roi);
                }
                StageKind::Classify => {
                    match best {
                        Some(found) if found.score >= stage.min_confidence => {
                            label.face = Some(Some(found.name));
                            label.face_confidence = Some(found.score);
                        }
                        Some(found) => {
                            label.face = Some(None);
                            label.face_confidence = Some(found.score);
                        }
                        None => label.clear_face(),
                    }
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

/// Map a box found inside `roi` back to image space and clamp it.
fn narrow(roi: &PixelRect, found: &Label, width: u32, height: u32) -> DetectResult<PixelRect> {
    found
        .bbox
        .offset(roi.x, roi.y)
        .clamp(width, height)
        .ok_or(DetectError::EmptyRoi)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::engine::adapter::testing::{adapter, FailingEngine, ScriptedEngine};
    use crate::engine::{ModelKind, RawDetection};
    use crate::types::BoundingBox;
    use image::RgbImage;

    fn frame() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(100, 80))
    }

    fn label(name: &str, bbox: BoundingBox) -> Label {
        Label::new(1, name, 0.9, bbox)
    }

    fn person_box() -> BoundingBox {
        BoundingBox { ymin: 10.0, xmin: 20.0, ymax: 70.0, xmax: 60.0 }
    }

    fn locator(detections: Vec<RawDetection>) -> (ChainStage, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let (engine, calls) = ScriptedEngine::new(detections);
        let stage = ChainStage {
            kind: StageKind::Locate,
            adapter: adapter(ModelKind::FaceLocator, engine, &["background", "face"], 0.0),
            min_confidence: 0.5,
        };
        (stage, calls)
    }

    fn classifier(class_id: i32, score: f32) -> (ChainStage, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let (engine, calls) = ScriptedEngine::new(vec![RawDetection::whole(class_id, score)]);
        let stage = ChainStage {
            kind: StageKind::Classify,
            adapter: adapter(ModelKind::Classifier, engine, &["Unknown", "nikki"], 0.0),
            min_confidence: 0.8,
        };
        (stage, calls)
    }

    #[test]
    fn test_trigger_class_from_config() {
        let trigger: TriggerClass = serde_json::from_str("\"person\"").unwrap();
        assert_eq!(trigger, TriggerClass::Person);
        let trigger: TriggerClass = serde_json::from_str("\"dog\"").unwrap();
        assert_eq!(trigger, TriggerClass::Other("dog".into()));
        assert!(trigger.matches(&label("dog", person_box())));
        assert!(!trigger.matches(&label("person", person_box())));
    }

    #[test]
    fn test_locate_then_classify() {
        let (locate, _) = locator(vec![RawDetection {
            class_id: 1,
            score: 0.95,
            bbox: [0.0, 0.0, 0.5, 0.5],
        }]);
        let (classify, calls) = classifier(1, 0.9);
        let chain = StageChain::new(TriggerClass::Person, vec![locate, classify]);

        let mut labels = vec![label("person", person_box()), label("car", person_box())];
        chain.apply(&frame(), &mut labels).unwrap();

        assert_eq!(labels[0].face, Some(Some("nikki".to_string())));
        assert_eq!(labels[0].face_confidence, Some(0.9));
        assert_eq!(labels[1].face, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_low_confidence_reports_score() {
        let (classify, _) = classifier(1, 0.3);
        let chain = StageChain::new(TriggerClass::Person, vec![classify]);

        let mut labels = vec![label("person", person_box())];
        chain.apply(&frame(), &mut labels).unwrap();

        assert_eq!(labels[0].face, Some(None));
        assert_eq!(labels[0].face_confidence, Some(0.3));
    }

    #[test]
    fn test_no_face_found_skips_classifier() {
        let (locate, _) = locator(Vec::new());
        let (classify, calls) = classifier(1, 0.9);
        let chain = StageChain::new(TriggerClass::Person, vec![locate, classify]);

        let mut labels = vec![label("person", person_box())];
        chain.apply(&frame(), &mut labels).unwrap();

        assert_eq!(labels[0].face, Some(None));
        assert_eq!(labels[0].face_confidence, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_weak_face_is_no_match() {
        let (locate, _) = locator(vec![RawDetection {
            class_id: 1,
            score: 0.2,
            bbox: [0.0, 0.0, 0.5, 0.5],
        }]);
        let (classify, calls) = classifier(1, 0.9);
        let chain = StageChain::new(TriggerClass::Person, vec![locate, classify]);

        let mut labels = vec![label("person", person_box())];
        chain.apply(&frame(), &mut labels).unwrap();

        assert_eq!(labels[0].face, Some(None));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_area_roi_continues() {
        let (classify, calls) = classifier(1, 0.9);
        let chain = StageChain::new(TriggerClass::Person, vec![classify]);

        let flat = BoundingBox { ymin: 10.0, xmin: 30.0, ymax: 50.0, xmax: 30.0 };
        let mut labels = vec![label("person", flat), label("person", person_box())];
        chain.apply(&frame(), &mut labels).unwrap();

        assert_eq!(labels[0].face, Some(None));
        assert_eq!(labels[1].face, Some(Some("nikki".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_failure_aborts() {
        let chain = StageChain::new(
            TriggerClass::Person,
            vec![ChainStage {
                kind: StageKind::Classify,
                adapter: adapter(ModelKind::Classifier, FailingEngine, &["Unknown"], 0.0),
                min_confidence: 0.5,
            }],
        );
        let mut labels = vec![label("person", person_box())];
        assert!(matches!(
            chain.apply(&frame(), &mut labels),
            Err(DetectError::Inference(_))
        ));
    }

    #[test]
    fn test_clear_marks_only_triggers() {
        let (classify, _) = classifier(1, 0.9);
        let chain = StageChain::new(TriggerClass::Person, vec![classify]);

        let mut labels = vec![label("person", person_box()), label("car", person_box())];
        chain.clear(&mut labels);
        assert_eq!(labels[0].face, Some(None));
        assert_eq!(labels[1].face, None);
        assert!(chain.triggers(&labels));
    }
}
