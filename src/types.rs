//! Annotation types shared by the pipeline and the RPC surface
//!
//! The serde shape matches the JSON response schema:
//! `{image, labels: [{id, name, score, box: {ymin, xmin, ymax, xmax}, face?, faceConfidence?}]}`.

use serde::{Deserialize, Deserializer, Serialize};

/// Pixel box in the coordinate space of the original, unresized image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
}

/// Integer sub-area of an image, already clamped to its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Denormalize fractional `(ymin, xmin, ymax, xmax)` model output using the
    /// original image dimensions.
    pub fn from_normalized(fractional: [f32; 4], original_width: u32, original_height: u32) -> Self {
        let (h, w) = (original_height as f32, original_width as f32);
        Self {
            ymin: fractional[0] * h,
            xmin: fractional[1] * w,
            ymax: fractional[2] * h,
            xmax: fractional[3] * w,
        }
    }

    /// Shift a box found inside a region back into the enclosing image.
    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self {
            ymin: self.ymin + dy as f32,
            xmin: self.xmin + dx as f32,
            ymax: self.ymax + dy as f32,
            xmax: self.xmax + dx as f32,
        }
    }

    /// Clamp to `width x height`, truncating to whole pixels.
    /// Returns `None` when nothing of the box is left.
    pub fn clamp(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x1 = self.xmin.max(0.0).min(width as f32) as u32;
        let y1 = self.ymin.max(0.0).min(height as f32) as u32;
        let x2 = self.xmax.max(0.0).min(width as f32) as u32;
        let y2 = self.ymax.max(0.0).min(height as f32) as u32;

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(PixelRect {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }
}

/// One detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i32,
    pub name: String,
    pub score: f32,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    /// `None` until a chained stage has run on this label, then `Some(None)`
    /// when nothing confident was found.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub face: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_confidence: Option<f32>,
}

impl Label {
    pub fn new(id: i32, name: impl Into<String>, score: f32, bbox: BoundingBox) -> Self {
        Self {
            id,
            name: name.into(),
            score,
            bbox,
            face: None,
            face_confidence: None,
        }
    }

    /// Mark that a chained stage ran without a usable result.
    pub fn clear_face(&mut self) {
        self.face = Some(None);
        self.face_confidence = None;
    }
}

/// A field that is present in the JSON, even as `null`, deserializes to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// All labels found in one image. One per input image, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub image: String,
    pub labels: Vec<Label>,
}

impl Annotation {
    pub fn new(image: impl Into<String>, labels: Vec<Label>) -> Self {
        Self {
            image: image.into(),
            labels,
        }
    }

    pub fn empty(image: impl Into<String>) -> Self {
        Self::new(image, Vec::new())
    }
}
