//! Image preprocessing for the inference stages
//!
//! Decodes alarm frames from disk, resizes them with area averaging and lays
//! them out as the tensor a model was trained with.

use std::io::Cursor;
use std::path::Path;

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;
use serde::Deserialize;

use crate::error::{DetectError, DetectResult};
use crate::types::PixelRect;

/// Channel order the model expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    /// OpenCV order, used by most converted detection models
    #[default]
    Bgr,
    Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    #[default]
    Nchw,
    Nhwc,
}

/// Pixel value scaling applied after the resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// 0..=255
    #[default]
    Raw,
    /// 0..=1
    Unit,
    /// -1..=1
    Symmetric,
}

impl Normalization {
    fn apply(self, value: u8) -> f32 {
        let value = value as f32;
        match self {
            Normalization::Raw => value,
            Normalization::Unit => value / 255.0,
            Normalization::Symmetric => (value - 127.5) / 127.5,
        }
    }
}

/// Tensor format a model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    pub color_order: ColorOrder,
    pub layout: TensorLayout,
    pub normalization: Normalization,
}

impl InputSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_order: ColorOrder::default(),
            layout: TensorLayout::default(),
            normalization: Normalization::default(),
        }
    }

    /// Tensor dimensions, batch of one.
    pub fn shape(&self) -> [usize; 4] {
        let (w, h) = (self.width as usize, self.height as usize);
        match self.layout {
            TensorLayout::Nchw => [1, 3, h, w],
            TensorLayout::Nhwc => [1, h, w, 3],
        }
    }
}

/// A model-ready tensor plus the size of the image it came from.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub tensor: Array4<f32>,
    pub original_width: u32,
    pub original_height: u32,
}

/// Read and decode an image file, applying its EXIF orientation.
pub fn load_image(path: &Path) -> DetectResult<DynamicImage> {
    let display = path.display().to_string();
    let data = std::fs::read(path).map_err(|e| DetectError::image_read(&display, e))?;
    decode_image(&data).map_err(|e| DetectError::image_read(&display, e))
}

/// Decode image bytes with EXIF orientation handling
pub fn decode_image(data: &[u8]) -> image::ImageResult<DynamicImage> {
    let image = image::load_from_memory(data)?;
    Ok(apply_exif_orientation(data, image))
}

fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    let orientation = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1),
        Err(_) => 1,
    };

    // See https://exiftool.org/TagNames/EXIF.html (Orientation)
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Resize to exactly `width x height` with area-weighted (box) filtering.
pub fn resize_area(image: &DynamicImage, width: u32, height: u32) -> DetectResult<RgbImage> {
    let (src_w, src_h) = image.dimensions();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return Err(DetectError::image_read(
            "<decoded image>",
            format!("cannot resize {}x{} to {}x{}", src_w, src_h, width, height),
        ));
    }

    let src = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut dst = Image::new(width, height, PixelType::U8x3);
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box));

    Resizer::new()
        .resize(&src, &mut dst, Some(&options))
        .map_err(|e| DetectError::image_read("<decoded image>", e))?;

    RgbImage::from_raw(width, height, dst.buffer().to_vec())
        .ok_or_else(|| DetectError::image_read("<decoded image>", "resize produced a short buffer"))
}

/// Lay out an RGB image as a batch-of-one tensor.
pub fn image_to_tensor(rgb: &RgbImage, spec: &InputSpec) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let dims = match spec.layout {
        TensorLayout::Nchw => (1, 3, height as usize, width as usize),
        TensorLayout::Nhwc => (1, height as usize, width as usize, 3),
    };
    let mut tensor = Array4::<f32>::zeros(dims);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let channels = match spec.color_order {
            ColorOrder::Bgr => [pixel[2], pixel[1], pixel[0]],
            ColorOrder::Rgb => [pixel[0], pixel[1], pixel[2]],
        };
        for (c, value) in channels.into_iter().enumerate() {
            let value = spec.normalization.apply(value);
            match spec.layout {
                TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
            }
        }
    }

    tensor
}

/// Resize and convert an already decoded image.
pub fn prepare(image: &DynamicImage, spec: &InputSpec) -> DetectResult<Prepared> {
    let (original_width, original_height) = image.dimensions();
    let resized = resize_area(image, spec.width, spec.height)?;

    Ok(Prepared {
        tensor: image_to_tensor(&resized, spec),
        original_width,
        original_height,
    })
}

/// Decode `path` and prepare it for a model of the given input size.
/// Returns the tensor with the original width and height.
pub fn load_and_prepare(path: &Path, spec: &InputSpec) -> DetectResult<(Array4<f32>, u32, u32)> {
    let image = load_image(path)?;
    let prepared = prepare(&image, spec).map_err(|e| match e {
        DetectError::ImageRead { reason, .. } => {
            DetectError::image_read(path.display().to_string(), reason)
        }
        other => other,
    })?;
    Ok((prepared.tensor, prepared.original_width, prepared.original_height))
}

/// Cut a clamped region out of an image.
pub fn crop_roi(image: &DynamicImage, roi: &PixelRect) -> DynamicImage {
    image.crop_imm(roi.x, roi.y, roi.width, roi.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_nchw_bgr_raw() {
        let image = solid(8, 6, [10, 20, 30]);
        let prepared = prepare(&image, &InputSpec::new(4, 3)).unwrap();

        assert_eq!(prepared.tensor.shape(), &[1, 3, 3, 4]);
        assert_eq!((prepared.original_width, prepared.original_height), (8, 6));
        assert_eq!(prepared.tensor[[0, 0, 1, 1]], 30.0);
        assert_eq!(prepared.tensor[[0, 1, 1, 1]], 20.0);
        assert_eq!(prepared.tensor[[0, 2, 1, 1]], 10.0);
    }

    #[test]
    fn test_nhwc_rgb_unit() {
        let image = solid(4, 4, [255, 0, 51]);
        let spec = InputSpec {
            layout: TensorLayout::Nhwc,
            color_order: ColorOrder::Rgb,
            normalization: Normalization::Unit,
            ..InputSpec::new(2, 2)
        };
        let prepared = prepare(&image, &spec).unwrap();

        assert_eq!(prepared.tensor.shape(), &spec.shape());
        assert!((prepared.tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(prepared.tensor[[0, 0, 0, 1]].abs() < 1e-6);
        assert!((prepared.tensor[[0, 1, 1, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_area_resize_averages() {
        // Left half black, right half white; downscale 4x2 -> 2x1
        let mut rgb = RgbImage::new(4, 2);
        for (x, _, pixel) in rgb.enumerate_pixels_mut() {
            *pixel = if x < 2 { Rgb([0, 0, 0]) } else { Rgb([200, 200, 200]) };
        }
        let resized = resize_area(&DynamicImage::ImageRgb8(rgb), 2, 1).unwrap();
        assert_eq!(resized.get_pixel(0, 0)[0], 0);
        assert_eq!(resized.get_pixel(1, 0)[0], 200);
    }

    #[test]
    fn test_symmetric_range() {
        assert_eq!(Normalization::Symmetric.apply(0), -1.0);
        assert_eq!(Normalization::Symmetric.apply(255), 1.0);
    }

    #[test]
    fn test_missing_file_is_image_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_and_prepare(&dir.path().join("00001-capture.jpg"), &InputSpec::new(4, 4));
        assert!(matches!(result, Err(DetectError::ImageRead { .. })));
    }

    #[test]
    fn test_corrupt_file_is_image_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00002-capture.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        assert!(matches!(load_image(&path), Err(DetectError::ImageRead { .. })));
    }

    #[test]
    fn test_load_and_prepare_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00003-capture.png");
        solid(40, 30, [1, 2, 3]).save(&path).unwrap();

        let (tensor, width, height) = load_and_prepare(&path, &InputSpec::new(8, 8)).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 8, 8]);
        assert_eq!((width, height), (40, 30));
    }

    #[test]
    fn test_crop_roi() {
        let image = solid(100, 50, [0, 0, 0]);
        let crop = crop_roi(&image, &PixelRect { x: 10, y: 5, width: 20, height: 30 });
        assert_eq!(crop.dimensions(), (20, 30));
    }
}
