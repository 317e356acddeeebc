use crate::datamodel::TransformStage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use thiserror::Error;

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 150;
pub const DEFAULT_JPEG_QUALITY: u8 = 85;
/// Largest height a JPEG can carry. Taller targets are refused before any
/// pixel buffer is allocated.
pub const MAX_THUMBNAIL_HEIGHT: u32 = 65_535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    /// Target width in pixels. The height follows the source aspect ratio.
    pub width: u32,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_THUMBNAIL_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug)]
pub struct Thumbnail {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Unsupported or corrupt image: {0}")]
    Decode(#[source] ImageError),

    #[error("Cannot resize a {width}x{height} image to width {target_width}")]
    Resize {
        width: u32,
        height: u32,
        target_width: u32,
    },

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] ImageError),
}

impl ThumbnailError {
    pub fn stage(&self) -> TransformStage {
        match self {
            ThumbnailError::Decode(_) => TransformStage::Decode,
            ThumbnailError::Resize { .. } => TransformStage::Resize,
            ThumbnailError::Encode(_) => TransformStage::Encode,
        }
    }
}

/// Height that keeps the aspect ratio of `width x height` at `target_width`.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (height as f64 * target_width as f64 / width as f64).round() as u32;
    scaled.max(1)
}

/// Decode `source`, resize it to the target width and re-encode as JPEG.
///
/// CPU bound. Async callers should run it on the blocking pool.
pub fn make_thumbnail(source: &[u8], spec: &ThumbnailSpec) -> Result<Thumbnail, ThumbnailError> {
    let image = image::load_from_memory(source).map_err(ThumbnailError::Decode)?;
    let resized = resize_to_width(&image, spec.width)?;

    // JPEG has no alpha channel.
    let rgb = resized.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, spec.jpeg_quality)
        .encode_image(&rgb)
        .map_err(ThumbnailError::Encode)?;

    Ok(Thumbnail {
        jpeg,
        width: rgb.width(),
        height: rgb.height(),
    })
}

fn resize_to_width(
    image: &DynamicImage,
    target_width: u32,
) -> Result<DynamicImage, ThumbnailError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 || target_width == 0 {
        return Err(ThumbnailError::Resize {
            width,
            height,
            target_width,
        });
    }
    let target_height = scaled_height(width, height, target_width);
    if target_height > MAX_THUMBNAIL_HEIGHT {
        return Err(ThumbnailError::Resize {
            width,
            height,
            target_width,
        });
    }
    Ok(image.resize_exact(target_width, target_height, FilterType::Lanczos3))
}
