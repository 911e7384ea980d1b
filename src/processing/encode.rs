//! Maps a target format and 0–1 quality factor onto `image` encoders.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use tracing::warn;
use crate::utils::{ImageFormat, NormalizeError};

type Result<T> = std::result::Result<T, NormalizeError>;

/// Converts a 0–1 quality factor to the 1–100 scale JPEG expects.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// True when a sub-1.0 quality was asked of a format that cannot use it.
pub fn quality_ignored(format: ImageFormat, quality: f32) -> bool {
    !format.is_lossy() && quality < 1.0
}

/// Encodes `image` as `format`.
///
/// JPEG honours `quality` and drops any alpha channel. PNG and WebP are
/// written lossless, so `quality` has no effect on them. Zero-length
/// output is reported as an encode failure.
pub fn encode_image(image: &DynamicImage, format: ImageFormat, quality: f32) -> Result<Vec<u8>> {
    if quality_ignored(format, quality) {
        warn!("{format} is encoded lossless; outputQuality {quality} is ignored");
    }

    let mut buf = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| NormalizeError::encode(format!("JPEG encode failed: {e}")))?;
        }
        ImageFormat::Png => {
            let (raw, color) = lossless_pixels(image);
            PngEncoder::new(&mut buf)
                .write_image(&raw, image.width(), image.height(), color)
                .map_err(|e| NormalizeError::encode(format!("PNG encode failed: {e}")))?;
        }
        ImageFormat::WebP => {
            let (raw, color) = lossless_pixels(image);
            WebPEncoder::new_lossless(&mut buf)
                .write_image(&raw, image.width(), image.height(), color)
                .map_err(|e| NormalizeError::encode(format!("WebP encode failed: {e}")))?;
        }
    }

    if buf.is_empty() {
        return Err(NormalizeError::encode(format!("{format} encoder produced no output")));
    }

    Ok(buf)
}

/// 8-bit pixel buffer, keeping alpha only when the source has it.
fn lossless_pixels(image: &DynamicImage) -> (Vec<u8>, ExtendedColorType) {
    if image.color().has_alpha() {
        (image.to_rgba8().into_raw(), ExtendedColorType::Rgba8)
    } else {
        (image.to_rgb8().into_raw(), ExtendedColorType::Rgb8)
    }
}
