//! Pre-upload image normalization.
//!
//! Oversized assets are decoded, downscaled so the longer side fits the
//! policy cap, and re-encoded in the policy's output format. Decode,
//! resample and encode are CPU-bound, so they run inside
//! `tokio::task::spawn_blocking` and the caller only awaits the result.

use std::io::Cursor;
use image::{DynamicImage, ImageReader};
use tracing::{debug, warn};

use crate::core::{Dimensions, ImageAsset, NormalizationPolicy};
use crate::utils::NormalizeError;

use super::encode::encode_image;
use super::resize::{resample, target_dimensions};

type Result<T> = std::result::Result<T, NormalizeError>;

/// Normalizes `asset` according to `policy`.
///
/// Assets smaller than `size_threshold_bytes` are returned unchanged.
/// Everything else is re-encoded as `policy.output_format`, shrunk first
/// if its longer side exceeds `max_dimension_pixels`. The output keeps
/// the asset's display name and gets a fresh timestamp.
///
/// Fails with [`NormalizeError::Decode`] when the bytes are not an image
/// and [`NormalizeError::Encode`] when re-encoding yields nothing.
pub async fn normalize(asset: ImageAsset, policy: &NormalizationPolicy) -> Result<ImageAsset> {
    if asset.size_bytes() < policy.size_threshold_bytes {
        debug!(
            "'{}' is {} bytes, below the {} byte threshold; leaving it untouched",
            asset.name(),
            asset.size_bytes(),
            policy.size_threshold_bytes
        );
        return Ok(asset);
    }

    let bytes = asset.bytes().clone();
    let job_policy = policy.clone();
    let (encoded, source, target) =
        tokio::task::spawn_blocking(move || normalize_blocking(&bytes, &job_policy))
            .await
            .map_err(|e| NormalizeError::encode(format!("Normalization task failed: {e}")))??;

    debug!(
        "Normalized '{}': {} → {}, {} → {} bytes ({})",
        asset.name(),
        source,
        target,
        asset.size_bytes(),
        encoded.len(),
        policy.output_format
    );

    Ok(ImageAsset::new(encoded, policy.output_format.mime(), asset.name()))
}

/// Normalizes `asset`, falling back to the original when normalization fails.
///
/// The failure is logged and otherwise swallowed: the upload proceeds
/// with the unmodified asset and the user is not told.
pub async fn normalize_or_original(asset: ImageAsset, policy: &NormalizationPolicy) -> ImageAsset {
    match normalize(asset.clone(), policy).await {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!("Normalization of '{}' failed, uploading original: {}", asset.name(), e);
            asset
        }
    }
}

/// Reads the pixel dimensions of an encoded image, from the header where
/// the codec allows it.
pub fn probe_dimensions(bytes: &[u8]) -> Result<Dimensions> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| NormalizeError::decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| NormalizeError::decode(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(NormalizeError::decode(format!("Image has no pixels ({width}×{height})")));
    }
    Ok(Dimensions::new(width, height))
}

// ── Blocking work (runs on tokio's blocking thread pool) ──────────────────────────────

fn normalize_blocking(
    bytes: &[u8],
    policy: &NormalizationPolicy,
) -> Result<(Vec<u8>, Dimensions, Dimensions)> {
    let image = decode(bytes)?;
    let source = Dimensions::new(image.width(), image.height());
    let target = target_dimensions(source, policy.max_dimension_pixels);

    let resized = resample(image, target);
    let encoded = encode_image(&resized, policy.output_format, policy.output_quality)?;

    Ok((encoded, source, target))
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| NormalizeError::decode(format!("Failed to decode image: {e}")))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(NormalizeError::decode("Image has no pixels"));
    }
    Ok(image)
}
