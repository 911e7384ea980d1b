//! Downscale step of normalization.

use image::DynamicImage;
use image::imageops::FilterType;
use crate::core::Dimensions;

/// Resampling filter for downscaling.
const FILTER: FilterType = FilterType::Lanczos3;

/// Computes the size an image should have so its longer side fits `cap`.
///
/// Never enlarges: images already within the cap keep their size. The
/// scale is `min(cap/W, cap/H)` with each side floored, computed in
/// integers so the longer side lands exactly on `cap`. Sides are clamped
/// to at least one pixel for extreme aspect ratios.
pub fn target_dimensions(source: Dimensions, cap: u32) -> Dimensions {
    let longest = source.longest_side();
    if longest <= cap || longest == 0 {
        return source;
    }

    let scale = |side: u32| -> u32 {
        let scaled = (side as u64 * cap as u64) / longest as u64;
        (scaled as u32).max(1)
    };

    Dimensions::new(scale(source.width), scale(source.height))
}

/// Resamples `image` to `target`, or hands it back untouched when the
/// size already matches.
pub fn resample(image: DynamicImage, target: Dimensions) -> DynamicImage {
    if image.width() == target.width && image.height() == target.height {
        return image;
    }
    image.resize_exact(target.width, target.height, FILTER)
}
