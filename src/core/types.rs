//! Core types for assets, normalization settings and removal results.

use std::time::SystemTime;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use crate::utils::{ImageFormat, ValidationError};

/// An in-memory image: bytes, declared MIME type and display name.
///
/// Immutable once built; clones share the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Bytes,
    mime_type: String,
    name: String,
    last_modified: SystemTime,
}

impl ImageAsset {
    pub fn new(
        bytes: impl Into<Bytes>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::with_modified(bytes, mime_type, name, SystemTime::now())
    }

    pub fn with_modified(
        bytes: impl Into<Bytes>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
        last_modified: SystemTime,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            name: name.into(),
            last_modified,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared format, if the MIME type is one we know
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime(&self.mime_type)
    }
}

/// Pixel dimensions of a decoded image. Both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// When and how to shrink an asset before upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizationPolicy {
    /// Only normalize assets at or above this size
    pub size_threshold_bytes: u64,
    /// Cap on the longer side after scaling
    pub max_dimension_pixels: u32,
    /// Lossy-encode quality factor in 0..=1
    pub output_quality: f32,
    /// Target encoding
    #[serde(rename = "outputMimeType")]
    pub output_format: ImageFormat,
}

impl NormalizationPolicy {
    pub const DEFAULT_THRESHOLD_BYTES: u64 = 2 * 1024 * 1024;
    pub const DEFAULT_MAX_DIMENSION: u32 = 2048;
    pub const DEFAULT_QUALITY: f32 = 0.9;

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_dimension_pixels == 0 {
            return Err(ValidationError::settings("maxDimensionPixels cannot be 0"));
        }
        if !self.output_quality.is_finite() || !(0.0..=1.0).contains(&self.output_quality) {
            return Err(ValidationError::settings(format!(
                "Invalid outputQuality: {}. Must be between 0 and 1",
                self.output_quality
            )));
        }
        Ok(())
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            size_threshold_bytes: Self::DEFAULT_THRESHOLD_BYTES,
            max_dimension_pixels: Self::DEFAULT_MAX_DIMENSION,
            output_quality: Self::DEFAULT_QUALITY,
            output_format: ImageFormat::Jpeg,
        }
    }
}

/// Asset ready for upload plus what normalization did to it.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub asset: ImageAsset,
    pub original_size: u64,
    pub normalized: bool,
}

impl PreparedUpload {
    /// Bytes saved (can be negative if the re-encode grew)
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.asset.size_bytes() as i64
    }
}

/// Processed image returned by the removal service.
///
/// Returned from each request and held by the shell's own state, never
/// in process-wide storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalResult {
    /// Request that produced this result
    pub request_id: u64,
    pub bytes: Bytes,
    pub mime_type: String,
    /// Suggested file name for saving
    pub download_name: String,
}

impl RemovalResult {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}
