use std::path::Path;
use crate::core::ImageAsset;
use crate::utils::{ImageFormat, ValidationError};

/// Upload cap enforced before anything leaves the machine (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Validates a user selection before it is normalized or uploaded.
///
/// Checks the declared MIME type, the display name's extension and the
/// byte size. The normalizer assumes this has already passed.
pub fn validate_asset(asset: &ImageAsset, max_upload_bytes: u64) -> Result<ImageFormat, ValidationError> {
    let format = validate_mime(asset.mime_type())?;
    validate_file_name(asset.name())?;

    if asset.size_bytes() == 0 {
        return Err(ValidationError::EmptyFile(asset.name().to_string()));
    }

    if asset.size_bytes() > max_upload_bytes {
        return Err(ValidationError::TooLarge {
            size: asset.size_bytes(),
            max: max_upload_bytes,
        });
    }

    Ok(format)
}

/// Validates the declared MIME type against the accepted set
pub fn validate_mime(mime: &str) -> Result<ImageFormat, ValidationError> {
    ImageFormat::from_mime(mime).ok_or_else(|| ValidationError::UnsupportedType(mime.to_string()))
}

/// Validates that the display name carries an allowed extension
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidFileName("No file selected".to_string()));
    }

    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ValidationError::InvalidFileName(format!("File has no extension: {}", name)))?;

    if ImageFormat::from_extension(ext).is_none() {
        return Err(ValidationError::InvalidFileName(format!(
            "Unsupported extension: {}",
            ext
        )));
    }

    Ok(())
}
