//! Command handlers for background removal.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use crate::core::{AppState, ImageAsset, PreparedUpload, RemovalResult};
use crate::processing::normalize_or_original;
use crate::utils::{AppError, AppResult, read_asset, save_result, validate_asset};

/// Validates a selection and shrinks it for upload when it is oversized.
///
/// Normalization failures are not errors here: the original asset is
/// uploaded instead.
///
/// # Arguments
/// * `state` - Controller state holding the config
/// * `asset` - The user's selection
///
/// # Returns
/// The asset to upload, with its original and final sizes.
pub async fn prepare_upload(state: &AppState, asset: ImageAsset) -> AppResult<PreparedUpload> {
    let config = state.config();
    validate_asset(&asset, config.max_upload_bytes)?;

    let original_size = asset.size_bytes();
    let prepared = normalize_or_original(asset.clone(), &config.policy).await;
    let normalized = prepared != asset;

    let upload = PreparedUpload {
        asset: prepared,
        original_size,
        normalized,
    };

    if normalized {
        debug!(
            "'{}' normalized: {} → {} bytes ({} saved)",
            upload.asset.name(),
            original_size,
            upload.asset.size_bytes(),
            upload.saved_bytes()
        );
    }

    Ok(upload)
}

/// Removes the background of one image.
///
/// Starts a new request, prepares the asset, uploads it once and records
/// the result as current. If the user started another request while this
/// one was in flight, the result is dropped.
///
/// # Arguments
/// * `state` - Controller state containing the client
/// * `asset` - The user's selection
///
/// # Returns
/// The processed image, or [`AppError::Superseded`] when a newer request won.
pub async fn remove_background(state: &AppState, asset: ImageAsset) -> AppResult<RemovalResult> {
    let request_id = state.begin_request();
    debug!("Request {} started for '{}'", request_id, asset.name());

    let upload = prepare_upload(state, asset).await?;
    if !state.is_current(request_id) {
        return Err(AppError::Superseded(request_id));
    }

    let processed = state.client().remove_background(&upload.asset).await?;

    let result = RemovalResult {
        request_id,
        bytes: processed.bytes,
        mime_type: processed.mime_type,
        download_name: processed
            .file_name
            .unwrap_or_else(|| state.config().download_name.clone()),
    };

    if !state.accept(result.clone()).await {
        return Err(AppError::Superseded(request_id));
    }

    info!(
        "Background removed for '{}' ({} bytes returned)",
        upload.asset.name(),
        result.size_bytes()
    );
    Ok(result)
}

/// Reads `path` and removes its background.
///
/// Convenience wrapper around [`remove_background`] for file selections.
pub async fn remove_background_file(state: &AppState, path: impl AsRef<Path>) -> AppResult<RemovalResult> {
    let asset = read_asset(path).await?;
    remove_background(state, asset).await
}

/// Saves a result to `target` (a directory or a file path).
pub async fn download_result(result: &RemovalResult, target: impl AsRef<Path>) -> AppResult<PathBuf> {
    save_result(result, target).await
}
