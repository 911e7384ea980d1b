use std::io;
use std::path::{Path, PathBuf, is_separator};
use tokio::fs;
use tracing::debug;
use crate::core::{ImageAsset, RemovalResult};
use crate::utils::{AppError, AppResult, format_from_extension};

/// Reads a file from disk into an [`ImageAsset`].
///
/// The MIME type comes from the extension; the file's mtime becomes the
/// asset's last-modified time.
pub async fn read_asset(path: impl AsRef<Path>) -> AppResult<ImageAsset> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::not_found(path),
            _ => AppError::io(format!("Cannot access {}: {e}", path.display())),
        })?;

    if !metadata.is_file() {
        return Err(AppError::io(format!("Not a file: {}", path.display())));
    }

    let format = format_from_extension(path)?;
    let bytes = fs::read(path).await?;
    let name = extract_filename(path);
    let modified = metadata.modified().unwrap_or_else(|_| std::time::SystemTime::now());

    debug!("Read '{}' ({} bytes, {})", name, bytes.len(), format);
    Ok(ImageAsset::with_modified(bytes, format.mime(), name, modified))
}

/// Writes a processed image to disk.
///
/// `target` may be a directory (the result's download name is appended)
/// or a full file path. A target ending in a path separator is a
/// directory even if it does not exist yet. Missing directories are created.
pub async fn save_result(result: &RemovalResult, target: impl AsRef<Path>) -> AppResult<PathBuf> {
    let target = target.as_ref();
    let path = if is_directory_target(target) {
        target.join(&result.download_name)
    } else {
        target.to_path_buf()
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::io(format!("Cannot create output directory: {e}"))
            })?;
        }
    }

    fs::write(&path, &result.bytes).await?;
    debug!("Saved {} bytes to {}", result.bytes.len(), path.display());
    Ok(path)
}

fn is_directory_target(target: &Path) -> bool {
    target.is_dir() || target.as_os_str().to_string_lossy().ends_with(is_separator)
}

/// Get file name component as an owned string
pub fn extract_filename(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
