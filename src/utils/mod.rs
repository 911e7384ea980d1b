pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{AppError, AppResult, NormalizeError, UploadError, ValidationError};
pub use validation::{validate_asset, DEFAULT_MAX_UPLOAD_BYTES};
pub use formats::{ImageFormat, format_from_extension};
pub use fs::{read_asset, save_result, extract_filename};
