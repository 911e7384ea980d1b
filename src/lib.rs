// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod config;
pub mod processing;
pub mod client;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{AppState, Dimensions, ImageAsset, NormalizationPolicy, PreparedUpload, RemovalResult};
pub use crate::config::AppConfig;
pub use crate::utils::{AppError, AppResult, ImageFormat, NormalizeError, UploadError, ValidationError};
pub use crate::processing::{normalize, normalize_or_original};
pub use crate::commands::*;

// This library file is used as a public API for consuming this crate as a library.
// The command-line entry point is in main.rs.
