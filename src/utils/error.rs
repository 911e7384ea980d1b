//! Error types for the background-removal client.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Failures of the image normalizer.
///
/// Both are recoverable: callers are expected to fall back to the
/// original asset rather than abort.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NormalizeError {
    /// Input bytes are not a decodable image
    #[error("Decode error: {0}")]
    Decode(String),
    /// Re-encoding produced no usable output
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Validation errors for a user selection and for settings.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    /// MIME type outside the accepted set
    #[error("Invalid file format: {0}. Allowed: JPG, PNG, WebP")]
    UnsupportedType(String),
    /// Zero-length selection
    #[error("File is empty: {0}")]
    EmptyFile(String),
    /// Selection exceeds the upload limit
    #[error("File too large: {size} bytes. Maximum size: {max} bytes")]
    TooLarge { size: u64, max: u64 },
    /// Display name missing or carrying a disallowed extension
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Errors from the single upload to the removal service.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UploadError {
    /// Connection, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Service answered with a non-success status
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },
    /// Success status but no image bytes
    #[error("Service returned an empty image")]
    EmptyResponse,
    /// Request could not be built (bad endpoint, bad MIME string)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Main error type for the client.
///
/// All errors in the crate are converted to this type before being
/// returned to the shell.
#[derive(Error, Debug, Serialize)]
pub enum AppError {
    /// Selection or settings validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Normalization failed (only surfaced when the caller asks for it)
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Upload or remote processing failed
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// A newer request started before this one finished
    #[error("Request {0} was superseded by a newer request")]
    Superseded(u64),
}

/// Convenience result type for client operations.
pub type AppResult<T> = Result<T, AppError>;

// Helper methods for error creation
impl AppError {
    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::IO(format!("File not found: {}", path.into().display()))
    }
}

impl ValidationError {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

impl NormalizeError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

// Convert std::io::Error to AppError
impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
