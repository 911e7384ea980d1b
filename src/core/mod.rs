//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the client:
//! - [`AppState`]: Controller state with request tracking
//! - [`ImageAsset`]: An in-memory image selected by the user or produced by normalization
//! - [`NormalizationPolicy`]: When and how to shrink an asset before upload
//! - [`RemovalResult`]: The processed image returned by the service

mod state;
mod types;

pub use state::{AppState, RequestId};
pub use types::{Dimensions, ImageAsset, NormalizationPolicy, PreparedUpload, RemovalResult};
