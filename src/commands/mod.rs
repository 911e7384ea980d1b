//! Command handlers for the shell.
//!
//! This module exposes the operations a front end invokes:
//! - [`remove_background`]: Validate, normalize, upload and record one image
//! - [`remove_background_file`]: Same, starting from a file on disk
//! - [`download_result`]: Save a processed image

mod removal;

pub use removal::*;
