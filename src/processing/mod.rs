//! Client-side image processing ahead of upload.
//!
//! - [`normalizer`]: threshold check, decode, downscale, re-encode.
//! - [`resize`]: cap computation and resampling.
//! - [`encode`]: format and quality mapping onto `image` encoders.

pub mod encode;
pub mod normalizer;
pub mod resize;

pub use normalizer::{normalize, normalize_or_original, probe_dimensions};
pub use resize::target_dimensions;
