//! CLI command implementations.

pub mod analysis;
pub mod common;
pub mod fft;
pub mod mlsacheck;
pub mod presets;
pub mod stream;
pub mod transform;
