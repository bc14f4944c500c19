//! Analysis presets for the SPTK command-line tools.
//!
//! The analysis commands (`mcep`, `mgcep`, `smcep`, `fftcep`, ...) share a
//! handful of parameters: order, all-pass constant, FFT length, iteration
//! limits. A preset bundles them in a TOML file so a whole corpus can be
//! analysed with one consistent setting.
//!
//! # Features
//!
//! - **Presets**: [`AnalysisPreset`] loads from and saves to TOML
//! - **Factory presets**: one per common sampling rate, always available
//! - **Validation**: [`validate_preset`] checks parameter ranges before a
//!   preset reaches the kernels
//! - **Paths** (`std` feature): the user preset directory and
//!   [`find_preset`] lookup
//!
//! # Example
//!
//! ```rust
//! use sptk_config::{AnalysisPreset, get_factory_preset, validate_preset};
//!
//! let preset = get_factory_preset("speech-16k").unwrap();
//! assert_eq!(preset.alpha(), 0.42);
//! validate_preset(&preset).unwrap();
//!
//! let custom = AnalysisPreset::from_toml("name = \"narrowband\"\nsample_rate = 8000").unwrap();
//! assert_eq!(custom.order, 25);
//! assert_eq!(custom.alpha(), 0.31);
//! ```

mod error;
mod preset;

/// Platform-specific preset directories and lookup.
#[cfg(feature = "std")]
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
#[cfg(feature = "std")]
pub use paths::{
    ensure_user_presets_dir, find_preset, find_preset_file, list_user_presets,
    preset_name_from_path, user_config_dir, user_presets_dir,
};
pub use preset::{AnalysisPreset, recommended_alpha};
pub use validation::{ValidationError, ValidationResult, validate_preset};
