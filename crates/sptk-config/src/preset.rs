//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// All-pass constants that best approximate the mel scale, by sampling rate.
const ALPHA_TABLE: &[(u32, f64)] = &[
    (8000, 0.31),
    (10000, 0.35),
    (12000, 0.37),
    (16000, 0.42),
    (22050, 0.45),
    (32000, 0.50),
    (44100, 0.53),
    (48000, 0.55),
];

/// All-pass constant for a sampling rate in Hz.
///
/// Rates between table entries take the constant of the nearest entry.
///
/// ```rust
/// use sptk_config::recommended_alpha;
///
/// assert_eq!(recommended_alpha(16000), 0.42);
/// assert_eq!(recommended_alpha(10500), 0.35);
/// assert_eq!(recommended_alpha(96000), 0.55);
/// ```
pub fn recommended_alpha(sample_rate: u32) -> f64 {
    ALPHA_TABLE
        .iter()
        .min_by_key(|(rate, _)| rate.abs_diff(sample_rate))
        .map_or(0.42, |&(_, alpha)| alpha)
}

/// Parameter set shared by the frame-based analysis tools.
///
/// # TOML Format
///
/// ```toml
/// name = "speech-16k"
/// description = "16 kHz speech, 25th-order mel-cepstrum"
/// sample_rate = 16000
/// order = 24
/// alpha = 0.42
/// gamma = 0.0
/// fft_length = 512
/// iterations = 30
/// threshold = 0.001
/// ```
///
/// Every field may be omitted. When `alpha` is absent, [`alpha`](Self::alpha)
/// derives it from the sampling rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisPreset {
    /// Name of the preset.
    #[serde(default = "default_name")]
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sampling rate of the material in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Order of the cepstrum.
    #[serde(default = "default_order")]
    pub order: usize,

    /// All-pass constant. `None` means [`recommended_alpha`] of the rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    /// Generalized-log exponent.
    #[serde(default)]
    pub gamma: f64,

    /// FFT length.
    #[serde(default = "default_fft_length")]
    pub fft_length: usize,

    /// Iteration limit of the Newton analyses.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Convergence threshold of the Newton analyses.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_name() -> String {
    "untitled".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_order() -> usize {
    25
}

fn default_fft_length() -> usize {
    256
}

fn default_iterations() -> usize {
    30
}

fn default_threshold() -> f64 {
    1e-3
}

impl AnalysisPreset {
    /// Create a preset with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            order: default_order(),
            alpha: None,
            gamma: 0.0,
            fft_length: default_fft_length(),
            iterations: default_iterations(),
            threshold: default_threshold(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sampling rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Pin the all-pass constant.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Set the generalized-log exponent.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the FFT length.
    pub fn with_fft_length(mut self, fft_length: usize) -> Self {
        self.fft_length = fft_length;
        self
    }

    /// Set the iteration limit and convergence threshold.
    pub fn with_convergence(mut self, iterations: usize, threshold: f64) -> Self {
        self.iterations = iterations;
        self.threshold = threshold;
        self
    }

    /// Effective all-pass constant.
    pub fn alpha(&self) -> f64 {
        self.alpha
            .unwrap_or_else(|| recommended_alpha(self.sample_rate))
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for AnalysisPreset {
    fn default() -> Self {
        Self::new(default_name())
    }
}
