//! Preset validation.
//!
//! Checks the ranges the analysis kernels would otherwise reject at
//! construction time, so a bad preset file is reported by field rather than
//! as a generic invalid configuration.
//!
//! ```rust
//! use sptk_config::{AnalysisPreset, ValidationError, validate_preset};
//!
//! let preset = AnalysisPreset::new("bad").with_fft_length(300);
//! assert_eq!(validate_preset(&preset), Err(ValidationError::FftLength(300)));
//! ```

use thiserror::Error;

use crate::AnalysisPreset;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// All-pass constant outside the open unit interval.
    #[error("alpha {0} must satisfy |alpha| < 1")]
    Alpha(f64),

    /// Exponent outside the analysable range.
    #[error("gamma {0} must lie in [-1, 0]")]
    Gamma(f64),

    /// FFT length that is not a power of two.
    #[error("FFT length {0} must be a power of two of at least 8")]
    FftLength(usize),

    /// Order too large for the FFT length.
    #[error("order {order} is too large for FFT length {fft_length}")]
    OrderTooLarge {
        /// Requested order.
        order: usize,
        /// Configured FFT length.
        fft_length: usize,
    },

    /// Zero sampling rate.
    #[error("sample rate must be positive")]
    SampleRate,

    /// Negative or non-finite convergence threshold.
    #[error("threshold {0} must be a finite non-negative number")]
    Threshold(f64),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", format_errors(.0))]
    Multiple(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate the parameters of an analysis preset.
///
/// Every cepstral analysis folds the cepstrum into half a spectrum, so the
/// FFT length must cover twice the order.
pub fn validate_preset(preset: &AnalysisPreset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let alpha = preset.alpha();
    if alpha.is_nan() || alpha.abs() >= 1.0 {
        errors.push(ValidationError::Alpha(alpha));
    }
    if !(-1.0..=0.0).contains(&preset.gamma) {
        errors.push(ValidationError::Gamma(preset.gamma));
    }
    if preset.fft_length < 8 || !preset.fft_length.is_power_of_two() {
        errors.push(ValidationError::FftLength(preset.fft_length));
    } else if 2 * preset.order > preset.fft_length {
        errors.push(ValidationError::OrderTooLarge {
            order: preset.order,
            fft_length: preset.fft_length,
        });
    }
    if preset.sample_rate == 0 {
        errors.push(ValidationError::SampleRate);
    }
    if !preset.threshold.is_finite() || preset.threshold < 0.0 {
        errors.push(ValidationError::Threshold(preset.threshold));
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.swap_remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
