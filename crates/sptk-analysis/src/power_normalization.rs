//! Mel-cepstrum power normalization (`pnorm` / `ipnorm`).
//!
//! The power of the minimum-phase system `exp C̃(z)` is `r[0]`, the zeroth
//! autocorrelation of its impulse response. `pnorm` takes it out of `c̃[0]`:
//!
//! ```text
//! power = ½ ln r[0]
//! c̃'[0] = c̃[0] - power
//! ```
//!
//! so that the normalized mel-cepstrum describes a unit-power system.

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::{FrequencyTransform, FrequencyTransformBuffer, is_valid_alpha};

use crate::autocorrelation::{CepstrumToAutocorrelation, CepstrumToAutocorrelationBuffer};

/// Scratch for [`MelCepstrumPowerNormalization`].
#[derive(Debug, Clone, Default)]
pub struct MelCepstrumPowerNormalizationBuffer {
    cepstrum: Vec<f64>,
    autocorrelation: Vec<f64>,
    frequency_transform: FrequencyTransformBuffer,
    cepstrum_to_autocorrelation: CepstrumToAutocorrelationBuffer,
}

/// Power normalization of an order-`M` mel-cepstrum.
///
/// The power is evaluated on an impulse response of `impulse_response_length`
/// samples, which must be a valid real FFT length.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{MelCepstrumPowerNormalization, MelCepstrumPowerNormalizationBuffer};
///
/// let pnorm = MelCepstrumPowerNormalization::new(2, 128, 0.35);
/// let mut buffer = MelCepstrumPowerNormalizationBuffer::default();
/// let mut normalized = Vec::new();
/// let power = pnorm.run(&[0.5, 0.0, 0.0], &mut normalized, &mut buffer).unwrap();
/// assert!((power - 0.5).abs() < 1e-12);
/// assert!(normalized[0].abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MelCepstrumPowerNormalization {
    num_order: usize,
    impulse_response_length: usize,
    alpha: f64,
    frequency_transform: FrequencyTransform,
    cepstrum_to_autocorrelation: CepstrumToAutocorrelation,
    is_valid: bool,
}

impl MelCepstrumPowerNormalization {
    /// Normalization for all-pass constant `alpha`.
    pub fn new(num_order: usize, impulse_response_length: usize, alpha: f64) -> Self {
        let cepstrum_order = impulse_response_length.saturating_sub(1);
        let frequency_transform = FrequencyTransform::new(num_order, cepstrum_order, -alpha);
        let cepstrum_to_autocorrelation =
            CepstrumToAutocorrelation::new(cepstrum_order, 0, impulse_response_length);
        let is_valid = is_valid_alpha(alpha) && cepstrum_to_autocorrelation.is_valid();
        Self {
            num_order,
            impulse_response_length,
            alpha,
            frequency_transform,
            cepstrum_to_autocorrelation,
            is_valid,
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Impulse response length used for the power.
    pub fn impulse_response_length(&self) -> usize {
        self.impulse_response_length
    }

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether `α` is valid and the length is a power of two of at least 8.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Write the normalized mel-cepstrum and return the power in log
    /// amplitude (nepers).
    pub fn run(
        &self,
        mel_cepstrum: &[f64],
        normalized: &mut Vec<f64>,
        buffer: &mut MelCepstrumPowerNormalizationBuffer,
    ) -> Result<f64> {
        ensure_valid(self.is_valid)?;
        ensure_length(mel_cepstrum.len(), self.num_order + 1)?;

        let MelCepstrumPowerNormalizationBuffer {
            cepstrum,
            autocorrelation,
            frequency_transform,
            cepstrum_to_autocorrelation,
        } = buffer;
        self.frequency_transform
            .run(mel_cepstrum, cepstrum, frequency_transform)?;
        self.cepstrum_to_autocorrelation
            .run(cepstrum, autocorrelation, cepstrum_to_autocorrelation)?;
        let power = 0.5 * autocorrelation[0].ln();

        normalized.clear();
        normalized.extend_from_slice(mel_cepstrum);
        normalized[0] -= power;
        Ok(power)
    }

    /// In-place variant of [`run`](Self::run).
    pub fn run_in_place(
        &self,
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut MelCepstrumPowerNormalizationBuffer,
    ) -> Result<f64> {
        let input = core::mem::take(mel_cepstrum);
        let result = self.run(&input, mel_cepstrum, buffer);
        if result.is_err() {
            *mel_cepstrum = input;
        }
        result
    }
}

/// Undo [`MelCepstrumPowerNormalization`] by adding the power back to `c̃[0]`.
#[derive(Debug, Clone)]
pub struct InverseMelCepstrumPowerNormalization {
    num_order: usize,
}

impl InverseMelCepstrumPowerNormalization {
    /// Inverse normalization of order `M`.
    pub fn new(num_order: usize) -> Self {
        Self { num_order }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Always true.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Rebuild the mel-cepstrum from `power` and `normalized`.
    pub fn run(&self, power: f64, normalized: &[f64], mel_cepstrum: &mut Vec<f64>) -> Result<()> {
        ensure_length(normalized.len(), self.num_order + 1)?;
        mel_cepstrum.clear();
        mel_cepstrum.extend_from_slice(normalized);
        mel_cepstrum[0] += power;
        Ok(())
    }

    /// In-place variant of [`run`](Self::run).
    pub fn run_in_place(&self, power: f64, sequence: &mut [f64]) -> Result<()> {
        ensure_length(sequence.len(), self.num_order + 1)?;
        sequence[0] += power;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_of_cosine_cepstrum() {
        // r[0] = I₀(1) for exp(cos ω).
        let pnorm = MelCepstrumPowerNormalization::new(1, 128, 0.0);
        let mut buffer = MelCepstrumPowerNormalizationBuffer::default();
        let mut normalized = Vec::new();
        let power = pnorm.run(&[0.0, 0.5], &mut normalized, &mut buffer).unwrap();
        let expected = 0.5 * 1.266_065_877_752_008_4_f64.ln();
        assert!((power - expected).abs() < 1e-12, "{power}");
        assert!((normalized[0] + expected).abs() < 1e-12);
        assert_eq!(normalized[1], 0.5);
    }

    #[test]
    fn test_normalized_has_unit_power() {
        let pnorm = MelCepstrumPowerNormalization::new(3, 256, 0.42);
        let mut buffer = MelCepstrumPowerNormalizationBuffer::default();
        let mut mc = vec![1.2, 0.4, -0.3, 0.1];
        let power = pnorm.run_in_place(&mut mc, &mut buffer).unwrap();
        assert!(0.0 < power);
        let residual = pnorm.run_in_place(&mut mc, &mut buffer).unwrap();
        assert!(residual.abs() < 1e-12, "{residual}");
    }

    #[test]
    fn test_inverse_restores_input() {
        let mc = [0.7, -0.2, 0.05];
        let pnorm = MelCepstrumPowerNormalization::new(2, 64, 0.35);
        let mut normalized = Vec::new();
        let power = pnorm
            .run(&mc, &mut normalized, &mut MelCepstrumPowerNormalizationBuffer::default())
            .unwrap();
        let mut restored = Vec::new();
        InverseMelCepstrumPowerNormalization::new(2)
            .run(power, &normalized, &mut restored)
            .unwrap();
        for (a, e) in restored.iter().zip(&mc) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_length() {
        assert!(!MelCepstrumPowerNormalization::new(2, 100, 0.35).is_valid());
        assert!(!MelCepstrumPowerNormalization::new(2, 4, 0.35).is_valid());
        assert!(!MelCepstrumPowerNormalization::new(2, 128, 1.0).is_valid());
        let mut mc = vec![0.0; 3];
        assert!(
            MelCepstrumPowerNormalization::new(2, 100, 0.35)
                .run_in_place(&mut mc, &mut MelCepstrumPowerNormalizationBuffer::default())
                .is_err()
        );
        assert_eq!(mc.len(), 3);
        assert!(InverseMelCepstrumPowerNormalization::new(2).run_in_place(0.0, &mut [0.0]).is_err());
    }
}
