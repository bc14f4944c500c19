//! Mel-cepstrum ↔ MLSA digital filter coefficients.
//!
//! The MLSA filter realises `exp Σ b[m] Φ_m(z)` with the basis
//! `Φ_m(z) = (1 - α²) z⁻¹ / (1 - α z⁻¹) · z̃^{-(m-1)}`. The coefficients are
//! related to the mel-cepstrum by a first-order backward recursion:
//!
//! ```text
//! b[M] = c[M],   b[m] = c[m] - α b[m+1]     (mc2b)
//! c[M] = b[M],   c[m] = b[m] + α b[m+1]     (b2mc)
//! ```

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::is_valid_alpha;

/// Mel-cepstrum to MLSA filter coefficients (`mc2b`).
#[derive(Debug, Clone)]
pub struct MelCepstrumToMlsaCoefficients {
    num_order: usize,
    alpha: f64,
}

impl MelCepstrumToMlsaCoefficients {
    /// Converter of order `num_order` for all-pass constant `alpha`.
    pub fn new(num_order: usize, alpha: f64) -> Self {
        Self { num_order, alpha }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether `|α| < 1`.
    pub fn is_valid(&self) -> bool {
        is_valid_alpha(self.alpha)
    }

    /// Convert `mel_cepstrum` (`M + 1` values).
    pub fn run(&self, mel_cepstrum: &[f64], coefficients: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid())?;
        ensure_length(mel_cepstrum.len(), self.num_order + 1)?;
        coefficients.clear();
        coefficients.extend_from_slice(mel_cepstrum);
        if self.alpha != 0.0 {
            for m in (0..self.num_order).rev() {
                coefficients[m] -= self.alpha * coefficients[m + 1];
            }
        }
        Ok(())
    }

    /// In-place variant.
    pub fn run_in_place(&self, sequence: &mut [f64]) -> Result<()> {
        ensure_valid(self.is_valid())?;
        ensure_length(sequence.len(), self.num_order + 1)?;
        if self.alpha != 0.0 {
            for m in (0..self.num_order).rev() {
                sequence[m] -= self.alpha * sequence[m + 1];
            }
        }
        Ok(())
    }
}

/// MLSA filter coefficients to mel-cepstrum (`b2mc`).
#[derive(Debug, Clone)]
pub struct MlsaCoefficientsToMelCepstrum {
    num_order: usize,
    alpha: f64,
}

impl MlsaCoefficientsToMelCepstrum {
    /// Converter of order `num_order` for all-pass constant `alpha`.
    pub fn new(num_order: usize, alpha: f64) -> Self {
        Self { num_order, alpha }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether `|α| < 1`.
    pub fn is_valid(&self) -> bool {
        is_valid_alpha(self.alpha)
    }

    /// Convert `coefficients` (`M + 1` values).
    pub fn run(&self, coefficients: &[f64], mel_cepstrum: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid())?;
        ensure_length(coefficients.len(), self.num_order + 1)?;
        mel_cepstrum.clear();
        mel_cepstrum.extend_from_slice(coefficients);
        self.recurse(coefficients, mel_cepstrum);
        Ok(())
    }

    /// In-place variant.
    pub fn run_in_place(&self, sequence: &mut [f64]) -> Result<()> {
        ensure_valid(self.is_valid())?;
        ensure_length(sequence.len(), self.num_order + 1)?;
        // The recursion reads b[m+1] before it is overwritten when walking
        // upwards from m = 0.
        if self.alpha != 0.0 {
            for m in 0..self.num_order {
                sequence[m] += self.alpha * sequence[m + 1];
            }
        }
        Ok(())
    }

    fn recurse(&self, coefficients: &[f64], mel_cepstrum: &mut [f64]) {
        if self.alpha == 0.0 {
            return;
        }
        for m in 0..self.num_order {
            mel_cepstrum[m] = coefficients[m] + self.alpha * coefficients[m + 1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mc2b_recursion() {
        let mut b = Vec::new();
        MelCepstrumToMlsaCoefficients::new(2, 0.5)
            .run(&[1.0, 1.0, 1.0], &mut b)
            .unwrap();
        // b2 = 1, b1 = 1 - 0.5, b0 = 1 - 0.25
        assert_eq!(b, vec![0.75, 0.5, 1.0]);
    }

    #[test]
    fn test_round_trip() {
        let mc = [0.3, -0.2, 0.15, 0.05, -0.01];
        let mut b = Vec::new();
        MelCepstrumToMlsaCoefficients::new(4, 0.42)
            .run(&mc, &mut b)
            .unwrap();
        let mut back = b.clone();
        MlsaCoefficientsToMelCepstrum::new(4, 0.42)
            .run_in_place(&mut back)
            .unwrap();
        for (a, e) in back.iter().zip(&mc) {
            assert!((a - e).abs() < 1e-15);
        }
        let mut copy = Vec::new();
        MlsaCoefficientsToMelCepstrum::new(4, 0.42)
            .run(&b, &mut copy)
            .unwrap();
        assert_eq!(copy, back);
    }

    #[test]
    fn test_zero_alpha_copies() {
        let mut seq = vec![1.0, 2.0, 3.0];
        MelCepstrumToMlsaCoefficients::new(2, 0.0)
            .run_in_place(&mut seq)
            .unwrap();
        assert_eq!(seq, vec![1.0, 2.0, 3.0]);
        assert!(!MelCepstrumToMlsaCoefficients::new(2, 1.0).is_valid());
    }
}
