//! Gain normalization of generalized cepstra.
//!
//! A generalized cepstrum `c_γ[0..=M]` describes
//!
//! ```text
//! H(z) = s_γ⁻¹( Σ c_γ[m] z⁻ᵐ ),   s_γ⁻¹(w) = (1 + γ w)^{1/γ}  (γ ≠ 0),  exp(w)  (γ = 0)
//! ```
//!
//! Normalizing pulls the gain out of the sum:
//!
//! ```text
//! K      = (1 + γ c_γ[0])^{1/γ}        c'_γ[m] = c_γ[m] / (1 + γ c_γ[0])
//! ```
//!
//! so that `H(z) = K · s_γ⁻¹(Σ_{m≥1} c'_γ[m] z⁻ᵐ)`. At γ = 0 the gain is
//! `exp(c[0])` and the remaining coefficients are unchanged.

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::is_valid_gamma;

/// `c_γ → (K, c'_γ)`.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::GainNormalization;
///
/// let gnorm = GainNormalization::new(2, -0.5);
/// let mut normalized = Vec::new();
/// gnorm.run(&[0.0, 0.2, 0.1], &mut normalized).unwrap();
/// assert_eq!(normalized, vec![1.0, 0.2, 0.1]);
/// ```
#[derive(Debug, Clone)]
pub struct GainNormalization {
    num_order: usize,
    gamma: f64,
    is_valid: bool,
}

impl GainNormalization {
    /// Normalizer for order `num_order` and exponent `gamma`.
    pub fn new(num_order: usize, gamma: f64) -> Self {
        let is_valid = is_valid_gamma(gamma);
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(gamma, "gain normalization rejected gamma");
        }
        Self {
            num_order,
            gamma,
            is_valid,
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Exponent `γ`.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Whether `|γ| ≤ 1`.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Normalize `generalized_cepstrum` (`M + 1` values).
    pub fn run(&self, generalized_cepstrum: &[f64], normalized: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(generalized_cepstrum.len(), self.num_order + 1)?;
        normalized.clear();
        if self.gamma == 0.0 {
            normalized.push(generalized_cepstrum[0].exp());
            normalized.extend_from_slice(&generalized_cepstrum[1..]);
        } else {
            let z = 1.0 + self.gamma * generalized_cepstrum[0];
            normalized.push(z.powf(1.0 / self.gamma));
            normalized.extend(generalized_cepstrum[1..].iter().map(|c| c / z));
        }
        Ok(())
    }

    /// In-place variant.
    pub fn run_in_place(&self, sequence: &mut Vec<f64>) -> Result<()> {
        ensure_length(sequence.len(), self.num_order + 1)?;
        let input = core::mem::take(sequence);
        let result = self.run(&input, sequence);
        if result.is_err() {
            *sequence = input;
        }
        result
    }
}

/// `(K, c'_γ) → c_γ`, the inverse of [`GainNormalization`].
#[derive(Debug, Clone)]
pub struct InverseGainNormalization {
    num_order: usize,
    gamma: f64,
    is_valid: bool,
}

impl InverseGainNormalization {
    /// Inverse normalizer for order `num_order` and exponent `gamma`.
    pub fn new(num_order: usize, gamma: f64) -> Self {
        Self {
            num_order,
            gamma,
            is_valid: is_valid_gamma(gamma),
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Exponent `γ`.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Whether `|γ| ≤ 1`.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Denormalize `normalized` (`M + 1` values, gain first).
    pub fn run(&self, normalized: &[f64], generalized_cepstrum: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(normalized.len(), self.num_order + 1)?;
        generalized_cepstrum.clear();
        if self.gamma == 0.0 {
            generalized_cepstrum.push(normalized[0].ln());
            generalized_cepstrum.extend_from_slice(&normalized[1..]);
        } else {
            let z = normalized[0].powf(self.gamma);
            generalized_cepstrum.push((z - 1.0) / self.gamma);
            generalized_cepstrum.extend(normalized[1..].iter().map(|c| c * z));
        }
        Ok(())
    }

    /// In-place variant.
    pub fn run_in_place(&self, sequence: &mut Vec<f64>) -> Result<()> {
        ensure_length(sequence.len(), self.num_order + 1)?;
        let input = core::mem::take(sequence);
        let result = self.run(&input, sequence);
        if result.is_err() {
            *sequence = input;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sptk_core::Error;

    #[test]
    fn test_normalize_gamma_minus_half() {
        let mut out = Vec::new();
        GainNormalization::new(2, -0.5)
            .run(&[0.0, 0.2, 0.1], &mut out)
            .unwrap();
        assert_eq!(out, vec![1.0, 0.2, 0.1]);

        let mut back = Vec::new();
        InverseGainNormalization::new(2, -0.5)
            .run(&out, &mut back)
            .unwrap();
        assert_eq!(back, vec![0.0, 0.2, 0.1]);
    }

    #[test]
    fn test_gamma_zero_uses_exponential() {
        let mut out = Vec::new();
        GainNormalization::new(1, 0.0)
            .run(&[1.0, 0.5], &mut out)
            .unwrap();
        assert!((out[0] - core::f64::consts::E).abs() < 1e-15);
        assert_eq!(out[1], 0.5);

        let mut back = vec![out[0], out[1]];
        InverseGainNormalization::new(1, 0.0)
            .run_in_place(&mut back)
            .unwrap();
        assert!((back[0] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_nonzero_gain_term() {
        // 1 + γ c[0] = 1.5, K = 1.5^{-2}
        let mut out = vec![-1.0, 0.3, -0.6];
        GainNormalization::new(2, -0.5)
            .run_in_place(&mut out)
            .unwrap();
        assert!((out[0] - 1.0 / 2.25).abs() < 1e-15);
        assert!((out[1] - 0.2).abs() < 1e-15);
        assert!((out[2] + 0.4).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_gamma_and_shape() {
        let gnorm = GainNormalization::new(2, 1.5);
        assert!(!gnorm.is_valid());
        let mut out = Vec::new();
        assert_eq!(
            gnorm.run(&[0.0; 3], &mut out),
            Err(Error::InvalidConfiguration)
        );
        let mut seq = vec![0.0; 2];
        assert!(
            InverseGainNormalization::new(2, 0.0)
                .run_in_place(&mut seq)
                .is_err()
        );
        assert_eq!(seq.len(), 2);
    }
}
