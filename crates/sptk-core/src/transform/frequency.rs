//! First-order all-pass frequency transform.
//!
//! Maps `c[0..=M₁]` to `ĉ[0..=M₂]` so that `Σ ĉ[m] z̃⁻ᵐ = Σ c[m] z⁻ᵐ` under
//! `z̃⁻¹ = (z⁻¹ - α) / (1 - α z⁻¹)`.
//!
//! # Algorithm
//!
//! The input is fed highest order first through a cascade of all-pass
//! sections. With `β = 1 - α²` and the previous state `d`:
//!
//! ```text
//! ĉ[0] = c[i] + α d[0]
//! ĉ[1] = β d[0] + α d[1]
//! ĉ[m] = d[m-1] + α (d[m] - ĉ[m-1])      m ≥ 2
//! ```
//!
//! `O(M₁ · M₂)` per call.
//!
//! # References
//!
//! - Oppenheim & Johnson, "Discrete representation of signals", Proc. IEEE, 1972

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{Result, ensure_length};

use super::copy_resized;

/// Scratch for [`FrequencyTransform`].
#[derive(Debug, Clone, Default)]
pub struct FrequencyTransformBuffer {
    d: Vec<f64>,
    g: Vec<f64>,
}

/// First-order all-pass frequency warping.
///
/// # Example
///
/// ```rust
/// use sptk_core::{FrequencyTransform, FrequencyTransformBuffer};
///
/// let warp = FrequencyTransform::new(2, 4, 0.0);
/// let mut out = Vec::new();
/// warp.run(&[1.0, 2.0, 3.0], &mut out, &mut FrequencyTransformBuffer::default())
///     .unwrap();
/// assert_eq!(out, vec![1.0, 2.0, 3.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyTransform {
    num_input_order: usize,
    num_output_order: usize,
    alpha: f64,
}

impl FrequencyTransform {
    /// Warp order-`num_input_order` sequences to order `num_output_order`
    /// with all-pass constant `alpha`.
    pub fn new(num_input_order: usize, num_output_order: usize, alpha: f64) -> Self {
        Self {
            num_input_order,
            num_output_order,
            alpha,
        }
    }

    /// Input order `M₁`.
    pub fn num_input_order(&self) -> usize {
        self.num_input_order
    }

    /// Output order `M₂`.
    pub fn num_output_order(&self) -> usize {
        self.num_output_order
    }

    /// All-pass constant.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Always `true`: any pair of orders is a valid configuration.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Warp `input` (exactly `M₁ + 1` values) into `output` (`M₂ + 1`).
    pub fn run(
        &self,
        input: &[f64],
        output: &mut Vec<f64>,
        buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        ensure_length(input.len(), self.num_input_order + 1)?;
        let output_length = self.num_output_order + 1;

        if self.alpha == 0.0 {
            copy_resized(input, output, output_length);
            return Ok(());
        }

        let alpha = self.alpha;
        let beta = 1.0 - alpha * alpha;
        let FrequencyTransformBuffer { d, g } = buffer;
        d.clear();
        d.resize(output_length, 0.0);
        g.clear();
        g.resize(output_length, 0.0);

        for &c in input.iter().rev() {
            d[0] = g[0];
            g[0] = c + alpha * d[0];
            if 1 < output_length {
                d[1] = g[1];
                g[1] = beta * d[0] + alpha * d[1];
            }
            for m in 2..output_length {
                d[m] = g[m];
                g[m] = d[m - 1] + alpha * (d[m] - g[m - 1]);
            }
        }

        output.clear();
        output.extend_from_slice(g);
        Ok(())
    }

    /// In-place variant; `sequence` is resized from `M₁ + 1` to `M₂ + 1`.
    pub fn run_in_place(
        &self,
        sequence: &mut Vec<f64>,
        buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        ensure_length(sequence.len(), self.num_input_order + 1)?;
        let input = core::mem::take(sequence);
        self.run(&input, sequence, buffer)
    }
}
