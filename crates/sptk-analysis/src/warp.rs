//! Coefficient warps used inside the Newton iterations.
//!
//! The analyses warp autocorrelation-like sequences rather than cepstra,
//! so the zeroth coefficient is not scaled by `1 - α²` the way
//! [`FrequencyTransform`](sptk_core::FrequencyTransform) scales the first.

use core::f64::consts::PI;

use sptk_core::error::Result;
use sptk_core::{InverseFft, Matrix, phase_warp};

/// Where the recursion applies the `1 - α²` factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recursion {
    /// No scaling; used by the mel-cepstral analysis.
    Plain,
    /// Scaling at index 1; used by the mel-generalized cepstral analysis.
    Scaled,
}

/// First-order warp of `input` into `output_length` coefficients.
pub(crate) fn warp_coefficients(
    input: &[f64],
    output_length: usize,
    alpha: f64,
    recursion: Recursion,
    output: &mut Vec<f64>,
    scratch: &mut Vec<f64>,
) {
    output.clear();
    if alpha == 0.0 {
        output.extend(input.iter().take(output_length));
        output.resize(output_length, 0.0);
        return;
    }

    output.resize(output_length, 0.0);
    scratch.clear();
    scratch.resize(output_length, 0.0);
    let (g, d) = (output, scratch);
    let beta = 1.0 - alpha * alpha;

    for &c in input.iter().rev() {
        d[0] = g[0];
        g[0] = c;
        let mut start = 1;
        if recursion == Recursion::Scaled && 1 < output_length {
            d[1] = g[1];
            g[1] = beta * d[0] + alpha * d[1];
            start = 2;
        }
        for j in start..output_length {
            d[j] = g[j];
            g[j] = d[j - 1] + alpha * (d[j] - g[j - 1]);
        }
    }
}

/// Matrix form of the second-order all-pass warp without the derivative
/// weighting, for autocorrelation sequences.
#[derive(Debug, Clone)]
pub(crate) struct SecondOrderCoefficientsWarp {
    input_length: usize,
    output_length: usize,
    // `None` when α = θ = 0.
    matrix: Option<Matrix>,
}

impl SecondOrderCoefficientsWarp {
    /// Precompute the `output_length × input_length` matrix on a
    /// `grid_length`-point grid.
    pub(crate) fn new(
        input_length: usize,
        output_length: usize,
        grid_length: usize,
        alpha: f64,
        theta: f64,
    ) -> Result<Self> {
        if alpha == 0.0 && theta == 0.0 {
            return Ok(Self {
                input_length,
                output_length,
                matrix: None,
            });
        }

        let ifft = InverseFft::with_length(grid_length);
        sptk_core::error::ensure_valid(ifft.is_valid() && input_length <= grid_length)?;
        let delta = 2.0 * PI / grid_length as f64;
        let warped: Vec<f64> = (0..grid_length)
            .map(|j| phase_warp(delta * j as f64, alpha, theta))
            .collect();

        let mut matrix = Matrix::new(output_length, input_length);
        let (mut re, mut im) = (Vec::new(), Vec::new());
        let (mut real, mut imag) = (Vec::new(), Vec::new());
        for m in 0..output_length {
            re.clear();
            im.clear();
            for &w in &warped {
                re.push((w * m as f64).cos());
                im.push(-(w * m as f64).sin());
            }
            ifft.run(&re, &im, &mut real, &mut imag)?;
            if 0 < input_length {
                matrix[m][0] = real[0];
            }
            for j in 1..input_length {
                matrix[m][j] = real[j] + real[grid_length - j];
            }
        }
        Ok(Self {
            input_length,
            output_length,
            matrix: Some(matrix),
        })
    }

    /// Warp the first `input_length` values of `input`.
    pub(crate) fn run(&self, input: &[f64], output: &mut Vec<f64>) {
        output.clear();
        let input = &input[..self.input_length.min(input.len())];
        match &self.matrix {
            None => {
                output.extend(input.iter().take(self.output_length));
                output.resize(self.output_length, 0.0);
            }
            Some(matrix) => output.extend((0..self.output_length).map(|m| {
                matrix[m]
                    .iter()
                    .zip(input)
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
            })),
        }
    }
}
