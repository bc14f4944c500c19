//! Second-order all-pass frequency transform.
//!
//! The all-pass is
//!
//! ```text
//! A(z) = sqrt((z⁻² - 2α cosθ z⁻¹ + α²) / (1 - 2α cosθ z⁻¹ + α²))
//! ```
//!
//! and cepstra are expanded on `(Aᵐ(z) + Aᵐ(z⁻¹)) / 2`. No recursion is
//! known for this warp, so each direction precomputes a conversion matrix
//! by sampling the warped phase on an `L`-point grid and taking inverse
//! FFTs; `run` is then a matrix-vector product.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f64::consts::PI;

use libm::{atan2, cos, sin};

use crate::error::{Result, ensure_length, ensure_valid};
use crate::fft::InverseFft;
use crate::math::is_valid_alpha;
use crate::matrix::Matrix;

use super::copy_resized;

/// Warped phase `ω̃(ω)` of the second-order all-pass.
///
/// ```rust
/// use sptk_core::phase_warp;
///
/// assert_eq!(phase_warp(0.7, 0.0, 0.0), 0.7);
/// assert!((phase_warp(std::f64::consts::PI, 0.3, 0.5) - std::f64::consts::PI).abs() < 1e-12);
/// ```
pub fn phase_warp(omega: f64, alpha: f64, theta: f64) -> f64 {
    let x = omega - theta;
    let y = omega + theta;
    omega
        + atan2(alpha * sin(x), 1.0 - alpha * cos(x))
        + atan2(alpha * sin(y), 1.0 - alpha * cos(y))
}

/// Derivative `dω̃/dω` of [`phase_warp`].
pub fn phase_warp_derivative(omega: f64, alpha: f64, theta: f64) -> f64 {
    let cos_x = cos(omega - theta);
    let cos_y = cos(omega + theta);
    let aa = alpha * alpha;
    let a2 = alpha + alpha;
    1.0 + (alpha * cos_x - aa) / (1.0 - a2 * cos_x + aa)
        + (alpha * cos_y - aa) / (1.0 - a2 * cos_y + aa)
}

fn is_valid_theta(theta: f64) -> bool {
    (0.0..=PI).contains(&theta)
}

/// Uniform grid on `[0, 2π)`.
fn grid(fft_length: usize) -> impl Iterator<Item = f64> {
    let delta = 2.0 * PI / fft_length as f64;
    (0..fft_length).map(move |j| delta * j as f64)
}

/// Inverse FFT of `exp(-j m ω̃) · weight` on the grid.
fn warped_basis(
    ifft: &InverseFft,
    warped: &[f64],
    weight: Option<&[f64]>,
    m: f64,
    real: &mut Vec<f64>,
    imag: &mut Vec<f64>,
) -> Result<()> {
    let mut re = Vec::with_capacity(warped.len());
    let mut im = Vec::with_capacity(warped.len());
    for (j, &w) in warped.iter().enumerate() {
        let scale = weight.map_or(1.0, |dw| dw[j]);
        re.push(cos(w * m) * scale);
        im.push(-sin(w * m) * scale);
    }
    ifft.run(&re, &im, real, imag)
}

/// Halve row 0 off the diagonal and double column 0 below it.
fn apply_basis_convention(matrix: &mut Matrix) {
    for m1 in 1..matrix.num_columns() {
        matrix[0][m1] *= 0.5;
    }
    for m2 in 1..matrix.num_rows() {
        matrix[m2][0] *= 2.0;
    }
}

fn multiply(matrix: &Matrix, input: &[f64], output: &mut Vec<f64>) {
    output.clear();
    output.extend(
        (0..matrix.num_rows()).map(|r| matrix[r].iter().zip(input).map(|(a, b)| a * b).sum::<f64>()),
    );
}

/// Forward second-order all-pass warp: `c[0..=M₁] → ĉ[0..=M₂]`.
#[derive(Debug, Clone)]
pub struct SecondOrderAllPassFrequencyTransform {
    num_input_order: usize,
    num_output_order: usize,
    alpha: f64,
    theta: f64,
    conversion_matrix: Matrix,
    is_valid: bool,
}

impl SecondOrderAllPassFrequencyTransform {
    /// Build the `(M₂+1) × (M₁+1)` conversion matrix on an
    /// `fft_length`-point grid.
    pub fn new(
        num_input_order: usize,
        num_output_order: usize,
        fft_length: usize,
        alpha: f64,
        theta: f64,
    ) -> Self {
        let mut transform = Self {
            num_input_order,
            num_output_order,
            alpha,
            theta,
            conversion_matrix: Matrix::default(),
            is_valid: false,
        };
        let ifft = InverseFft::with_length(fft_length);
        if num_input_order < fft_length
            && is_valid_alpha(alpha)
            && is_valid_theta(theta)
            && ifft.is_valid()
        {
            if let Ok(matrix) = Self::build(&ifft, num_input_order, num_output_order, alpha, theta)
            {
                transform.conversion_matrix = matrix;
                transform.is_valid = true;
            }
        }
        transform
    }

    fn build(
        ifft: &InverseFft,
        num_input_order: usize,
        num_output_order: usize,
        alpha: f64,
        theta: f64,
    ) -> Result<Matrix> {
        let fft_length = ifft.fft_length();
        let warped: Vec<f64> = grid(fft_length)
            .map(|w| phase_warp(w, alpha, theta))
            .collect();
        let derivative: Vec<f64> = grid(fft_length)
            .map(|w| phase_warp_derivative(w, alpha, theta))
            .collect();

        let mut matrix = Matrix::new(num_output_order + 1, num_input_order + 1);
        let (mut real, mut imag) = (Vec::new(), Vec::new());
        for m2 in 0..=num_output_order {
            warped_basis(
                ifft,
                &warped,
                Some(&derivative),
                m2 as f64,
                &mut real,
                &mut imag,
            )?;
            matrix[m2][0] = real[0];
            for m1 in 1..=num_input_order {
                matrix[m2][m1] = real[m1] + real[fft_length - m1];
            }
        }
        apply_basis_convention(&mut matrix);
        Ok(matrix)
    }

    /// Input order `M₁`.
    pub fn num_input_order(&self) -> usize {
        self.num_input_order
    }

    /// Output order `M₂`.
    pub fn num_output_order(&self) -> usize {
        self.num_output_order
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The precomputed `(M₂+1) × (M₁+1)` matrix.
    pub fn conversion_matrix(&self) -> &Matrix {
        &self.conversion_matrix
    }

    /// Warp `input` (exactly `M₁ + 1` values).
    pub fn run(&self, input: &[f64], output: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(input.len(), self.num_input_order + 1)?;
        if self.alpha == 0.0 && self.theta == 0.0 {
            copy_resized(input, output, self.num_output_order + 1);
            return Ok(());
        }
        multiply(&self.conversion_matrix, input, output);
        Ok(())
    }

    /// In-place variant; `sequence` is resized to `M₂ + 1`.
    pub fn run_in_place(&self, sequence: &mut Vec<f64>) -> Result<()> {
        let input = core::mem::take(sequence);
        let result = self.run(&input, sequence);
        if result.is_err() {
            *sequence = input;
        }
        result
    }
}

/// Inverse second-order all-pass warp: `ĉ[0..=M₁] → c[0..=M₂]`.
#[derive(Debug, Clone)]
pub struct SecondOrderAllPassInverseFrequencyTransform {
    num_input_order: usize,
    num_output_order: usize,
    alpha: f64,
    theta: f64,
    conversion_matrix: Matrix,
    is_valid: bool,
}

impl SecondOrderAllPassInverseFrequencyTransform {
    /// Build the `(M₂+1) × (M₁+1)` inverse conversion matrix.
    pub fn new(
        num_input_order: usize,
        num_output_order: usize,
        fft_length: usize,
        alpha: f64,
        theta: f64,
    ) -> Self {
        let mut transform = Self {
            num_input_order,
            num_output_order,
            alpha,
            theta,
            conversion_matrix: Matrix::default(),
            is_valid: false,
        };
        let ifft = InverseFft::with_length(fft_length);
        if num_output_order < fft_length
            && is_valid_alpha(alpha)
            && is_valid_theta(theta)
            && ifft.is_valid()
        {
            if let Ok(matrix) = Self::build(&ifft, num_input_order, num_output_order, alpha, theta)
            {
                transform.conversion_matrix = matrix;
                transform.is_valid = true;
            }
        }
        transform
    }

    fn build(
        ifft: &InverseFft,
        num_input_order: usize,
        num_output_order: usize,
        alpha: f64,
        theta: f64,
    ) -> Result<Matrix> {
        let fft_length = ifft.fft_length();
        let warped: Vec<f64> = grid(fft_length)
            .map(|w| phase_warp(w, alpha, theta))
            .collect();

        // Row k holds the basis for m₁ = k - M₁, m₁ in -M₁..=M₁.
        let order = num_input_order as isize;
        let mut rows: Vec<Vec<f64>> = vec![Vec::new(); 2 * num_input_order + 1];
        let mut imag = Vec::new();
        for m1 in -order..=order {
            let k = (m1 + order) as usize;
            warped_basis(ifft, &warped, None, m1 as f64, &mut rows[k], &mut imag)?;
        }

        let mut matrix = Matrix::new(num_output_order + 1, num_input_order + 1);
        for m1 in 0..=num_input_order {
            let positive = &rows[m1 + num_input_order];
            let negative = &rows[num_input_order - m1];
            for m2 in 0..=num_output_order {
                matrix[m2][m1] = if m1 == 0 {
                    positive[m2]
                } else {
                    positive[m2] + negative[m2]
                };
            }
        }
        apply_basis_convention(&mut matrix);
        Ok(matrix)
    }

    /// Input order `M₁`.
    pub fn num_input_order(&self) -> usize {
        self.num_input_order
    }

    /// Output order `M₂`.
    pub fn num_output_order(&self) -> usize {
        self.num_output_order
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The precomputed `(M₂+1) × (M₁+1)` matrix.
    pub fn conversion_matrix(&self) -> &Matrix {
        &self.conversion_matrix
    }

    /// Unwarp `input` (exactly `M₁ + 1` values).
    pub fn run(&self, input: &[f64], output: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(input.len(), self.num_input_order + 1)?;
        if self.alpha == 0.0 && self.theta == 0.0 {
            copy_resized(input, output, self.num_output_order + 1);
            return Ok(());
        }
        multiply(&self.conversion_matrix, input, output);
        Ok(())
    }

    /// In-place variant; `sequence` is resized to `M₂ + 1`.
    pub fn run_in_place(&self, sequence: &mut Vec<f64>) -> Result<()> {
        let input = core::mem::take(sequence);
        let result = self.run(&input, sequence);
        if result.is_err() {
            *sequence = input;
        }
        result
    }
}
