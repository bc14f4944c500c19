//! Complex FFT and its inverse.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{Result, ensure_length, ensure_valid};
use crate::math::is_power_of_two;

use super::sine_table;

/// Complex radix-2 FFT of length `L`.
///
/// Configured with an order `M` (inputs hold `M + 1` values, zero-padded to
/// `L`) and a length `L`, which must be a power of two no smaller than 4.
///
/// # Example
///
/// ```rust
/// use sptk_core::Fft;
///
/// let fft = Fft::new(0, 8);
/// let (mut re, mut im) = (Vec::new(), Vec::new());
/// fft.run(&[1.0], &[0.0], &mut re, &mut im).unwrap();
/// assert!(re.iter().all(|&v| (v - 1.0).abs() < 1e-15));
/// ```
#[derive(Debug, Clone)]
pub struct Fft {
    num_order: usize,
    fft_length: usize,
    sine_table: Vec<f64>,
    is_valid: bool,
}

impl Fft {
    /// Transform of length `fft_length` over inputs of `num_order + 1` values.
    pub fn new(num_order: usize, fft_length: usize) -> Self {
        let is_valid = 4 <= fft_length && is_power_of_two(fft_length) && num_order < fft_length;
        if !is_valid {
            #[cfg(feature = "tracing")]
            tracing::debug!("fft: invalid configuration order={num_order} length={fft_length}");
            return Self {
                num_order,
                fft_length,
                sine_table: Vec::new(),
                is_valid,
            };
        }
        Self {
            num_order,
            fft_length,
            sine_table: sine_table(fft_length),
            is_valid,
        }
    }

    /// Full-length transform: order `L - 1`.
    pub fn with_length(fft_length: usize) -> Self {
        Self::new(fft_length.saturating_sub(1), fft_length)
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Transform length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Transform `(real_input, imag_input)` into `L`-long outputs.
    ///
    /// Both inputs must hold exactly `M + 1` values.
    pub fn run(
        &self,
        real_input: &[f64],
        imag_input: &[f64],
        real_output: &mut Vec<f64>,
        imag_output: &mut Vec<f64>,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(real_input.len(), self.num_order + 1)?;
        ensure_length(imag_input.len(), self.num_order + 1)?;

        load(real_input, real_output, self.fft_length);
        load(imag_input, imag_output, self.fft_length);
        self.transform(real_output, imag_output);
        Ok(())
    }

    /// In-place transform; both vectors grow from `M + 1` to `L` values.
    pub fn run_in_place(&self, real: &mut Vec<f64>, imag: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(real.len(), self.num_order + 1)?;
        ensure_length(imag.len(), self.num_order + 1)?;

        real.resize(self.fft_length, 0.0);
        imag.resize(self.fft_length, 0.0);
        self.transform(real, imag);
        Ok(())
    }

    /// Butterflies followed by the bit-reversal permutation.
    fn transform(&self, x: &mut [f64], y: &mut [f64]) {
        let length = self.fft_length;
        let table = &self.sine_table;
        let quarter = length / 4;

        let mut lix = length;
        let mut lmx = length / 2;
        let mut stride = 1;
        while 1 < lmx {
            let mut sin_index = 0;
            let mut cos_index = quarter;
            for i in 0..lmx {
                let (s, c) = (table[sin_index], table[cos_index]);
                for p in (i..length).step_by(lix) {
                    let q = p + lmx;
                    let t1 = x[p] - x[q];
                    let t2 = y[p] - y[q];
                    x[p] += x[q];
                    y[p] += y[q];
                    x[q] = c * t1 + s * t2;
                    y[q] = c * t2 - s * t1;
                }
                sin_index += stride;
                cos_index += stride;
            }
            lix = lmx;
            lmx /= 2;
            stride *= 2;
        }

        // Last stage: twiddle is 1.
        for k in (0..length).step_by(2) {
            let (a, b) = (x[k], x[k + 1]);
            x[k] = a + b;
            x[k + 1] = a - b;
            let (a, b) = (y[k], y[k + 1]);
            y[k] = a + b;
            y[k + 1] = a - b;
        }

        let mut j = 0;
        for k in 0..length - 1 {
            if k < j {
                x.swap(k, j);
                y.swap(k, j);
            }
            let mut half = length / 2;
            while half <= j {
                j -= half;
                half /= 2;
            }
            j += half;
        }
    }
}

/// Copy `input` into `output` and zero-pad to `length`.
#[inline]
fn load(input: &[f64], output: &mut Vec<f64>, length: usize) {
    output.clear();
    output.extend_from_slice(input);
    output.resize(length, 0.0);
}

/// Inverse complex FFT, scaled by `1 / L`.
///
/// Computed as a forward [`Fft`] with the real and imaginary parts
/// exchanged on the way in and on the way out.
#[derive(Debug, Clone)]
pub struct InverseFft {
    fft: Fft,
}

impl InverseFft {
    /// Inverse transform of length `fft_length` over `num_order + 1` inputs.
    pub fn new(num_order: usize, fft_length: usize) -> Self {
        Self {
            fft: Fft::new(num_order, fft_length),
        }
    }

    /// Full-length inverse: order `L - 1`.
    pub fn with_length(fft_length: usize) -> Self {
        Self {
            fft: Fft::with_length(fft_length),
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.fft.num_order()
    }

    /// Transform length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft.fft_length()
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.fft.is_valid()
    }

    /// Inverse transform into `L`-long outputs.
    pub fn run(
        &self,
        real_input: &[f64],
        imag_input: &[f64],
        real_output: &mut Vec<f64>,
        imag_output: &mut Vec<f64>,
    ) -> Result<()> {
        self.fft
            .run(imag_input, real_input, imag_output, real_output)?;
        self.scale(real_output, imag_output);
        Ok(())
    }

    /// In-place inverse transform.
    pub fn run_in_place(&self, real: &mut Vec<f64>, imag: &mut Vec<f64>) -> Result<()> {
        self.fft.run_in_place(imag, real)?;
        self.scale(real, imag);
        Ok(())
    }

    fn scale(&self, real: &mut [f64], imag: &mut [f64]) {
        let inverse = 1.0 / self.fft.fft_length() as f64;
        for (re, im) in real.iter_mut().zip(imag.iter_mut()) {
            *re *= inverse;
            *im *= inverse;
        }
    }
}
