//! FFT of real sequences through a half-length complex transform.
//!
//! # Algorithm
//!
//! The `L`-point real input is folded into an `L/2`-point complex signal
//! (even samples in the real part, odd samples in the imaginary part),
//! transformed by [`Fft`], and untangled:
//!
//! ```text
//! X[0]   = Re Z[0] + Im Z[0]
//! X[L/2] = Re Z[0] - Im Z[0]
//! X[k]   = ½ (Z[k] + Z*[L/2-k]) - ½ j W^k (Z[k] - Z*[L/2-k])
//! ```
//!
//! where `W = exp(-j 2π / L)`. The upper half is the conjugate mirror of
//! the lower half.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{Result, ensure_length, ensure_valid};
use crate::math::is_power_of_two;

use super::{Fft, sine_table};

/// Scratch for [`RealFft`] and [`RealInverseFft`].
#[derive(Debug, Clone, Default)]
pub struct RealFftBuffer {
    real_part_input: Vec<f64>,
    imag_part_input: Vec<f64>,
}

/// Forward FFT of a real sequence of `M + 1` values, zero-padded to `L`.
///
/// `L` must be a power of two no smaller than 8.
#[derive(Debug, Clone)]
pub struct RealFft {
    num_order: usize,
    fft_length: usize,
    fft: Fft,
    sine_table: Vec<f64>,
    is_valid: bool,
}

impl RealFft {
    /// Real FFT of length `fft_length` over `num_order + 1` inputs.
    pub fn new(num_order: usize, fft_length: usize) -> Self {
        let half = fft_length / 2;
        let fft = Fft::new(half.saturating_sub(1), half);
        let is_valid = num_order < fft_length && is_power_of_two(fft_length) && fft.is_valid();
        let sine_table = if is_valid {
            sine_table(fft_length)
        } else {
            Vec::new()
        };
        Self {
            num_order,
            fft_length,
            fft,
            sine_table,
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

    /// Transform `input` (exactly `M + 1` values) into `L`-long outputs.
    pub fn run(
        &self,
        input: &[f64],
        real_output: &mut Vec<f64>,
        imag_output: &mut Vec<f64>,
        buffer: &mut RealFftBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(input.len(), self.num_order + 1)?;
        self.pack(input, buffer);
        self.untangle(real_output, imag_output, buffer)
    }

    /// In-place variant: `real` holds the input on entry and the real part
    /// of the spectrum on return.
    pub fn run_in_place(
        &self,
        real: &mut Vec<f64>,
        imag: &mut Vec<f64>,
        buffer: &mut RealFftBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(real.len(), self.num_order + 1)?;
        self.pack(real, buffer);
        self.untangle(real, imag, buffer)
    }

    /// Fold even and odd samples into the half-length complex input.
    fn pack(&self, input: &[f64], buffer: &mut RealFftBuffer) {
        let half = self.fft_length / 2;
        buffer.real_part_input.clear();
        buffer.imag_part_input.clear();
        for pair in input.chunks(2) {
            buffer.real_part_input.push(pair[0]);
            if let Some(&odd) = pair.get(1) {
                buffer.imag_part_input.push(odd);
            }
        }
        buffer.real_part_input.resize(half, 0.0);
        buffer.imag_part_input.resize(half, 0.0);
    }

    fn untangle(
        &self,
        x: &mut Vec<f64>,
        y: &mut Vec<f64>,
        buffer: &mut RealFftBuffer,
    ) -> Result<()> {
        let length = self.fft_length;
        let half = length / 2;
        let quarter = length / 4;

        self.fft
            .run(&buffer.real_part_input, &buffer.imag_part_input, x, y)?;
        x.resize(length, 0.0);
        y.resize(length, 0.0);

        x[half] = x[0] - y[0];
        x[0] += y[0];
        y[half] = 0.0;
        y[0] = 0.0;

        for i in 1..half {
            let w = half - i;
            let (s, c) = (self.sine_table[i], self.sine_table[i + quarter]);
            let xt = x[i] - x[w];
            let yt = y[i] + y[w];
            x[length - i] = (x[i] + x[w] + c * yt - s * xt) * 0.5;
            y[length - i] = (-y[i] + y[w] + s * yt + c * xt) * 0.5;
        }

        for i in 1..half {
            x[i] = x[length - i];
            y[i] = -y[length - i];
        }
        Ok(())
    }
}

/// Inverse FFT of a real-valued spectrum, scaled by `1 / L`.
///
/// The input must hold `M + 1` values of a Hermitian spectrum's real part;
/// the result is the forward [`RealFft`] divided by `L`.
#[derive(Debug, Clone)]
pub struct RealInverseFft {
    fft: RealFft,
}

impl RealInverseFft {
    /// Inverse real FFT of length `fft_length` over `num_order + 1` inputs.
    pub fn new(num_order: usize, fft_length: usize) -> Self {
        Self {
            fft: RealFft::new(num_order, fft_length),
        }
    }

    /// Full-length inverse: order `L - 1`.
    pub fn with_length(fft_length: usize) -> Self {
        Self {
            fft: RealFft::with_length(fft_length),
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
        input: &[f64],
        real_output: &mut Vec<f64>,
        imag_output: &mut Vec<f64>,
        buffer: &mut RealFftBuffer,
    ) -> Result<()> {
        self.fft.run(input, real_output, imag_output, buffer)?;
        self.scale(real_output, imag_output);
        Ok(())
    }

    /// In-place inverse transform.
    pub fn run_in_place(
        &self,
        real: &mut Vec<f64>,
        imag: &mut Vec<f64>,
        buffer: &mut RealFftBuffer,
    ) -> Result<()> {
        self.fft.run_in_place(real, imag, buffer)?;
        self.scale(real, imag);
        Ok(())
    }

    fn scale(&self, real: &mut [f64], imag: &mut [f64]) {
        let inverse = 1.0 / self.fft.fft_length() as f64;
        real.iter_mut().for_each(|v| *v *= inverse);
        imag.iter_mut().for_each(|v| *v *= inverse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(RealFft::new(7, 8).is_valid());
        assert!(!RealFft::new(3, 4).is_valid());
        assert!(!RealFft::new(8, 8).is_valid());
        assert!(!RealFft::new(5, 24).is_valid());
        assert!(RealInverseFft::with_length(512).is_valid());
    }

    #[test]
    fn test_matches_complex_fft() {
        let input = [0.5, -1.0, 2.0, 0.25, 3.0, -0.75, 1.5];
        let rfft = RealFft::new(6, 16);
        let fft = Fft::new(6, 16);
        let mut buffer = RealFftBuffer::default();
        let (mut re, mut im) = (Vec::new(), Vec::new());
        rfft.run(&input, &mut re, &mut im, &mut buffer).unwrap();
        let (mut expected_re, mut expected_im) = (Vec::new(), Vec::new());
        fft.run(&input, &[0.0; 7], &mut expected_re, &mut expected_im)
            .unwrap();
        assert_eq!(re.len(), 16);
        for k in 0..16 {
            assert!((re[k] - expected_re[k]).abs() < 1e-12, "re[{k}]");
            assert!((im[k] - expected_im[k]).abs() < 1e-12, "im[{k}]");
        }
    }

    #[test]
    fn test_hermitian_symmetry() {
        let input: Vec<f64> = (0..8).map(|i| (i as f64 * 0.9).sin()).collect();
        let rfft = RealFft::with_length(8);
        let mut buffer = RealFftBuffer::default();
        let (mut re, mut im) = (Vec::new(), Vec::new());
        rfft.run(&input, &mut re, &mut im, &mut buffer).unwrap();
        for k in 1..8 {
            assert!((re[k] - re[8 - k]).abs() < 1e-12);
            assert!((im[k] + im[8 - k]).abs() < 1e-12);
        }
        assert_eq!(im[0], 0.0);
        assert_eq!(im[4], 0.0);
    }

    #[test]
    fn test_in_place_and_inverse_scaling() {
        let rfft = RealFft::new(3, 8);
        let irfft = RealInverseFft::new(3, 8);
        let mut buffer = RealFftBuffer::default();
        let mut real = vec![1.0, 2.0, 3.0, 4.0];
        let mut imag = Vec::new();
        rfft.run_in_place(&mut real, &mut imag, &mut buffer).unwrap();
        assert!((real[0] - 10.0).abs() < 1e-12);

        let (mut re, mut im) = (Vec::new(), Vec::new());
        irfft
            .run(&[1.0, 2.0, 3.0, 4.0], &mut re, &mut im, &mut buffer)
            .unwrap();
        assert!((re[0] - 10.0 / 8.0).abs() < 1e-12);
    }
}
