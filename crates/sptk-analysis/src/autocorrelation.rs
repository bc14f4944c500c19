//! Cepstrum to autocorrelation (`c2acr`).
//!
//! The power spectrum of a minimum-phase cepstrum is `exp(2 Re C(k))`; its
//! inverse transform is the autocorrelation. Both transforms reuse the real
//! forward FFT since the intermediate spectrum is real and even.

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::{RealFft, RealFftBuffer};

/// Scratch for [`CepstrumToAutocorrelation`].
#[derive(Debug, Clone, Default)]
pub struct CepstrumToAutocorrelationBuffer {
    real: Vec<f64>,
    imag: Vec<f64>,
    fft: RealFftBuffer,
}

/// Autocorrelation `r[0..=M₂]` of the spectrum described by `c[0..=M₁]`.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{CepstrumToAutocorrelation, CepstrumToAutocorrelationBuffer};
///
/// let c2acr = CepstrumToAutocorrelation::new(0, 2, 16);
/// let mut r = Vec::new();
/// c2acr
///     .run(&[0.5], &mut r, &mut CepstrumToAutocorrelationBuffer::default())
///     .unwrap();
/// assert!((r[0] - 1f64.exp()).abs() < 1e-12);
/// assert!(r[1].abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CepstrumToAutocorrelation {
    num_input_order: usize,
    num_output_order: usize,
    fft_length: usize,
    cepstrum_fft: RealFft,
    spectrum_fft: RealFft,
    is_valid: bool,
}

impl CepstrumToAutocorrelation {
    /// Converter for `num_input_order`-order cepstra onto an
    /// `fft_length`-point grid.
    pub fn new(num_input_order: usize, num_output_order: usize, fft_length: usize) -> Self {
        let cepstrum_fft = RealFft::new(num_input_order, fft_length);
        let spectrum_fft = RealFft::with_length(fft_length);
        let is_valid = num_input_order < fft_length
            && num_output_order < fft_length
            && cepstrum_fft.is_valid()
            && spectrum_fft.is_valid();
        Self {
            num_input_order,
            num_output_order,
            fft_length,
            cepstrum_fft,
            spectrum_fft,
            is_valid,
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

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Whether both orders fit below `L` and `L` is a valid real FFT length.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Convert `cepstrum` (`M₁ + 1` values) into `autocorrelation` (`M₂ + 1`).
    pub fn run(
        &self,
        cepstrum: &[f64],
        autocorrelation: &mut Vec<f64>,
        buffer: &mut CepstrumToAutocorrelationBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(cepstrum.len(), self.num_input_order + 1)?;

        let CepstrumToAutocorrelationBuffer { real, imag, fft } = buffer;
        real.clear();
        real.extend_from_slice(cepstrum);
        self.cepstrum_fft.run_in_place(real, imag, fft)?;
        for x in real.iter_mut() {
            *x = (2.0 * *x).exp();
        }
        self.spectrum_fft.run_in_place(real, imag, fft)?;

        let inverse = 1.0 / self.fft_length as f64;
        autocorrelation.clear();
        autocorrelation.extend(real[..=self.num_output_order].iter().map(|r| r * inverse));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_order_cepstrum() {
        // c = [0, a]: |H|² = exp(2a cos ω), r[k] = I_k(2a)
        let c2acr = CepstrumToAutocorrelation::new(1, 2, 64);
        let mut r = Vec::new();
        c2acr
            .run(&[0.0, 0.1], &mut r, &mut CepstrumToAutocorrelationBuffer::default())
            .unwrap();
        // Modified Bessel series at x = 0.2
        let i0 = 1.0 + 0.01 + 0.0001 / 4.0;
        let i1 = 0.1 + 0.001 / 2.0 + 0.00001 / 12.0;
        let i2 = 0.005 + 0.0001 / 6.0;
        assert!((r[0] - i0).abs() < 1e-7, "{r:?}");
        assert!((r[1] - i1).abs() < 1e-7, "{r:?}");
        assert!((r[2] - i2).abs() < 1e-7, "{r:?}");
    }

    #[test]
    fn test_invalid_orders() {
        assert!(!CepstrumToAutocorrelation::new(16, 2, 16).is_valid());
        assert!(!CepstrumToAutocorrelation::new(2, 16, 16).is_valid());
        assert!(!CepstrumToAutocorrelation::new(2, 2, 12).is_valid());
        let c2acr = CepstrumToAutocorrelation::new(2, 2, 16);
        let mut r = Vec::new();
        assert!(
            c2acr
                .run(&[0.0; 2], &mut r, &mut CepstrumToAutocorrelationBuffer::default())
                .is_err()
        );
    }
}
