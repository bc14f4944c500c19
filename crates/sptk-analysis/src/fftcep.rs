//! FFT cepstral analysis with an improved spectral envelope (`fftcep`).
//!
//! Plain cepstral smoothing underestimates the envelope at spectral peaks.
//! The Imai-Abe iteration repeatedly lifts the smoothed log spectrum over
//! the residual: the residual cepstrum is transformed back to a log
//! spectrum, rectified (`max(E, 0)`), and its low-quefrency part is moved
//! into the estimate with an optional over-relaxation factor.
//!
//! # References
//!
//! - Imai & Abe, "Spectral envelope extraction by improved cepstral method",
//!   IEICE Trans. A, 1979

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::{RealFft, RealFftBuffer, RealInverseFft, floor_log};

/// Scratch for [`FftCepstralAnalysis`].
#[derive(Debug, Clone, Default)]
pub struct FftCepstralAnalysisBuffer {
    real: Vec<f64>,
    imag: Vec<f64>,
    fft: RealFftBuffer,
}

/// Cepstrum `c[0..=M]` from an `L/2 + 1`-bin power spectrum.
#[derive(Debug, Clone)]
pub struct FftCepstralAnalysis {
    fft_length: usize,
    num_order: usize,
    num_iteration: usize,
    acceleration_factor: f64,
    fft: RealFft,
    inverse_fft: RealInverseFft,
    is_valid: bool,
}

impl FftCepstralAnalysis {
    /// Analysis of order `num_order` on an `fft_length`-point grid with
    /// `num_iteration` envelope iterations.
    pub fn new(
        fft_length: usize,
        num_order: usize,
        num_iteration: usize,
        acceleration_factor: f64,
    ) -> Self {
        let fft = RealFft::with_length(fft_length);
        let inverse_fft = RealInverseFft::with_length(fft_length);
        let is_valid = 2 * num_order <= fft_length
            && 0.0 <= acceleration_factor
            && fft.is_valid()
            && inverse_fft.is_valid();
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(fft_length, num_order, acceleration_factor, "fftcep rejected parameters");
        }
        Self {
            fft_length,
            num_order,
            num_iteration,
            acceleration_factor,
            fft,
            inverse_fft,
            is_valid,
        }
    }

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Number of envelope iterations.
    pub fn num_iteration(&self) -> usize {
        self.num_iteration
    }

    /// Over-relaxation factor applied to each envelope step.
    pub fn acceleration_factor(&self) -> f64 {
        self.acceleration_factor
    }

    /// Whether `2M ≤ L`, the factor is non-negative and `L` is a valid
    /// real FFT length.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Analyse `power_spectrum` (`L/2 + 1` bins; empty bins take the log floor).
    pub fn run(
        &self,
        power_spectrum: &[f64],
        cepstrum: &mut Vec<f64>,
        buffer: &mut FftCepstralAnalysisBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        let length = self.fft_length;
        let half = length / 2;
        ensure_length(power_spectrum.len(), half + 1)?;

        let FftCepstralAnalysisBuffer { real, imag, fft } = buffer;
        real.clear();
        real.extend(power_spectrum.iter().map(|&p| floor_log(p)));
        real.extend((1..half).rev().map(|k| floor_log(power_spectrum[k])));
        self.inverse_fft.run_in_place(real, imag, fft)?;

        let order = self.num_order;
        cepstrum.clear();
        cepstrum.extend_from_slice(&real[..=order]);
        real[..=order].fill(0.0);

        let step = 1.0 + self.acceleration_factor;
        for _ in 0..self.num_iteration {
            for m in 1..=order {
                real[length - m] = real[m];
            }
            self.fft.run_in_place(real, imag, fft)?;
            for x in real.iter_mut() {
                *x = x.max(0.0);
            }
            self.inverse_fft.run_in_place(real, imag, fft)?;
            for (v, e) in cepstrum.iter_mut().zip(real.iter_mut()) {
                let t = *e * step;
                *v += t;
                *e -= t;
            }
        }

        cepstrum[0] *= 0.5;
        if half == order {
            cepstrum[order] *= 0.5;
        }
        Ok(())
    }
}
