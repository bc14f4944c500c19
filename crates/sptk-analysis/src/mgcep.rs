//! Mel-generalized cepstral analysis (`mgcep`).
//!
//! Works in the gain-normalized MLSA-coefficient domain `(K, b'[1..=M])`.
//! Each Newton step warps `b'` to a linear-frequency cepstrum, forms
//!
//! ```text
//! p = IFFT( I / |D^{1+γ}|² )
//! q = IFFT( I / |D^{1+2γ}|² · D^{2γ} )
//! r = IFFT( I / |D^{1+γ}|² · D^γ )
//! ```
//!
//! with `D^γ = 1 + γ C(ω)`, warps them back, and solves the
//! `(M - 1)`-order Toeplitz-plus-Hankel system `(P + (1 + γ) Q) Δb' = r`.
//! The gain follows from `ε = r[0] + γ Σ r[m] b'[m]` as `K = √ε`.
//!
//! The estimate is seeded with the γ = -1 solution (a single linear solve)
//! converted to the target γ. At γ = 0 the analysis is the mel-cepstral
//! analysis.
//!
//! # References
//!
//! - Tokuda et al., "Mel-generalized cepstral analysis - a unified approach
//!   to speech spectral estimation", ICSLP 1994

use sptk_core::error::{Error, Result, ensure_length, ensure_valid};
use sptk_core::{
    InverseFft, RealFft, RealFftBuffer, RealInverseFft, ToeplitzPlusHankelBuffer,
    ToeplitzPlusHankelSolver, is_valid_gamma,
};

use crate::gain_normalization::{GainNormalization, InverseGainNormalization};
use crate::generalized_cepstrum::{
    CepstrumFormat, MelGeneralizedCepstrumConverter, MelGeneralizedCepstrumConverterBuffer,
};
use crate::mcep::{MelCepstralAnalysis, MelCepstralAnalysisBuffer};
use crate::mlsa_coefficients::{MelCepstrumToMlsaCoefficients, MlsaCoefficientsToMelCepstrum};
use crate::warp::{Recursion, warp_coefficients};

/// Scratch for [`MelGeneralizedCepstralAnalysis`].
#[derive(Debug, Clone, Default)]
pub struct MelGeneralizedCepstralAnalysisBuffer {
    periodogram: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    real: Vec<f64>,
    imag: Vec<f64>,
    p_real: Vec<f64>,
    q_real: Vec<f64>,
    q_imag: Vec<f64>,
    r_real: Vec<f64>,
    r_imag: Vec<f64>,
    p: Vec<f64>,
    q: Vec<f64>,
    r: Vec<f64>,
    p_trim: Vec<f64>,
    q_trim: Vec<f64>,
    gradient: Vec<f64>,
    scratch: Vec<f64>,
    fft: RealFftBuffer,
    solver: ToeplitzPlusHankelBuffer,
    converter: MelGeneralizedCepstrumConverterBuffer,
    mel_cepstral_analysis: MelCepstralAnalysisBuffer,
}

/// Mel-generalized cepstrum `c̃_γ[0..=M]` from a periodogram, for
/// `-1 ≤ γ ≤ 0`.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{MelGeneralizedCepstralAnalysis, MelGeneralizedCepstralAnalysisBuffer};
///
/// let mgcep = MelGeneralizedCepstralAnalysis::new(16, 3, 0.0, -1.0, 10, 1e-6);
/// let mut mgc = Vec::new();
/// mgcep
///     .run(&[1.0; 9], &mut mgc, &mut MelGeneralizedCepstralAnalysisBuffer::default())
///     .unwrap();
/// assert!(mgc.iter().all(|c| c.abs() < 1e-10));
/// ```
#[derive(Debug, Clone)]
pub struct MelGeneralizedCepstralAnalysis {
    fft_length: usize,
    num_order: usize,
    alpha: f64,
    gamma: f64,
    num_iteration: usize,
    convergence_threshold: f64,
    fft: RealFft,
    inverse_fft: RealInverseFft,
    complex_inverse_fft: InverseFft,
    solver: ToeplitzPlusHankelSolver,
    gain_normalization: GainNormalization,
    inverse_gain_normalization_gamma_minus_one: InverseGainNormalization,
    inverse_gain_normalization: InverseGainNormalization,
    mc2b: MelCepstrumToMlsaCoefficients,
    b2mc: MlsaCoefficientsToMelCepstrum,
    converter: MelGeneralizedCepstrumConverter,
    mel_cepstral_analysis: Option<MelCepstralAnalysis>,
    is_valid: bool,
}

impl MelGeneralizedCepstralAnalysis {
    /// Analysis of order `num_order` on an `fft_length`-point periodogram.
    pub fn new(
        fft_length: usize,
        num_order: usize,
        alpha: f64,
        gamma: f64,
        num_iteration: usize,
        convergence_threshold: f64,
    ) -> Self {
        let fft = RealFft::with_length(fft_length);
        let inverse_fft = RealInverseFft::with_length(fft_length);
        let complex_inverse_fft = InverseFft::with_length(fft_length);
        let solver = ToeplitzPlusHankelSolver::new(num_order.saturating_sub(1), true);
        let gain_normalization = GainNormalization::new(num_order, gamma);
        let inverse_gain_normalization = InverseGainNormalization::new(num_order, gamma);
        let mc2b = MelCepstrumToMlsaCoefficients::new(num_order, alpha);
        let b2mc = MlsaCoefficientsToMelCepstrum::new(num_order, alpha);
        let converter = MelGeneralizedCepstrumConverter::new(
            CepstrumFormat::new(num_order, 0.0, -1.0),
            CepstrumFormat::new(num_order, 0.0, gamma),
        );

        let is_valid = is_valid_gamma(gamma)
            && gamma <= 0.0
            && 0 < num_order
            && 0.0 <= convergence_threshold
            && fft.is_valid()
            && inverse_fft.is_valid()
            && complex_inverse_fft.is_valid()
            && solver.is_valid()
            && mc2b.is_valid()
            && converter.is_valid();
        let mel_cepstral_analysis = (is_valid && gamma == 0.0).then(|| {
            MelCepstralAnalysis::new(
                fft_length,
                num_order,
                alpha,
                num_iteration,
                convergence_threshold,
            )
        });
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(fft_length, num_order, alpha, gamma, "mgcep rejected parameters");
        }

        Self {
            fft_length,
            num_order,
            alpha,
            gamma,
            num_iteration,
            convergence_threshold,
            fft,
            inverse_fft,
            complex_inverse_fft,
            solver,
            gain_normalization,
            inverse_gain_normalization_gamma_minus_one: InverseGainNormalization::new(
                num_order, -1.0,
            ),
            inverse_gain_normalization,
            mc2b,
            b2mc,
            converter,
            mel_cepstral_analysis,
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

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Exponent `γ`.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Maximum number of Newton steps.
    pub fn num_iteration(&self) -> usize {
        self.num_iteration
    }

    /// Relative-change threshold that stops the iteration.
    pub fn convergence_threshold(&self) -> f64 {
        self.convergence_threshold
    }

    /// Whether `-1 ≤ γ ≤ 0`, `|α| < 1`, `M ≥ 1` and `L` is a valid FFT
    /// length.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Estimate the mel-generalized cepstrum (`M + 1` values) of
    /// `periodogram` (`L/2 + 1` bins).
    pub fn run(
        &self,
        periodogram: &[f64],
        mel_generalized_cepstrum: &mut Vec<f64>,
        buffer: &mut MelGeneralizedCepstralAnalysisBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        if let Some(mcep) = &self.mel_cepstral_analysis {
            return mcep.run(
                periodogram,
                mel_generalized_cepstrum,
                &mut buffer.mel_cepstral_analysis,
            );
        }

        let half = self.fft_length / 2;
        ensure_length(periodogram.len(), half + 1)?;
        if periodogram.iter().any(|&p| p < 0.0) {
            return Err(Error::InvalidInput("periodogram must be non-negative"));
        }

        buffer.periodogram.clear();
        buffer.periodogram.extend_from_slice(periodogram);
        buffer
            .periodogram
            .extend(periodogram[1..half].iter().rev());

        buffer.b.clear();
        buffer.b.resize(self.num_order + 1, 0.0);
        let mut prev_epsilon = self.newton_raphson(-1.0, buffer)?;

        if self.gamma != -1.0 {
            self.inverse_gain_normalization_gamma_minus_one
                .run_in_place(&mut buffer.b)?;
            self.b2mc.run(&buffer.b, &mut buffer.c)?;
            self.converter
                .run_in_place(&mut buffer.c, &mut buffer.converter)?;
            self.mc2b.run(&buffer.c, &mut buffer.b)?;
            self.gain_normalization.run_in_place(&mut buffer.b)?;

            for _iteration in 1..=self.num_iteration {
                let epsilon = self.newton_raphson(self.gamma, buffer)?;
                #[cfg(feature = "tracing")]
                tracing::trace!(iteration = _iteration, epsilon, "mgcep");
                if ((epsilon - prev_epsilon) / epsilon).abs() < self.convergence_threshold {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(iterations = _iteration, epsilon, "mgcep converged");
                    break;
                }
                prev_epsilon = epsilon;
            }
        }

        self.inverse_gain_normalization
            .run_in_place(&mut buffer.b)?;
        self.b2mc.run(&buffer.b, mel_generalized_cepstrum)
    }

    /// One Newton step on `buffer.b`; returns the prediction error power.
    fn newton_raphson(
        &self,
        gamma: f64,
        buffer: &mut MelGeneralizedCepstralAnalysisBuffer,
    ) -> Result<f64> {
        let length = self.fft_length;
        let order = self.num_order;
        let MelGeneralizedCepstralAnalysisBuffer {
            periodogram,
            b,
            c,
            real,
            imag,
            p_real,
            q_real,
            q_imag,
            r_real,
            r_imag,
            p,
            q,
            r,
            p_trim,
            q_trim,
            gradient,
            scratch,
            fft,
            solver,
            ..
        } = buffer;

        b[0] = 0.0;
        warp_coefficients(b, length, -self.alpha, Recursion::Scaled, c, scratch);
        self.fft.run(c, real, imag, fft)?;

        p_real.clear();
        if gamma == -1.0 {
            p_real.extend_from_slice(periodogram);
        } else if gamma == 0.0 {
            p_real.extend(
                periodogram
                    .iter()
                    .zip(real.iter())
                    .map(|(x, d)| x / (d + d).exp()),
            );
        } else {
            q_real.clear();
            q_imag.clear();
            r_real.clear();
            r_imag.clear();
            for i in 0..length {
                // D^γ
                let x = 1.0 + gamma * real[i];
                let y = gamma * imag[i];
                let (xx, yy) = (x * x, y * y);
                let d_gamma = xx + yy;
                let pi = periodogram[i] * d_gamma.powf(-1.0 / gamma) / d_gamma;
                p_real.push(pi);
                let qi = pi / d_gamma;
                q_real.push(qi * (xx - yy));
                q_imag.push(qi * 2.0 * x * y);
                r_real.push(pi * x);
                r_imag.push(pi * y);
            }
        }

        self.inverse_fft.run_in_place(p_real, imag, fft)?;
        warp_coefficients(p_real, 2 * order + 1, self.alpha, Recursion::Scaled, p, scratch);

        if gamma == 0.0 || gamma == -1.0 {
            q.clone_from(p);
            r.clear();
            r.extend_from_slice(&p[..=order]);
        } else {
            self.complex_inverse_fft.run_in_place(q_real, q_imag)?;
            self.complex_inverse_fft.run_in_place(r_real, r_imag)?;
            warp_coefficients(q_real, 2 * order + 1, self.alpha, Recursion::Scaled, q, scratch);
            warp_coefficients(r_real, order + 1, self.alpha, Recursion::Scaled, r, scratch);
        }

        p_transform(self.alpha, p);
        q_transform(self.alpha, q);

        p_trim.clear();
        p_trim.extend((0..2 * order - 1).map(|i| p[i.abs_diff(order - 1)]));
        q_trim.clear();
        q_trim.extend_from_slice(&q[2..]);

        let mut epsilon = if gamma == 0.0 {
            r[0]
        } else {
            prediction_error(gamma, r, b)
        };

        if gamma != 0.0 {
            let g = 1.0 + gamma;
            q_trim.iter_mut().for_each(|x| *x *= g);
        }

        self.solver
            .run(p_trim, q_trim, &r[1..], gradient, solver)?;
        for (coefficient, step) in b[1..].iter_mut().zip(gradient.iter()) {
            *coefficient += step;
        }

        if gamma == -1.0 {
            epsilon = prediction_error(gamma, r, b);
        }
        if epsilon < 0.0 {
            return Err(Error::InvalidInput("negative prediction error"));
        }
        b[0] = epsilon.sqrt();
        Ok(epsilon)
    }
}

/// `r[0] + γ Σ_{m≥1} r[m] b'[m]`.
fn prediction_error(gamma: f64, r: &[f64], b: &[f64]) -> f64 {
    r[0] + gamma * r[1..].iter().zip(&b[1..]).map(|(r, b)| r * b).sum::<f64>()
}

/// Warped `p̃'` to `p̃` (undo the `1 - α²` scaling of the zeroth term).
fn p_transform(alpha: f64, x: &mut [f64]) {
    if alpha == 0.0 {
        return;
    }
    let order = x.len() - 1;
    let mut d = x[order];
    for k in (1..=order).rev() {
        let o = x[k] + alpha * d;
        d = x[k];
        x[k] = o;
    }
    x[0] = (1.0 - alpha * alpha) * x[0] + 2.0 * alpha * d;
}

/// Warped `q̃'` to `q̃`.
fn q_transform(alpha: f64, x: &mut [f64]) {
    if alpha == 0.0 {
        return;
    }
    let mut d = x[1];
    for k in 1..x.len() {
        let o = x[k] + alpha * d;
        d = x[k];
        x[k] = o;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcep::tests::resonance;

    #[test]
    fn test_all_pole_spectrum_recovered_at_gamma_minus_one() {
        // 1 / (1 - 1.6 cos φ z⁻¹ + 0.64 z⁻²) has c_{-1} = [0, -a1, -a2].
        let angle = 0.3 * core::f64::consts::PI;
        let periodogram = resonance(256, 0.8, angle);
        let mgcep = MelGeneralizedCepstralAnalysis::new(256, 2, 0.0, -1.0, 10, 1e-6);
        let mut mgc = Vec::new();
        mgcep
            .run(&periodogram, &mut mgc, &mut MelGeneralizedCepstralAnalysisBuffer::default())
            .unwrap();
        assert!(mgc[0].abs() < 1e-8, "{mgc:?}");
        assert!((mgc[1] - 1.6 * angle.cos()).abs() < 1e-8, "{mgc:?}");
        assert!((mgc[2] + 0.64).abs() < 1e-8, "{mgc:?}");
    }

    #[test]
    fn test_gamma_zero_matches_mcep() {
        let periodogram = resonance(64, 0.7, 0.4);
        let (mut a, mut b) = (Vec::new(), Vec::new());
        MelGeneralizedCepstralAnalysis::new(64, 6, 0.3, 0.0, 10, 1e-6)
            .run(&periodogram, &mut a, &mut MelGeneralizedCepstralAnalysisBuffer::default())
            .unwrap();
        MelCepstralAnalysis::new(64, 6, 0.3, 10, 1e-6)
            .run(&periodogram, &mut b, &mut MelCepstralAnalysisBuffer::default())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_intermediate_gamma_fits_spectrum() {
        let periodogram = resonance(256, 0.85, 0.25 * core::f64::consts::PI);
        let mgcep = MelGeneralizedCepstralAnalysis::new(256, 12, 0.35, -0.5, 30, 1e-8);
        let mut mgc = Vec::new();
        mgcep
            .run(&periodogram, &mut mgc, &mut MelGeneralizedCepstralAnalysisBuffer::default())
            .unwrap();
        let converter = MelGeneralizedCepstrumConverter::new(
            CepstrumFormat::new(12, 0.35, -0.5),
            CepstrumFormat::new(128, 0.0, 0.0),
        );
        let mut c = Vec::new();
        converter
            .run(&mgc, &mut c, &mut MelGeneralizedCepstrumConverterBuffer::default())
            .unwrap();
        for (k, p) in periodogram.iter().enumerate() {
            let w = 2.0 * core::f64::consts::PI * k as f64 / 256.0;
            let model: f64 = c
                .iter()
                .enumerate()
                .map(|(m, cm)| cm * (w * m as f64).cos())
                .sum();
            assert!((model - 0.5 * p.ln()).abs() < 0.1, "bin {k}: {model}");
        }
    }

    #[test]
    fn test_transforms_are_identity_without_warping() {
        let mut x = vec![1.0, 2.0, 3.0];
        p_transform(0.0, &mut x);
        q_transform(0.0, &mut x);
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        p_transform(0.5, &mut x);
        // d = 3: x2 = 3 + 1.5, x1 = 2 + 1.5, x0 = 0.75 + 2
        assert_eq!(x, vec![2.75, 3.5, 4.5]);
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(!MelGeneralizedCepstralAnalysis::new(64, 6, 0.3, 0.5, 10, 1e-6).is_valid());
        assert!(!MelGeneralizedCepstralAnalysis::new(64, 0, 0.3, -0.5, 10, 1e-6).is_valid());
        assert!(!MelGeneralizedCepstralAnalysis::new(64, 6, 1.3, -0.5, 10, 1e-6).is_valid());
        assert!(!MelGeneralizedCepstralAnalysis::new(60, 6, 0.3, -0.5, 10, 1e-6).is_valid());
        let mgcep = MelGeneralizedCepstralAnalysis::new(64, 6, 0.3, -0.5, 10, 1e-6);
        let mut mgc = Vec::new();
        assert!(
            mgcep
                .run(&[1.0; 32], &mut mgc, &mut MelGeneralizedCepstralAnalysisBuffer::default())
                .is_err()
        );
    }

    #[test]
    fn test_silent_frame_at_gamma_zero() {
        let mut periodogram = vec![1.0; 9];
        periodogram[8] = 0.0;
        let mgcep = MelGeneralizedCepstralAnalysis::new(16, 4, 0.35, 0.0, 10, 1e-6);
        let mut mgc = Vec::new();
        mgcep
            .run(&periodogram, &mut mgc, &mut MelGeneralizedCepstralAnalysisBuffer::default())
            .unwrap();
        assert!(mgc.iter().all(|c| c.is_finite()), "{mgc:?}");
    }
}
