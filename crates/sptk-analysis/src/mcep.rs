//! Mel-cepstral analysis (`mcep`, `smcep`).
//!
//! Minimises the spectral criterion of the unbiased log-spectrum estimator
//! over the mel-cepstrum `c̃[0..=M]` by Newton's method. Each step needs
//! the autocorrelation of `I(ω) / |D(ω)|²` on the warped frequency axis and
//! one Toeplitz-plus-Hankel solve:
//!
//! ```text
//! r  = IFFT( exp(log I - 2 log D) )          r̃ = warp(r)   (2M + 1 values)
//! (T(r̃) + H(r̃)) Δc̃ = r̃[0..=M] - a          c̃ += Δc̃
//! ```
//!
//! `a` is the warped unit impulse. The loop stops after `J` steps or when
//! `r̃[0]` changes by less than the threshold relative to itself.
//!
//! The first-order analysis warps with the all-pass `(z⁻¹ - α)/(1 - α z⁻¹)`;
//! [`SecondOrderAllPassMelCepstralAnalysis`] uses the two-parameter all-pass
//! and warps through precomputed matrices.
//!
//! # References
//!
//! - Tokuda et al., "Mel-generalized cepstral analysis - a unified approach
//!   to speech spectral estimation", ICSLP 1994
//! - Fukada et al., "An adaptive algorithm for mel-cepstral analysis of
//!   speech", ICASSP 1992

use sptk_core::error::{Error, Result, ensure_length, ensure_valid};
use sptk_core::{
    FrequencyTransform, FrequencyTransformBuffer, RealFft, RealFftBuffer, RealInverseFft,
    SecondOrderAllPassFrequencyTransform, SecondOrderAllPassInverseFrequencyTransform,
    ToeplitzPlusHankelBuffer, ToeplitzPlusHankelSolver, floor_log, is_valid_alpha,
};

use crate::warp::{Recursion, SecondOrderCoefficientsWarp, warp_coefficients};

/// Scratch shared by [`MelCepstralAnalysis`] and
/// [`SecondOrderAllPassMelCepstralAnalysis`].
#[derive(Debug, Clone, Default)]
pub struct MelCepstralAnalysisBuffer {
    log_periodogram: Vec<f64>,
    cepstrum: Vec<f64>,
    real: Vec<f64>,
    imag: Vec<f64>,
    warped: Vec<f64>,
    toeplitz: Vec<f64>,
    constant: Vec<f64>,
    gradient: Vec<f64>,
    scratch: Vec<f64>,
    fft: RealFftBuffer,
    frequency_transform: FrequencyTransformBuffer,
    solver: ToeplitzPlusHankelBuffer,
}

/// The three warps the Newton loop needs.
trait MelWarping {
    /// Cepstrum `c[0..=L/2]` to mel-cepstrum `c̃[0..=M]`.
    fn cepstrum_to_mel(
        &self,
        cepstrum: &[f64],
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()>;

    /// Mel-cepstrum `c̃[0..=M]` back to `c[0..=L/2]`.
    fn mel_to_cepstrum(
        &self,
        mel_cepstrum: &[f64],
        cepstrum: &mut Vec<f64>,
        buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()>;

    /// Autocorrelation `r[0..=L/2]` to `r̃[0..=2M]`.
    fn warp_autocorrelation(&self, r: &[f64], warped: &mut Vec<f64>, scratch: &mut Vec<f64>);
}

/// Parameters and kernels common to both analyses.
#[derive(Debug, Clone)]
struct NewtonIteration {
    num_order: usize,
    fft_length: usize,
    num_iteration: usize,
    convergence_threshold: f64,
    fft: RealFft,
    inverse_fft: RealInverseFft,
    solver: ToeplitzPlusHankelSolver,
    alpha_vector: Vec<f64>,
}

impl NewtonIteration {
    fn new(
        num_order: usize,
        fft_length: usize,
        num_iteration: usize,
        convergence_threshold: f64,
    ) -> Self {
        Self {
            num_order,
            fft_length,
            num_iteration,
            convergence_threshold,
            fft: RealFft::with_length(fft_length),
            inverse_fft: RealInverseFft::with_length(fft_length),
            solver: ToeplitzPlusHankelSolver::new(num_order, true),
            alpha_vector: Vec::new(),
        }
    }

    fn is_valid(&self) -> bool {
        self.num_order <= self.fft_length / 2
            && 0.0 <= self.convergence_threshold
            && self.fft.is_valid()
            && self.inverse_fft.is_valid()
            && self.solver.is_valid()
    }

    fn run(
        &self,
        warping: &impl MelWarping,
        periodogram: &[f64],
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut MelCepstralAnalysisBuffer,
    ) -> Result<()> {
        let length = self.fft_length;
        let half = length / 2;
        let order = self.num_order;
        ensure_length(periodogram.len(), half + 1)?;

        let MelCepstralAnalysisBuffer {
            log_periodogram,
            cepstrum,
            real,
            imag,
            warped,
            toeplitz,
            constant,
            gradient,
            scratch,
            fft,
            frequency_transform,
            solver,
        } = buffer;

        log_periodogram.clear();
        log_periodogram.extend(periodogram.iter().map(|&p| floor_log(p)));

        // Initial estimate from the conventional cepstrum.
        real.clear();
        real.extend_from_slice(log_periodogram);
        real.extend(log_periodogram[1..half].iter().rev());
        self.inverse_fft.run_in_place(real, imag, fft)?;
        real[0] *= 0.5;
        real[half] *= 0.5;
        real.truncate(half + 1);
        warping.cepstrum_to_mel(real, mel_cepstrum, frequency_transform)?;

        let mut prev_epsilon = f64::MAX;
        for _iteration in 0..self.num_iteration {
            warping.mel_to_cepstrum(mel_cepstrum, cepstrum, frequency_transform)?;
            real.clear();
            real.extend_from_slice(cepstrum);
            real.resize(length, 0.0);
            self.fft.run_in_place(real, imag, fft)?;

            for k in 0..=half {
                real[k] = (log_periodogram[k] - 2.0 * real[k]).exp();
            }
            for j in 0..half.saturating_sub(1) {
                real[half + 1 + j] = real[half - 1 - j];
            }
            self.inverse_fft.run_in_place(real, imag, fft)?;

            warping.warp_autocorrelation(&real[..=half], warped, scratch);

            let epsilon = warped[0];
            #[cfg(feature = "tracing")]
            tracing::trace!(iteration = _iteration, epsilon, "mel-cepstral analysis");
            // Empty bins can overflow the auxiliary spectrum; keep the last estimate.
            if !warped.iter().all(|r| r.is_finite()) {
                #[cfg(feature = "tracing")]
                tracing::debug!(iterations = _iteration, "mel-cepstral analysis diverged");
                break;
            }
            if ((epsilon - prev_epsilon) / epsilon).abs() < self.convergence_threshold {
                #[cfg(feature = "tracing")]
                tracing::debug!(iterations = _iteration, epsilon, "mel-cepstral analysis converged");
                break;
            }
            prev_epsilon = epsilon;

            toeplitz.clear();
            toeplitz.extend((0..=2 * order).map(|i| warped[i.abs_diff(order)]));
            constant.clear();
            constant.extend(
                warped[..=order]
                    .iter()
                    .zip(&self.alpha_vector)
                    .map(|(r, a)| r - a),
            );
            self.solver
                .run(toeplitz, warped, constant, gradient, solver)?;
            if !gradient.iter().all(|g| g.is_finite()) {
                break;
            }
            for (c, g) in mel_cepstrum.iter_mut().zip(gradient.iter()) {
                *c += g;
            }
        }
        Ok(())
    }
}

/// First-order warping through [`FrequencyTransform`].
#[derive(Debug, Clone)]
struct FirstOrderWarping {
    alpha: f64,
    num_order: usize,
    to_mel: FrequencyTransform,
    from_mel: FrequencyTransform,
}

impl MelWarping for FirstOrderWarping {
    fn cepstrum_to_mel(
        &self,
        cepstrum: &[f64],
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        self.to_mel.run(cepstrum, mel_cepstrum, buffer)
    }

    fn mel_to_cepstrum(
        &self,
        mel_cepstrum: &[f64],
        cepstrum: &mut Vec<f64>,
        buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        self.from_mel.run(mel_cepstrum, cepstrum, buffer)
    }

    fn warp_autocorrelation(&self, r: &[f64], warped: &mut Vec<f64>, scratch: &mut Vec<f64>) {
        warp_coefficients(
            r,
            2 * self.num_order + 1,
            self.alpha,
            Recursion::Plain,
            warped,
            scratch,
        );
    }
}

/// Mel-cepstral analysis with the first-order all-pass.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{MelCepstralAnalysis, MelCepstralAnalysisBuffer};
///
/// // A flat periodogram of unit power has a zero mel-cepstrum.
/// let mcep = MelCepstralAnalysis::new(16, 4, 0.35, 10, 1e-6);
/// let mut mc = Vec::new();
/// mcep.run(&[1.0; 9], &mut mc, &mut MelCepstralAnalysisBuffer::default())
///     .unwrap();
/// assert!(mc.iter().all(|c| c.abs() < 1e-8));
/// ```
#[derive(Debug, Clone)]
pub struct MelCepstralAnalysis {
    newton: NewtonIteration,
    warping: FirstOrderWarping,
    is_valid: bool,
}

impl MelCepstralAnalysis {
    /// Analysis of order `num_order` on an `fft_length`-point periodogram.
    pub fn new(
        fft_length: usize,
        num_order: usize,
        alpha: f64,
        num_iteration: usize,
        convergence_threshold: f64,
    ) -> Self {
        let half = fft_length / 2;
        let mut newton =
            NewtonIteration::new(num_order, fft_length, num_iteration, convergence_threshold);
        let mut power = 1.0;
        newton.alpha_vector = (0..=num_order)
            .map(|_| {
                let value = power;
                power *= -alpha;
                value
            })
            .collect();
        let warping = FirstOrderWarping {
            alpha,
            num_order,
            to_mel: FrequencyTransform::new(half, num_order, alpha),
            from_mel: FrequencyTransform::new(num_order, half, -alpha),
        };
        let is_valid = newton.is_valid() && is_valid_alpha(alpha);
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(fft_length, num_order, alpha, "mel-cepstral analysis rejected parameters");
        }
        Self {
            newton,
            warping,
            is_valid,
        }
    }

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.newton.fft_length
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.newton.num_order
    }

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.warping.alpha
    }

    /// Maximum number of Newton steps.
    pub fn num_iteration(&self) -> usize {
        self.newton.num_iteration
    }

    /// Relative-change threshold that stops the iteration.
    pub fn convergence_threshold(&self) -> f64 {
        self.newton.convergence_threshold
    }

    /// Whether `M ≤ L/2`, `|α| < 1`, the threshold is non-negative and `L`
    /// is a valid real FFT length.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Estimate the mel-cepstrum (`M + 1` values) of `periodogram`
    /// (`L/2 + 1` non-negative bins; empty bins take the log floor).
    pub fn run(
        &self,
        periodogram: &[f64],
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut MelCepstralAnalysisBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        self.newton
            .run(&self.warping, periodogram, mel_cepstrum, buffer)
    }
}

/// Second-order warping through precomputed matrices.
#[derive(Debug, Clone)]
struct SecondOrderWarping {
    to_mel: SecondOrderAllPassFrequencyTransform,
    from_mel: SecondOrderAllPassInverseFrequencyTransform,
    autocorrelation: SecondOrderCoefficientsWarp,
}

impl MelWarping for SecondOrderWarping {
    fn cepstrum_to_mel(
        &self,
        cepstrum: &[f64],
        mel_cepstrum: &mut Vec<f64>,
        _buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        self.to_mel.run(cepstrum, mel_cepstrum)
    }

    fn mel_to_cepstrum(
        &self,
        mel_cepstrum: &[f64],
        cepstrum: &mut Vec<f64>,
        _buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        self.from_mel.run(mel_cepstrum, cepstrum)
    }

    fn warp_autocorrelation(&self, r: &[f64], warped: &mut Vec<f64>, _scratch: &mut Vec<f64>) {
        self.autocorrelation.run(r, warped);
    }
}

/// Mel-cepstral analysis with the second-order all-pass
/// `sqrt((z⁻² - 2α cosθ z⁻¹ + α²) / (1 - 2α cosθ z⁻¹ + α²))`.
///
/// The warps are matrices sampled on `L · accuracy_factor` points.
#[derive(Debug, Clone)]
pub struct SecondOrderAllPassMelCepstralAnalysis {
    newton: NewtonIteration,
    warping: Option<SecondOrderWarping>,
    alpha: f64,
    theta: f64,
    accuracy_factor: usize,
    is_valid: bool,
}

impl SecondOrderAllPassMelCepstralAnalysis {
    /// Analysis of order `num_order` with all-pass parameters `alpha` and
    /// `theta` (radians in `[0, π]`).
    pub fn new(
        fft_length: usize,
        num_order: usize,
        accuracy_factor: usize,
        alpha: f64,
        theta: f64,
        num_iteration: usize,
        convergence_threshold: f64,
    ) -> Self {
        let half = fft_length / 2;
        let grid_length = fft_length * accuracy_factor;
        let mut newton =
            NewtonIteration::new(num_order, fft_length, num_iteration, convergence_threshold);

        let to_mel =
            SecondOrderAllPassFrequencyTransform::new(half, num_order, grid_length, alpha, theta);
        let from_mel = SecondOrderAllPassInverseFrequencyTransform::new(
            num_order,
            half,
            grid_length,
            alpha,
            theta,
        );
        let warps = (
            SecondOrderCoefficientsWarp::new(1, num_order + 1, grid_length, alpha, theta),
            SecondOrderCoefficientsWarp::new(
                half + 1,
                2 * num_order + 1,
                grid_length,
                alpha,
                theta,
            ),
        );

        let mut warping = None;
        if 0 < accuracy_factor && newton.is_valid() && to_mel.is_valid() && from_mel.is_valid() {
            if let (Ok(seed), Ok(autocorrelation)) = warps {
                seed.run(&[1.0], &mut newton.alpha_vector);
                warping = Some(SecondOrderWarping {
                    to_mel,
                    from_mel,
                    autocorrelation,
                });
            }
        }
        let is_valid = warping.is_some();
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(fft_length, num_order, alpha, theta, "smcep rejected parameters");
        }
        Self {
            newton,
            warping,
            alpha,
            theta,
            accuracy_factor,
            is_valid,
        }
    }

    /// FFT length `L`.
    pub fn fft_length(&self) -> usize {
        self.newton.fft_length
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.newton.num_order
    }

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Emphasised frequency `θ` in radians.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Grid oversampling factor.
    pub fn accuracy_factor(&self) -> usize {
        self.accuracy_factor
    }

    /// Whether every warp matrix could be built.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Estimate the mel-cepstrum (`M + 1` values) of `periodogram`.
    pub fn run(
        &self,
        periodogram: &[f64],
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut MelCepstralAnalysisBuffer,
    ) -> Result<()> {
        let warping = self.warping.as_ref().ok_or(Error::InvalidConfiguration)?;
        self.newton.run(warping, periodogram, mel_cepstrum, buffer)
    }
}
