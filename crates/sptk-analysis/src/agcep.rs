//! Adaptive generalized cepstral analysis (`agcep`).
//!
//! A sample-by-sample estimator for `γ = -1/C`. The inverse filter
//! `(1 + γ F(z))^{-1/γ}`, with `F(z) = Σ c'[m] z⁻ᵐ`, is realised as `C`
//! cascaded all-zero stages. The coefficients follow a stochastic gradient
//! with momentum `τ`, normalised by a running error power with forgetting
//! factor `λ`:
//!
//! ```text
//! ε(n) = max(λ ε(n-1) + (1 - λ) e_γ²(n), ε_min)
//! ∇(n) = τ ∇(n-1) - 2(1 - τ) e(n) [e_γ(n-1) … e_γ(n-M)]ᵀ
//! c'   = c' - a / (M ε(n)) · ∇(n)
//! ```
//!
//! # References
//!
//! - Tokuda et al., "Adaptive generalized cepstral analysis", 1992

use sptk_core::error::{Result, ensure_valid};

use crate::gain_normalization::InverseGainNormalization;

/// Per-stream state for [`AdaptiveGeneralizedCepstralAnalysis`].
///
/// Create one per signal; it carries the filter memory between samples.
#[derive(Debug, Clone)]
pub struct AdaptiveGeneralizedCepstralAnalysisBuffer {
    normalized_generalized_cepstrum: Vec<f64>,
    d: Vec<f64>,
    gradient: Vec<f64>,
    prev_epsilon: f64,
    prev_adjusted_error: f64,
}

impl Default for AdaptiveGeneralizedCepstralAnalysisBuffer {
    fn default() -> Self {
        Self {
            normalized_generalized_cepstrum: Vec::new(),
            d: Vec::new(),
            gradient: Vec::new(),
            prev_epsilon: 1.0,
            prev_adjusted_error: 1.0,
        }
    }
}

/// Adaptive estimator of order `M` with `C` cascade stages.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{
///     AdaptiveGeneralizedCepstralAnalysis, AdaptiveGeneralizedCepstralAnalysisBuffer,
/// };
///
/// let agcep = AdaptiveGeneralizedCepstralAnalysis::new(4, 1, 1e-16, 0.9, 0.98, 0.1);
/// let mut buffer = AdaptiveGeneralizedCepstralAnalysisBuffer::default();
/// let mut gc = Vec::new();
/// let e = agcep.run(0.5, &mut gc, &mut buffer).unwrap();
/// assert_eq!(e, 0.5);
/// assert_eq!(gc.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveGeneralizedCepstralAnalysis {
    num_order: usize,
    num_stage: usize,
    min_epsilon: f64,
    momentum: f64,
    forgetting_factor: f64,
    step_size_factor: f64,
    inverse_gain_normalization: InverseGainNormalization,
    is_valid: bool,
}

impl AdaptiveGeneralizedCepstralAnalysis {
    /// Estimator with `num_stage` stages, i.e. `γ = -1 / num_stage`.
    pub fn new(
        num_order: usize,
        num_stage: usize,
        min_epsilon: f64,
        momentum: f64,
        forgetting_factor: f64,
        step_size_factor: f64,
    ) -> Self {
        let gamma = -1.0 / num_stage as f64;
        let inverse_gain_normalization = InverseGainNormalization::new(num_order, gamma);
        let is_valid = 0 < num_stage
            && 0.0 < min_epsilon
            && (0.0..1.0).contains(&momentum)
            && (0.0..1.0).contains(&forgetting_factor)
            && 0.0 < step_size_factor
            && step_size_factor < 1.0
            && inverse_gain_normalization.is_valid();
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(
                num_stage,
                min_epsilon,
                momentum,
                forgetting_factor,
                step_size_factor,
                "agcep rejected parameters"
            );
        }
        Self {
            num_order,
            num_stage,
            min_epsilon,
            momentum,
            forgetting_factor,
            step_size_factor,
            inverse_gain_normalization,
            is_valid,
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// Number of cascade stages `C`.
    pub fn num_stage(&self) -> usize {
        self.num_stage
    }

    /// `γ = -1 / C`.
    pub fn gamma(&self) -> f64 {
        -1.0 / self.num_stage as f64
    }

    /// Lower bound on the running error power.
    pub fn min_epsilon(&self) -> f64 {
        self.min_epsilon
    }

    /// Gradient momentum `τ`.
    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    /// Forgetting factor `λ`.
    pub fn forgetting_factor(&self) -> f64 {
        self.forgetting_factor
    }

    /// Step size factor `a`.
    pub fn step_size_factor(&self) -> f64 {
        self.step_size_factor
    }

    /// Whether `C ≥ 1`, `ε_min > 0`, `τ, λ ∈ [0, 1)` and `a ∈ (0, 1)`.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Consume one input sample, update the estimate and return the
    /// prediction error. `generalized_cepstrum` receives `M + 1` values.
    pub fn run(
        &self,
        input: f64,
        generalized_cepstrum: &mut Vec<f64>,
        buffer: &mut AdaptiveGeneralizedCepstralAnalysisBuffer,
    ) -> Result<f64> {
        ensure_valid(self.is_valid)?;
        let order = self.num_order;
        let gamma = self.gamma();
        let AdaptiveGeneralizedCepstralAnalysisBuffer {
            normalized_generalized_cepstrum: c,
            d,
            gradient,
            prev_epsilon,
            prev_adjusted_error,
        } = buffer;

        if c.len() != order + 1 {
            c.clear();
            c.resize(order + 1, 0.0);
        }
        if d.len() != order * self.num_stage {
            d.clear();
            d.resize(order * self.num_stage, 0.0);
        }
        if gradient.len() != order {
            gradient.clear();
            gradient.resize(order, 0.0);
        }

        // e_γ(n - M), about to leave the last delay line.
        let last_e = d.last().copied().unwrap_or(0.0);

        let mut x = input;
        if 0 < order {
            for stage in d.chunks_exact_mut(order) {
                let mut y = 0.0;
                for j in (1..order).rev() {
                    y += c[j + 1] * stage[j];
                    stage[j] = stage[j - 1];
                }
                y += c[1] * stage[0];
                stage[0] = x;
                x += y * gamma;
            }
        }
        let prediction_error = x;

        let last_stage = order * (self.num_stage - 1);
        let e_gamma = d.get(last_stage).copied().unwrap_or(prediction_error);
        let epsilon = (self.forgetting_factor * *prev_epsilon
            + (1.0 - self.forgetting_factor) * e_gamma * e_gamma)
            .max(self.min_epsilon);

        if 0 < order {
            let sigma = 2.0 * (1.0 - self.momentum) * prediction_error;
            let mu = self.step_size_factor / (order as f64 * epsilon);
            for i in 0..order {
                let f = if i == order - 1 {
                    last_e
                } else {
                    d[last_stage + 1 + i]
                };
                gradient[i] = self.momentum * gradient[i] - sigma * f;
                c[i + 1] -= mu * gradient[i];
            }
        }

        let adjusted_error = self.forgetting_factor * *prev_adjusted_error
            + (1.0 - self.forgetting_factor) * prediction_error * prediction_error;
        c[0] = adjusted_error.sqrt();
        *prev_adjusted_error = adjusted_error;
        *prev_epsilon = epsilon;

        self.inverse_gain_normalization
            .run(c, generalized_cepstrum)?;
        Ok(prediction_error)
    }
}
