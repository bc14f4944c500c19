//! Conversion between mel-generalized cepstral representations (`mgc2mgc`).
//!
//! Each endpoint is a [`CepstrumFormat`]: order, all-pass constant,
//! exponent, and whether the coefficients are gain-normalized and/or
//! multiplied by γ. [`MelGeneralizedCepstrumConverter`] derives a flat list
//! of [`Stage`]s that takes one to the other:
//!
//! | Stage | Effect |
//! |-------|--------|
//! | [`Stage::GammaDivision`] | `c[1..] /= γ` |
//! | [`Stage::GammaMultiplication`] | `c[1..] *= γ` |
//! | [`Stage::GainNormalization`] | [`GainNormalization`] |
//! | [`Stage::InverseGainNormalization`] | [`InverseGainNormalization`] |
//! | [`Stage::FrequencyTransform`] | first-order warp by `α* = (α₂ - α₁) / (1 - α₁α₂)` |
//! | [`Stage::GeneralizedCepstrumTransform`] | γ₁ → γ₂ in the normalized domain |
//!
//! # Stage selection
//!
//! With `α* = 0`, equal orders and equal γ only flag flips are needed (and
//! possibly none, in which case the input is copied). With `α* = 0`
//! otherwise the coefficients are normalized, converted by
//! [`GeneralizedCepstrumTransform`] and denormalized. With `α* ≠ 0` the
//! warp runs on the unnormalized cepstrum and the γ conversion follows it.

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::{FrequencyTransform, FrequencyTransformBuffer, is_valid_alpha, is_valid_gamma};

use crate::gain_normalization::{GainNormalization, InverseGainNormalization};

/// Generalized-log conversion `c'_{γ₁} → c'_{γ₂}` of normalized cepstra.
///
/// ```text
/// c₂[0] = c₁[0]
/// c₂[m] = c₁[m] + (1/m) Σ_{k=1}^{min(M₁, m-1)} (γ₂ k - γ₁ (m - k)) c₁[k] c₂[m-k]
/// ```
///
/// where `c₁[m] = 0` for `m > M₁`.
#[derive(Debug, Clone)]
pub struct GeneralizedCepstrumTransform {
    num_input_order: usize,
    num_output_order: usize,
    input_gamma: f64,
    output_gamma: f64,
}

impl GeneralizedCepstrumTransform {
    /// Converter from `(M₁, γ₁)` to `(M₂, γ₂)`.
    pub fn new(
        num_input_order: usize,
        num_output_order: usize,
        input_gamma: f64,
        output_gamma: f64,
    ) -> Self {
        Self {
            num_input_order,
            num_output_order,
            input_gamma,
            output_gamma,
        }
    }

    /// Whether both exponents lie in `[-1, 1]`.
    pub fn is_valid(&self) -> bool {
        is_valid_gamma(self.input_gamma) && is_valid_gamma(self.output_gamma)
    }

    /// Convert `input` (`M₁ + 1` values) into `output` (`M₂ + 1`).
    pub fn run(&self, input: &[f64], output: &mut Vec<f64>) -> Result<()> {
        ensure_valid(self.is_valid())?;
        ensure_length(input.len(), self.num_input_order + 1)?;
        output.clear();
        output.resize(self.num_output_order + 1, 0.0);

        output[0] = input[0];
        for m in 1..=self.num_output_order {
            let (mut ss1, mut ss2) = (0.0, 0.0);
            for k in 1..=self.num_input_order.min(m - 1) {
                let cc = input[k] * output[m - k];
                ss2 += k as f64 * cc;
                ss1 += (m - k) as f64 * cc;
            }
            let carried = if m <= self.num_input_order {
                input[m]
            } else {
                0.0
            };
            output[m] = carried + (self.output_gamma * ss2 - self.input_gamma * ss1) / m as f64;
        }
        Ok(())
    }
}

/// One endpoint of a conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CepstrumFormat {
    /// Order `M`.
    pub num_order: usize,
    /// All-pass constant `α`.
    pub alpha: f64,
    /// Exponent `γ`.
    pub gamma: f64,
    /// Coefficients are `(K, c'_γ[1..])`.
    pub normalized: bool,
    /// Coefficients `1..` are multiplied by `γ`.
    pub multiplied: bool,
}

impl CepstrumFormat {
    /// Plain (unnormalized, unmultiplied) mel-generalized cepstrum.
    pub fn new(num_order: usize, alpha: f64, gamma: f64) -> Self {
        Self {
            num_order,
            alpha,
            gamma,
            normalized: false,
            multiplied: false,
        }
    }

    /// Same representation, gain-normalized.
    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    /// Same representation, multiplied by γ.
    pub fn multiplied(mut self) -> Self {
        self.multiplied = true;
        self
    }

    fn is_valid(&self) -> bool {
        is_valid_alpha(self.alpha) && is_valid_gamma(self.gamma)
    }
}

/// Elementary conversion step.
#[derive(Debug, Clone)]
pub enum Stage {
    /// `c[0]` kept, `c[1..] /= γ`.
    GammaDivision {
        /// Order `M`.
        num_order: usize,
        /// Divisor `γ`.
        gamma: f64,
    },
    /// `c[0]` kept, `c[1..] *= γ`.
    GammaMultiplication {
        /// Order `M`.
        num_order: usize,
        /// Factor `γ`.
        gamma: f64,
    },
    /// Gain normalization.
    GainNormalization(GainNormalization),
    /// Gain denormalization.
    InverseGainNormalization(InverseGainNormalization),
    /// First-order all-pass warp.
    FrequencyTransform(FrequencyTransform),
    /// γ₁ → γ₂ on normalized coefficients.
    GeneralizedCepstrumTransform(GeneralizedCepstrumTransform),
}

impl Stage {
    /// Whether the stage can run.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::GammaDivision { .. } | Self::GammaMultiplication { .. } => true,
            Self::GainNormalization(s) => s.is_valid(),
            Self::InverseGainNormalization(s) => s.is_valid(),
            Self::FrequencyTransform(s) => s.is_valid(),
            Self::GeneralizedCepstrumTransform(s) => s.is_valid(),
        }
    }

    /// Apply the stage.
    pub fn run(
        &self,
        input: &[f64],
        output: &mut Vec<f64>,
        frequency_transform_buffer: &mut FrequencyTransformBuffer,
    ) -> Result<()> {
        match self {
            Self::GammaDivision { num_order, gamma } => {
                scale_tail(input, output, *num_order, 1.0 / gamma);
                Ok(())
            }
            Self::GammaMultiplication { num_order, gamma } => {
                scale_tail(input, output, *num_order, *gamma);
                Ok(())
            }
            Self::GainNormalization(s) => s.run(input, output),
            Self::InverseGainNormalization(s) => s.run(input, output),
            Self::FrequencyTransform(s) => s.run(input, output, frequency_transform_buffer),
            Self::GeneralizedCepstrumTransform(s) => s.run(input, output),
        }
    }
}

fn scale_tail(input: &[f64], output: &mut Vec<f64>, num_order: usize, factor: f64) {
    output.clear();
    output.extend(
        input
            .iter()
            .enumerate()
            .map(|(m, &c)| if m == 0 { c } else { c * factor }),
    );
    output.resize(num_order + 1, 0.0);
}

/// Scratch for [`MelGeneralizedCepstrumConverter`].
#[derive(Debug, Clone, Default)]
pub struct MelGeneralizedCepstrumConverterBuffer {
    temporary: Vec<f64>,
    frequency_transform: FrequencyTransformBuffer,
}

/// Converter between two [`CepstrumFormat`]s.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{CepstrumFormat, MelGeneralizedCepstrumConverter,
///     MelGeneralizedCepstrumConverterBuffer};
///
/// // Mel-cepstrum at α = 0.42 to plain cepstrum
/// let converter = MelGeneralizedCepstrumConverter::new(
///     CepstrumFormat::new(2, 0.42, 0.0),
///     CepstrumFormat::new(2, 0.0, 0.0),
/// );
/// assert_eq!(converter.stages().len(), 1);
///
/// let mut out = Vec::new();
/// converter
///     .run(&[1.0, 0.0, 0.0], &mut out, &mut MelGeneralizedCepstrumConverterBuffer::default())
///     .unwrap();
/// assert_eq!(out, vec![1.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct MelGeneralizedCepstrumConverter {
    input: CepstrumFormat,
    output: CepstrumFormat,
    stages: Vec<Stage>,
    is_valid: bool,
}

impl MelGeneralizedCepstrumConverter {
    /// Derive the stage list from `input` to `output`.
    pub fn new(input: CepstrumFormat, output: CepstrumFormat) -> Self {
        let is_valid =
            input.is_valid() && output.is_valid() && !(input.multiplied && input.gamma == 0.0);
        if !is_valid {
            #[cfg(feature = "tracing")]
            tracing::debug!(?input, ?output, "mgc2mgc rejected endpoints");
            return Self {
                input,
                output,
                stages: Vec::new(),
                is_valid,
            };
        }

        let stages = select_stages(&input, &output);
        let is_valid = stages.iter().all(Stage::is_valid);
        #[cfg(feature = "tracing")]
        tracing::debug!(?stages, "mgc2mgc stages");
        Self {
            input,
            output,
            stages,
            is_valid,
        }
    }

    /// Input representation.
    pub fn input_format(&self) -> &CepstrumFormat {
        &self.input
    }

    /// Output representation.
    pub fn output_format(&self) -> &CepstrumFormat {
        &self.output
    }

    /// The derived stages, in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Convert `input` (`M₁ + 1` values) into `output` (`M₂ + 1`).
    pub fn run(
        &self,
        input: &[f64],
        output: &mut Vec<f64>,
        buffer: &mut MelGeneralizedCepstrumConverterBuffer,
    ) -> Result<()> {
        ensure_valid(self.is_valid)?;
        ensure_length(input.len(), self.input.num_order + 1)?;

        let Some((first, rest)) = self.stages.split_first() else {
            output.clear();
            output.extend_from_slice(input);
            output.resize(self.output.num_order + 1, 0.0);
            return Ok(());
        };

        let MelGeneralizedCepstrumConverterBuffer {
            temporary,
            frequency_transform,
        } = buffer;
        first.run(input, output, frequency_transform)?;
        for stage in rest {
            core::mem::swap(output, temporary);
            stage.run(temporary, output, frequency_transform)?;
        }
        Ok(())
    }

    /// In-place variant.
    pub fn run_in_place(
        &self,
        sequence: &mut Vec<f64>,
        buffer: &mut MelGeneralizedCepstrumConverterBuffer,
    ) -> Result<()> {
        ensure_length(sequence.len(), self.input.num_order + 1)?;
        let input = core::mem::take(sequence);
        let result = self.run(&input, sequence, buffer);
        if result.is_err() {
            *sequence = input;
        }
        result
    }
}

fn select_stages(input: &CepstrumFormat, output: &CepstrumFormat) -> Vec<Stage> {
    let (m1, m2) = (input.num_order, output.num_order);
    let (g1, g2) = (input.gamma, output.gamma);
    let alpha = if input.alpha == output.alpha {
        0.0
    } else {
        (output.alpha - input.alpha) / (1.0 - input.alpha * output.alpha)
    };

    let mut stages = Vec::new();
    if alpha == 0.0 {
        if m1 == m2 && g1 == g2 {
            if !input.multiplied && output.multiplied {
                stages.push(Stage::GammaMultiplication {
                    num_order: m1,
                    gamma: g1,
                });
            }
            if !input.normalized && output.normalized {
                stages.push(Stage::GainNormalization(GainNormalization::new(m1, g1)));
            }
            if input.normalized && !output.normalized {
                stages.push(Stage::InverseGainNormalization(
                    InverseGainNormalization::new(m2, g2),
                ));
            }
            if input.multiplied && !output.multiplied {
                stages.push(Stage::GammaDivision {
                    num_order: m2,
                    gamma: g2,
                });
            }
        } else {
            if input.multiplied {
                stages.push(Stage::GammaDivision {
                    num_order: m1,
                    gamma: g1,
                });
            }
            if !input.normalized {
                stages.push(Stage::GainNormalization(GainNormalization::new(m1, g1)));
            }
            stages.push(Stage::GeneralizedCepstrumTransform(
                GeneralizedCepstrumTransform::new(m1, m2, g1, g2),
            ));
            if !output.normalized {
                stages.push(Stage::InverseGainNormalization(
                    InverseGainNormalization::new(m2, g2),
                ));
            }
            if output.multiplied {
                stages.push(Stage::GammaMultiplication {
                    num_order: m2,
                    gamma: g2,
                });
            }
        }
    } else {
        if input.multiplied {
            stages.push(Stage::GammaDivision {
                num_order: m1,
                gamma: g1,
            });
        }
        if input.normalized {
            stages.push(Stage::InverseGainNormalization(
                InverseGainNormalization::new(m1, g1),
            ));
        }
        stages.push(Stage::FrequencyTransform(FrequencyTransform::new(
            m1, m2, alpha,
        )));
        if output.normalized || g1 != g2 {
            stages.push(Stage::GainNormalization(GainNormalization::new(m2, g1)));
        }
        if g1 != g2 {
            stages.push(Stage::GeneralizedCepstrumTransform(
                GeneralizedCepstrumTransform::new(m2, m2, g1, g2),
            ));
        }
        if !output.normalized && g1 != g2 {
            stages.push(Stage::InverseGainNormalization(
                InverseGainNormalization::new(m2, g2),
            ));
        }
        if output.multiplied {
            stages.push(Stage::GammaMultiplication {
                num_order: m2,
                gamma: g2,
            });
        }
    }
    stages
}
