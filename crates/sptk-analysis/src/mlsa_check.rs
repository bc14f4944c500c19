//! Stability check and repair for MLSA digital filters (`mlsacheck`).
//!
//! The MLSA filter realises `exp F(z)` with a Padé approximant whose
//! log-approximation error stays bounded only while the amplitude of the
//! basic filter `F(e^{jω})` (the mel-cepstrum with its gain removed) stays
//! below a radius that depends on the Padé order.

use core::str::FromStr;

use sptk_core::error::{Result, ensure_length, ensure_valid};
use sptk_core::{InverseFft, RealFft, RealFftBuffer, is_valid_alpha};

/// Stability radius for a Padé approximation of order 4 through 7.
///
/// With `keep_log_approximation_error` the radius bounds the maximum
/// log-approximation error; otherwise it is the larger radius that only
/// guarantees filter stability.
///
/// ```rust
/// use sptk_analysis::pade_threshold;
///
/// assert_eq!(pade_threshold(4, true), Some(4.5));
/// assert_eq!(pade_threshold(7, false), Some(10.6));
/// assert_eq!(pade_threshold(8, true), None);
/// ```
pub fn pade_threshold(pade_order: usize, keep_log_approximation_error: bool) -> Option<f64> {
    let (kept, unconstrained) = match pade_order {
        4 => (4.5, 6.20),
        5 => (6.0, 7.65),
        6 => (7.4, 9.13),
        7 => (8.9, 10.6),
        _ => return None,
    };
    Some(if keep_log_approximation_error {
        kept
    } else {
        unconstrained
    })
}

/// How an unstable mel-cepstrum is repaired in accurate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modification {
    /// Scale each over-threshold bin down to the threshold.
    #[default]
    Clipping,
    /// Scale every bin by `threshold / max`.
    Scaling,
}

impl Modification {
    /// Both modifications, in command-line index order.
    pub const ALL: [Modification; 2] = [Modification::Clipping, Modification::Scaling];
}

impl FromStr for Modification {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clip" | "clipping" | "0" => Ok(Self::Clipping),
            "scale" | "scaling" | "1" => Ok(Self::Scaling),
            _ => Err(format!("unknown modification '{s}'")),
        }
    }
}

/// Outcome of one [`MlsaStabilityCheck::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReport {
    /// Whether the maximum amplitude is within the threshold.
    pub is_stable: bool,
    /// Maximum amplitude of the basic filter.
    pub maximum_amplitude: f64,
}

#[derive(Debug, Clone)]
enum Mode {
    Fast,
    Accurate {
        fft: RealFft,
        inverse_fft: InverseFft,
        modification: Modification,
    },
}

/// Scratch for [`MlsaStabilityCheck`].
#[derive(Debug, Clone, Default)]
pub struct MlsaStabilityCheckBuffer {
    real: Vec<f64>,
    imag: Vec<f64>,
    amplitude: Vec<f64>,
    fft: RealFftBuffer,
}

/// Checker for order-`M` mel-cepstra with all-pass constant `α`.
///
/// # Example
///
/// ```rust
/// use sptk_analysis::{MlsaStabilityCheck, MlsaStabilityCheckBuffer};
///
/// let check = MlsaStabilityCheck::fast(2, 0.0, 4.5);
/// let mut buffer = MlsaStabilityCheckBuffer::default();
/// let mut mc = vec![0.0, 3.0, 3.0];
/// let report = check.run_in_place(&mut mc, &mut buffer).unwrap();
/// assert!(!report.is_stable);
/// assert_eq!(report.maximum_amplitude, 6.0);
/// assert_eq!(mc, vec![0.0, 2.25, 2.25]);
/// ```
#[derive(Debug, Clone)]
pub struct MlsaStabilityCheck {
    num_order: usize,
    alpha: f64,
    threshold: f64,
    mode: Mode,
    is_valid: bool,
}

impl MlsaStabilityCheck {
    /// Fast mode: the amplitude is taken at `ω = 0` only, and repair
    /// always scales.
    pub fn fast(num_order: usize, alpha: f64, threshold: f64) -> Self {
        Self {
            num_order,
            alpha,
            threshold,
            mode: Mode::Fast,
            is_valid: is_valid_alpha(alpha) && 0.0 < threshold,
        }
    }

    /// Accurate mode over an `fft_length`-point amplitude spectrum.
    pub fn new(
        num_order: usize,
        alpha: f64,
        threshold: f64,
        fft_length: usize,
        modification: Modification,
    ) -> Self {
        let fft = RealFft::new(num_order, fft_length);
        let inverse_fft = InverseFft::with_length(fft_length);
        let is_valid = is_valid_alpha(alpha)
            && 0.0 < threshold
            && num_order < fft_length
            && fft.is_valid()
            && inverse_fft.is_valid();
        #[cfg(feature = "tracing")]
        if !is_valid {
            tracing::debug!(num_order, alpha, threshold, fft_length, "mlsacheck rejected parameters");
        }
        Self {
            num_order,
            alpha,
            threshold,
            mode: Mode::Accurate {
                fft,
                inverse_fft,
                modification,
            },
            is_valid,
        }
    }

    /// Order `M`.
    pub fn num_order(&self) -> usize {
        self.num_order
    }

    /// All-pass constant `α`.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Stability radius.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether this is a fast-mode checker.
    pub fn is_fast(&self) -> bool {
        matches!(self.mode, Mode::Fast)
    }

    /// Whether construction succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Check `mel_cepstrum` (`M + 1` values). When `modified` is given it
    /// receives the input unchanged if stable, or the repaired
    /// mel-cepstrum otherwise.
    pub fn run(
        &self,
        mel_cepstrum: &[f64],
        modified: Option<&mut Vec<f64>>,
        buffer: &mut MlsaStabilityCheckBuffer,
    ) -> Result<StabilityReport> {
        ensure_valid(self.is_valid)?;
        ensure_length(mel_cepstrum.len(), self.num_order + 1)?;

        if self.num_order == 0 {
            if let Some(output) = modified {
                output.clear();
                output.extend_from_slice(mel_cepstrum);
            }
            return Ok(StabilityReport {
                is_stable: true,
                maximum_amplitude: 0.0,
            });
        }

        let mut power = 1.0;
        let mut gain = 0.0;
        for c in mel_cepstrum {
            gain += c * power;
            power *= -self.alpha;
        }

        let MlsaStabilityCheckBuffer {
            real,
            imag,
            amplitude,
            fft: fft_buffer,
        } = buffer;

        let maximum_amplitude = match &self.mode {
            Mode::Fast => mel_cepstrum.iter().sum::<f64>() - gain,
            Mode::Accurate { fft, .. } => {
                real.clear();
                real.extend_from_slice(mel_cepstrum);
                // Same as zeroing b[0] between mc2b and b2mc.
                real[0] -= gain;
                fft.run_in_place(real, imag, fft_buffer)?;
                amplitude.clear();
                amplitude.extend(real.iter().zip(imag.iter()).map(|(x, y)| x.hypot(*y)));
                amplitude.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }
        };
        let is_stable = maximum_amplitude <= self.threshold;
        #[cfg(feature = "tracing")]
        if !is_stable {
            tracing::trace!(maximum_amplitude, threshold = self.threshold, "unstable MLSA filter");
        }

        if let Some(output) = modified {
            output.clear();
            if is_stable {
                output.extend_from_slice(mel_cepstrum);
            } else {
                let ratio = self.threshold / maximum_amplitude;
                match &self.mode {
                    Mode::Fast => {
                        output.extend_from_slice(mel_cepstrum);
                        output[0] -= gain;
                        for c in output.iter_mut() {
                            *c *= ratio;
                        }
                        output[0] += gain;
                    }
                    Mode::Accurate {
                        inverse_fft,
                        modification,
                        ..
                    } => {
                        let bins = real.iter_mut().zip(imag.iter_mut()).zip(amplitude.iter());
                        match modification {
                            Modification::Clipping => {
                                for ((x, y), &a) in bins {
                                    if self.threshold < a {
                                        *x *= self.threshold / a;
                                        *y *= self.threshold / a;
                                    }
                                }
                            }
                            Modification::Scaling => {
                                for ((x, y), _) in bins {
                                    *x *= ratio;
                                    *y *= ratio;
                                }
                            }
                        }
                        inverse_fft.run_in_place(real, imag)?;
                        real[0] += gain;
                        output.extend_from_slice(&real[..=self.num_order]);
                    }
                }
            }
        }

        Ok(StabilityReport {
            is_stable,
            maximum_amplitude,
        })
    }

    /// Check and, if needed, repair `mel_cepstrum` in place.
    pub fn run_in_place(
        &self,
        mel_cepstrum: &mut Vec<f64>,
        buffer: &mut MlsaStabilityCheckBuffer,
    ) -> Result<StabilityReport> {
        let input = core::mem::take(mel_cepstrum);
        let result = self.run(&input, Some(mel_cepstrum), buffer);
        if result.is_err() {
            *mel_cepstrum = input;
        }
        result
    }
}
