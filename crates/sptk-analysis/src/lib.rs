//! SPTK Analysis - cepstral estimators and conversions for speech
//!
//! This crate builds the analysis layer on top of the `sptk-core` kernels:
//!
//! - [`gain_normalization`] - Gain normalization of generalized cepstra (`gnorm`/`ignorm`)
//! - [`generalized_cepstrum`] - `gc2gc` and the composed mel-generalized converter (`mgc2mgc`)
//! - [`mlsa_coefficients`] - Mel-cepstrum ↔ MLSA filter coefficients (`mc2b`/`b2mc`)
//! - [`autocorrelation`] - Cepstrum to autocorrelation (`c2acr`)
//! - [`spectrum`] - Spectrum formats, filter responses and periodograms
//! - [`fftcep`] - FFT cepstral analysis with the improved envelope
//! - [`mcep`] - Mel-cepstral analysis, first- and second-order all-pass
//! - [`mgcep`] - Mel-generalized cepstral analysis by Newton-Raphson
//! - [`agcep`] - Adaptive generalized cepstral analysis, one sample at a time
//! - [`mlsa_check`] - MLSA filter stability check and repair
//! - [`power_normalization`] - Mel-cepstrum power normalization (`pnorm`/`ipnorm`)
//! - [`principal_components`] - Principal component scores (`pcas`)
//!
//! Every type follows the kernel convention of `sptk-core`: parameters are
//! fixed at construction, `is_valid()` reports whether they were accepted,
//! and `run` takes caller-owned scratch so repeated frames do not allocate.
//!
//! ## Example Workflow
//!
//! ```rust
//! use sptk_analysis::{
//!     MelCepstralAnalysis, MelCepstralAnalysisBuffer, MlsaStabilityCheck,
//!     MlsaStabilityCheckBuffer, pade_threshold,
//! };
//!
//! // 1. Periodogram of a flat spectrum (L/2 + 1 bins)
//! let periodogram = vec![1.0; 129];
//!
//! // 2. Mel-cepstral analysis
//! let mcep = MelCepstralAnalysis::new(256, 24, 0.42, 30, 1e-6);
//! let mut buffer = MelCepstralAnalysisBuffer::default();
//! let mut mc = Vec::new();
//! mcep.run(&periodogram, &mut mc, &mut buffer).unwrap();
//!
//! // 3. Check that an MLSA filter can synthesise from it
//! let threshold = pade_threshold(4, true).unwrap();
//! let check = MlsaStabilityCheck::fast(24, 0.42, threshold);
//! let report = check
//!     .run(&mc, None, &mut MlsaStabilityCheckBuffer::default())
//!     .unwrap();
//! assert!(report.is_stable);
//! ```
//!
//! ## Tracing
//!
//! With the `tracing` feature, constructors log rejected parameters and
//! the iterative estimators log their convergence at `debug`/`trace` level.

pub mod agcep;
pub mod autocorrelation;
pub mod fftcep;
pub mod gain_normalization;
pub mod generalized_cepstrum;
pub mod mcep;
pub mod mgcep;
pub mod mlsa_check;
pub mod mlsa_coefficients;
pub mod power_normalization;
pub mod principal_components;
pub mod spectrum;

mod warp;

// Re-export main types
pub use agcep::{AdaptiveGeneralizedCepstralAnalysis, AdaptiveGeneralizedCepstralAnalysisBuffer};
pub use autocorrelation::{CepstrumToAutocorrelation, CepstrumToAutocorrelationBuffer};
pub use fftcep::{FftCepstralAnalysis, FftCepstralAnalysisBuffer};
pub use gain_normalization::{GainNormalization, InverseGainNormalization};
pub use generalized_cepstrum::{
    CepstrumFormat, GeneralizedCepstrumTransform, MelGeneralizedCepstrumConverter,
    MelGeneralizedCepstrumConverterBuffer, Stage,
};
pub use mcep::{MelCepstralAnalysis, MelCepstralAnalysisBuffer, SecondOrderAllPassMelCepstralAnalysis};
pub use mgcep::{MelGeneralizedCepstralAnalysis, MelGeneralizedCepstralAnalysisBuffer};
pub use mlsa_check::{
    MlsaStabilityCheck, MlsaStabilityCheckBuffer, Modification, StabilityReport, pade_threshold,
};
pub use mlsa_coefficients::{MelCepstrumToMlsaCoefficients, MlsaCoefficientsToMelCepstrum};
pub use power_normalization::{
    InverseMelCepstrumPowerNormalization, MelCepstrumPowerNormalization,
    MelCepstrumPowerNormalizationBuffer,
};
pub use principal_components::PrincipalComponentScores;
pub use spectrum::{
    FilterCoefficientsToPhaseSpectrum, FilterCoefficientsToSpectrum,
    FilterCoefficientsToSpectrumBuffer, SpectrumFormat, SpectrumToSpectrum, WaveformToSpectrum,
};
