//! SPTK Core - numerical kernels for speech signal processing
//!
//! This crate holds the leaf-level numerics every cepstral analysis in the
//! toolkit is built from. Everything here is deterministic, single-threaded
//! and computed in IEEE-754 double precision.
//!
//! # Core Abstractions
//!
//! ## Matrices
//!
//! - [`Matrix`] - Row-major dense matrix with checked arithmetic and determinant
//! - [`Matrix2x2`] - Inline 2×2 block with inversion and cross-transpose
//! - [`SymmetricMatrix`] - Packed symmetric matrix with LDLᵀ decomposition
//!
//! ## Fourier Transforms
//!
//! One radix-2 decimation-in-frequency engine with a shared sine table backs
//! every transform:
//!
//! - [`Fft`] / [`InverseFft`] - Complex transforms of length `L`
//! - [`RealFft`] / [`RealInverseFft`] - Real sequences via a half-length complex FFT
//! - [`TwoDimensionalFft`], [`TwoDimensionalInverseFft`], [`TwoDimensionalRealFft`]
//!
//! ## Frequency Warping
//!
//! - [`FrequencyTransform`] - First-order all-pass warping (`freqt`)
//! - [`SecondOrderAllPassFrequencyTransform`] and its inverse - matrix-based
//!   warping for the two-parameter all-pass
//!
//! ## Linear Systems
//!
//! - [`ToeplitzPlusHankelSolver`] - Merchant-Parks block Levinson on 2×2 blocks
//!
//! ## Utilities
//!
//! - Log-domain helpers: [`floor_log`], [`add_in_log_space`], [`LOG_ZERO`]
//! - Parameter checks: [`is_valid_alpha`], [`is_valid_gamma`], [`is_power_of_two`]
//!
//! # Error Handling
//!
//! Every kernel is configured once at construction and exposes
//! `is_valid()`. Calls return [`Result`]; an invalid configuration, a
//! shape mismatch or a numerically singular system comes back as an
//! [`Error`] and never as a panic.
//!
//! # no_std Support
//!
//! The crate builds without `std` (it needs `alloc`):
//!
//! ```toml
//! [dependencies]
//! sptk-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use sptk_core::{Fft, RealFft, RealFftBuffer};
//!
//! let fft = Fft::new(3, 4);
//! let (mut re, mut im) = (Vec::new(), Vec::new());
//! fft.run(&[1.0, 1.0, 1.0, 1.0], &[0.0; 4], &mut re, &mut im).unwrap();
//! assert_eq!(re, vec![4.0, 0.0, 0.0, 0.0]);
//!
//! let rfft = RealFft::new(7, 8);
//! let mut buffer = RealFftBuffer::default();
//! rfft.run(&[1.0; 8], &mut re, &mut im, &mut buffer).unwrap();
//! assert!((re[0] - 8.0).abs() < 1e-12);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod error;
pub mod fft;
pub mod math;
pub mod matrix;
pub mod toeplitz;
pub mod transform;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use fft::{
    Fft, InverseFft, RealFft, RealFftBuffer, RealInverseFft, TwoDimensionalFft,
    TwoDimensionalFftBuffer, TwoDimensionalInverseFft, TwoDimensionalRealFft,
    TwoDimensionalRealFftBuffer,
};
pub use math::{
    LOG_TWO, LOG_ZERO, NEPER, add_in_log_space, extract_sign, floor_log, floor_log2, floor_log10,
    is_power_of_two, is_valid_alpha, is_valid_gamma,
};
pub use matrix::{Matrix, Matrix2x2, SymmetricMatrix};
pub use toeplitz::{ToeplitzPlusHankelBuffer, ToeplitzPlusHankelSolver};
pub use transform::{
    FrequencyTransform, FrequencyTransformBuffer, SecondOrderAllPassFrequencyTransform,
    SecondOrderAllPassInverseFrequencyTransform, phase_warp, phase_warp_derivative,
};
