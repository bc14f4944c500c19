//! Radix-2 Fourier transforms.
//!
//! Every transform in this module is driven by one complex engine,
//! [`Fft`]: a decimation-in-frequency butterfly over `log₂ L` stages that
//! reads both sines and cosines from a single table of `L - L/4 + 1`
//! values.
//!
//! # Conventions
//!
//! - The forward transform is unscaled:
//!   `X[k] = Σ x[n] · exp(-j 2π k n / L)`.
//! - The inverse transform swaps the real and imaginary parts around a
//!   forward transform and divides by `L`.
//! - Inputs shorter than `L` are zero-padded; outputs always hold `L`
//!   values (or an `L × L` matrix for the 2-D variants).

mod complex;
mod real;
mod two_dimensional;

pub use complex::{Fft, InverseFft};
pub use real::{RealFft, RealFftBuffer, RealInverseFft};
pub use two_dimensional::{
    TwoDimensionalFft, TwoDimensionalFftBuffer, TwoDimensionalInverseFft, TwoDimensionalRealFft,
    TwoDimensionalRealFftBuffer, append_boundary, swap_quadrants,
};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;

use libm::sin;

/// `sin(2π i / L)` for `i` in `0..=L - L/4`, with the exact zero at `L/2`.
///
/// The cosine of the same angle sits `L/4` entries further along.
pub(crate) fn sine_table(length: usize) -> Vec<f64> {
    let size = length - length / 4 + 1;
    let argument = 2.0 * PI / length as f64;
    let mut table: Vec<f64> = (0..size).map(|i| sin(argument * i as f64)).collect();
    if length / 2 < size {
        table[length / 2] = 0.0;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_table_layout() {
        let table = sine_table(8);
        assert_eq!(table.len(), 7);
        assert_eq!(table[0], 0.0);
        assert!((table[2] - 1.0).abs() < 1e-15);
        assert_eq!(table[4], 0.0);
        // Cosine view starts at L/4
        assert!((table[2] - libm::cos(0.0)).abs() < 1e-15);
        assert!((table[3] - libm::cos(PI / 4.0)).abs() < 1e-15);
    }
}
