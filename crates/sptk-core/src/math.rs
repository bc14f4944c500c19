//! Scalar helpers shared across the toolkit.
//!
//! # Log Domain
//!
//! Logarithms of non-positive values never produce NaN here; they return
//! the sentinel [`LOG_ZERO`] instead. [`add_in_log_space`] adds two
//! probabilities held in log form without leaving the log domain.
//!
//! # Parameter Checks
//!
//! - [`is_valid_alpha`] - all-pass constant inside the unit circle
//! - [`is_valid_gamma`] - generalized-cepstrum exponent in `[-1, 1]`
//! - [`is_power_of_two`] - FFT length check

use libm::{exp, fabs, log, log2, log10};

/// Stand-in for `log(0)`.
pub const LOG_ZERO: f64 = -1.0e10;

/// Decibels per neper: `20 / ln(10)`.
pub const NEPER: f64 = 8.685889638065035;

/// `ln(2)`.
pub const LOG_TWO: f64 = core::f64::consts::LN_2;

/// Below this log-ratio the smaller term no longer changes a double sum.
const INFORMATION_LOSS_THRESHOLD: f64 = -34.0;

/// Returns `true` if `n` is `2^p` for some `p ≥ 0`.
///
/// ```rust
/// use sptk_core::is_power_of_two;
///
/// assert!(is_power_of_two(1));
/// assert!(is_power_of_two(256));
/// assert!(!is_power_of_two(0));
/// assert!(!is_power_of_two(12));
/// ```
#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n.is_power_of_two()
}

/// Returns `true` if `|alpha| < 1`.
#[inline]
pub fn is_valid_alpha(alpha: f64) -> bool {
    fabs(alpha) < 1.0
}

/// Returns `true` if `|gamma| ≤ 1`.
#[inline]
pub fn is_valid_gamma(gamma: f64) -> bool {
    fabs(gamma) <= 1.0
}

/// Natural logarithm that maps `x ≤ 0` to [`LOG_ZERO`].
#[inline]
pub fn floor_log(x: f64) -> f64 {
    if x <= 0.0 { LOG_ZERO } else { log(x) }
}

/// Base-2 logarithm that maps `x ≤ 0` to [`LOG_ZERO`].
#[inline]
pub fn floor_log2(x: f64) -> f64 {
    if x <= 0.0 { LOG_ZERO } else { log2(x) }
}

/// Base-10 logarithm that maps `x ≤ 0` to [`LOG_ZERO`].
#[inline]
pub fn floor_log10(x: f64) -> f64 {
    if x <= 0.0 { LOG_ZERO } else { log10(x) }
}

/// Computes `log(x + y)` from `log(x)` and `log(y)`.
///
/// ```rust
/// use sptk_core::add_in_log_space;
///
/// let sum = add_in_log_space(2.0_f64.ln(), 3.0_f64.ln());
/// assert!((sum - 5.0_f64.ln()).abs() < 1e-12);
/// ```
pub fn add_in_log_space(log_x: f64, log_y: f64) -> f64 {
    if log_x == log_y {
        return log_x + LOG_TWO;
    }

    let (smaller, greater) = if log_x < log_y {
        (log_x, log_y)
    } else {
        (log_y, log_x)
    };
    let diff = smaller - greater;
    if diff < INFORMATION_LOSS_THRESHOLD {
        return greater;
    }
    greater + log(exp(diff) + 1.0)
}

/// Sign of `x` as `-1`, `0` or `1`.
#[inline]
pub fn extract_sign(x: f64) -> i32 {
    if 0.0 < x {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_log_sentinel() {
        assert_eq!(floor_log(0.0), LOG_ZERO);
        assert_eq!(floor_log(-3.0), LOG_ZERO);
        assert_eq!(floor_log2(0.0), LOG_ZERO);
        assert_eq!(floor_log10(-1.0), LOG_ZERO);
        assert!((floor_log(core::f64::consts::E) - 1.0).abs() < 1e-15);
        assert!((floor_log2(8.0) - 3.0).abs() < 1e-15);
        assert!((floor_log10(1000.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_in_log_space() {
        assert!((add_in_log_space(0.0, 0.0) - LOG_TWO).abs() < 1e-15);
        // Far below the larger term the smaller one is dropped
        assert_eq!(add_in_log_space(LOG_ZERO, 1.5), 1.5);
        let sum = add_in_log_space(log(0.25), log(0.5));
        assert!((sum - log(0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_parameter_checks() {
        assert!(is_valid_alpha(0.99));
        assert!(!is_valid_alpha(1.0));
        assert!(!is_valid_alpha(-1.0));
        assert!(is_valid_gamma(-1.0));
        assert!(is_valid_gamma(1.0));
        assert!(!is_valid_gamma(1.01));
        assert_eq!(extract_sign(-0.3), -1);
        assert_eq!(extract_sign(0.0), 0);
        assert_eq!(extract_sign(2.0), 1);
    }

    #[test]
    fn test_neper_constant() {
        assert!((NEPER - 20.0 / core::f64::consts::LN_10).abs() < 1e-12);
    }
}
