//! Property-based tests for sptk-core numerical kernels.
//!
//! Checks FFT linearity and inversion, real-FFT symmetry, frequency-warp
//! round trips and Toeplitz-plus-Hankel residuals over randomized inputs.

use proptest::prelude::*;
use sptk_core::{
    Fft, FrequencyTransform, FrequencyTransformBuffer, InverseFft, RealFft, RealFftBuffer,
    ToeplitzPlusHankelBuffer, ToeplitzPlusHankelSolver,
};

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |m, v| m.max(v.abs()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// FFT(a·x + b·y) = a·FFT(x) + b·FFT(y).
    #[test]
    fn fft_linearity(
        x in prop::collection::vec(-10.0f64..10.0, 16),
        y in prop::collection::vec(-10.0f64..10.0, 16),
        a in -3.0f64..3.0,
        b in -3.0f64..3.0,
    ) {
        let fft = Fft::with_length(16);
        let zeros = [0.0; 16];
        let (mut xr, mut xi) = (Vec::new(), Vec::new());
        let (mut yr, mut yi) = (Vec::new(), Vec::new());
        let (mut sr, mut si) = (Vec::new(), Vec::new());
        let sum: Vec<f64> = x.iter().zip(&y).map(|(p, q)| a * p + b * q).collect();
        fft.run(&x, &zeros, &mut xr, &mut xi).unwrap();
        fft.run(&y, &zeros, &mut yr, &mut yi).unwrap();
        fft.run(&sum, &zeros, &mut sr, &mut si).unwrap();
        for k in 0..16 {
            prop_assert!((sr[k] - (a * xr[k] + b * yr[k])).abs() < 1e-9);
            prop_assert!((si[k] - (a * xi[k] + b * yi[k])).abs() < 1e-9);
        }
    }

    /// IFFT(FFT(x)) recovers x within 1e-10 relative to its peak.
    #[test]
    fn fft_inversion(
        re in prop::collection::vec(-100.0f64..100.0, 64),
        im in prop::collection::vec(-100.0f64..100.0, 64),
    ) {
        let fft = Fft::with_length(64);
        let ifft = InverseFft::with_length(64);
        let (mut fr, mut fi) = (Vec::new(), Vec::new());
        let (mut br, mut bi) = (Vec::new(), Vec::new());
        fft.run(&re, &im, &mut fr, &mut fi).unwrap();
        ifft.run(&fr, &fi, &mut br, &mut bi).unwrap();
        let scale = max_abs(&re).max(max_abs(&im)).max(1e-300);
        for k in 0..64 {
            prop_assert!((br[k] - re[k]).abs() <= 1e-10 * scale);
            prop_assert!((bi[k] - im[k]).abs() <= 1e-10 * scale);
        }
    }

    /// X[L-k] = conj(X[k]) for real input.
    #[test]
    fn real_fft_hermitian(
        input in prop::collection::vec(-5.0f64..5.0, 1..=32),
    ) {
        let rfft = RealFft::new(input.len() - 1, 32);
        let mut buffer = RealFftBuffer::default();
        let (mut re, mut im) = (Vec::new(), Vec::new());
        rfft.run(&input, &mut re, &mut im, &mut buffer).unwrap();
        for k in 1..32 {
            prop_assert!((re[32 - k] - re[k]).abs() < 1e-10);
            prop_assert!((im[32 - k] + im[k]).abs() < 1e-10);
        }
    }

    /// Warping by α and back by -α is the identity when the middle order is
    /// high enough for the truncation error to vanish.
    #[test]
    fn freqt_round_trip(
        input in prop::collection::vec(-1.0f64..1.0, 8),
        alpha in -0.5f64..0.5,
    ) {
        let mut buffer = FrequencyTransformBuffer::default();
        let (mut warped, mut back) = (Vec::new(), Vec::new());
        FrequencyTransform::new(7, 120, alpha)
            .run(&input, &mut warped, &mut buffer)
            .unwrap();
        FrequencyTransform::new(120, 7, -alpha)
            .run(&warped, &mut back, &mut buffer)
            .unwrap();
        for (a, b) in back.iter().zip(&input) {
            prop_assert!((a - b).abs() < 1e-8);
        }
    }

    /// Residual of a diagonally dominant Toeplitz-plus-Hankel system.
    #[test]
    fn toeplitz_plus_hankel_residual(
        order in 1usize..8,
        seed_t in prop::collection::vec(-0.5f64..0.5, 15),
        seed_h in prop::collection::vec(-0.5f64..0.5, 15),
        seed_b in prop::collection::vec(-2.0f64..2.0, 8),
    ) {
        let n = 2 * order + 1;
        let mut t: Vec<f64> = seed_t[..n].to_vec();
        let h: Vec<f64> = seed_h[..n].to_vec();
        let b: Vec<f64> = seed_b[..=order].to_vec();
        // Dominant diagonal keeps the leading blocks well away from singular.
        t[order] = 4.0 * n as f64;

        let mut x = Vec::new();
        ToeplitzPlusHankelSolver::new(order, false)
            .run(&t, &h, &b, &mut x, &mut ToeplitzPlusHankelBuffer::default())
            .unwrap();

        let norm_b = max_abs(&b).max(1e-12);
        for i in 0..=order {
            let v: f64 = (0..=order).map(|j| (t[i + order - j] + h[i + j]) * x[j]).sum();
            prop_assert!((v - b[i]).abs() <= 1e-8 * norm_b);
        }
    }
}
