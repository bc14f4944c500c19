//! Integration tests for sptk-core.
//!
//! Exercises the kernels together the way the cepstral analyses drive
//! them: real FFTs of framed signals, 2-D transforms of matrices and
//! warping through both all-pass families.

use sptk_core::{
    Error, Fft, FrequencyTransform, FrequencyTransformBuffer, InverseFft, Matrix, RealFft,
    RealFftBuffer, RealInverseFft, SecondOrderAllPassFrequencyTransform,
    SecondOrderAllPassInverseFrequencyTransform, ToeplitzPlusHankelBuffer,
    ToeplitzPlusHankelSolver, TwoDimensionalFft, TwoDimensionalFftBuffer,
    TwoDimensionalInverseFft, TwoDimensionalRealFft, TwoDimensionalRealFftBuffer,
};

const TAU: f64 = core::f64::consts::TAU;

fn sine(bin: usize, length: usize) -> Vec<f64> {
    (0..length)
        .map(|n| libm::sin(TAU * (bin * n) as f64 / length as f64))
        .collect()
}

// ============================================================================
// 1. One-dimensional transforms
// ============================================================================

#[test]
fn fft_scenarios() {
    let fft = Fft::new(3, 4);
    let (mut re, mut im) = (Vec::new(), Vec::new());

    fft.run(&[1.0, 0.0, 0.0, 0.0], &[0.0; 4], &mut re, &mut im)
        .unwrap();
    assert_eq!(re, vec![1.0, 1.0, 1.0, 1.0]);
    assert_eq!(im, vec![0.0, 0.0, 0.0, 0.0]);

    fft.run(&[1.0, 1.0, 1.0, 1.0], &[0.0; 4], &mut re, &mut im)
        .unwrap();
    assert_eq!(re, vec![4.0, 0.0, 0.0, 0.0]);
    assert_eq!(im, vec![0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn real_fft_of_sine_concentrates_in_one_bin() {
    let length = 64;
    let signal = sine(5, length);
    let rfft = RealFft::with_length(length);
    let mut buffer = RealFftBuffer::default();
    let (mut re, mut im) = (Vec::new(), Vec::new());
    rfft.run(&signal, &mut re, &mut im, &mut buffer).unwrap();

    for k in 0..length {
        let power = re[k] * re[k] + im[k] * im[k];
        if k == 5 || k == length - 5 {
            assert!((im[k].abs() - length as f64 / 2.0).abs() < 1e-9);
        } else {
            assert!(power < 1e-18, "leak at bin {k}: {power}");
        }
    }
}

#[test]
fn real_inverse_of_symmetric_spectrum() {
    // A real even spectrum inverts to a real even sequence.
    let length = 16;
    let spectrum: Vec<f64> = (0..length)
        .map(|k| {
            let k = k.min(length - k) as f64;
            1.0 / (1.0 + k)
        })
        .collect();
    let irfft = RealInverseFft::with_length(length);
    let ifft = InverseFft::with_length(length);
    let mut buffer = RealFftBuffer::default();
    let (mut re, mut im) = (Vec::new(), Vec::new());
    irfft.run(&spectrum, &mut re, &mut im, &mut buffer).unwrap();
    let (mut cre, mut cim) = (Vec::new(), Vec::new());
    ifft.run(&spectrum, &[0.0; 16], &mut cre, &mut cim).unwrap();
    for k in 0..length {
        assert!((re[k] - cre[k]).abs() < 1e-12);
        assert!(im[k].abs() < 1e-12);
    }
}

#[test]
fn invalid_configurations_report_errors() {
    let (mut re, mut im) = (Vec::new(), Vec::new());
    let fft = Fft::new(2, 6);
    assert!(!fft.is_valid());
    assert_eq!(
        fft.run(&[0.0; 3], &[0.0; 3], &mut re, &mut im),
        Err(Error::InvalidConfiguration)
    );
    let rfft = RealFft::new(3, 8);
    assert_eq!(
        rfft.run(&[0.0; 5], &mut re, &mut im, &mut RealFftBuffer::default()),
        Err(Error::LengthMismatch {
            expected: 4,
            actual: 5
        })
    );
}

// ============================================================================
// 2. Two-dimensional transforms
// ============================================================================

#[test]
fn two_dimensional_plane_wave() {
    let length = 8;
    let mut input = Matrix::new(length, length);
    for r in 0..length {
        for c in 0..length {
            input[r][c] = libm::cos(TAU * (2 * r + 3 * c) as f64 / length as f64);
        }
    }

    let fft = TwoDimensionalRealFft::new(length, length, length);
    let (mut re, mut im) = (Matrix::default(), Matrix::default());
    fft.run(
        &input,
        &mut re,
        &mut im,
        &mut TwoDimensionalRealFftBuffer::default(),
    )
    .unwrap();

    let half_energy = (length * length) as f64 / 2.0;
    assert!((re[2][3] - half_energy).abs() < 1e-9);
    assert!((re[6][5] - half_energy).abs() < 1e-9);
    assert!(re[0][0].abs() < 1e-9);
    assert!(re[3][2].abs() < 1e-9);
}

#[test]
fn two_dimensional_round_trip_with_padding() {
    let (rows, columns, length) = (3, 5, 8);
    let mut input = Matrix::new(rows, columns);
    for r in 0..rows {
        for c in 0..columns {
            input[r][c] = (r as f64 + 1.0) * (c as f64 - 2.0);
        }
    }
    let zeros = Matrix::new(rows, columns);
    let mut buffer = TwoDimensionalFftBuffer::default();
    let (mut re, mut im) = (Matrix::default(), Matrix::default());
    TwoDimensionalFft::new(rows, columns, length)
        .run(&input, &zeros, &mut re, &mut im, &mut buffer)
        .unwrap();

    let (mut back_re, mut back_im) = (Matrix::default(), Matrix::default());
    TwoDimensionalInverseFft::new(length, length, length)
        .run(&re, &im, &mut back_re, &mut back_im, &mut buffer)
        .unwrap();
    for r in 0..length {
        for c in 0..length {
            let expected = if r < rows && c < columns {
                input[r][c]
            } else {
                0.0
            };
            assert!((back_re[r][c] - expected).abs() < 1e-10);
            assert!(back_im[r][c].abs() < 1e-10);
        }
    }
}

// ============================================================================
// 3. Warping and linear systems
// ============================================================================

#[test]
fn freqt_zero_alpha_scenario() {
    let mut out = Vec::new();
    FrequencyTransform::new(2, 2, 0.0)
        .run(
            &[1.0, 0.0, 0.0],
            &mut out,
            &mut FrequencyTransformBuffer::default(),
        )
        .unwrap();
    assert_eq!(out, vec![1.0, 0.0, 0.0]);
}

#[test]
fn second_order_keeps_constant_term() {
    // The warp maps [0, 2π) onto itself, so a pure gain is left untouched.
    let forward = SecondOrderAllPassFrequencyTransform::new(3, 10, 256, 0.3, 0.0);
    let mut out = Vec::new();
    forward.run(&[1.0, 0.0, 0.0, 0.0], &mut out).unwrap();
    assert!((out[0] - 1.0).abs() < 1e-10);
    for v in &out[1..] {
        assert!(v.abs() < 1e-10);
    }

    let inverse = SecondOrderAllPassInverseFrequencyTransform::new(10, 3, 256, 0.3, 0.0);
    let mut back = Vec::new();
    inverse.run(&out, &mut back).unwrap();
    assert!((back[0] - 1.0).abs() < 1e-10);
}

#[test]
fn toeplitz_plus_hankel_scenario() {
    let mut x = Vec::new();
    ToeplitzPlusHankelSolver::new(1, false)
        .run(
            &[0.0, 2.0, 0.0],
            &[0.0, 0.0, 0.0],
            &[2.0, 0.0],
            &mut x,
            &mut ToeplitzPlusHankelBuffer::default(),
        )
        .unwrap();
    assert_eq!(x, vec![1.0, 0.0]);
}
