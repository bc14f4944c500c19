//! Integration tests for sptk-analysis.
//!
//! Drives a resonant periodogram through the frame analyses, converts the
//! results between representations, and hands them to the MLSA stability
//! check. Also runs the adaptive analyzer on synthetic AR processes.

use core::f64::consts::PI;

use sptk_analysis::{
    AdaptiveGeneralizedCepstralAnalysis, AdaptiveGeneralizedCepstralAnalysisBuffer,
    CepstrumFormat, GainNormalization, InverseGainNormalization, MelCepstralAnalysis,
    MelCepstralAnalysisBuffer, MelCepstrumToMlsaCoefficients, MelGeneralizedCepstralAnalysis,
    MelGeneralizedCepstralAnalysisBuffer, MelGeneralizedCepstrumConverter,
    MelGeneralizedCepstrumConverterBuffer, MlsaCoefficientsToMelCepstrum, MlsaStabilityCheck,
    MlsaStabilityCheckBuffer, Modification, pade_threshold,
};

const FFT_LENGTH: usize = 256;

/// Power spectrum of `1 / (1 - 2r cos θ z⁻¹ + r² z⁻²)` on `L/2 + 1` bins.
fn resonance(radius: f64, angle: f64) -> Vec<f64> {
    let a1 = -2.0 * radius * angle.cos();
    let a2 = radius * radius;
    (0..=FFT_LENGTH / 2)
        .map(|k| {
            let w = 2.0 * PI * k as f64 / FFT_LENGTH as f64;
            let re = 1.0 + a1 * w.cos() + a2 * (2.0 * w).cos();
            let im = -a1 * w.sin() - a2 * (2.0 * w).sin();
            1.0 / (re * re + im * im)
        })
        .collect()
}

/// Largest deviation between the log amplitude of cepstrum `c` and
/// `½ ln P`.
fn log_spectral_error(c: &[f64], power: &[f64]) -> f64 {
    power
        .iter()
        .enumerate()
        .map(|(k, p)| {
            let w = 2.0 * PI * k as f64 / FFT_LENGTH as f64;
            let model: f64 = c
                .iter()
                .enumerate()
                .map(|(m, cm)| cm * (w * m as f64).cos())
                .sum();
            (model - 0.5 * p.ln()).abs()
        })
        .fold(0.0, f64::max)
}

fn to_linear_cepstrum(input: CepstrumFormat, mgc: &[f64]) -> Vec<f64> {
    let converter =
        MelGeneralizedCepstrumConverter::new(input, CepstrumFormat::new(FFT_LENGTH / 2 - 1, 0.0, 0.0));
    assert!(converter.is_valid());
    let mut c = Vec::new();
    converter
        .run(mgc, &mut c, &mut MelGeneralizedCepstrumConverterBuffer::default())
        .unwrap();
    c
}

// ============================================================================
// 1. Gain normalization
// ============================================================================

#[test]
fn gain_normalization_scenario() {
    let c = [0.0, 0.2, 0.1];
    let mut normalized = Vec::new();
    GainNormalization::new(2, -0.5)
        .run(&c, &mut normalized)
        .unwrap();
    assert_eq!(normalized, vec![1.0, 0.2, 0.1]);

    let mut restored = Vec::new();
    InverseGainNormalization::new(2, -0.5)
        .run(&normalized, &mut restored)
        .unwrap();
    assert_eq!(restored, c.to_vec());
}

// ============================================================================
// 2. Periodogram → analysis → conversion → stability check
// ============================================================================

#[test]
fn mel_cepstrum_pipeline() {
    let power = resonance(0.9, 0.2 * PI);
    let alpha = 0.35;

    let mcep = MelCepstralAnalysis::new(FFT_LENGTH, 24, alpha, 30, 1e-6);
    let mut mc = Vec::new();
    mcep.run(&power, &mut mc, &mut MelCepstralAnalysisBuffer::default())
        .unwrap();
    assert_eq!(mc.len(), 25);

    let c = to_linear_cepstrum(CepstrumFormat::new(24, alpha, 0.0), &mc);
    assert!(log_spectral_error(&c, &power) < 0.02);

    // MLSA coefficients round trip.
    let mut b = Vec::new();
    let mut back = Vec::new();
    MelCepstrumToMlsaCoefficients::new(24, alpha)
        .run(&mc, &mut b)
        .unwrap();
    MlsaCoefficientsToMelCepstrum::new(24, alpha)
        .run(&b, &mut back)
        .unwrap();
    for (x, y) in back.iter().zip(&mc) {
        assert!((x - y).abs() < 1e-12);
    }

    // The fitted envelope is well within the 4th-order Padé radius.
    let threshold = pade_threshold(4, true).unwrap();
    let mut buffer = MlsaStabilityCheckBuffer::default();
    for check in [
        MlsaStabilityCheck::fast(24, alpha, threshold),
        MlsaStabilityCheck::new(24, alpha, threshold, FFT_LENGTH, Modification::Clipping),
    ] {
        let mut out = Vec::new();
        let report = check.run(&mc, Some(&mut out), &mut buffer).unwrap();
        assert!(report.is_stable, "{report:?}");
        assert_eq!(out, mc);
    }

    // A tight radius forces a repair that lowers the peak.
    let tight = MlsaStabilityCheck::new(24, alpha, 2.0, FFT_LENGTH, Modification::Clipping);
    let mut repaired = mc.clone();
    let before = tight.run_in_place(&mut repaired, &mut buffer).unwrap();
    assert!(!before.is_stable);
    let after = tight.run(&repaired, None, &mut buffer).unwrap();
    assert!(after.maximum_amplitude < before.maximum_amplitude);
}

#[test]
fn mel_generalized_cepstrum_pipeline() {
    let power = resonance(0.9, 0.2 * PI);
    let alpha = 0.35;
    for (gamma, tolerance) in [(-1.0, 1e-4), (-0.5, 0.01)] {
        let mgcep = MelGeneralizedCepstralAnalysis::new(FFT_LENGTH, 24, alpha, gamma, 10, 1e-3);
        assert!(mgcep.is_valid());
        let mut mgc = Vec::new();
        mgcep
            .run(&power, &mut mgc, &mut MelGeneralizedCepstralAnalysisBuffer::default())
            .unwrap();
        let c = to_linear_cepstrum(CepstrumFormat::new(24, alpha, gamma), &mgc);
        let error = log_spectral_error(&c, &power);
        assert!(error < tolerance, "γ = {gamma}: {error}");
    }
}

// ============================================================================
// 3. Adaptive analysis
// ============================================================================

struct XorShift(u64);

impl XorShift {
    fn uniform(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

#[test]
fn adaptive_analysis_tracks_ar2_process() {
    let a1 = -1.6 * (0.3 * PI).cos();
    let a2 = 0.64;
    let mut rng = XorShift(0x2545_F491_4F6C_DD1D);
    let (mut y1, mut y2) = (0.0, 0.0);

    let agcep = AdaptiveGeneralizedCepstralAnalysis::new(2, 1, 1e-6, 0.9, 0.98, 0.02);
    let mut buffer = AdaptiveGeneralizedCepstralAnalysisBuffer::default();
    let mut gc = Vec::new();
    for _ in 0..16000 {
        let x = rng.uniform() - a1 * y1 - a2 * y2;
        y2 = y1;
        y1 = x;
        agcep.run(x, &mut gc, &mut buffer).unwrap();
    }

    // At γ = -1 the normalized coefficients approach the negated AR
    // polynomial and K the innovation deviation of U(-1, 1).
    let mut normalized = Vec::new();
    GainNormalization::new(2, -1.0)
        .run(&gc, &mut normalized)
        .unwrap();
    assert!((normalized[0] - (1.0f64 / 3.0).sqrt()).abs() < 0.05, "{normalized:?}");
    assert!((normalized[1] + a1).abs() < 0.1, "{normalized:?}");
    assert!((normalized[2] + a2).abs() < 0.1, "{normalized:?}");
}
