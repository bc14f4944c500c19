//! Property-based tests for sptk-analysis.
//!
//! Checks gain-normalization and MLSA-coefficient round trips, power
//! normalization, and the stability check's idempotence over randomized
//! mel-cepstra.

use proptest::prelude::*;
use sptk_analysis::{
    GainNormalization, InverseGainNormalization, InverseMelCepstrumPowerNormalization,
    MelCepstrumPowerNormalization, MelCepstrumPowerNormalizationBuffer,
    MelCepstrumToMlsaCoefficients, MlsaCoefficientsToMelCepstrum, MlsaStabilityCheck,
    MlsaStabilityCheckBuffer, Modification,
};

fn gamma_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![-1.0f64..-0.05, Just(0.0), 0.05f64..1.0]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// ignorm(gnorm(c)) = c within 1e-12.
    #[test]
    fn gain_normalization_round_trip(
        c0 in -0.5f64..0.5,
        rest in prop::collection::vec(-1.0f64..1.0, 1..20),
        gamma in gamma_strategy(),
    ) {
        let mut c = vec![c0];
        c.extend(rest);
        let order = c.len() - 1;
        let mut normalized = Vec::new();
        let mut restored = Vec::new();
        GainNormalization::new(order, gamma).run(&c, &mut normalized).unwrap();
        InverseGainNormalization::new(order, gamma).run(&normalized, &mut restored).unwrap();
        for (a, e) in restored.iter().zip(&c) {
            prop_assert!((a - e).abs() < 1e-12, "{c:?} -> {restored:?}");
        }
    }

    /// b2mc(mc2b(c)) = c.
    #[test]
    fn mlsa_coefficients_round_trip(
        mc in prop::collection::vec(-2.0f64..2.0, 1..30),
        alpha in -0.9f64..0.9,
    ) {
        let order = mc.len() - 1;
        let mut b = Vec::new();
        let mut restored = Vec::new();
        MelCepstrumToMlsaCoefficients::new(order, alpha).run(&mc, &mut b).unwrap();
        MlsaCoefficientsToMelCepstrum::new(order, alpha).run(&b, &mut restored).unwrap();
        for (a, e) in restored.iter().zip(&mc) {
            prop_assert!((a - e).abs() < 1e-9);
        }
    }

    /// A stable mel-cepstrum passes through the check unchanged.
    #[test]
    fn mlsa_check_idempotence(
        mc in prop::collection::vec(-0.3f64..0.3, 2..26),
        alpha in -0.6f64..0.6,
        fast in any::<bool>(),
    ) {
        let order = mc.len() - 1;
        let check = if fast {
            MlsaStabilityCheck::fast(order, alpha, 4.5)
        } else {
            MlsaStabilityCheck::new(order, alpha, 4.5, 256, Modification::Clipping)
        };
        let mut buffer = MlsaStabilityCheckBuffer::default();
        let mut out = Vec::new();
        let report = check.run(&mc, Some(&mut out), &mut buffer).unwrap();
        if report.is_stable {
            prop_assert_eq!(&out, &mc);
            let again = check.run(&out, None, &mut buffer).unwrap();
            prop_assert!(again.is_stable);
        }
    }

    /// Scaling repair brings the peak amplitude down to the threshold.
    #[test]
    fn mlsa_scaling_repair_reaches_threshold(
        mc in prop::collection::vec(-3.0f64..3.0, 2..16),
        alpha in -0.6f64..0.6,
    ) {
        let order = mc.len() - 1;
        let check = MlsaStabilityCheck::new(order, alpha, 2.0, 64, Modification::Scaling);
        let mut buffer = MlsaStabilityCheckBuffer::default();
        let mut repaired = mc.clone();
        let report = check.run_in_place(&mut repaired, &mut buffer).unwrap();
        let after = check.run(&repaired, None, &mut buffer).unwrap();
        if report.is_stable {
            prop_assert_eq!(&repaired, &mc);
        } else {
            prop_assert!((after.maximum_amplitude - 2.0).abs() < 1e-9);
        }
    }

    /// ipnorm(pnorm(c)) = c, and the normalized cepstrum has zero power.
    #[test]
    fn power_normalization_round_trip(
        mc in prop::collection::vec(-0.5f64..0.5, 1..20),
        alpha in -0.6f64..0.6,
    ) {
        let order = mc.len() - 1;
        let pnorm = MelCepstrumPowerNormalization::new(order, 256, alpha);
        let mut buffer = MelCepstrumPowerNormalizationBuffer::default();
        let mut normalized = Vec::new();
        let power = pnorm.run(&mc, &mut normalized, &mut buffer).unwrap();
        let residual = pnorm.run(&normalized, &mut Vec::new(), &mut buffer).unwrap();
        prop_assert!(residual.abs() < 1e-10);

        let mut restored = Vec::new();
        InverseMelCepstrumPowerNormalization::new(order)
            .run(power, &normalized, &mut restored)
            .unwrap();
        for (a, e) in restored.iter().zip(&mc) {
            prop_assert!((a - e).abs() < 1e-12);
        }
    }
}
