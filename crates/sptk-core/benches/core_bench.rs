//! Criterion benchmarks for sptk-core kernels
//!
//! Run with: cargo bench -p sptk-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sptk_core::{
    Fft, FrequencyTransform, FrequencyTransformBuffer, RealFft, RealFftBuffer,
    SecondOrderAllPassFrequencyTransform, ToeplitzPlusHankelBuffer, ToeplitzPlusHankelSolver,
};

const FFT_LENGTHS: &[usize] = &[64, 256, 1024, 4096];
const ORDERS: &[usize] = &[12, 25, 40];

fn generate_frame(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| {
            let t = i as f64 / 16000.0;
            (2.0 * std::f64::consts::PI * 220.0 * t).sin() * 0.5
                + (2.0 * std::f64::consts::PI * 1330.0 * t).sin() * 0.1
        })
        .collect()
}

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fft");

    for &length in FFT_LENGTHS {
        let frame = generate_frame(length);
        let zeros = vec![0.0; length];

        group.bench_with_input(BenchmarkId::new("complex", length), &length, |b, &l| {
            let fft = Fft::with_length(l);
            let (mut re, mut im) = (Vec::new(), Vec::new());
            b.iter(|| {
                fft.run(black_box(&frame), &zeros, &mut re, &mut im).unwrap();
                black_box(&re);
            });
        });

        group.bench_with_input(BenchmarkId::new("real", length), &length, |b, &l| {
            let fft = RealFft::with_length(l);
            let mut buffer = RealFftBuffer::default();
            let (mut re, mut im) = (Vec::new(), Vec::new());
            b.iter(|| {
                fft.run(black_box(&frame), &mut re, &mut im, &mut buffer)
                    .unwrap();
                black_box(&re);
            });
        });
    }

    group.finish();
}

fn bench_warping(c: &mut Criterion) {
    let mut group = c.benchmark_group("Warping");

    for &order in ORDERS {
        let input: Vec<f64> = (0..=order).map(|m| 1.0 / (1.0 + m as f64)).collect();

        group.bench_with_input(BenchmarkId::new("freqt", order), &order, |b, &m| {
            let warp = FrequencyTransform::new(m, m, 0.42);
            let mut buffer = FrequencyTransformBuffer::default();
            let mut out = Vec::new();
            b.iter(|| {
                warp.run(black_box(&input), &mut out, &mut buffer).unwrap();
                black_box(&out);
            });
        });

        group.bench_with_input(BenchmarkId::new("second_order", order), &order, |b, &m| {
            let warp = SecondOrderAllPassFrequencyTransform::new(m, m, 512, 0.42, 0.3);
            let mut out = Vec::new();
            b.iter(|| {
                warp.run(black_box(&input), &mut out).unwrap();
                black_box(&out);
            });
        });
    }

    // Matrix construction cost
    group.bench_function("second_order_build", |b| {
        b.iter(|| {
            black_box(SecondOrderAllPassFrequencyTransform::new(
                25,
                25,
                black_box(512),
                0.42,
                0.3,
            ))
        });
    });

    group.finish();
}

fn bench_toeplitz_plus_hankel(c: &mut Criterion) {
    let mut group = c.benchmark_group("ToeplitzPlusHankel");

    for &order in ORDERS {
        let n = 2 * order + 1;
        let mut toeplitz: Vec<f64> = (0..n).map(|i| 0.1 / (1.0 + i as f64)).collect();
        toeplitz[order] = 4.0;
        let hankel: Vec<f64> = (0..n).map(|i| 0.05 * (i as f64).cos()).collect();
        let constant: Vec<f64> = (0..=order).map(|i| (i as f64).sin()).collect();

        group.bench_with_input(BenchmarkId::new("solve", order), &order, |b, &m| {
            let solver = ToeplitzPlusHankelSolver::new(m, true);
            let mut buffer = ToeplitzPlusHankelBuffer::default();
            let mut x = Vec::new();
            b.iter(|| {
                solver
                    .run(
                        black_box(&toeplitz),
                        &hankel,
                        &constant,
                        &mut x,
                        &mut buffer,
                    )
                    .unwrap();
                black_box(&x);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fft,
    bench_warping,
    bench_toeplitz_plus_hankel
);
criterion_main!(benches);
