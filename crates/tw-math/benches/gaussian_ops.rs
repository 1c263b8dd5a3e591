//! Criterion benchmarks for `tw-math`.
//!
//! Focus on the kernels evaluated per visibility sample.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tw_math::{normal_pdf, sample_variance, two_state_posterior};

fn bench_gaussian_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian");

    // Calibrated visible/covered inter-read timing models.
    for (name, mean, variance) in [("visible", 0.0956, 0.0051), ("covered", 0.62, 7.38)] {
        group.bench_with_input(
            BenchmarkId::new("normal_pdf", name),
            &(mean, variance),
            |b, &(m, v)| {
                b.iter(|| black_box(normal_pdf(black_box(0.11), black_box(m), black_box(v))));
            },
        );
    }

    group.bench_function("two_state_posterior", |b| {
        b.iter(|| {
            black_box(two_state_posterior(black_box(5.6), black_box(0.14), black_box(0.55)));
        });
    });

    group.finish();
}

fn bench_window_variance(c: &mut Criterion) {
    let window: Vec<f64> = (0..100).map(|i| 0.09 + (i % 7) as f64 * 0.003).collect();
    c.bench_function("sample_variance_100", |b| {
        b.iter(|| black_box(sample_variance(black_box(&window).iter().copied())));
    });
}

criterion_group!(benches, bench_gaussian_kernels, bench_window_variance);
criterion_main!(benches);
