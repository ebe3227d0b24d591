//! Criterion benchmarks for the signal engine.
//!
//! Benchmarks:
//! 1. SMA precompute across window sizes
//! 2. Full signal series (SMA + per-bar comparison)
//! 3. Window scaling: half-table windows on a large table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use meansig_core::components::Indicator;
use meansig_core::domain::{bars_from_closes, Bar};
use meansig_core::indicators::Sma;
use meansig_core::SignalSeries;

fn make_bars(n: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n)
        .map(|i| 30_000.0 + (i as f64 * 0.1).sin() * 500.0)
        .collect();
    bars_from_closes(&closes)
}

fn bench_sma(c: &mut Criterion) {
    let mut group = c.benchmark_group("sma_precompute");
    let bars = make_bars(10_000);

    for &window in &[5, 20, 200] {
        let sma = Sma::new(window);
        group.bench_with_input(BenchmarkId::new("window", window), &window, |b, _| {
            b.iter(|| sma.compute(black_box(&bars)));
        });
    }

    group.finish();
}

fn bench_signal_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_series");

    for &bar_count in &[1_000, 10_000, 100_000] {
        let bars = make_bars(bar_count);
        group.bench_with_input(BenchmarkId::new("sma_20", bar_count), &bar_count, |b, _| {
            b.iter(|| SignalSeries::compute(black_box(&bars), black_box(20)));
        });
    }

    group.finish();
}

fn bench_large_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_window");
    group.sample_size(20);
    let bars = make_bars(200_000);

    for &window in &[20, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("window", window), &window, |b, &w| {
            b.iter(|| SignalSeries::compute(black_box(&bars), black_box(w)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sma, bench_signal_series, bench_large_window);
criterion_main!(benches);
