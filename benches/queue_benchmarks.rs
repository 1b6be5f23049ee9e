//! Queueing Engine Benchmarks
//!
//! Measures the cost of evaluating the full plan for each model as the
//! server count and population grow.
//!
//! Run with: cargo criterion

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queuecalc::prelude::*;

/// M/M/k full calculation
///
/// P0 sums k terms, so cost grows linearly with the server count.
fn bench_mmk_calculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("MMk_Calculate");
    group.sample_size(100);
    group.confidence_level(0.95);

    for k in [2u32, 16, 128].iter() {
        group.bench_with_input(BenchmarkId::new("servers", k), k, |b, &k| {
            let lambda = 0.8 * f64::from(k) * 5.0;
            let params = QueueParams::new(QueueVariant::MultiServerInfinite, lambda, 5.0)
                .with_servers(k);
            b.iter(|| {
                let model = QueueModel::new(black_box(params)).unwrap();
                black_box(model.calculate(Some(3), None).unwrap())
            });
        });
    }

    group.finish();
}

/// M/M/k/M/M full calculation
///
/// Each measure walks the `M + 1` state weights, so cost grows with `M`.
fn bench_finite_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("MMkMM_Calculate");
    group.sample_size(100);
    group.confidence_level(0.95);

    for population in [10u32, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("population", population),
            population,
            |b, &m| {
                let params = QueueParams::new(QueueVariant::MultiServerFinite, 0.1, 1.0)
                    .with_servers(4)
                    .with_population(m);
                b.iter(|| {
                    let model = QueueModel::new(black_box(params)).unwrap();
                    black_box(model.calculate(None, None).unwrap())
                });
            },
        );
    }

    group.finish();
}

/// Request round trip
///
/// Parse, validate, evaluate and format a JSON body.
fn bench_handle_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("Request");
    group.sample_size(100);

    let body = r#"{"model": "PICM", "lambda": "8", "mu": 5, "k": 2, "n_clients": 3,
                   "cost_wait": 10, "cost_server": 100}"#;
    group.bench_function("handle_request", |b| {
        b.iter(|| black_box(handle_request(black_box(body))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mmk_calculate,
    bench_finite_population,
    bench_handle_request
);
criterion_main!(benches);
