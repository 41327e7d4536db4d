//! Benchmarks for series expansion and limit algorithms.
//!
//! Includes:
//! - Truncated series of elementary functions
//! - Leading terms
//! - Limit computation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use symbolon::prelude::*;

/// Benchmark truncated series to increasing orders.
fn bench_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("series");

    for n in [4, 8, 12] {
        for (name, src) in [("sin", "sin(x)"), ("exp_cos", "exp(cos(x))"), ("geometric", "1/(1 - x)")] {
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, &n| {
                b.iter(|| {
                    let mut arena = ExprArena::new();
                    let x = arena.symbol("x");
                    let e = arena.parse(src).unwrap();
                    black_box(arena.series(e, x, n).unwrap())
                })
            });
        }
    }

    group.finish();
}

/// Benchmark leading terms with cancellation.
fn bench_leading_term(c: &mut Criterion) {
    let mut group = c.benchmark_group("leading_term");

    group.bench_function("sin_minus_x", |b| {
        b.iter(|| {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let e = arena.parse("sin(x) - x").unwrap();
            black_box(arena.as_leading_term(e, x).unwrap())
        })
    });

    group.finish();
}

/// Benchmark limit computation.
fn bench_limits(c: &mut Criterion) {
    let mut group = c.benchmark_group("limits");

    let cases = [
        ("poly_over_exp", "x^7/exp(x)"),
        ("rational", "(2*x + 1)/(x - 3)"),
        ("cancelling_sines", "exp(x)*(sin(1/x + exp(-x)) - sin(1/x))"),
    ];

    for (name, src) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut arena = ExprArena::new();
                let x = arena.symbol("x");
                let e = arena.parse(src).unwrap();
                black_box(limit(&mut arena, e, x, Limit::PosInfinity).unwrap())
            })
        });
    }

    group.bench_function("sinc_at_zero", |b| {
        b.iter(|| {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let zero = arena.zero();
            let e = arena.parse("sin(x)/x").unwrap();
            black_box(limit(&mut arena, e, x, Limit::TwoSided(zero)).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_series, bench_leading_term, bench_limits);
criterion_main!(benches);
