//! Benchmarks for canonical arithmetic.
//!
//! Includes:
//! - Hash-consed construction of sums and products
//! - Multinomial expansion
//! - Differentiation and substitution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use symbolon::prelude::*;

/// Sum of `n` distinct monomials `k*x^k`.
fn build_sum(arena: &mut ExprArena, x: ExprHandle, n: i64) -> ExprHandle {
    let terms: Vec<ExprHandle> = (1..=n)
        .map(|k| {
            let c = arena.integer(k);
            let e = arena.integer(k);
            let p = arena.pow(x, e).unwrap();
            arena.mul(&[c, p])
        })
        .collect();
    arena.add(&terms)
}

/// Benchmark building canonical sums.
fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for n in [10, 50, 200] {
        group.bench_with_input(BenchmarkId::new("sum", n), &n, |b, &n| {
            b.iter(|| {
                let mut arena = ExprArena::new();
                let x = arena.symbol("x");
                black_box(build_sum(&mut arena, x, n))
            })
        });
    }

    // Re-interning an existing expression is a lookup
    group.bench_function("rebuild_interned", |b| {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        build_sum(&mut arena, x, 50);
        b.iter(|| black_box(build_sum(&mut arena, x, 50)))
    });

    group.finish();
}

/// Benchmark expansion of (x + y + 1)^n.
fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");

    for n in [2, 5, 10] {
        group.bench_with_input(BenchmarkId::new("trinomial", n), &n, |b, &n| {
            b.iter(|| {
                let mut arena = ExprArena::new();
                let e = arena.parse(&format!("(x + y + 1)^{n}")).unwrap();
                black_box(arena.expand(e).unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark differentiation and substitution.
fn bench_calculus(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculus");

    group.bench_function("diff_nested", |b| {
        b.iter(|| {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let e = arena.parse("sin(x^2)*exp(cos(x))/(x + 1)").unwrap();
            black_box(arena.diff(e, x).unwrap())
        })
    });

    group.bench_function("subs_polynomial", |b| {
        b.iter(|| {
            let mut arena = ExprArena::new();
            let x = arena.symbol("x");
            let p = build_sum(&mut arena, x, 20);
            let y = arena.parse("y + 1").unwrap();
            black_box(arena.subs(p, x, y).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_construction, bench_expand, bench_calculus);
criterion_main!(benches);
