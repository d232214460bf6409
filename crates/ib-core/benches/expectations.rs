//! Criterion benchmarks for batched expectations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ib_core::integration::{gauss_hermite_quadrature, monte_carlo_expectation};
use ib_core::{Distribution, InfraPolytope, Normal, Tensor};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn normal_batch(size: usize) -> Normal {
    let loc: Tensor = Array1::linspace(-1.0, 1.0, size).into_dyn();
    let scale: Tensor = Array1::linspace(0.1, 1.0, size).into_dyn();
    Normal::new(loc, scale).unwrap()
}

fn integrand(x: &Tensor) -> Tensor {
    x.mapv(|v| (0.5 * v).tanh())
}

fn bench_quadrature(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadrature");
    for size in [10usize, 1_000, 100_000] {
        let normal = normal_batch(size);
        group.bench_with_input(BenchmarkId::new("gauss_hermite_20", size), &normal, |b, mu| {
            b.iter(|| gauss_hermite_quadrature(black_box(mu), integrand, 20).unwrap());
        });
    }
    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);
    let mu = Distribution::from(normal_batch(10));
    for n in [1_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::new("samples", n), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| monte_carlo_expectation(black_box(&mu), integrand, n, &mut rng).unwrap());
        });
    }
    group.finish();
}

fn bench_polytope(c: &mut Criterion) {
    let polytope = InfraPolytope::new(Distribution::from(normal_batch(64))).unwrap();
    c.bench_function("polytope_infimum_64", |b| {
        b.iter(|| polytope.evaluate(integrand).unwrap());
    });
}

criterion_group!(benches, bench_quadrature, bench_monte_carlo, bench_polytope);
criterion_main!(benches);
