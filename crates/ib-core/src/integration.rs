//! Routines for approximating expectations E[f(X)].
//!
//! - [`gauss_hermite_quadrature`]: deterministic, exact for polynomial
//!   integrands of degree ≤ 2n−1 under a Normal law. This is the production
//!   path for Normal-family sa-measures.
//! - [`monte_carlo_expectation`]: unbiased sampling estimate for any family,
//!   with standard error ~1/√n. Used as an independent oracle.
//! - [`bernoulli_expectation`]: the exact two-point sum for Bernoulli laws.
//!
//! Integrands map a tensor of points to a tensor of values with the *same
//! shape*; the engine stacks all evaluation points into one tensor and calls
//! the integrand once.

use ib_common::{Error, Result};
use ib_config::EvalConfig;
use ib_math::{QuadratureCache, MAX_NODES};
use ndarray::{Axis, Dimension, IxDyn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::distribution::{Bernoulli, Distribution, Family, Normal};
use crate::tensor::{ensure_shape, Tensor};

/// Default Monte Carlo sample count.
pub const DEFAULT_MC_SAMPLES: usize = 1000;

/// Samples drawn per Monte Carlo chunk unless configured otherwise.
pub const DEFAULT_MC_CHUNK: usize = 65_536;

/// E[f(X)] for a batched Normal `mu` using an n-point Gauss-Hermite rule
/// from the global rule cache.
///
/// Returns a tensor with `mu`'s batch shape.
pub fn gauss_hermite_quadrature<F>(mu: &Normal, f: F, n: usize) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
{
    gauss_hermite_quadrature_with_cache(mu, f, n, QuadratureCache::global())
}

/// As [`gauss_hermite_quadrature`], drawing the rule from `cache`.
pub fn gauss_hermite_quadrature_with_cache<F>(
    mu: &Normal,
    f: F,
    n: usize,
    cache: &QuadratureCache,
) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
{
    if n == 0 || n > MAX_NODES {
        return Err(Error::invalid_parameter(
            "n",
            format!("node count must be in 1..={MAX_NODES}, got {n}"),
        ));
    }
    if !cache.contains(n) {
        debug!(nodes = n, "computing gauss-hermite rule");
    }
    let rule = cache
        .rule(n)
        .ok_or_else(|| Error::invalid_parameter("n", "no gauss-hermite rule for this node count"))?;

    let batch = mu.batch_shape();
    let mut shape = Vec::with_capacity(batch.len() + 1);
    shape.push(n);
    shape.extend_from_slice(batch);

    // x = μ + √(2σ²)·node
    let mean = mu.mean();
    let spread = mu.variance().mapv(|v| (2.0 * v).sqrt());
    let points = Tensor::from_shape_fn(IxDyn(&shape), |idx| {
        let node = rule.nodes[idx[0]];
        let b = IxDyn(&idx.slice()[1..]);
        mean[b.clone()] + spread[b] * node
    });

    let values = f(&points);
    ensure_shape(&values, &shape)?;
    trace!(nodes = n, batch_shape = ?batch, "gauss-hermite quadrature");

    let norm = std::f64::consts::PI.sqrt();
    let mut acc = Tensor::zeros(IxDyn(batch));
    for (slice, &w) in values.axis_iter(Axis(0)).zip(&rule.weights) {
        acc.scaled_add(w / norm, &slice);
    }
    Ok(acc)
}

/// Exact E[f(X)] = p·f(1) + (1−p)·f(0) for a batched Bernoulli.
pub fn bernoulli_expectation<F>(mu: &Bernoulli, f: F) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
{
    let p = mu.probs();
    let at_one = f(&Tensor::ones(p.raw_dim()));
    ensure_shape(&at_one, p.shape())?;
    let at_zero = f(&Tensor::zeros(p.raw_dim()));
    ensure_shape(&at_zero, p.shape())?;

    let q = p.mapv(|p| 1.0 - p);
    Ok(p * &at_one + &q * &at_zero)
}

/// Monte Carlo estimate of E[f(X)] from `n` i.i.d. samples of `mu`.
pub fn monte_carlo_expectation<F, R>(mu: &Distribution, f: F, n: usize, rng: &mut R) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
    R: Rng + ?Sized,
{
    monte_carlo_expectation_chunked(mu, f, n, DEFAULT_MC_CHUNK, rng)
}

/// Monte Carlo estimate drawing at most `chunk_size` samples at a time.
///
/// The estimate is the same sample mean as a single draw of `n` samples;
/// chunking only bounds peak memory.
pub fn monte_carlo_expectation_chunked<F, R>(
    mu: &Distribution,
    f: F,
    n: usize,
    chunk_size: usize,
    rng: &mut R,
) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
    R: Rng + ?Sized,
{
    if n == 0 {
        return Err(Error::invalid_parameter("n", "monte carlo needs at least one sample"));
    }
    if chunk_size == 0 {
        return Err(Error::invalid_parameter("chunk_size", "must be at least 1"));
    }

    let batch = mu.batch_shape().to_vec();
    let mut total = Tensor::zeros(IxDyn(&batch));
    let mut remaining = n;
    let mut chunks = 0usize;

    while remaining > 0 {
        let m = remaining.min(chunk_size);
        let samples = mu.sample(m, rng);
        let values = f(&samples);
        ensure_shape(&values, samples.shape())?;
        total += &values.sum_axis(Axis(0));
        remaining -= m;
        chunks += 1;
    }

    debug!(family = mu.name(), samples = n, chunks, "monte carlo expectation");
    total.mapv_inplace(|s| s / n as f64);
    Ok(total)
}

/// Monte Carlo estimate with a `StdRng` seeded from `seed`.
pub fn monte_carlo_expectation_seeded<F>(mu: &Distribution, f: F, n: usize, seed: u64) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
{
    let mut rng = StdRng::seed_from_u64(seed);
    monte_carlo_expectation(mu, f, n, &mut rng)
}

/// Monte Carlo estimate using the sample count, chunk size and seed from `config`.
pub fn monte_carlo_with_config<F>(mu: &Distribution, f: F, config: &EvalConfig) -> Result<Tensor>
where
    F: Fn(&Tensor) -> Tensor,
{
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    monte_carlo_expectation_chunked(mu, f, config.mc_samples, config.mc_chunk_size, &mut rng)
}
