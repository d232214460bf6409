//! Gauss-Hermite quadrature rules.
//!
//! An n-point rule approximates
//!
//! ```text
//! ∫ g(x) · exp(-x²) dx ≈ Σᵢ wᵢ · g(xᵢ)
//! ```
//!
//! and is exact whenever `g` is a polynomial of degree ≤ 2n−1. These are the
//! "physicists'" nodes and weights: the weights sum to √π.
//!
//! Rules are built with the Golub-Welsch algorithm. The nodes are the
//! eigenvalues of the symmetric tridiagonal Jacobi matrix
//!
//! ```text
//! J[i,i] = 0,  J[i,i+1] = J[i+1,i] = √((i+1)/2)
//! ```
//!
//! and each weight is `√π · v₀²`, where `v₀` is the first component of the
//! matching normalized eigenvector. The eigenproblem is solved with implicit
//! QL iterations, tracking only the first row of the eigenvector matrix.
//!
//! Node counts are capped at [`MAX_NODES`]. Rules are memoized in a
//! [`QuadratureCache`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::Serialize;

const QL_MAX_ITER: usize = 60;

/// Node count used when a caller does not choose one.
///
/// Twenty nodes integrate polynomials up to degree 39 exactly.
pub const DEFAULT_NODES: usize = 20;

/// Largest supported node count.
pub const MAX_NODES: usize = 1024;

/// An n-point Gauss-Hermite rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussHermiteRule {
    /// Quadrature nodes in ascending order.
    pub nodes: Vec<f64>,
    /// Weights matching `nodes`, summing to √π.
    pub weights: Vec<f64>,
}

impl GaussHermiteRule {
    /// Compute the n-point rule.
    ///
    /// Returns None when `n == 0` or `n > MAX_NODES`.
    pub fn compute(n: usize) -> Option<Self> {
        if n == 0 || n > MAX_NODES {
            return None;
        }

        let mut diag = vec![0.0; n];
        let mut off_diag: Vec<f64> = (0..n)
            .map(|i| if i + 1 < n { ((i + 1) as f64 / 2.0).sqrt() } else { 0.0 })
            .collect();
        let mut first_row = vec![0.0; n];
        first_row[0] = 1.0;

        tridiagonal_ql(&mut diag, &mut off_diag, &mut first_row)?;

        let sqrt_pi = std::f64::consts::PI.sqrt();
        let mut pairs: Vec<(f64, f64)> = diag
            .into_iter()
            .zip(first_row)
            .map(|(x, v)| (x, sqrt_pi * v * v))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // The rule is symmetric about zero; fold rounding noise out of it.
        for i in 0..n / 2 {
            let j = n - 1 - i;
            let x = 0.5 * (pairs[j].0 - pairs[i].0);
            let w = 0.5 * (pairs[i].1 + pairs[j].1);
            pairs[i] = (-x, w);
            pairs[j] = (x, w);
        }
        if n % 2 == 1 {
            pairs[n / 2].0 = 0.0;
        }

        let (nodes, weights) = pairs.into_iter().unzip();
        Some(Self { nodes, weights })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: rules have at least one node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Apply the rule to a scalar function: Σᵢ wᵢ · g(xᵢ).
    pub fn integrate<G: Fn(f64) -> f64>(&self, g: G) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * g(x))
            .sum()
    }

    /// E[g(X)] for X ~ Normal(mean, std²) via x = mean + std·√2·node.
    pub fn normal_expectation<G: Fn(f64) -> f64>(&self, mean: f64, std: f64, g: G) -> f64 {
        let spread = std * std::f64::consts::SQRT_2;
        self.integrate(|node| g(mean + spread * node)) / std::f64::consts::PI.sqrt()
    }
}

/// Eigenvalues of a symmetric tridiagonal matrix by implicit QL with
/// Wilkinson-style shifts.
///
/// On return `diag` holds the eigenvalues (unsorted) and `first_row` holds the
/// first component of each eigenvector, provided it started as e₀.
/// `off_diag[i]` is the (i, i+1) entry; its last slot is scratch.
/// Returns None if an eigenvalue fails to converge.
fn tridiagonal_ql(diag: &mut [f64], off_diag: &mut [f64], first_row: &mut [f64]) -> Option<()> {
    let n = diag.len();
    for l in 0..n {
        let mut iterations = 0;
        loop {
            let mut m = l;
            while m + 1 < n {
                let scale = diag[m].abs() + diag[m + 1].abs();
                if off_diag[m].abs() <= f64::EPSILON * scale {
                    break;
                }
                m += 1;
            }
            if m == l {
                break;
            }
            iterations += 1;
            if iterations > QL_MAX_ITER {
                return None;
            }

            let mut g = (diag[l + 1] - diag[l]) / (2.0 * off_diag[l]);
            let mut r = g.hypot(1.0);
            g = diag[m] - diag[l] + off_diag[l] / (g + r.copysign(g));
            let (mut s, mut c, mut p) = (1.0, 1.0, 0.0);
            let mut deflated = false;

            for i in (l..m).rev() {
                let f = s * off_diag[i];
                let b = c * off_diag[i];
                r = f.hypot(g);
                off_diag[i + 1] = r;
                if r == 0.0 {
                    diag[i + 1] -= p;
                    off_diag[m] = 0.0;
                    deflated = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = diag[i + 1] - p;
                r = (diag[i] - g) * s + 2.0 * c * b;
                p = s * r;
                diag[i + 1] = g + p;
                g = c * r - b;

                let upper = first_row[i + 1];
                first_row[i + 1] = s * first_row[i] + c * upper;
                first_row[i] = c * first_row[i] - s * upper;
            }
            if deflated {
                continue;
            }
            diag[l] -= p;
            off_diag[l] = g;
            off_diag[m] = 0.0;
        }
    }
    Some(())
}

/// Insert-once, read-many cache of quadrature rules keyed by node count.
///
/// Entries are never replaced or invalidated. Concurrent first use of a key
/// takes the write lock and re-checks before inserting.
#[derive(Debug, Default)]
pub struct QuadratureCache {
    rules: RwLock<HashMap<usize, Arc<GaussHermiteRule>>>,
}

impl QuadratureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> &'static QuadratureCache {
        static GLOBAL: OnceLock<QuadratureCache> = OnceLock::new();
        GLOBAL.get_or_init(QuadratureCache::new)
    }

    /// Fetch (computing on first use) the n-point rule.
    ///
    /// None for `n == 0` or `n > MAX_NODES`.
    pub fn rule(&self, n: usize) -> Option<Arc<GaussHermiteRule>> {
        if let Some(rule) = self.rules.read().get(&n) {
            return Some(Arc::clone(rule));
        }

        let mut rules = self.rules.write();
        if let Some(rule) = rules.get(&n) {
            return Some(Arc::clone(rule));
        }
        let rule = Arc::new(GaussHermiteRule::compute(n)?);
        rules.insert(n, Arc::clone(&rule));
        Some(rule)
    }

    /// Whether the n-point rule has already been computed.
    pub fn contains(&self, n: usize) -> bool {
        self.rules.read().contains_key(&n)
    }

    /// Number of cached rules.
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

/// The n-point rule from the global cache. None outside `1..=MAX_NODES`.
pub fn gauss_hermite_params(n: usize) -> Option<Arc<GaussHermiteRule>> {
    QuadratureCache::global().rule(n)
}
