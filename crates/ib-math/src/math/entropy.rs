//! Numerically stable entropy kernels.
//!
//! All entropies are in nats.

use std::f64::consts::{E, PI};

/// x·ln(x) with the convention 0·ln(0) = 0.
///
/// Returns NaN for negative or NaN input.
pub fn xlogx(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    x * x.ln()
}

/// Shannon entropy of a Bernoulli(p) variable.
///
/// Returns NaN for p outside [0, 1].
pub fn binary_entropy(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    -(xlogx(p) + xlogx(1.0 - p))
}

/// Differential entropy of Normal(·, std²): ½·ln(2πe·std²).
///
/// Returns NaN for non-positive std.
pub fn normal_entropy(std: f64) -> f64 {
    if std.is_nan() || std <= 0.0 {
        return f64::NAN;
    }
    0.5 * (2.0 * PI * E).ln() + std.ln()
}

/// Differential entropy of Uniform(low, high): ln(high − low).
pub fn uniform_entropy(low: f64, high: f64) -> f64 {
    if low.is_nan() || high.is_nan() || high <= low {
        return f64::NAN;
    }
    (high - low).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn xlogx_edges() {
        assert_eq!(xlogx(0.0), 0.0);
        assert_eq!(xlogx(1.0), 0.0);
        assert!(xlogx(-0.1).is_nan());
        assert!(approx_eq(xlogx(E), E, 1e-12));
    }

    #[test]
    fn binary_entropy_known_values() {
        assert!(approx_eq(binary_entropy(0.5), 2.0f64.ln(), 1e-12));
        assert_eq!(binary_entropy(0.0), 0.0);
        assert_eq!(binary_entropy(1.0), 0.0);
        assert!(approx_eq(binary_entropy(0.2), binary_entropy(0.8), 1e-15));
        assert!(binary_entropy(1.5).is_nan());
    }

    #[test]
    fn normal_entropy_standard() {
        // ½ ln(2πe) ≈ 1.4189385
        assert!(approx_eq(normal_entropy(1.0), 1.418_938_533_204_672_7, 1e-12));
        assert!(approx_eq(normal_entropy(2.0) - normal_entropy(1.0), 2.0f64.ln(), 1e-12));
        assert!(normal_entropy(0.0).is_nan());
    }

    #[test]
    fn uniform_entropy_unit_interval() {
        assert_eq!(uniform_entropy(0.0, 1.0), 0.0);
        assert!(approx_eq(uniform_entropy(-1.0, 1.0), 2.0f64.ln(), 1e-12));
        assert!(uniform_entropy(1.0, 1.0).is_nan());
    }
}
