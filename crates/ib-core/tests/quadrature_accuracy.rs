//! Gauss-Hermite quadrature against a large Monte Carlo oracle.
//!
//! A batch of ten Normals with means spread over [-1, 1] and standard
//! deviations over [0.1, 1] is integrated against x, x² and x³. Both
//! estimators must agree to 0.01 everywhere.

use ib_core::integration::{gauss_hermite_quadrature, monte_carlo_expectation_seeded};
use ib_core::{Distribution, Normal, Tensor};
use ndarray::{Array1, IxDyn};

const SAMPLES: usize = 5_000_000;
const ATOL: f64 = 0.01;
const SEED: u64 = 0x1b_5eed;

fn batch() -> Normal {
    let loc: Tensor = Array1::linspace(-1.0, 1.0, 10).into_dyn();
    let scale: Tensor = Array1::linspace(0.1, 1.0, 10).into_dyn();
    Normal::new(loc, scale).expect("valid normal batch")
}

fn power(k: i32) -> impl Fn(&Tensor) -> Tensor {
    move |x: &Tensor| x.mapv(|v| v.powi(k))
}

#[test]
fn quadrature_matches_monte_carlo_for_low_moments() {
    let normal = batch();
    let mu = Distribution::from(normal.clone());

    for k in 1..=3 {
        let quad = gauss_hermite_quadrature(&normal, power(k), 20).expect("quadrature");
        let mc = monte_carlo_expectation_seeded(&mu, power(k), SAMPLES, SEED).expect("monte carlo");
        assert_eq!(quad.shape(), &[10]);
        assert_eq!(mc.shape(), &[10]);

        for (i, (q, m)) in quad.iter().zip(mc.iter()).enumerate() {
            assert!(
                (q - m).abs() <= ATOL,
                "k={k} element {i}: quadrature {q} vs monte carlo {m}"
            );
        }
    }
}

#[test]
fn quadrature_matches_closed_form_moments() {
    let normal = batch();
    let loc: Array1<f64> = Array1::linspace(-1.0, 1.0, 10);
    let scale: Array1<f64> = Array1::linspace(0.1, 1.0, 10);

    let e1 = gauss_hermite_quadrature(&normal, power(1), 2).unwrap();
    let e2 = gauss_hermite_quadrature(&normal, power(2), 2).unwrap();
    let e3 = gauss_hermite_quadrature(&normal, power(3), 2).unwrap();

    for i in 0..10 {
        let (m, s) = (loc[i], scale[i]);
        assert!((e1[IxDyn(&[i])] - m).abs() < 1e-12);
        assert!((e2[IxDyn(&[i])] - (m * m + s * s)).abs() < 1e-12);
        assert!((e3[IxDyn(&[i])] - (m * m * m + 3.0 * m * s * s)).abs() < 1e-12);
    }
}

#[test]
fn more_nodes_do_not_hurt_smooth_integrands() {
    let normal = batch();
    let f = |x: &Tensor| x.mapv(f64::cos);
    let coarse = gauss_hermite_quadrature(&normal, f, 20).unwrap();
    let fine = gauss_hermite_quadrature(&normal, f, 60).unwrap();

    // E[cos X] = cos(μ)·exp(-σ²/2)
    let loc: Array1<f64> = Array1::linspace(-1.0, 1.0, 10);
    let scale: Array1<f64> = Array1::linspace(0.1, 1.0, 10);
    for i in 0..10 {
        let exact = loc[i].cos() * (-scale[i] * scale[i] / 2.0).exp();
        assert!((coarse[IxDyn(&[i])] - exact).abs() < 1e-10);
        assert!((fine[IxDyn(&[i])] - exact).abs() < 1e-10);
    }
}
