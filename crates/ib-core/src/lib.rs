//! Infra-Bayesian expectations.
//!
//! - [`distribution`]: batched Bernoulli, Normal and Uniform laws
//! - [`integration`]: Gauss-Hermite quadrature, exact Bernoulli sums, Monte Carlo
//! - [`measure`]: sa-measures `(μ, λ, b)`
//! - [`infra`]: infradistributions as polytopes of minimal points
//! - [`scenario`]: JSON/TOML scenario files driving the `ib-core` binary

pub mod distribution;
pub mod exit_codes;
pub mod infra;
pub mod integrand;
pub mod integration;
pub mod logging;
pub mod measure;
pub mod scenario;
pub mod tensor;

pub use distribution::{Bernoulli, Distribution, Family, Normal, Uniform};
pub use infra::{InfraDistribution, InfraPolytope};
pub use integrand::IntegrandSpec;
pub use integration::{
    bernoulli_expectation, gauss_hermite_quadrature, gauss_hermite_quadrature_with_cache,
    monte_carlo_expectation, monte_carlo_expectation_chunked, monte_carlo_expectation_seeded,
    monte_carlo_with_config,
};
pub use measure::{Operand, SaMeasure};
pub use scenario::Scenario;
pub use tensor::Tensor;

pub use ib_common::{Error, Result};
