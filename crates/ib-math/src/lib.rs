//! Infrabayes math utilities: quadrature rules and stable scalar kernels.

pub mod math;

pub use math::entropy::*;
pub use math::hermite::{
    gauss_hermite_params, GaussHermiteRule, QuadratureCache, DEFAULT_NODES, MAX_NODES,
};
