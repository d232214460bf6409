//! Batched probability distributions.
//!
//! Every family stores its parameters as tensors broadcast to a common batch
//! shape, so a single value can stand for many independent distributions
//! evaluated in parallel. The closed [`Distribution`] enum is what sa-measures
//! dispatch on; [`Family`] is the capability surface every variant supports.
//!
//! | Family | Support | Expectation rule |
//! |--------|---------|------------------|
//! | [`Bernoulli`] | {0, 1} | closed form |
//! | [`Normal`] | ℝ | Gauss-Hermite quadrature |
//! | [`Uniform`] | [low, high) | none (sampling only) |

mod bernoulli;
mod normal;
mod uniform;

pub use bernoulli::Bernoulli;
pub use normal::Normal;
pub use uniform::Uniform;

use ib_common::{Error, Result};
use rand::Rng;

use crate::tensor::{broadcast_shape, broadcast_to, Tensor};

/// Capabilities shared by every distribution family.
pub trait Family {
    /// Lowercase family name, used in error messages.
    fn name(&self) -> &'static str;

    /// Shape of the batch of independent distributions.
    fn batch_shape(&self) -> &[usize];

    fn mean(&self) -> Tensor;

    fn variance(&self) -> Tensor;

    /// Shannon entropy (discrete) or differential entropy (continuous), in nats.
    fn entropy(&self) -> Tensor;

    /// Draw `n` i.i.d. samples. The result has shape `[n, batch_shape...]`.
    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Tensor;
}

/// A distribution from one of the supported families.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Bernoulli(Bernoulli),
    Normal(Normal),
    Uniform(Uniform),
}

impl Distribution {
    /// Stack same-family distributions with equal batch shapes along a new
    /// leading batch axis.
    pub fn stack(items: &[&Distribution]) -> Result<Distribution> {
        let first = items
            .first()
            .ok_or_else(|| Error::InvalidShape("cannot stack zero distributions".to_string()))?;

        match first {
            Distribution::Bernoulli(_) => {
                let parts = collect_family(items, |d| match d {
                    Distribution::Bernoulli(b) => Some(b),
                    _ => None,
                })?;
                Ok(Distribution::Bernoulli(Bernoulli::stack(&parts)?))
            }
            Distribution::Normal(_) => {
                let parts = collect_family(items, |d| match d {
                    Distribution::Normal(n) => Some(n),
                    _ => None,
                })?;
                Ok(Distribution::Normal(Normal::stack(&parts)?))
            }
            Distribution::Uniform(_) => {
                let parts = collect_family(items, |d| match d {
                    Distribution::Uniform(u) => Some(u),
                    _ => None,
                })?;
                Ok(Distribution::Uniform(Uniform::stack(&parts)?))
            }
        }
    }
}

fn collect_family<'a, T, F>(items: &[&'a Distribution], pick: F) -> Result<Vec<&'a T>>
where
    F: Fn(&'a Distribution) -> Option<&'a T>,
{
    let expected = items.first().map(|d| d.name()).unwrap_or("none");
    items
        .iter()
        .map(|&d| {
            pick(d).ok_or_else(|| {
                Error::invalid_parameter(
                    "family",
                    format!("cannot stack {} with {}", d.name(), expected),
                )
            })
        })
        .collect()
}

impl Family for Distribution {
    fn name(&self) -> &'static str {
        match self {
            Distribution::Bernoulli(d) => d.name(),
            Distribution::Normal(d) => d.name(),
            Distribution::Uniform(d) => d.name(),
        }
    }

    fn batch_shape(&self) -> &[usize] {
        match self {
            Distribution::Bernoulli(d) => d.batch_shape(),
            Distribution::Normal(d) => d.batch_shape(),
            Distribution::Uniform(d) => d.batch_shape(),
        }
    }

    fn mean(&self) -> Tensor {
        match self {
            Distribution::Bernoulli(d) => d.mean(),
            Distribution::Normal(d) => d.mean(),
            Distribution::Uniform(d) => d.mean(),
        }
    }

    fn variance(&self) -> Tensor {
        match self {
            Distribution::Bernoulli(d) => d.variance(),
            Distribution::Normal(d) => d.variance(),
            Distribution::Uniform(d) => d.variance(),
        }
    }

    fn entropy(&self) -> Tensor {
        match self {
            Distribution::Bernoulli(d) => d.entropy(),
            Distribution::Normal(d) => d.entropy(),
            Distribution::Uniform(d) => d.entropy(),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Tensor {
        match self {
            Distribution::Bernoulli(d) => d.sample(n, rng),
            Distribution::Normal(d) => d.sample(n, rng),
            Distribution::Uniform(d) => d.sample(n, rng),
        }
    }
}

impl From<Bernoulli> for Distribution {
    fn from(d: Bernoulli) -> Self {
        Distribution::Bernoulli(d)
    }
}

impl From<Normal> for Distribution {
    fn from(d: Normal) -> Self {
        Distribution::Normal(d)
    }
}

impl From<Uniform> for Distribution {
    fn from(d: Uniform) -> Self {
        Distribution::Uniform(d)
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Distribution::Bernoulli(_) => "Bernoulli",
            Distribution::Normal(_) => "Normal",
            Distribution::Uniform(_) => "Uniform",
        };
        write!(f, "{}(batch_shape={:?})", name, self.batch_shape())
    }
}

/// Broadcast two parameter tensors to their common shape.
pub(crate) fn broadcast_pair(
    family: &str,
    a: &Tensor,
    b: &Tensor,
) -> Result<(Tensor, Tensor, Vec<usize>)> {
    let shape = broadcast_shape(a.shape(), b.shape()).ok_or_else(|| {
        Error::invalid_parameter(
            family,
            format!(
                "parameter shapes {:?} and {:?} do not broadcast",
                a.shape(),
                b.shape()
            ),
        )
    })?;
    let a = broadcast_to(family, a, &shape)?;
    let b = broadcast_to(family, b, &shape)?;
    Ok((a, b, shape))
}
