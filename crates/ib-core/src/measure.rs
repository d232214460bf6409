//! Signed-affine measures: a probability distribution plus an optional
//! pointwise scale (λ) and offset (b).
//!
//! The expectation of `f` under an sa-measure is `λ·E_μ[f] + b`, applied
//! per batch element. Absent λ or b means the transform is skipped, which is
//! not the same as a zero tensor: scaling a measure with no bias leaves it
//! without a bias.

use std::fmt;
use std::ops::{Add, Mul};
use std::sync::Arc;

use ib_common::{Error, Result};
use ib_math::DEFAULT_NODES;
use tracing::trace;

use crate::distribution::{Distribution, Family};
use crate::integration::{bernoulli_expectation, gauss_hermite_quadrature};
use crate::tensor::{broadcast_to, scalar, stack_leading, Tensor};

/// A right-hand side for [`SaMeasure::add`].
#[derive(Debug, Clone)]
pub enum Operand {
    Scalar(f64),
    Tensor(Tensor),
    Measure(SaMeasure),
    Distribution(Distribution),
}

impl Operand {
    fn kind(&self) -> String {
        match self {
            Operand::Scalar(_) => "scalar".to_string(),
            Operand::Tensor(_) => "tensor".to_string(),
            Operand::Measure(_) => "sa-measure".to_string(),
            Operand::Distribution(d) => format!("{} distribution", d.name()),
        }
    }
}

impl From<f64> for Operand {
    fn from(x: f64) -> Self {
        Operand::Scalar(x)
    }
}

impl From<Tensor> for Operand {
    fn from(t: Tensor) -> Self {
        Operand::Tensor(t)
    }
}

impl From<SaMeasure> for Operand {
    fn from(m: SaMeasure) -> Self {
        Operand::Measure(m)
    }
}

impl From<Distribution> for Operand {
    fn from(d: Distribution) -> Self {
        Operand::Distribution(d)
    }
}

/// An sa-measure `(μ, λ, b)`.
///
/// Scale and bias, when present, are stored broadcast to `μ`'s batch shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SaMeasure {
    mu: Arc<Distribution>,
    scale: Option<Tensor>,
    bias: Option<Tensor>,
}

impl SaMeasure {
    /// A plain probability measure: no scale, no bias.
    pub fn new(mu: impl Into<Distribution>) -> Self {
        Self::from_shared(Arc::new(mu.into()))
    }

    /// Wrap an already shared distribution.
    pub fn from_shared(mu: Arc<Distribution>) -> Self {
        Self {
            mu,
            scale: None,
            bias: None,
        }
    }

    /// Set λ. Fails with `InvalidShape` if it does not broadcast to the batch shape.
    pub fn with_scale(mut self, scale: Tensor) -> Result<Self> {
        self.scale = Some(broadcast_to("scale", &scale, self.mu.batch_shape())?);
        Ok(self)
    }

    /// Set b. Fails with `InvalidShape` if it does not broadcast to the batch shape.
    pub fn with_bias(mut self, bias: Tensor) -> Result<Self> {
        self.bias = Some(broadcast_to("bias", &bias, self.mu.batch_shape())?);
        Ok(self)
    }

    pub fn mu(&self) -> &Distribution {
        &self.mu
    }

    /// The shared handle to the base distribution.
    pub fn mu_shared(&self) -> &Arc<Distribution> {
        &self.mu
    }

    pub fn scale(&self) -> Option<&Tensor> {
        self.scale.as_ref()
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// λ, the conventional name for [`SaMeasure::scale`].
    pub fn lambda(&self) -> Option<&Tensor> {
        self.scale()
    }

    /// b, the conventional name for [`SaMeasure::bias`].
    pub fn b(&self) -> Option<&Tensor> {
        self.bias()
    }

    pub fn batch_shape(&self) -> &[usize] {
        self.mu.batch_shape()
    }

    /// Expected value of `f` using the default quadrature node count.
    pub fn evaluate<F>(&self, f: F) -> Result<Tensor>
    where
        F: Fn(&Tensor) -> Tensor,
    {
        self.evaluate_with_nodes(f, DEFAULT_NODES)
    }

    /// Expected value of `f`, using `n` Gauss-Hermite nodes for Normal laws.
    ///
    /// Bernoulli is exact and ignores `n`. Other families fail with
    /// `UnsupportedDistribution`.
    pub fn evaluate_with_nodes<F>(&self, f: F, n: usize) -> Result<Tensor>
    where
        F: Fn(&Tensor) -> Tensor,
    {
        trace!(family = self.mu.name(), nodes = n, "evaluating sa-measure");
        let mut e = match self.mu.as_ref() {
            Distribution::Bernoulli(d) => bernoulli_expectation(d, f)?,
            Distribution::Normal(d) => gauss_hermite_quadrature(d, f, n)?,
            other => {
                return Err(Error::UnsupportedDistribution {
                    family: other.name().to_string(),
                })
            }
        };
        if let Some(scale) = &self.scale {
            e *= scale;
        }
        if let Some(bias) = &self.bias {
            e += bias;
        }
        Ok(e)
    }

    /// Entropy of μ. λ and b do not enter.
    pub fn entropy(&self) -> Tensor {
        self.mu.entropy()
    }

    /// Add a scalar or tensor to the bias.
    ///
    /// Adding another sa-measure is `NotImplemented`; any other operand is a
    /// `TypeMismatch`.
    pub fn add(&self, other: impl Into<Operand>) -> Result<SaMeasure> {
        match other.into() {
            Operand::Scalar(x) => self.with_bias_added(&scalar(x)),
            Operand::Tensor(t) => self.with_bias_added(&t),
            Operand::Measure(m) => self.combined_with(&m),
            other => Err(Error::TypeMismatch { found: other.kind() }),
        }
    }

    /// A copy whose bias is `bias + offset`, or `offset` if there was none.
    pub fn with_bias_added(&self, offset: &Tensor) -> Result<SaMeasure> {
        let offset = broadcast_to("bias", offset, self.batch_shape())?;
        let bias = match &self.bias {
            Some(b) => b + &offset,
            None => offset,
        };
        Ok(SaMeasure {
            mu: Arc::clone(&self.mu),
            scale: self.scale.clone(),
            bias: Some(bias),
        })
    }

    /// Sum of two sa-measures. Not supported.
    pub fn combined_with(&self, _other: &SaMeasure) -> Result<SaMeasure> {
        Err(Error::NotImplemented(
            "addition of two sa-measures".to_string(),
        ))
    }

    /// Multiply λ and b by `factor`. Absent fields stay absent.
    pub fn scaled(&self, factor: f64) -> SaMeasure {
        SaMeasure {
            mu: Arc::clone(&self.mu),
            scale: self.scale.as_ref().map(|s| s * factor),
            bias: self.bias.as_ref().map(|b| b * factor),
        }
    }

    /// Stack measures with equal batch shapes along a new leading axis.
    ///
    /// If any member has a scale (bias), members without one get ones (zeros),
    /// which leaves their expectations unchanged.
    ///
    /// The filled values are concrete afterwards. A stacked measure is one
    /// measure with a single scale, so [`SaMeasure::scaled`] multiplies the
    /// filled ones too: scaling after stacking equals scaling each member
    /// only when every member had a scale, or when none did. Scale members
    /// before stacking to keep the per-point "no scale" behaviour.
    pub fn stack(members: &[SaMeasure]) -> Result<SaMeasure> {
        let dists: Vec<&Distribution> = members.iter().map(|m| m.mu.as_ref()).collect();
        let mu = Distribution::stack(&dists)?;

        let scale = stack_optional("scale", members, |m| m.scale.as_ref(), 1.0)?;
        let bias = stack_optional("bias", members, |m| m.bias.as_ref(), 0.0)?;
        Ok(SaMeasure {
            mu: Arc::new(mu),
            scale,
            bias,
        })
    }
}

fn stack_optional<F>(name: &str, members: &[SaMeasure], field: F, fill: f64) -> Result<Option<Tensor>>
where
    F: Fn(&SaMeasure) -> Option<&Tensor>,
{
    if members.iter().all(|m| field(m).is_none()) {
        return Ok(None);
    }
    let filled: Vec<Tensor> = members
        .iter()
        .map(|m| match field(m) {
            Some(t) => t.clone(),
            None => Tensor::from_elem(m.batch_shape(), fill),
        })
        .collect();
    let refs: Vec<&Tensor> = filled.iter().collect();
    stack_leading(name, &refs).map(Some)
}

impl From<Distribution> for SaMeasure {
    fn from(mu: Distribution) -> Self {
        SaMeasure::new(mu)
    }
}

impl Add<f64> for &SaMeasure {
    type Output = SaMeasure;

    fn add(self, rhs: f64) -> SaMeasure {
        let bias = match &self.bias {
            Some(b) => b + rhs,
            None => Tensor::from_elem(self.batch_shape(), rhs),
        };
        SaMeasure {
            mu: Arc::clone(&self.mu),
            scale: self.scale.clone(),
            bias: Some(bias),
        }
    }
}

impl Mul<f64> for &SaMeasure {
    type Output = SaMeasure;

    fn mul(self, rhs: f64) -> SaMeasure {
        self.scaled(rhs)
    }
}

impl fmt::Display for SaMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |t: &Option<Tensor>| match t {
            Some(t) => format!("{:?}", t.shape()),
            None => "None".to_string(),
        };
        write!(
            f,
            "SaMeasure(mu={}, scale={}, bias={})",
            self.mu,
            part(&self.scale),
            part(&self.bias)
        )
    }
}
