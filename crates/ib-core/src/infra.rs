//! Infradistributions represented by their minimal points.
//!
//! An infradistribution is a convex set of sa-measures. Expectation is linear,
//! so the infimum over the set is attained at a minimal point; a polytope with
//! finitely many minimal points is fully described by a batch of sa-measures
//! laid out along one reduction axis.

use std::fmt;

use ib_common::{Error, Result};
use ib_math::DEFAULT_NODES;
use ndarray::ArrayD;
use tracing::debug;

use crate::distribution::Distribution;
use crate::measure::SaMeasure;
use crate::tensor::{argmin_along, max_along, min_along, Tensor};

/// A gadget for taking worst-case expected values.
pub trait InfraDistribution {
    /// Infimum of `E[f]` over the sa-measures in the set.
    fn expectation(&self, f: &dyn Fn(&Tensor) -> Tensor) -> Result<Tensor>;

    /// Maximum entropy over the set.
    fn entropy(&self) -> Tensor;
}

/// An infradistribution with finitely many minimal points.
#[derive(Debug, Clone, PartialEq)]
pub struct InfraPolytope {
    measure: SaMeasure,
    axis: usize,
}

impl InfraPolytope {
    /// Minimal points laid out along batch axis 0.
    pub fn new(measure: impl Into<SaMeasure>) -> Result<Self> {
        Self::with_axis(measure, 0)
    }

    /// Minimal points laid out along batch axis `axis`.
    ///
    /// Fails with `InvalidShape` unless the batch has more than `axis` axes
    /// and the reduction axis is non-empty.
    pub fn with_axis(measure: impl Into<SaMeasure>, axis: usize) -> Result<Self> {
        let measure = measure.into();
        let shape = measure.batch_shape();
        if shape.len() <= axis {
            return Err(Error::InvalidShape(format!(
                "expected an sa-measure with at least {} batch dimension(s); got {}",
                axis + 1,
                shape.len()
            )));
        }
        if shape[axis] == 0 {
            return Err(Error::InvalidShape(format!(
                "reduction axis {axis} has no minimal points"
            )));
        }
        Ok(Self { measure, axis })
    }

    /// Stack sa-measures with equal batch shapes into a polytope along a new axis 0.
    ///
    /// Missing scales and biases are filled as in [`SaMeasure::stack`].
    pub fn from_points(points: &[SaMeasure]) -> Result<Self> {
        Self::new(SaMeasure::stack(points)?)
    }

    /// Worst-case expectation using the default quadrature node count.
    pub fn evaluate<F>(&self, f: F) -> Result<Tensor>
    where
        F: Fn(&Tensor) -> Tensor,
    {
        self.evaluate_with_nodes(f, DEFAULT_NODES)
    }

    /// Worst-case expectation with `n` quadrature nodes.
    ///
    /// The result has the batch shape with the reduction axis removed. A NaN
    /// expectation at any minimal point makes its slot NaN.
    pub fn evaluate_with_nodes<F>(&self, f: F, n: usize) -> Result<Tensor>
    where
        F: Fn(&Tensor) -> Tensor,
    {
        let per_point = self.measure.evaluate_with_nodes(f, n)?;
        debug!(points = self.num_points(), axis = self.axis, "polytope infimum");
        Ok(min_along(&per_point, self.axis))
    }

    /// Index of the minimal point attaining the infimum of `E[f]`.
    pub fn minimizing_points<F>(&self, f: F) -> Result<ArrayD<usize>>
    where
        F: Fn(&Tensor) -> Tensor,
    {
        self.minimizing_points_with_nodes(f, DEFAULT_NODES)
    }

    /// As [`InfraPolytope::minimizing_points`] with `n` quadrature nodes.
    pub fn minimizing_points_with_nodes<F>(&self, f: F, n: usize) -> Result<ArrayD<usize>>
    where
        F: Fn(&Tensor) -> Tensor,
    {
        let per_point = self.measure.evaluate_with_nodes(f, n)?;
        Ok(argmin_along(&per_point, self.axis))
    }

    pub fn entropy(&self) -> Tensor {
        max_along(&self.measure.entropy(), self.axis)
    }

    /// Number of minimal points along the reduction axis.
    pub fn num_points(&self) -> usize {
        self.measure.batch_shape()[self.axis]
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn measure(&self) -> &SaMeasure {
        &self.measure
    }
}

impl TryFrom<Distribution> for InfraPolytope {
    type Error = Error;

    fn try_from(mu: Distribution) -> Result<Self> {
        InfraPolytope::new(mu)
    }
}

impl InfraDistribution for InfraPolytope {
    fn expectation(&self, f: &dyn Fn(&Tensor) -> Tensor) -> Result<Tensor> {
        self.evaluate(f)
    }

    fn entropy(&self) -> Tensor {
        InfraPolytope::entropy(self)
    }
}

impl fmt::Display for InfraPolytope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfraPolytope({})", self.measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{Bernoulli, Normal};
    use crate::tensor::{scalar, vector};
    use ndarray::{array, IxDyn};

    #[test]
    fn rejects_missing_batch_axis() {
        let d = Distribution::from(Normal::new(scalar(0.0), scalar(1.0)).unwrap());
        assert!(matches!(InfraPolytope::new(d), Err(Error::InvalidShape(_))));

        let v = Distribution::from(Normal::new(vector(vec![0.0, 1.0]), scalar(1.0)).unwrap());
        assert!(InfraPolytope::with_axis(v.clone(), 1).is_err());
        assert!(InfraPolytope::with_axis(v, 0).is_ok());
    }

    #[test]
    fn rejects_empty_point_set() {
        let d = Distribution::from(Bernoulli::new(vector(vec![])).unwrap());
        assert!(matches!(InfraPolytope::new(d), Err(Error::InvalidShape(_))));
    }

    #[test]
    fn infimum_over_points() {
        let d = Distribution::from(Bernoulli::new(vector(vec![0.2, 0.9, 0.5])).unwrap());
        let p = InfraPolytope::new(d).unwrap();
        let e = p.evaluate(|x| x.clone()).unwrap();
        assert_eq!(e.ndim(), 0);
        assert!((e[IxDyn(&[])] - 0.2).abs() < 1e-15);
        assert_eq!(p.minimizing_points(|x| x.clone()).unwrap()[IxDyn(&[])], 0);
        assert_eq!(p.minimizing_points(|x| -x).unwrap()[IxDyn(&[])], 1);
    }

    #[test]
    fn reduces_along_chosen_axis() {
        let probs = array![[0.1, 0.7], [0.4, 0.3]].into_dyn();
        let d = Distribution::from(Bernoulli::new(probs).unwrap());
        let along_1 = InfraPolytope::with_axis(d, 1).unwrap();
        assert_eq!(along_1.num_points(), 2);
        let e = along_1.evaluate(|x| x.clone()).unwrap();
        assert_eq!(e, vector(vec![0.1, 0.3]));
    }

    #[test]
    fn entropy_is_max_over_points() {
        let d = Distribution::from(Bernoulli::new(vector(vec![0.1, 0.5, 0.0])).unwrap());
        let p = InfraPolytope::new(d).unwrap();
        let h = p.entropy();
        assert!((h[IxDyn(&[])] - 2.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn trait_object_expectation() {
        let d = Distribution::from(Normal::new(vector(vec![1.0, -2.0]), scalar(0.5)).unwrap());
        let p: Box<dyn InfraDistribution> = Box::new(InfraPolytope::try_from(d).unwrap());
        let e = p.expectation(&|x: &Tensor| x.clone()).unwrap();
        assert!((e[IxDyn(&[])] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn from_points_stacks_measures() {
        let a = SaMeasure::new(Normal::new(scalar(0.0), scalar(1.0)).unwrap());
        let b = SaMeasure::new(Normal::new(scalar(0.0), scalar(2.0)).unwrap())
            .add(-0.5)
            .unwrap();
        let p = InfraPolytope::from_points(&[a, b]).unwrap();
        assert_eq!(p.num_points(), 2);
        let e = p.evaluate(|x| x.mapv(|v| v * v)).unwrap();
        assert!((e[IxDyn(&[])] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn display_wraps_measure() {
        let d = Distribution::from(Bernoulli::new(vector(vec![0.5])).unwrap());
        let p = InfraPolytope::new(d).unwrap();
        assert_eq!(
            p.to_string(),
            "InfraPolytope(SaMeasure(mu=Bernoulli(batch_shape=[1]), scale=None, bias=None))"
        );
    }
}
