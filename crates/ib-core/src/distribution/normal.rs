use ib_common::{Error, Result};
use ndarray::{Dimension, IxDyn};
use rand::Rng;

use super::{broadcast_pair, Family};
use crate::tensor::{stack_leading, Tensor};

/// Batched Normal(loc, scale²).
#[derive(Debug, Clone, PartialEq)]
pub struct Normal {
    loc: Tensor,
    scale: Tensor,
    batch_shape: Vec<usize>,
}

impl Normal {
    /// `loc` and `scale` (standard deviation) are broadcast to a common shape.
    /// Every scale must be finite and positive.
    pub fn new(loc: Tensor, scale: Tensor) -> Result<Self> {
        let (loc, scale, batch_shape) = broadcast_pair("normal", &loc, &scale)?;
        if let Some(bad) = scale.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(Error::invalid_parameter(
                "scale",
                format!("normal standard deviation must be positive, got {bad}"),
            ));
        }
        if loc.iter().any(|m| !m.is_finite()) {
            return Err(Error::invalid_parameter("loc", "normal mean must be finite"));
        }
        Ok(Self {
            loc,
            scale,
            batch_shape,
        })
    }

    /// Standard deviations.
    pub fn std(&self) -> &Tensor {
        &self.scale
    }

    pub(crate) fn stack(parts: &[&Normal]) -> Result<Normal> {
        let locs: Vec<&Tensor> = parts.iter().map(|p| &p.loc).collect();
        let scales: Vec<&Tensor> = parts.iter().map(|p| &p.scale).collect();
        let loc = stack_leading("loc", &locs)?;
        let scale = stack_leading("scale", &scales)?;
        let batch_shape = loc.shape().to_vec();
        Ok(Normal {
            loc,
            scale,
            batch_shape,
        })
    }
}

impl Family for Normal {
    fn name(&self) -> &'static str {
        "normal"
    }

    fn batch_shape(&self) -> &[usize] {
        &self.batch_shape
    }

    fn mean(&self) -> Tensor {
        self.loc.clone()
    }

    fn variance(&self) -> Tensor {
        self.scale.mapv(|s| s * s)
    }

    fn entropy(&self) -> Tensor {
        self.scale.mapv(ib_math::normal_entropy)
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Tensor {
        let mut shape = Vec::with_capacity(self.batch_shape.len() + 1);
        shape.push(n);
        shape.extend_from_slice(&self.batch_shape);

        Tensor::from_shape_fn(IxDyn(&shape), |idx| {
            let batch = IxDyn(&idx.slice()[1..]);
            // Box-Muller; 1 - u keeps the log argument in (0, 1].
            let u1: f64 = 1.0 - rng.random::<f64>();
            let u2: f64 = rng.random();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            self.loc[batch.clone()] + self.scale[batch] * z
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::{scalar, vector};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn broadcasts_parameters() {
        let d = Normal::new(vector(vec![0.0, 1.0, 2.0]), scalar(0.5)).unwrap();
        assert_eq!(d.batch_shape(), &[3]);
        assert_eq!(d.variance(), vector(vec![0.25, 0.25, 0.25]));
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(Normal::new(scalar(0.0), scalar(0.0)).is_err());
        assert!(Normal::new(scalar(0.0), scalar(-1.0)).is_err());
        assert!(Normal::new(scalar(f64::NAN), scalar(1.0)).is_err());
        assert!(Normal::new(vector(vec![0.0, 1.0]), vector(vec![1.0, 1.0, 1.0])).is_err());
    }

    #[test]
    fn sample_shape_and_moments() {
        let d = Normal::new(vector(vec![-1.0, 3.0]), vector(vec![0.5, 2.0])).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let samples = d.sample(20_000, &mut rng);
        assert_eq!(samples.shape(), &[20_000, 2]);

        let means = samples.mean_axis(ndarray::Axis(0)).unwrap();
        assert!((means[IxDyn(&[0])] - -1.0).abs() < 0.03);
        assert!((means[IxDyn(&[1])] - 3.0).abs() < 0.1);
    }

    #[test]
    fn entropy_matches_closed_form() {
        let d = Normal::new(scalar(0.0), scalar(1.0)).unwrap();
        let h = d.entropy();
        assert!((h[IxDyn(&[])] - 1.418_938_533_204_672_7).abs() < 1e-12);
    }
}
