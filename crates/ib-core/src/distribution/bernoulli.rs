use ib_common::{Error, Result};
use ndarray::{Dimension, IxDyn};
use rand::Rng;

use super::Family;
use crate::tensor::{stack_leading, Tensor};

/// Batched Bernoulli(p) over {0, 1}.
#[derive(Debug, Clone, PartialEq)]
pub struct Bernoulli {
    probs: Tensor,
    batch_shape: Vec<usize>,
}

impl Bernoulli {
    /// Every success probability must lie in [0, 1].
    pub fn new(probs: Tensor) -> Result<Self> {
        if let Some(bad) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(Error::invalid_parameter(
                "probs",
                format!("bernoulli probability must be in [0, 1], got {bad}"),
            ));
        }
        let batch_shape = probs.shape().to_vec();
        Ok(Self { probs, batch_shape })
    }

    /// Success probabilities P(X = 1).
    pub fn probs(&self) -> &Tensor {
        &self.probs
    }

    pub(crate) fn stack(parts: &[&Bernoulli]) -> Result<Bernoulli> {
        let probs: Vec<&Tensor> = parts.iter().map(|p| &p.probs).collect();
        Bernoulli::new(stack_leading("probs", &probs)?)
    }
}

impl Family for Bernoulli {
    fn name(&self) -> &'static str {
        "bernoulli"
    }

    fn batch_shape(&self) -> &[usize] {
        &self.batch_shape
    }

    fn mean(&self) -> Tensor {
        self.probs.clone()
    }

    fn variance(&self) -> Tensor {
        self.probs.mapv(|p| p * (1.0 - p))
    }

    fn entropy(&self) -> Tensor {
        self.probs.mapv(ib_math::binary_entropy)
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Tensor {
        let mut shape = Vec::with_capacity(self.batch_shape.len() + 1);
        shape.push(n);
        shape.extend_from_slice(&self.batch_shape);

        Tensor::from_shape_fn(IxDyn(&shape), |idx| {
            let p = self.probs[IxDyn(&idx.slice()[1..])];
            if rng.random_bool(p) {
                1.0
            } else {
                0.0
            }
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
    fn rejects_out_of_range() {
        assert!(Bernoulli::new(scalar(1.2)).is_err());
        assert!(Bernoulli::new(vector(vec![0.5, -0.1])).is_err());
        assert!(Bernoulli::new(scalar(f64::NAN)).is_err());
        assert!(Bernoulli::new(vector(vec![0.0, 1.0])).is_ok());
    }

    #[test]
    fn moments() {
        let d = Bernoulli::new(vector(vec![0.2, 0.5])).unwrap();
        assert_eq!(d.mean(), vector(vec![0.2, 0.5]));
        let var = d.variance();
        assert!((var[IxDyn(&[0])] - 0.16).abs() < 1e-15);
        assert!((var[IxDyn(&[1])] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn degenerate_samples() {
        let d = Bernoulli::new(vector(vec![0.0, 1.0])).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let samples = d.sample(100, &mut rng);
        assert_eq!(samples.shape(), &[100, 2]);
        assert!(samples.index_axis(ndarray::Axis(1), 0).iter().all(|&x| x == 0.0));
        assert!(samples.index_axis(ndarray::Axis(1), 1).iter().all(|&x| x == 1.0));
    }

    #[test]
    fn entropy_peaks_at_half() {
        let d = Bernoulli::new(vector(vec![0.5, 0.1, 0.0])).unwrap();
        let h = d.entropy();
        assert!((h[IxDyn(&[0])] - 2.0f64.ln()).abs() < 1e-12);
        assert!(h[IxDyn(&[1])] < h[IxDyn(&[0])]);
        assert_eq!(h[IxDyn(&[2])], 0.0);
    }
}
