use ib_common::{Error, Result};
use ndarray::{Dimension, IxDyn, Zip};
use rand::Rng;

use super::{broadcast_pair, Family};
use crate::tensor::{stack_leading, Tensor};

/// Batched continuous Uniform[low, high).
///
/// Supports sampling, moments and entropy. There is no expectation rule for
/// it inside an sa-measure.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    low: Tensor,
    high: Tensor,
    batch_shape: Vec<usize>,
}

impl Uniform {
    /// Requires finite `low < high` elementwise after broadcasting.
    pub fn new(low: Tensor, high: Tensor) -> Result<Self> {
        let (low, high, batch_shape) = broadcast_pair("uniform", &low, &high)?;
        let mut valid = true;
        Zip::from(&low).and(&high).for_each(|&l, &h| {
            valid &= l.is_finite() && h.is_finite() && l < h;
        });
        if !valid {
            return Err(Error::invalid_parameter(
                "uniform",
                "bounds must be finite with low < high",
            ));
        }
        Ok(Self {
            low,
            high,
            batch_shape,
        })
    }

    pub(crate) fn stack(parts: &[&Uniform]) -> Result<Uniform> {
        let lows: Vec<&Tensor> = parts.iter().map(|p| &p.low).collect();
        let highs: Vec<&Tensor> = parts.iter().map(|p| &p.high).collect();
        let low = stack_leading("low", &lows)?;
        let high = stack_leading("high", &highs)?;
        let batch_shape = low.shape().to_vec();
        Ok(Uniform {
            low,
            high,
            batch_shape,
        })
    }
}

impl Family for Uniform {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn batch_shape(&self) -> &[usize] {
        &self.batch_shape
    }

    fn mean(&self) -> Tensor {
        (&self.low + &self.high) * 0.5
    }

    fn variance(&self) -> Tensor {
        (&self.high - &self.low).mapv(|w| w * w / 12.0)
    }

    fn entropy(&self) -> Tensor {
        Zip::from(&self.low)
            .and(&self.high)
            .map_collect(|&l, &h| ib_math::uniform_entropy(l, h))
    }

    fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Tensor {
        let mut shape = Vec::with_capacity(self.batch_shape.len() + 1);
        shape.push(n);
        shape.extend_from_slice(&self.batch_shape);

        Tensor::from_shape_fn(IxDyn(&shape), |idx| {
            let batch = IxDyn(&idx.slice()[1..]);
            let low = self.low[batch.clone()];
            let u: f64 = rng.random();
            low + u * (self.high[batch] - low)
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
    fn rejects_empty_interval() {
        assert!(Uniform::new(scalar(1.0), scalar(1.0)).is_err());
        assert!(Uniform::new(scalar(2.0), scalar(1.0)).is_err());
        assert!(Uniform::new(scalar(0.0), scalar(f64::INFINITY)).is_err());
    }

    #[test]
    fn moments_and_entropy() {
        let d = Uniform::new(vector(vec![0.0, -1.0]), scalar(1.0)).unwrap();
        assert_eq!(d.batch_shape(), &[2]);
        assert_eq!(d.mean(), vector(vec![0.5, 0.0]));
        let var = d.variance();
        assert!((var[IxDyn(&[0])] - 1.0 / 12.0).abs() < 1e-15);
        let h = d.entropy();
        assert!((h[IxDyn(&[1])] - 2.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn samples_stay_in_bounds() {
        let d = Uniform::new(scalar(-2.0), scalar(3.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let samples = d.sample(1000, &mut rng);
        assert_eq!(samples.shape(), &[1000]);
        assert!(samples.iter().all(|&x| (-2.0..3.0).contains(&x)));
    }
}
