//! Shape helpers over `ndarray` dynamic-rank tensors.
//!
//! Broadcasting follows the usual trailing-axis rule: two shapes are
//! compatible when, aligned from the right, every pair of extents is equal or
//! one of them is 1.

use ib_common::{Error, Result};
use ndarray::{arr0, Array1, ArrayD, ArrayViewD, Axis};

/// Tensor type used throughout the engine.
pub type Tensor = ArrayD<f64>;

/// A rank-0 tensor.
pub fn scalar(x: f64) -> Tensor {
    arr0(x).into_dyn()
}

/// A rank-1 tensor.
pub fn vector(values: Vec<f64>) -> Tensor {
    Array1::from(values).into_dyn()
}

/// The broadcast shape of `a` and `b`, or None if incompatible.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let rank = a.len().max(b.len());
    let mut out = vec![0; rank];
    for i in 0..rank {
        let da = if i < rank - a.len() { 1 } else { a[i - (rank - a.len())] };
        let db = if i < rank - b.len() { 1 } else { b[i - (rank - b.len())] };
        out[i] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => return None,
        };
    }
    Some(out)
}

/// Materialize `t` at `shape`, failing with `InvalidShape` if it does not broadcast.
pub fn broadcast_to(name: &str, t: &Tensor, shape: &[usize]) -> Result<Tensor> {
    t.broadcast(shape).map(|view| view.to_owned()).ok_or_else(|| {
        Error::InvalidShape(format!(
            "{name} with shape {:?} does not broadcast to batch shape {:?}",
            t.shape(),
            shape
        ))
    })
}

/// Check that an integrand preserved the shape of its input.
pub fn ensure_shape(values: &Tensor, expected: &[usize]) -> Result<()> {
    if values.shape() != expected {
        return Err(Error::ShapeMismatch {
            expected: expected.to_vec(),
            actual: values.shape().to_vec(),
        });
    }
    Ok(())
}

/// Stack equally-shaped tensors along a new leading axis.
pub fn stack_leading(name: &str, tensors: &[&Tensor]) -> Result<Tensor> {
    let first = tensors
        .first()
        .ok_or_else(|| Error::InvalidShape(format!("cannot stack zero {name} tensors")))?;
    if let Some(other) = tensors.iter().find(|t| t.shape() != first.shape()) {
        return Err(Error::ShapeMismatch {
            expected: first.shape().to_vec(),
            actual: other.shape().to_vec(),
        });
    }
    let views: Vec<ArrayViewD<'_, f64>> = tensors.iter().map(|t| t.view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|e| Error::InvalidShape(format!("{name}: {e}")))
}

/// Minimum along `axis`. NaN anywhere in a lane makes that lane NaN.
pub fn min_along(t: &Tensor, axis: usize) -> Tensor {
    t.map_axis(Axis(axis), |lane| {
        lane.iter().fold(f64::INFINITY, |acc, &x| {
            if acc.is_nan() || x.is_nan() {
                f64::NAN
            } else {
                acc.min(x)
            }
        })
    })
}

/// Maximum along `axis`. NaN anywhere in a lane makes that lane NaN.
pub fn max_along(t: &Tensor, axis: usize) -> Tensor {
    t.map_axis(Axis(axis), |lane| {
        lane.iter().fold(f64::NEG_INFINITY, |acc, &x| {
            if acc.is_nan() || x.is_nan() {
                f64::NAN
            } else {
                acc.max(x)
            }
        })
    })
}

/// Index of the minimum along `axis`; the first NaN wins, ties go to the lowest index.
pub fn argmin_along(t: &Tensor, axis: usize) -> ArrayD<usize> {
    t.map_axis(Axis(axis), |lane| {
        let mut best = 0;
        for (i, &x) in lane.iter().enumerate() {
            if x.is_nan() {
                return i;
            }
            if x < lane[best] {
                best = i;
            }
        }
        best
    })
}
