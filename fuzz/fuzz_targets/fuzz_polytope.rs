//! Fuzz target for structured measure construction.
//!
//! Arbitrary parameters (NaN, infinities, out-of-range probabilities) must be
//! rejected or evaluated without panicking.

#![no_main]

use arbitrary::Arbitrary;
use ib_core::tensor::{scalar, vector};
use ib_core::{Bernoulli, InfraPolytope, Normal, SaMeasure};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    bernoulli: bool,
    params: Vec<(f64, f64)>,
    scale: Option<f64>,
    bias: Option<f64>,
    nodes: u8,
}

fuzz_target!(|input: Input| {
    let (a, b): (Vec<f64>, Vec<f64>) = input.params.into_iter().take(32).unzip();
    let measure = if input.bernoulli {
        Bernoulli::new(vector(a)).map(SaMeasure::new)
    } else {
        Normal::new(vector(a), vector(b)).map(SaMeasure::new)
    };
    let Ok(mut measure) = measure else {
        return;
    };
    if let Some(s) = input.scale {
        measure = match measure.with_scale(scalar(s)) {
            Ok(m) => m,
            Err(_) => return,
        };
    }
    if let Some(b) = input.bias {
        measure = match measure.add(b) {
            Ok(m) => m,
            Err(_) => return,
        };
    }
    if let Ok(polytope) = InfraPolytope::new(measure) {
        let _ = polytope.evaluate_with_nodes(|x| x.mapv(f64::tanh), input.nodes as usize);
        let _ = polytope.minimizing_points(|x| x.clone());
    }
});
