//! Fuzz target for JSON scenario files.
//!
//! Parsing, building and evaluating a scenario must return errors, never panic.

#![no_main]

use ib_core::Scenario;
use libfuzzer_sys::fuzz_target;

/// Keeps rule construction cheap on hostile node counts.
const MAX_NODES: usize = 64;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(scenario) = Scenario::from_json_str(text) else {
        return;
    };
    let Ok(polytope) = scenario.polytope() else {
        return;
    };
    let nodes = scenario.nodes.unwrap_or(8).min(MAX_NODES);
    let _ = polytope.entropy();
    for integrand in &scenario.integrands {
        let _ = polytope.evaluate_with_nodes(|x| integrand.apply(x), nodes);
    }
});
