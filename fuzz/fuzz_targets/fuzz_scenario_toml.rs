//! Fuzz target for TOML scenario files.

#![no_main]

use ib_core::Scenario;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(scenario) = Scenario::from_toml_str(text) {
            let _ = scenario.polytope().map(|p| p.entropy());
        }
    }
});
