//! Fuzz target for evaluation config parsing and validation.

#![no_main]

use ib_config::{validate_eval_config, EvalConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = EvalConfig::from_toml_str(text) {
            let _ = validate_eval_config(&config);
        }
    }
});
