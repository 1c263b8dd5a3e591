//! Fuzz target for config.json parsing and validation.
//!
//! Tests that parsing and semantic validation handle arbitrary input
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tw_core::config::{validate_config, Config};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<Config>(data) {
        let _ = validate_config(&config);
    }
});
