//! Fuzz target for reader line decoding.
//!
//! Tests that `decode` handles arbitrary bytes without panicking and that
//! every accepted line carries the identifier after the fourth comma.

#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use tw_core::collect::decode;

fuzz_target!(|data: &[u8]| {
    let at = Utc.timestamp_opt(1_772_366_400, 0).unwrap();
    if let Ok(event) = decode(data, at) {
        let line = std::str::from_utf8(data).unwrap().trim();
        let tail = line.splitn(5, ',').nth(4).unwrap();
        assert_eq!(event.tag_id.as_str(), tail);
        assert_eq!(event.observed_at, at);
    }
});
