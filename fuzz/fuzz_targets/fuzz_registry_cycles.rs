//! Fuzz target for registry cycles.
//!
//! Drives a small registry with arbitrary lines, idle cycles and clock
//! steps (including backwards) and checks the registry invariants.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{Duration, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use tw_core::registry::TagRegistry;

#[derive(Debug, Arbitrary)]
enum Step {
    Reading { tag: u8, rssi: i16 },
    Raw(Vec<u8>),
    Idle,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    seed: u64,
    steps: Vec<(Step, i32)>,
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity % 16) + 1;
    let mut registry = TagRegistry::with_seed(capacity, input.seed);
    let mut now = Utc.timestamp_opt(1_772_366_400, 0).unwrap();

    for (step, millis) in input.steps.iter().take(256) {
        now += Duration::milliseconds(i64::from(*millis));
        let line = match step {
            Step::Reading { tag, rssi } => Some(format!("TAG,{rssi},915,0,T{tag}").into_bytes()),
            Step::Raw(bytes) => Some(bytes.clone()),
            Step::Idle => None,
        };
        let result = registry.advance(line.as_deref(), now);

        assert!(registry.len() <= capacity);
        let mut previous = None;
        for snap in &result.snapshot {
            assert!((0.0..=1.0).contains(&snap.visibility_probability));
            assert!(snap.interval_variance >= 0.0);
            if let Some(prev) = previous {
                assert!(snap.sequence_id > prev);
            }
            previous = Some(snap.sequence_id);
        }
    }
});
