//! Worked examples for the ingest/estimate cycle.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tw_core::collect::ScriptedLineSource;
use tw_core::config::EstimatorParams;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tw_core::registry::{IngestOutcome, TagRegistry, VisibilityStatus};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn two_reads_a_tenth_apart() {
    let mut registry = TagRegistry::with_seed(10, 1);
    registry.advance(Some(b"TAG,-40,915,1234567,ABC123\n"), t0());
    let result = registry.advance(
        Some(b"TAG,-42,915,1234568,ABC123\n"),
        t0() + Duration::milliseconds(100),
    );

    let tag = registry.get("ABC123").unwrap();
    assert_eq!(tag.stats.read_count, 1);
    assert!((tag.stats.average_interval - 0.1).abs() < 1e-9);
    assert_eq!(tag.stats.interval_variance, 0.0);
    assert_eq!(tag.signal_strength, -42);
    assert_eq!(result.snapshot.len(), 1);
}

#[test]
fn fresh_tag_has_no_interval() {
    let mut registry = TagRegistry::with_seed(10, 1);
    let result = registry.advance(Some(b"TAG,-40,915,1234567,ABC123"), t0());
    let snap = &result.snapshot[0];
    assert_eq!(snap.read_count, 0);
    assert_eq!(snap.interval_variance, 0.0);
    assert_eq!(snap.average_interval, 0.0);
}

#[test]
fn garbage_line_is_ignored() {
    let mut registry = TagRegistry::with_seed(10, 1);
    let result = registry.advance(Some(b"GARBAGE,1,2,3"), t0());
    assert!(matches!(result.outcome, IngestOutcome::Malformed(_)));
    assert!(registry.is_empty());
    assert!(result.snapshot.is_empty());
}

#[test]
fn window_keeps_the_last_hundred_intervals() {
    let mut registry = TagRegistry::with_seed(10, 1);
    let mut now = t0();
    registry.advance(Some(b"TAG,-40,915,0,ABC123"), now);

    // 101 intervals of 10ms, 11ms, ... so every interval is distinct.
    let mut total = 0.0;
    for i in 0..101i64 {
        let step = Duration::milliseconds(10 + i);
        now += step;
        total += (10 + i) as f64 / 1000.0;
        registry.advance(Some(b"TAG,-40,915,0,ABC123"), now);
    }

    let tag = registry.get("ABC123").unwrap();
    let window = tag.stats.window();
    assert_eq!(window.len(), 100);
    assert!((window.oldest().unwrap() - 0.011).abs() < 1e-9);
    assert!((window.latest().unwrap() - 0.110).abs() < 1e-9);
    assert_eq!(tag.stats.read_count, 101);
    assert!((tag.stats.cumulative_interval_time - total).abs() < 1e-9);
    assert!((tag.stats.average_interval - total / 101.0).abs() < 1e-9);
}

#[test]
fn identifier_with_commas_is_one_tag() {
    let mut registry = TagRegistry::with_seed(10, 1);
    registry.advance(Some(b"TAG,-40,915,0,E200,3412"), t0());
    assert!(registry.contains("E200,3412"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn scripted_session_with_timeouts() {
    let mut source = ScriptedLineSource::new();
    source
        .push_line("TAG,-40,915,0,A")
        .push_timeout()
        .push_line("not a reading")
        .push_line("TAG,-41,915,0,A")
        .push_line("TAG,-60,902,0,B");

    let mut registry = TagRegistry::with_rng(
        1,
        EstimatorParams::default(),
        rand::SeedableRng::seed_from_u64(3),
    );

    let mut outcomes = Vec::new();
    let mut now = t0();
    while let Ok(result) = registry.ingest_and_advance(&mut source, now) {
        outcomes.push(result.outcome);
        now += Duration::milliseconds(100);
    }

    assert!(matches!(outcomes[0], IngestOutcome::Admitted { .. }));
    assert_eq!(outcomes[1], IngestOutcome::NoReading);
    assert!(matches!(outcomes[2], IngestOutcome::Malformed(_)));
    assert!(matches!(outcomes[3], IngestOutcome::Updated { .. }));
    assert!(matches!(outcomes[4], IngestOutcome::Dropped { .. }));

    let counters = registry.counters();
    assert_eq!(counters.cycles, 5);
    assert_eq!(counters.admitted, 1);
    assert_eq!(counters.updated, 1);
    assert_eq!(counters.dropped, 1);
    assert_eq!(counters.malformed, 1);
    assert_eq!(counters.idle, 1);

    let a = registry.get("A").unwrap();
    assert_eq!(a.stats.read_count, 1);
    assert!((a.stats.average_interval - 0.3).abs() < 1e-9);
}

#[test]
fn steady_reads_look_visible_and_silence_drifts_back() {
    let mut registry = TagRegistry::with_seed(10, 7);
    let mut now = t0();
    for _ in 0..30 {
        registry.advance(Some(b"TAG,-40,915,0,ABC123"), now);
        now += Duration::milliseconds(95);
    }
    let visible = registry.get("ABC123").unwrap().visibility_probability;
    assert!(visible > 0.8, "p = {visible}");

    let result = registry.advance(None, now + Duration::seconds(60));
    let drifted = result.snapshot[0].visibility_probability;
    assert!((drifted - 0.5).abs() < 0.005, "p = {drifted}");
}

#[test]
fn tag_read_again_after_long_cover_is_visible() {
    let params = EstimatorParams::default().with_num_samples(400);
    let mut registry = TagRegistry::with_rng(4, params, StdRng::seed_from_u64(17));
    registry.advance(Some(b"TAG,-40,915,0,ABC123"), t0());

    // Covered for 200 s, then read again: the window now holds the 200 s gap,
    // where both densities vanish and a draw keeps the prior.
    let back = t0() + Duration::seconds(200);
    registry.advance(Some(b"TAG,-40,915,1,ABC123"), back);
    let result = registry.advance(None, back + Duration::milliseconds(10));

    let snap = &result.snapshot[0];
    assert_eq!(registry.get("ABC123").unwrap().stats.window().to_vec(), vec![200.0]);
    assert!(snap.visibility_probability > 0.8, "p = {}", snap.visibility_probability);
    assert_eq!(snap.status(), VisibilityStatus::Visible);
}
