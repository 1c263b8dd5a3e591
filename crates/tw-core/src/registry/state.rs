//! Per-tag state owned by the registry.

use chrono::{DateTime, Utc};
use tw_common::{SequenceId, TagId};

use super::snapshot::TagSnapshot;
use crate::collect::ReadEvent;
use crate::inference::{record_interval, IntervalStats, NEUTRAL_PROBABILITY};

/// Everything the registry knows about one admitted tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagState {
    pub sequence_id: SequenceId,
    pub tag_id: TagId,
    pub first_seen_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
    pub signal_strength: i64,
    pub frequency: i64,
    pub stats: IntervalStats,
    /// Belief that the tag is currently visible, in [0, 1].
    pub visibility_probability: f64,
}

impl TagState {
    pub fn new(
        sequence_id: SequenceId,
        tag_id: TagId,
        observed_at: DateTime<Utc>,
        signal_strength: i64,
        frequency: i64,
        window_capacity: usize,
    ) -> Self {
        Self {
            sequence_id,
            tag_id,
            first_seen_at: observed_at,
            last_read_at: observed_at,
            signal_strength,
            frequency,
            stats: IntervalStats::new(window_capacity),
            visibility_probability: NEUTRAL_PROBABILITY,
        }
    }

    /// State for a first sighting. No interval is recorded.
    pub fn from_event(sequence_id: SequenceId, event: &ReadEvent, window_capacity: usize) -> Self {
        Self::new(
            sequence_id,
            event.tag_id.clone(),
            event.observed_at,
            event.signal_strength,
            event.frequency,
            window_capacity,
        )
    }

    /// Fold a repeat reading in. Returns the recorded interval (seconds).
    pub fn apply_reading(&mut self, event: &ReadEvent) -> f64 {
        let elapsed = record_interval(self, event.observed_at);
        self.signal_strength = event.signal_strength;
        self.frequency = event.frequency;
        self.last_read_at = event.observed_at;
        elapsed
    }

    pub fn snapshot(&self) -> TagSnapshot {
        TagSnapshot {
            sequence_id: self.sequence_id,
            tag_id: self.tag_id.clone(),
            last_read_at: self.last_read_at,
            signal_strength: self.signal_strength,
            frequency: self.frequency,
            read_count: self.stats.read_count,
            average_interval: self.stats.average_interval,
            interval_variance: self.stats.interval_variance,
            visibility_probability: self.visibility_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn event(at: DateTime<Utc>, rssi: i64) -> ReadEvent {
        ReadEvent {
            tag_id: TagId::from("ABC123"),
            observed_at: at,
            signal_strength: rssi,
            frequency: 915,
            device_timestamp: Some(1),
        }
    }

    #[test]
    fn first_sighting_starts_neutral() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let state = TagState::from_event(SequenceId(4), &event(t0, -40), 100);
        assert_eq!(state.sequence_id, SequenceId(4));
        assert_eq!(state.visibility_probability, 0.5);
        assert_eq!(state.stats.read_count, 0);
        assert_eq!(state.first_seen_at, t0);
        assert_eq!(state.last_read_at, t0);
    }

    #[test]
    fn repeat_reading_overwrites_latest_values() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let t1 = t0 + Duration::milliseconds(250);
        let mut state = TagState::from_event(SequenceId(0), &event(t0, -40), 100);
        let elapsed = state.apply_reading(&event(t1, -55));
        assert!((elapsed - 0.25).abs() < 1e-9);
        assert_eq!(state.signal_strength, -55);
        assert_eq!(state.last_read_at, t1);
        assert_eq!(state.first_seen_at, t0);
        assert_eq!(state.stats.read_count, 1);
    }
}
