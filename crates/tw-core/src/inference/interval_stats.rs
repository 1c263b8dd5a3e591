//! Incremental read-timing statistics.
//!
//! Two estimators live side by side and are kept distinct:
//! the average interval is lifetime (unbounded sum over unbounded count),
//! the variance only covers the interval window.

use chrono::{DateTime, Utc};

use super::elapsed_seconds;
use super::window::IntervalWindow;
use crate::registry::TagState;

/// Running inter-read timing profile of one tag.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalStats {
    /// Completed inter-read intervals; the first sighting is not counted.
    pub read_count: u64,
    /// Sum of every interval ever recorded (seconds).
    pub cumulative_interval_time: f64,
    /// `cumulative_interval_time / read_count`, 0 before the first interval.
    pub average_interval: f64,
    /// Sample variance over the window, 0 with fewer than two entries.
    pub interval_variance: f64,
    window: IntervalWindow,
}

impl IntervalStats {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            read_count: 0,
            cumulative_interval_time: 0.0,
            average_interval: 0.0,
            interval_variance: 0.0,
            window: IntervalWindow::new(window_capacity),
        }
    }

    /// Fold one completed interval into the profile.
    pub fn record(&mut self, elapsed: f64) {
        self.window.push(elapsed);
        self.cumulative_interval_time += elapsed;
        self.read_count += 1;
        self.average_interval = self.cumulative_interval_time / self.read_count as f64;
        self.interval_variance = self.window.variance();
    }

    pub fn window(&self) -> &IntervalWindow {
        &self.window
    }
}

/// Record the interval between the tag's last read and `now`.
///
/// Only called for tags that already exist. The caller updates
/// `last_read_at` afterwards. Returns the recorded interval in seconds.
pub fn record_interval(state: &mut TagState, now: DateTime<Utc>) -> f64 {
    let elapsed = elapsed_seconds(state.last_read_at, now);
    state.stats.record(elapsed);
    elapsed
}
