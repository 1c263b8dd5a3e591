//! Inference engine modules.

pub mod interval_stats;
pub mod visibility;
pub mod window;

pub use interval_stats::{record_interval, IntervalStats};
pub use visibility::{
    apply_decay, posterior_visible, softened_prior, update_visibility, VisibilityUpdate,
    NEUTRAL_PROBABILITY,
};
pub use window::IntervalWindow;

use chrono::{DateTime, Utc};

/// Seconds from `since` to `now`, clamped at zero when the clock went backwards.
pub fn elapsed_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
