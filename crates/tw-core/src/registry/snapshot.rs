//! Read-only view of tag state handed to presentation code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tw_common::{SequenceId, TagId};

use crate::inference::{elapsed_seconds, NEUTRAL_PROBABILITY};

/// Coarse visibility verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityStatus {
    Visible,
    Covered,
}

impl fmt::Display for VisibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityStatus::Visible => write!(f, "visible"),
            VisibilityStatus::Covered => write!(f, "covered"),
        }
    }
}

/// Copy of one tag's state at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSnapshot {
    pub sequence_id: SequenceId,
    pub tag_id: TagId,
    pub last_read_at: DateTime<Utc>,
    pub signal_strength: i64,
    pub frequency: i64,
    pub read_count: u64,
    pub average_interval: f64,
    pub interval_variance: f64,
    pub visibility_probability: f64,
}

impl TagSnapshot {
    /// `Visible` strictly above 0.5.
    pub fn status(&self) -> VisibilityStatus {
        if self.visibility_probability > NEUTRAL_PROBABILITY {
            VisibilityStatus::Visible
        } else {
            VisibilityStatus::Covered
        }
    }

    pub fn seconds_since_read(&self, now: DateTime<Utc>) -> f64 {
        elapsed_seconds(self.last_read_at, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn snapshot(p: f64) -> TagSnapshot {
        TagSnapshot {
            sequence_id: SequenceId(0),
            tag_id: TagId::from("ABC123"),
            last_read_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            signal_strength: -40,
            frequency: 915,
            read_count: 0,
            average_interval: 0.0,
            interval_variance: 0.0,
            visibility_probability: p,
        }
    }

    #[test]
    fn status_threshold() {
        assert_eq!(snapshot(0.51).status(), VisibilityStatus::Visible);
        assert_eq!(snapshot(0.5).status(), VisibilityStatus::Covered);
        assert_eq!(snapshot(0.1).status(), VisibilityStatus::Covered);
    }

    #[test]
    fn seconds_since_read_from_absolute_time() {
        let s = snapshot(0.5);
        let now = s.last_read_at + Duration::seconds(3);
        assert!((s.seconds_since_read(now) - 3.0).abs() < 1e-12);
        assert_eq!(s.seconds_since_read(s.last_read_at - Duration::seconds(1)), 0.0);
    }

    #[test]
    fn serializes_status_names() {
        assert_eq!(
            serde_json::to_string(&VisibilityStatus::Covered).unwrap(),
            "\"covered\""
        );
        let json = serde_json::to_value(snapshot(0.7)).unwrap();
        assert_eq!(json["tag_id"], "ABC123");
        assert_eq!(json["sequence_id"], 0);
    }
}
