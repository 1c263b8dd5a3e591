//! Optional reclaiming of registry slots held by silent tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inference::elapsed_seconds;

/// When an admitted tag is dropped from the registry.
///
/// The default keeps every tag for the life of the registry, so a tag that
/// stops transmitting holds its slot forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    #[default]
    Never,
    /// Drop a tag once it has gone this many seconds without a read.
    IdleAfterSeconds(f64),
}

impl EvictionPolicy {
    pub fn is_expired(&self, last_read_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            EvictionPolicy::Never => false,
            EvictionPolicy::IdleAfterSeconds(limit) => elapsed_seconds(last_read_at, now) > *limit,
        }
    }
}
