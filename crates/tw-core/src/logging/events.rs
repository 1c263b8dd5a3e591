//! Structured event vocabulary for logging.
//!
//! Every lifecycle event carries a stable name, the pipeline stage and the
//! run id of the invocation.

use serde::{Deserialize, Serialize};

/// Stages of one tracking cycle, plus startup and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading and decoding a line, admitting or updating a tag.
    Ingest,
    /// Visibility sweep over all tags.
    Estimate,
    /// Snapshot rendering.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Estimate => "estimate",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Ingest stage
    pub const READING_APPLIED: &str = "reading.applied";
    pub const READING_ADMITTED: &str = "reading.admitted";
    pub const READING_DROPPED: &str = "reading.dropped";
    pub const LINE_MALFORMED: &str = "line.malformed";
    pub const TRANSPORT_TIMEOUT: &str = "transport.timeout";
    pub const TRANSPORT_CLOSED: &str = "transport.closed";
    pub const TAG_EVICTED: &str = "tag.evicted";

    // Estimate stage
    pub const ESTIMATE_SWEPT: &str = "estimate.swept";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
}

/// Correlation context for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Ingest).unwrap(), "\"ingest\"");
        assert_eq!(Stage::Estimate.to_string(), "estimate");
    }

    #[test]
    fn test_event_names_are_dotted() {
        for name in [
            event_names::RUN_STARTED,
            event_names::READING_DROPPED,
            event_names::ESTIMATE_SWEPT,
            event_names::CONFIG_DEFAULT_USED,
        ] {
            assert!(name.contains('.'), "{name}");
        }
    }
}
