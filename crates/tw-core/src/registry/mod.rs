//! Tag registry: admission, per-tag state and the ingest/estimate cycle.
//!
//! One [`TagRegistry::ingest_and_advance`] call is one cycle:
//! 1. apply the eviction policy (a no-op by default),
//! 2. pull at most one line from the source and decode it,
//! 3. update or admit the addressed tag, or drop the reading when full,
//! 4. re-estimate visibility for every tag against the shared `now`,
//! 5. hand back a snapshot of all tags in admission order.
//!
//! Timeouts, malformed lines and capacity drops are ordinary outcomes;
//! only a failed transport ends the cycle with an error.

pub mod eviction;
pub mod snapshot;
pub mod state;

pub use eviction::EvictionPolicy;
pub use snapshot::{TagSnapshot, VisibilityStatus};
pub use state::TagState;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tw_common::{SequenceId, TagId};

use crate::collect::{decode, DecodeError, LineSource, ReadEvent, TransportError};
use crate::config::{EstimatorParams, RegistryConfig};
use crate::inference::update_visibility;
use crate::logging::event_names;

/// What the ingest half of a cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Known tag read again.
    Updated { tag_id: TagId, interval: f64 },
    /// New tag admitted.
    Admitted {
        tag_id: TagId,
        sequence_id: SequenceId,
    },
    /// New tag seen while the registry was full.
    Dropped { tag_id: TagId },
    /// A line arrived but is not a reading.
    Malformed(DecodeError),
    /// No line within the read timeout.
    NoReading,
}

impl IngestOutcome {
    /// Whether a reading changed tag state.
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            IngestOutcome::Updated { .. } | IngestOutcome::Admitted { .. }
        )
    }

    /// Tag addressed by the reading, if one was decoded.
    pub fn tag_id(&self) -> Option<&TagId> {
        match self {
            IngestOutcome::Updated { tag_id, .. }
            | IngestOutcome::Admitted { tag_id, .. }
            | IngestOutcome::Dropped { tag_id } => Some(tag_id),
            IngestOutcome::Malformed(_) | IngestOutcome::NoReading => None,
        }
    }
}

/// Result of one full cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestResult {
    pub outcome: IngestOutcome,
    /// Tags removed by the eviction policy at the start of the cycle.
    pub evicted: Vec<TagId>,
    /// All tags after the visibility sweep, in admission order.
    pub snapshot: Vec<TagSnapshot>,
}

/// Running totals since the registry was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryCounters {
    pub cycles: u64,
    pub updated: u64,
    pub admitted: u64,
    pub dropped: u64,
    pub malformed: u64,
    pub idle: u64,
    pub evicted: u64,
}

/// Bounded collection of tracked tags.
#[derive(Debug)]
pub struct TagRegistry {
    capacity: usize,
    /// Tag states keyed by admission order, so sweeps and snapshots are
    /// ordered and reproducible for a fixed seed.
    tags: BTreeMap<SequenceId, TagState>,
    index: HashMap<TagId, SequenceId>,
    next_sequence_id: SequenceId,
    estimator: EstimatorParams,
    eviction: EvictionPolicy,
    rng: StdRng,
    counters: RegistryCounters,
}

impl TagRegistry {
    /// Registry with default estimator settings and an OS-seeded RNG.
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, EstimatorParams::default(), StdRng::from_os_rng())
    }

    /// Registry with default estimator settings and a fixed seed.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(
            capacity,
            EstimatorParams::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn with_rng(capacity: usize, estimator: EstimatorParams, rng: StdRng) -> Self {
        Self {
            capacity,
            tags: BTreeMap::new(),
            index: HashMap::new(),
            next_sequence_id: SequenceId(0),
            estimator,
            eviction: EvictionPolicy::Never,
            rng,
            counters: RegistryCounters::default(),
        }
    }

    /// Registry built from validated configuration.
    pub fn from_config(registry: &RegistryConfig, estimator: &EstimatorParams) -> Self {
        let rng = match registry.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(registry.capacity, estimator.clone(), rng).with_eviction(registry.eviction)
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tags.len() >= self.capacity
    }

    pub fn counters(&self) -> RegistryCounters {
        self.counters
    }

    pub fn get(&self, tag_id: &str) -> Option<&TagState> {
        self.index
            .get(tag_id)
            .and_then(|sequence_id| self.tags.get(sequence_id))
    }

    pub fn contains(&self, tag_id: &str) -> bool {
        self.index.contains_key(tag_id)
    }

    /// Tag states in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &TagState> {
        self.tags.values()
    }

    /// Run one cycle against a line source.
    ///
    /// A timed-out read is a normal cycle; a closed or failed source is
    /// returned as an error and leaves the registry untouched.
    pub fn ingest_and_advance<S>(
        &mut self,
        source: &mut S,
        now: DateTime<Utc>,
    ) -> Result<IngestResult, TransportError>
    where
        S: LineSource + ?Sized,
    {
        let line = source.next_line()?;
        Ok(self.advance(line.as_deref(), now))
    }

    /// Run one cycle with an already received line (or none).
    pub fn advance(&mut self, line: Option<&[u8]>, now: DateTime<Utc>) -> IngestResult {
        self.counters.cycles += 1;
        let evicted = self.evict_idle(now);

        let outcome = match line {
            None => {
                self.counters.idle += 1;
                tracing::trace!(event = event_names::TRANSPORT_TIMEOUT, "no line this cycle");
                IngestOutcome::NoReading
            }
            Some(raw) => match decode(raw, now) {
                Ok(event) => self.apply_event(&event),
                Err(err) => {
                    self.counters.malformed += 1;
                    tracing::debug!(
                        event = event_names::LINE_MALFORMED,
                        reason = %err,
                        "ignoring line"
                    );
                    IngestOutcome::Malformed(err)
                }
            },
        };

        self.estimate_all(now);

        IngestResult {
            outcome,
            evicted,
            snapshot: self.snapshot(),
        }
    }

    /// Apply one decoded reading: update, admit, or drop.
    pub fn apply_event(&mut self, event: &ReadEvent) -> IngestOutcome {
        if let Some(sequence_id) = self.index.get(&event.tag_id) {
            if let Some(state) = self.tags.get_mut(sequence_id) {
                let interval = state.apply_reading(event);
                self.counters.updated += 1;
                tracing::trace!(
                    event = event_names::READING_APPLIED,
                    tag = %event.tag_id,
                    interval,
                    read_count = state.stats.read_count,
                    "reading applied"
                );
                return IngestOutcome::Updated {
                    tag_id: event.tag_id.clone(),
                    interval,
                };
            }
        }

        if self.is_full() {
            self.counters.dropped += 1;
            tracing::debug!(
                event = event_names::READING_DROPPED,
                tag = %event.tag_id,
                capacity = self.capacity,
                "registry full, reading dropped"
            );
            return IngestOutcome::Dropped {
                tag_id: event.tag_id.clone(),
            };
        }

        let sequence_id = self.next_sequence_id;
        self.next_sequence_id = sequence_id.next();
        let state = TagState::from_event(sequence_id, event, self.estimator.window_capacity);
        self.tags.insert(sequence_id, state);
        self.index.insert(event.tag_id.clone(), sequence_id);
        self.counters.admitted += 1;
        tracing::debug!(
            event = event_names::READING_ADMITTED,
            tag = %event.tag_id,
            sequence_id = sequence_id.0,
            "tag admitted"
        );

        IngestOutcome::Admitted {
            tag_id: event.tag_id.clone(),
            sequence_id,
        }
    }

    /// Re-estimate visibility for every tag at `now`.
    pub fn estimate_all(&mut self, now: DateTime<Utc>) {
        for state in self.tags.values_mut() {
            update_visibility(state, now, &self.estimator, &mut self.rng);
        }
        tracing::trace!(
            event = event_names::ESTIMATE_SWEPT,
            tags = self.tags.len(),
            "visibility sweep done"
        );
    }

    /// Remove tags the eviction policy considers expired.
    ///
    /// Freed slots can be taken by new tags; sequence ids are not reused.
    pub fn evict_idle(&mut self, now: DateTime<Utc>) -> Vec<TagId> {
        if self.eviction == EvictionPolicy::Never {
            return Vec::new();
        }
        let expired: Vec<SequenceId> = self
            .tags
            .iter()
            .filter(|(_, state)| self.eviction.is_expired(state.last_read_at, now))
            .map(|(sequence_id, _)| *sequence_id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for sequence_id in expired {
            if let Some(state) = self.tags.remove(&sequence_id) {
                self.index.remove(&state.tag_id);
                self.counters.evicted += 1;
                tracing::debug!(
                    event = event_names::TAG_EVICTED,
                    tag = %state.tag_id,
                    sequence_id = sequence_id.0,
                    "idle tag evicted"
                );
                evicted.push(state.tag_id);
            }
        }
        evicted
    }

    /// Read-only copy of every tag, in admission order.
    pub fn snapshot(&self) -> Vec<TagSnapshot> {
        self.tags.values().map(TagState::snapshot).collect()
    }
}
