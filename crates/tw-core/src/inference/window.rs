//! Bounded FIFO of recent inter-read intervals.
//!
//! One buffer per tag, shared by the statistics tracker (variance) and the
//! visibility estimator (history draws).

use std::collections::VecDeque;

/// Most recent inter-read intervals of a tag, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl IntervalWindow {
    /// Empty window holding at most `capacity` intervals (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an interval, returning the evicted oldest one when full.
    pub fn push(&mut self, seconds: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(seconds);
        evicted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Intervals from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Interval at `index`, counted from the oldest.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn oldest(&self) -> Option<f64> {
        self.values.front().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Sample variance of the window, 0 with fewer than two entries.
    pub fn variance(&self) -> f64 {
        tw_math::sample_variance(self.iter())
    }

    pub fn mean(&self) -> Option<f64> {
        tw_math::mean(self.iter())
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}
