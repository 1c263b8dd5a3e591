//! Two-state visibility estimator.
//!
//! Each update draws `num_samples` intervals uniformly (with replacement)
//! from the tag's recent history plus the currently open interval, runs a
//! Bayes update of a softened prior for each draw, averages the posteriors,
//! and finally decays the result toward 0.5 by the time since the last read.
//!
//! The Bayes step works on linear densities. Far in the tails (intervals
//! beyond roughly 105 s) both densities underflow to zero, the evidence
//! vanishes and the draw contributes the softened prior.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tw_math::two_state_posterior;

use super::elapsed_seconds;
use crate::config::EstimatorParams;
use crate::registry::TagState;

/// Neutral belief: no evidence either way.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Outcome of one visibility update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibilityUpdate {
    /// Seconds since the tag's last read.
    pub elapsed: f64,
    /// Mean posterior over the draws, before decay.
    pub posterior_mean: f64,
    /// New visibility probability.
    pub probability: f64,
}

/// Pull the current belief toward 0.5 by `transition_rate`.
pub fn softened_prior(current: f64, transition_rate: f64) -> f64 {
    NEUTRAL_PROBABILITY + (current - NEUTRAL_PROBABILITY) * (1.0 - transition_rate)
}

/// P(visible | interval) for a single interval under the two Gaussians.
///
/// Returns `prior` unchanged when the evidence `p_visible·prior +
/// p_covered·(1 − prior)` is zero or not finite.
pub fn posterior_visible(interval: f64, prior: f64, params: &EstimatorParams) -> f64 {
    let p_visible = params.visible.pdf(interval);
    let p_covered = params.covered.pdf(interval);
    two_state_posterior(p_visible, p_covered, prior).unwrap_or(prior)
}

/// Exponential decay toward 0.5 after `elapsed` seconds without a read.
pub fn apply_decay(probability: f64, elapsed: f64, decay_seconds: f64) -> f64 {
    let decay = (-elapsed / decay_seconds).exp();
    NEUTRAL_PROBABILITY + (probability - NEUTRAL_PROBABILITY) * decay
}

/// Re-estimate the visibility of one tag at `now`.
///
/// The draw pool is the window as it would look after recording the open
/// interval: when the window is full its oldest entry is left out. The open
/// interval joins the pool for this call only; the window keeps completed
/// intervals.
pub fn update_visibility<R: Rng>(
    state: &mut TagState,
    now: DateTime<Utc>,
    params: &EstimatorParams,
    rng: &mut R,
) -> VisibilityUpdate {
    let elapsed = elapsed_seconds(state.last_read_at, now);
    let prior = softened_prior(state.visibility_probability, params.transition_rate);
    let window = state.stats.window();
    let first = usize::from(window.is_full());
    let pool_end = window.len() + 1;

    let posteriors = (0..params.num_samples).map(|_| {
        let draw = rng.random_range(first..pool_end);
        let interval = window.get(draw).unwrap_or(elapsed);
        posterior_visible(interval, prior, params)
    });
    let posterior_mean = tw_math::mean(posteriors).unwrap_or(state.visibility_probability);

    let probability = apply_decay(posterior_mean, elapsed, params.decay_seconds).clamp(0.0, 1.0);
    state.visibility_probability = probability;

    tracing::trace!(
        tag = %state.tag_id,
        elapsed,
        posterior_mean,
        probability,
        "visibility updated"
    );

    VisibilityUpdate {
        elapsed,
        posterior_mean,
        probability,
    }
}
