//! Visibility estimator calibration.
//!
//! Two hidden states, each a fixed Gaussian over the time between reads:
//! a visible tag is read every ~0.1 s with little spread, a covered tag is
//! read rarely and erratically. The defaults are bench calibrations, not
//! learned online.

use serde::{Deserialize, Serialize};
use tw_math::GaussianParams;

/// Default number of history draws per visibility update.
pub const DEFAULT_NUM_SAMPLES: usize = 10;

/// Default inter-read window length per tag.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Parameters of the two-state visibility estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorParams {
    /// Inter-read time model while the tag is visible (seconds).
    pub visible: GaussianParams,

    /// Inter-read time model while the tag is covered (seconds).
    pub covered: GaussianParams,

    /// Damping of the previous belief toward 0.5 before each update, in [0, 1].
    pub transition_rate: f64,

    /// Time constant of the decay toward 0.5 while a tag goes unread (seconds).
    pub decay_seconds: f64,

    /// History draws per update.
    pub num_samples: usize,

    /// Most recent inter-read intervals kept per tag.
    pub window_capacity: usize,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            visible: GaussianParams {
                mean: 0.0956,
                variance: 0.0051,
            },
            covered: GaussianParams {
                mean: 0.62,
                variance: 7.38,
            },
            transition_rate: 0.1,
            decay_seconds: 10.0,
            num_samples: DEFAULT_NUM_SAMPLES,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

impl EstimatorParams {
    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_window_capacity(mut self, window_capacity: usize) -> Self {
        self.window_capacity = window_capacity;
        self
    }
}
