//! Semantic validation for configuration files.
//!
//! This module validates that config values are not just syntactically correct
//! but also usable by the tracker (e.g., variances are positive, rates are
//! probabilities).

use thiserror::Error;
use tw_math::GaussianParams;

use super::estimator::EstimatorParams;
use super::{Config, RegistryConfig, TransportConfig};
use crate::registry::EvictionPolicy;

/// Errors that can occur during semantic validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Registry capacity must be at least 1 (got {value})")]
    CapacityZero { value: usize },

    #[error("Eviction idle time must be positive and finite (got {value:.4})")]
    EvictionIdleNonPositive { value: f64 },

    #[error("Gaussian {field}.variance must be positive and finite (got {value:.6})")]
    VarianceNonPositive { field: String, value: f64 },

    #[error("Gaussian {field}.mean must be finite (got {value})")]
    MeanNotFinite { field: String, value: f64 },

    #[error("Transition rate must be in [0, 1] (got {value:.4})")]
    TransitionRateRange { value: f64 },

    #[error("Decay time constant must be positive and finite (got {value:.4})")]
    DecayNonPositive { value: f64 },

    #[error("Estimator num_samples must be at least 1 (got {value})")]
    NumSamplesZero { value: usize },

    #[error("Interval window capacity must be at least 1 (got {value})")]
    WindowCapacityZero { value: usize },

    #[error("Transport read timeout must be at least 1 ms (got {value})")]
    ReadTimeoutZero { value: u64 },
}

impl From<ValidationError> for tw_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::VarianceNonPositive { .. }
            | ValidationError::MeanNotFinite { .. }
            | ValidationError::TransitionRateRange { .. }
            | ValidationError::DecayNonPositive { .. }
            | ValidationError::NumSamplesZero { .. }
            | ValidationError::WindowCapacityZero { .. } => {
                tw_common::Error::InvalidEstimator(err.to_string())
            }
            other => tw_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate a full configuration.
pub fn validate_config(config: &Config) -> Result<(), ValidationError> {
    validate_registry(&config.registry)?;
    validate_estimator(&config.estimator)?;
    validate_transport(&config.transport)?;
    Ok(())
}

/// Validate the registry section.
pub fn validate_registry(registry: &RegistryConfig) -> Result<(), ValidationError> {
    if registry.capacity == 0 {
        return Err(ValidationError::CapacityZero {
            value: registry.capacity,
        });
    }
    if let EvictionPolicy::IdleAfterSeconds(seconds) = registry.eviction {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(ValidationError::EvictionIdleNonPositive { value: seconds });
        }
    }
    Ok(())
}

/// Validate estimator calibration.
pub fn validate_estimator(params: &EstimatorParams) -> Result<(), ValidationError> {
    validate_gaussian(&params.visible, "visible")?;
    validate_gaussian(&params.covered, "covered")?;

    if !(0.0..=1.0).contains(&params.transition_rate) {
        return Err(ValidationError::TransitionRateRange {
            value: params.transition_rate,
        });
    }
    if !(params.decay_seconds.is_finite() && params.decay_seconds > 0.0) {
        return Err(ValidationError::DecayNonPositive {
            value: params.decay_seconds,
        });
    }
    if params.num_samples == 0 {
        return Err(ValidationError::NumSamplesZero {
            value: params.num_samples,
        });
    }
    if params.window_capacity == 0 {
        return Err(ValidationError::WindowCapacityZero {
            value: params.window_capacity,
        });
    }
    Ok(())
}

/// Validate the transport section.
pub fn validate_transport(transport: &TransportConfig) -> Result<(), ValidationError> {
    if transport.read_timeout_ms == 0 {
        return Err(ValidationError::ReadTimeoutZero {
            value: transport.read_timeout_ms,
        });
    }
    Ok(())
}

fn validate_gaussian(params: &GaussianParams, field: &str) -> Result<(), ValidationError> {
    if !params.mean.is_finite() {
        return Err(ValidationError::MeanNotFinite {
            field: field.to_string(),
            value: params.mean,
        });
    }
    if !(params.variance.is_finite() && params.variance > 0.0) {
        return Err(ValidationError::VarianceNonPositive {
            field: field.to_string(),
            value: params.variance,
        });
    }
    Ok(())
}
