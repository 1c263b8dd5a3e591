//! Gaussian (normal) distribution utilities for inter-read timing models.
//!
//! # Parameterization
//!
//! Uses **mean/variance parameterization**: `N(μ, σ²)` where:
//! - `μ` = mean
//! - `σ²` = variance (σ² > 0)
//!
//! The density is: `f(x) = exp(-(x - μ)² / (2σ²)) / sqrt(2πσ²)`

use serde::{Deserialize, Serialize};

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)

/// Parameters of a univariate Gaussian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    pub mean: f64,
    pub variance: f64,
}

impl GaussianParams {
    /// Density at x.
    pub fn pdf(&self, x: f64) -> f64 {
        normal_pdf(x, self.mean, self.variance)
    }
}

/// Log of the Gaussian PDF at x.
///
/// # Arguments
/// * `x` - The value at which to evaluate
/// * `mean` - Mean μ
/// * `variance` - Variance σ² (σ² > 0)
///
/// # Returns
/// * `log f(x | μ, σ²)`, NaN for invalid parameters
pub fn normal_log_pdf(x: f64, mean: f64, variance: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || variance.is_nan() {
        return f64::NAN;
    }
    if variance <= 0.0 || variance.is_infinite() {
        return f64::NAN;
    }
    if x.is_infinite() || mean.is_infinite() {
        return f64::NEG_INFINITY;
    }
    let diff = x - mean;
    -LOG_SQRT_2PI - 0.5 * variance.ln() - diff * diff / (2.0 * variance)
}

/// Gaussian PDF at x.
///
/// Underflows to 0.0 far in the tails (beyond roughly 38 standard
/// deviations).
pub fn normal_pdf(x: f64, mean: f64, variance: f64) -> f64 {
    let log_pdf = normal_log_pdf(x, mean, variance);
    if log_pdf.is_nan() {
        return f64::NAN;
    }
    log_pdf.exp()
}
