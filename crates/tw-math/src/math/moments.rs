//! Streaming sample moments.
//!
//! Inputs are iterators so callers can pass ring buffers without copying
//! them into a contiguous slice first.

/// Arithmetic mean, `None` for empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    for v in values {
        count += 1;
        sum += v;
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Unbiased sample variance (n - 1 denominator).
///
/// Returns 0.0 with fewer than two values. Single pass (Welford), so large
/// offsets do not cancel catastrophically.
pub fn sample_variance<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for v in values {
        count += 1;
        let delta = v - mean;
        mean += delta / count as f64;
        m2 += delta * (v - mean);
    }
    if count < 2 {
        return 0.0;
    }
    m2 / (count - 1) as f64
}
