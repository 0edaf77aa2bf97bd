//! Pseudo p-value computation over simulated null distributions

use seg_core::{Error, Result};
use tracing::warn;

/// Drop non-finite simulation rounds, warning once in aggregate
pub(crate) fn screen(estimates: Vec<f64>) -> Vec<f64> {
    let requested = estimates.len();
    let surviving: Vec<f64> = estimates.into_iter().filter(|v| v.is_finite()).collect();
    let dropped = requested - surviving.len();
    if dropped > 0 {
        warn!(
            dropped,
            requested,
            "simulation rounds produced NaN or infinite statistics and were \
             removed from the null distribution"
        );
    }
    surviving
}

/// Right one-tailed pseudo p-value; denominator is the requested iteration
/// count
pub(crate) fn one_tailed(null_sample: &[f64], point_estimate: f64, iterations: usize) -> f64 {
    let above = null_sample.iter().filter(|&&v| v > point_estimate).count();
    above as f64 / iterations as f64
}

/// Two-tailed pseudo p-value; denominator is the surviving sample size
///
/// The null distribution can sit far from zero, so both tail counts are
/// taken around the point estimate rather than around zero.
pub(crate) fn two_tailed(null_sample: &[f64], point_estimate: f64) -> f64 {
    let above = null_sample.iter().filter(|&&v| v > point_estimate).count();
    let below = null_sample.iter().filter(|&&v| v < point_estimate).count();
    2.0 * above.min(below) as f64 / null_sample.len() as f64
}

/// Screen the raw estimates and derive the requested p-value
pub(crate) fn finalize(
    estimates: Vec<f64>,
    point_estimate: f64,
    use_two_tailed: bool,
    iterations: usize,
) -> Result<(f64, Vec<f64>)> {
    let null_sample = screen(estimates);
    if null_sample.is_empty() {
        return Err(Error::DegenerateNull(format!(
            "all {iterations} simulation rounds produced non-finite statistics"
        )));
    }
    let p_value = if use_two_tailed {
        two_tailed(&null_sample, point_estimate)
    } else {
        one_tailed(&null_sample, point_estimate, iterations)
    };
    Ok((p_value, null_sample))
}
