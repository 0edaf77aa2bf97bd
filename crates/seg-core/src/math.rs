//! Rank and empirical-CDF helpers used by the counterfactual generator

use std::cmp::Ordering;

/// Percentile rank of each value within its own distribution
///
/// Ties receive the average of their 1-based ranks, divided by the sample
/// size, so the maximum always maps to 1.0.
pub fn rank_pct(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // average of the 1-based ranks start+1 ..= end+1
        let avg = (start + end + 2) as f64 / 2.0;
        for &idx in &order[start..=end] {
            ranks[idx] = avg / n as f64;
        }
        start = end + 1;
    }
    ranks
}

/// Inverse empirical CDF: smallest value whose cumulative fraction reaches q
///
/// The small offset absorbs the round-trip error of q values produced by
/// `rank_pct` (r/n multiplied back by n), so self-matching is exact.
pub fn inverse_ecdf(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let position = (q * n as f64 - 1e-9).ceil() as isize - 1;
    let index = position.clamp(0, n as isize - 1) as usize;
    sorted[index]
}

/// Transplant `source`'s values through `target`'s distribution
///
/// Each source value is replaced by the target value at the same percentile
/// rank. Matching a distribution against itself is the identity transform.
pub fn cdf_match(source: &[f64], target: &[f64]) -> Vec<f64> {
    let mut sorted_target = target.to_vec();
    sorted_target.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    rank_pct(source)
        .into_iter()
        .map(|q| inverse_ecdf(&sorted_target, q))
        .collect()
}

/// Round to the nearest non-negative integer value
pub fn round_non_negative(value: f64) -> f64 {
    value.round().max(0.0)
}
