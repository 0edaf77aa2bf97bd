//! Counterfactual population generation
//!
//! Builds synthetic population columns for two datasets by transplanting one
//! dataset's distributional shape onto the other's unit structure, and vice
//! versa. Both the decomposition engine and the two-sample inference engine
//! consume these datasets; neither mutates them after creation.

use crate::math::{cdf_match, round_non_negative};
use crate::{Result, SingleGroupData};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Technique used to generate counterfactual population distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterfactualApproach {
    /// Match the per-unit group/total ratio
    Composition,
    /// Match the per-unit share of the group-wide population
    Share,
    /// Match the minority composition and its complement independently
    DualComposition,
}

impl fmt::Display for CounterfactualApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CounterfactualApproach::Composition => "composition",
            CounterfactualApproach::Share => "share",
            CounterfactualApproach::DualComposition => "dual_composition",
        };
        f.write_str(name)
    }
}

/// Counterfactual population columns, aligned row-for-row with one input
/// dataset
///
/// For [`CounterfactualApproach::Share`] the matched-variable columns hold
/// shares; for the other approaches they hold compositions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualData {
    approach: CounterfactualApproach,
    composition: Vec<f64>,
    counterfactual_composition: Vec<f64>,
    counterfactual_group: Vec<f64>,
    counterfactual_total: Vec<f64>,
}

impl CounterfactualData {
    pub fn approach(&self) -> CounterfactualApproach {
        self.approach
    }

    /// Observed matched variable (composition or share) per unit
    pub fn composition(&self) -> &[f64] {
        &self.composition
    }

    /// Matched variable transplanted from the other dataset
    pub fn counterfactual_composition(&self) -> &[f64] {
        &self.counterfactual_composition
    }

    pub fn counterfactual_group(&self) -> &[f64] {
        &self.counterfactual_group
    }

    pub fn counterfactual_total(&self) -> &[f64] {
        &self.counterfactual_total
    }
}

// Ratio columns treat an empty denominator as zero; genuinely degenerate
// datasets surface through the index formula's NaN contract instead.
fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn compositions(data: &SingleGroupData) -> Vec<f64> {
    data.group()
        .iter()
        .zip(data.total())
        .map(|(&g, &t)| safe_ratio(g, t))
        .collect()
}

fn complement_compositions(data: &SingleGroupData) -> Vec<f64> {
    data.group()
        .iter()
        .zip(data.total())
        .map(|(&g, &t)| safe_ratio(t - g, t))
        .collect()
}

fn shares(values: &[f64], totals: &[f64]) -> Vec<f64> {
    let sum: f64 = values.iter().sum();
    values
        .iter()
        .zip(totals)
        .map(|(&v, &t)| if t == 0.0 { 0.0 } else { safe_ratio(v, sum) })
        .collect()
}

/// Generate counterfactual population columns for two datasets
///
/// Each dataset receives, per unit, the other dataset's matched variable at
/// the same percentile rank; counterfactual populations are reconstructed
/// from the transplanted variable and rounded to the nearest non-negative
/// integer.
pub fn generate_counterfactual(
    data1: &SingleGroupData,
    data2: &SingleGroupData,
    approach: CounterfactualApproach,
) -> Result<(CounterfactualData, CounterfactualData)> {
    match approach {
        CounterfactualApproach::Composition => Ok((
            composition_counterfactual(data1, data2),
            composition_counterfactual(data2, data1),
        )),
        CounterfactualApproach::Share => Ok((
            share_counterfactual(data1, data2),
            share_counterfactual(data2, data1),
        )),
        CounterfactualApproach::DualComposition => Ok((
            dual_composition_counterfactual(data1, data2),
            dual_composition_counterfactual(data2, data1),
        )),
    }
}

fn composition_counterfactual(own: &SingleGroupData, other: &SingleGroupData) -> CounterfactualData {
    let composition = compositions(own);
    let counterfactual_composition = cdf_match(&composition, &compositions(other));
    let counterfactual_group: Vec<f64> = counterfactual_composition
        .iter()
        .zip(own.total())
        .map(|(&c, &t)| round_non_negative(c * t))
        .collect();
    CounterfactualData {
        approach: CounterfactualApproach::Composition,
        composition,
        counterfactual_composition,
        counterfactual_group,
        counterfactual_total: own.total().to_vec(),
    }
}

fn share_counterfactual(own: &SingleGroupData, other: &SingleGroupData) -> CounterfactualData {
    let complement_own: Vec<f64> = own
        .group()
        .iter()
        .zip(own.total())
        .map(|(&g, &t)| t - g)
        .collect();
    let complement_other: Vec<f64> = other
        .group()
        .iter()
        .zip(other.total())
        .map(|(&g, &t)| t - g)
        .collect();

    let share = shares(own.group(), own.total());
    let counterfactual_share = cdf_match(&share, &shares(other.group(), other.total()));
    let counterfactual_complement_share = cdf_match(
        &shares(&complement_own, own.total()),
        &shares(&complement_other, other.total()),
    );

    // Scale matched shares back through this dataset's marginal totals
    let group_sum = own.group_sum();
    let complement_sum: f64 = complement_own.iter().sum();
    let counterfactual_group: Vec<f64> = counterfactual_share
        .iter()
        .map(|&s| round_non_negative(s * group_sum))
        .collect();
    let counterfactual_total: Vec<f64> = counterfactual_group
        .iter()
        .zip(&counterfactual_complement_share)
        .map(|(&g, &s)| g + round_non_negative(s * complement_sum))
        .collect();

    CounterfactualData {
        approach: CounterfactualApproach::Share,
        composition: share,
        counterfactual_composition: counterfactual_share,
        counterfactual_group,
        counterfactual_total,
    }
}

fn dual_composition_counterfactual(
    own: &SingleGroupData,
    other: &SingleGroupData,
) -> CounterfactualData {
    let composition = compositions(own);
    let counterfactual_composition = cdf_match(&composition, &compositions(other));
    let counterfactual_complement = cdf_match(
        &complement_compositions(own),
        &complement_compositions(other),
    );

    let counterfactual_group: Vec<f64> = counterfactual_composition
        .iter()
        .zip(own.total())
        .map(|(&c, &t)| round_non_negative(c * t))
        .collect();
    let counterfactual_total: Vec<f64> = counterfactual_group
        .iter()
        .zip(counterfactual_complement.iter().zip(own.total()))
        .map(|(&g, (&c, &t))| g + round_non_negative(c * t))
        .collect();

    CounterfactualData {
        approach: CounterfactualApproach::DualComposition,
        composition,
        counterfactual_composition,
        counterfactual_group,
        counterfactual_total,
    }
}
