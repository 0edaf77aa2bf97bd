//! Common types for the inference engines

use seg_core::CounterfactualApproach;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Null model for single-sample inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleNullApproach {
    /// Multinomial draws from a shared probability vector proportional to
    /// each unit's share of total population
    Systematic,
    /// Resample unit rows with replacement, same sample size
    Bootstrap,
    /// Per-unit binomial draw at the global focal-group rate, totals fixed
    Evenness,
    /// Keep populations fixed, permute spatial assignment
    Permutation,
    /// Systematic generation followed by spatial permutation
    SystematicPermutation,
    /// Evenness generation followed by spatial permutation
    EvenPermutation,
}

impl SingleNullApproach {
    /// Whether the model permutes spatial assignment (and so requires sites)
    pub fn requires_sites(self) -> bool {
        matches!(
            self,
            SingleNullApproach::Permutation
                | SingleNullApproach::SystematicPermutation
                | SingleNullApproach::EvenPermutation
        )
    }

    /// Whether the model is defined for multigroup index results
    pub fn supports_multigroup(self) -> bool {
        matches!(
            self,
            SingleNullApproach::Bootstrap | SingleNullApproach::Evenness
        )
    }
}

impl fmt::Display for SingleNullApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SingleNullApproach::Systematic => "systematic",
            SingleNullApproach::Bootstrap => "bootstrap",
            SingleNullApproach::Evenness => "evenness",
            SingleNullApproach::Permutation => "permutation",
            SingleNullApproach::SystematicPermutation => "systematic_permutation",
            SingleNullApproach::EvenPermutation => "even_permutation",
        };
        f.write_str(name)
    }
}

/// Null model for two-sample comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareNullApproach {
    /// Pool both datasets and randomly re-partition into the original sizes
    RandomLabel,
    /// Per-row coin flip between observed and composition-matched
    /// counterfactual group counts
    CounterfactualComposition,
    /// As composition, with share matching and counterfactual totals
    CounterfactualShare,
    /// As composition, matching minority and complement independently, with
    /// counterfactual totals
    CounterfactualDualComposition,
}

impl CompareNullApproach {
    /// The counterfactual technique behind this model, if any
    pub fn counterfactual_approach(self) -> Option<CounterfactualApproach> {
        match self {
            CompareNullApproach::RandomLabel => None,
            CompareNullApproach::CounterfactualComposition => {
                Some(CounterfactualApproach::Composition)
            }
            CompareNullApproach::CounterfactualShare => Some(CounterfactualApproach::Share),
            CompareNullApproach::CounterfactualDualComposition => {
                Some(CounterfactualApproach::DualComposition)
            }
        }
    }

    /// Whether the counterfactual totals replace the observed totals
    pub(crate) fn substitutes_totals(self) -> bool {
        matches!(
            self,
            CompareNullApproach::CounterfactualShare
                | CompareNullApproach::CounterfactualDualComposition
        )
    }
}

impl fmt::Display for CompareNullApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompareNullApproach::RandomLabel => "random_label",
            CompareNullApproach::CounterfactualComposition => "counterfactual_composition",
            CompareNullApproach::CounterfactualShare => "counterfactual_share",
            CompareNullApproach::CounterfactualDualComposition => {
                "counterfactual_dual_composition"
            }
        };
        f.write_str(name)
    }
}

/// Result of a significance test against a simulated null distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Pseudo p-value estimated from the simulations
    pub p_value: f64,
    /// Statistics simulated under the null hypothesis, in completion order,
    /// with non-finite rounds already removed
    pub null_sample: Vec<f64>,
    /// The statistic under test (for two-sample runs, the difference)
    pub point_estimate: f64,
    /// Tag of the index formula the test was run for
    pub index_name: String,
}
