//! Shapley decomposition of a segregation difference
//!
//! The difference between two observed statistics of the same index is split
//! into a spatial component (how differently people are arranged across
//! units) and an attribute component (how differently the group is
//! represented overall), by evaluating the index on counterfactual datasets
//! that swap one dimension at a time.

use seg_core::{
    generate_counterfactual, CounterfactualApproach, Error, Result, SingleGroupData,
    SingleGroupResult,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The four index evaluations behind a decomposition
///
/// `s1_a1` is the first spatial structure with the first attribute profile
/// (the observed first statistic), `s1_a2` the first structure with the
/// second profile, and so on. `s2_a2` is the observed second statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossStatistics {
    pub s1_a1: f64,
    pub s1_a2: f64,
    pub s2_a1: f64,
    pub s2_a2: f64,
}

impl CrossStatistics {
    /// Shapley value of the spatial dimension: the change from swapping the
    /// spatial structure, averaged over both attribute profiles
    pub fn spatial_component(&self) -> f64 {
        0.5 * ((self.s1_a1 - self.s2_a1) + (self.s1_a2 - self.s2_a2))
    }

    /// Shapley value of the attribute dimension: the change from swapping
    /// the attribute profile, averaged over both spatial structures
    pub fn attribute_component(&self) -> f64 {
        0.5 * ((self.s1_a1 - self.s1_a2) + (self.s2_a1 - self.s2_a2))
    }
}

/// Outcome of a Shapley decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    spatial_component: f64,
    attribute_component: f64,
    cross: CrossStatistics,
    approach: CounterfactualApproach,
    counterfactual1: SingleGroupData,
    counterfactual2: SingleGroupData,
}

impl Decomposition {
    /// Share of the difference explained by spatial arrangement
    pub fn spatial_component(&self) -> f64 {
        self.spatial_component
    }

    /// Share of the difference explained by the attribute profile
    pub fn attribute_component(&self) -> f64 {
        self.attribute_component
    }

    /// The four underlying index evaluations
    pub fn cross_statistics(&self) -> CrossStatistics {
        self.cross
    }

    /// The counterfactual technique the decomposition was built with
    pub fn approach(&self) -> CounterfactualApproach {
        self.approach
    }

    /// First dataset with the second dataset's attribute profile
    pub fn counterfactual1(&self) -> &SingleGroupData {
        &self.counterfactual1
    }

    /// Second dataset with the first dataset's attribute profile
    pub fn counterfactual2(&self) -> &SingleGroupData {
        &self.counterfactual2
    }

    /// The decomposed difference, `first - second`
    pub fn total_difference(&self) -> f64 {
        self.cross.s1_a1 - self.cross.s2_a2
    }
}

/// Decompose the difference between two index results
///
/// Both results must carry the same index formula; its evaluator from
/// `first` is used for all four cross evaluations. Counterfactual datasets
/// keep each side's spatial identity while borrowing the other side's
/// attribute profile.
pub fn decompose(
    first: &SingleGroupResult,
    second: &SingleGroupResult,
    approach: CounterfactualApproach,
) -> Result<Decomposition> {
    if first.label() != second.label() {
        return Err(Error::IncompatibleIndices(format!(
            "cannot decompose {} against {}",
            first.label(),
            second.label()
        )));
    }
    debug!(
        index = %first.label(),
        %approach,
        "decomposing difference between two index statistics"
    );

    let (cf_first, cf_second) = generate_counterfactual(first.data(), second.data(), approach)?;
    let counterfactual1 = first.data().with_counts(
        cf_first.counterfactual_group().to_vec(),
        cf_first.counterfactual_total().to_vec(),
    )?;
    let counterfactual2 = second.data().with_counts(
        cf_second.counterfactual_group().to_vec(),
        cf_second.counterfactual_total().to_vec(),
    )?;

    let index = first.index();
    let cross = CrossStatistics {
        s1_a1: first.statistic(),
        s1_a2: index.evaluate(&counterfactual1)?,
        s2_a1: index.evaluate(&counterfactual2)?,
        s2_a2: second.statistic(),
    };

    Ok(Decomposition {
        spatial_component: cross.spatial_component(),
        attribute_component: cross.attribute_component(),
        cross,
        approach,
        counterfactual1,
        counterfactual2,
    })
}
