//! Two-sample comparison engine
//!
//! Tests whether the difference between two index statistics could have
//! arisen by chance, by simulating a null in which the two datasets are
//! exchangeable.

use crate::driver::simulate;
use crate::{pvalue, CompareNullApproach, InferenceResult};
use rand::prelude::*;
use seg_core::{
    generate_counterfactual, math, CounterfactualApproach, Error, IndexResult, MultiGroupResult,
    NoProgress, ProgressSink, Result, SingleGroupData, SingleGroupResult,
};
use tracing::debug;

/// Significance test for the difference between two index statistics
///
/// Both results must carry the same index formula; the point estimate is
/// always `first - second` and the p-value is always two-tailed.
#[derive(Debug, Clone)]
pub struct TwoValueTest {
    approach: CompareNullApproach,
    iterations: usize,
    seed: Option<u64>,
}

impl TwoValueTest {
    /// Create a test under the given null model
    pub fn new(approach: CompareNullApproach) -> Self {
        Self {
            approach,
            iterations: 500,
            seed: None,
        }
    }

    /// Set the number of simulation rounds
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        assert!(iterations > 0, "Number of iterations must be positive");
        self.iterations = iterations;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the test, discarding progress reports
    pub fn run(&self, first: &IndexResult, second: &IndexResult) -> Result<InferenceResult> {
        self.run_with_progress(first, second, &mut NoProgress)
    }

    /// Run the test, reporting completed rounds to the sink
    pub fn run_with_progress(
        &self,
        first: &IndexResult,
        second: &IndexResult,
        sink: &mut dyn ProgressSink,
    ) -> Result<InferenceResult> {
        if !first.compatible_with(second) {
            return Err(Error::IncompatibleIndices(format!(
                "cannot compare {} ({}) against {} ({})",
                first.label(),
                first.class_name(),
                second.label(),
                second.class_name()
            )));
        }
        let seed = self.seed.unwrap_or_else(|| thread_rng().gen());
        debug!(
            approach = %self.approach,
            iterations = self.iterations,
            index = %first.label(),
            "running two-sample null simulation"
        );

        let differences = match (first, second) {
            (IndexResult::SingleGroup(a), IndexResult::SingleGroup(b)) => {
                self.run_single_group(a, b, seed, sink)?
            }
            (IndexResult::MultiGroup(a), IndexResult::MultiGroup(b)) => {
                self.run_multigroup(a, b, seed, sink)?
            }
            // compatible_with has already rejected mixed classes
            _ => unreachable!("index class mismatch survived compatibility check"),
        };

        let point_estimate = first.statistic() - second.statistic();
        let (p_value, null_sample) =
            pvalue::finalize(differences, point_estimate, true, self.iterations)?;
        Ok(InferenceResult {
            p_value,
            null_sample,
            point_estimate,
            index_name: first.label().to_string(),
        })
    }

    fn run_single_group(
        &self,
        first: &SingleGroupResult,
        second: &SingleGroupResult,
        seed: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<f64>> {
        match self.approach.counterfactual_approach() {
            None => self.run_random_label(first, second, seed, sink),
            Some(approach) => self.run_counterfactual(first, second, approach, seed, sink),
        }
    }

    /// Pool both datasets, then repeatedly re-partition the pooled rows into
    /// two sides of the original sizes
    fn run_random_label(
        &self,
        first: &SingleGroupResult,
        second: &SingleGroupResult,
        seed: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<f64>> {
        let pooled = pool_rows(first.data(), second.data());
        let n_first = first.data().n_units();
        let index_first = first.index();
        let index_second = second.index();

        simulate(self.iterations, seed, sink, |_, rng| {
            let mut order: Vec<usize> = (0..pooled.len()).collect();
            order.shuffle(rng);

            let (side_first, side_second) = order.split_at(n_first);
            let first_data = rows_to_data(&pooled, side_first)?;
            let second_data = rows_to_data(&pooled, side_second)?;
            Ok(index_first.evaluate(&first_data)? - index_second.evaluate(&second_data)?)
        })
    }

    /// Per row, flip a fair coin between the observed and the counterfactual
    /// group count, on both sides independently
    fn run_counterfactual(
        &self,
        first: &SingleGroupResult,
        second: &SingleGroupResult,
        approach: CounterfactualApproach,
        seed: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<f64>> {
        let (cf_first, cf_second) =
            generate_counterfactual(first.data(), second.data(), approach)?;
        let totals_first = if self.approach.substitutes_totals() {
            cf_first.counterfactual_total().to_vec()
        } else {
            first.data().total().to_vec()
        };
        let totals_second = if self.approach.substitutes_totals() {
            cf_second.counterfactual_total().to_vec()
        } else {
            second.data().total().to_vec()
        };
        let index_first = first.index();
        let index_second = second.index();

        simulate(self.iterations, seed, sink, |_, rng| {
            let group_first = coin_flip_groups(rng, first.data().group(), cf_first.counterfactual_group());
            let group_second =
                coin_flip_groups(rng, second.data().group(), cf_second.counterfactual_group());
            let first_data = first.data().with_counts(group_first, totals_first.clone())?;
            let second_data = second
                .data()
                .with_counts(group_second, totals_second.clone())?;
            Ok(index_first.evaluate(&first_data)? - index_second.evaluate(&second_data)?)
        })
    }

    fn run_multigroup(
        &self,
        first: &MultiGroupResult,
        second: &MultiGroupResult,
        seed: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<f64>> {
        match self.approach {
            CompareNullApproach::RandomLabel => {}
            CompareNullApproach::CounterfactualComposition
            | CompareNullApproach::CounterfactualShare
            | CompareNullApproach::CounterfactualDualComposition => {
                return Err(Error::UnsupportedNullModel {
                    model: self.approach.to_string(),
                    index_class: "multigroup",
                });
            }
        }
        if first.data().groups() != second.data().groups() {
            return Err(Error::InvalidInput(
                "random labeling requires both datasets to share the same ordered group list"
                    .to_string(),
            ));
        }

        let pooled: Vec<Vec<f64>> = first
            .data()
            .counts()
            .iter()
            .chain(second.data().counts())
            .map(|row| row.iter().map(|&v| math::round_non_negative(v)).collect())
            .collect();
        let n_first = first.data().n_units();
        let data_first = first.data();
        let data_second = second.data();
        let index_first = first.index();
        let index_second = second.index();

        simulate(self.iterations, seed, sink, |_, rng| {
            let mut order: Vec<usize> = (0..pooled.len()).collect();
            order.shuffle(rng);

            let (side_first, side_second) = order.split_at(n_first);
            let first_data =
                data_first.with_counts(side_first.iter().map(|&i| pooled[i].clone()).collect())?;
            let second_data = data_second
                .with_counts(side_second.iter().map(|&i| pooled[i].clone()).collect())?;
            Ok(index_first.evaluate(&first_data)? - index_second.evaluate(&second_data)?)
        })
    }
}

/// Pooled (group, total) rows, rounded to whole persons, spatial identity
/// deliberately dropped
fn pool_rows(first: &SingleGroupData, second: &SingleGroupData) -> Vec<(f64, f64)> {
    first
        .group()
        .iter()
        .zip(first.total())
        .chain(second.group().iter().zip(second.total()))
        .map(|(&g, &t)| (math::round_non_negative(g), math::round_non_negative(t)))
        .collect()
}

fn rows_to_data(pooled: &[(f64, f64)], indices: &[usize]) -> Result<SingleGroupData> {
    SingleGroupData::new(
        indices.iter().map(|&i| pooled[i].0).collect(),
        indices.iter().map(|&i| pooled[i].1).collect(),
    )
}

fn coin_flip_groups(rng: &mut StdRng, observed: &[f64], counterfactual: &[f64]) -> Vec<f64> {
    observed
        .iter()
        .zip(counterfactual)
        .map(|(&obs, &cf)| if rng.gen::<f64>() > 0.5 { obs } else { cf })
        .collect()
}
