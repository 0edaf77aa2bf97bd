//! Single-sample inference engine
//!
//! Generates an empirical null distribution for one index statistic by
//! repeatedly reconstructing the input dataset under a chosen null model and
//! re-evaluating the index formula.

use crate::driver::simulate;
use crate::{null, pvalue, InferenceResult, SingleNullApproach};
use rand::prelude::*;
use seg_core::{
    Error, IndexResult, MultiGroupResult, NoProgress, ProgressSink, Result, SingleGroupData,
    SingleGroupResult, Site,
};
use tracing::debug;

/// Significance test for a single segregation index
///
/// Builder-style configuration; `run` leaves the input result and its
/// dataset untouched.
///
/// ```rust,ignore
/// let test = SingleValueTest::new(SingleNullApproach::Bootstrap)
///     .with_iterations(500)
///     .with_seed(42);
/// let outcome = test.run(&index_result)?;
/// ```
#[derive(Debug, Clone)]
pub struct SingleValueTest {
    approach: SingleNullApproach,
    iterations: usize,
    two_tailed: bool,
    seed: Option<u64>,
}

impl SingleValueTest {
    /// Create a test under the given null model
    pub fn new(approach: SingleNullApproach) -> Self {
        Self {
            approach,
            iterations: 500,
            two_tailed: true,
            seed: None,
        }
    }

    /// Set the number of simulation rounds
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        assert!(iterations > 0, "Number of iterations must be positive");
        self.iterations = iterations;
        self
    }

    /// Choose between a two-tailed and a right one-tailed p-value
    pub fn two_tailed(mut self, two_tailed: bool) -> Self {
        self.two_tailed = two_tailed;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the test, discarding progress reports
    pub fn run(&self, index: &IndexResult) -> Result<InferenceResult> {
        self.run_with_progress(index, &mut NoProgress)
    }

    /// Run the test, reporting completed rounds to the sink
    pub fn run_with_progress(
        &self,
        index: &IndexResult,
        sink: &mut dyn ProgressSink,
    ) -> Result<InferenceResult> {
        let seed = self.seed.unwrap_or_else(|| thread_rng().gen());
        debug!(
            approach = %self.approach,
            iterations = self.iterations,
            index = %index.label(),
            "running single-sample null simulation"
        );

        let estimates = match index {
            IndexResult::SingleGroup(result) => self.run_single_group(result, seed, sink)?,
            IndexResult::MultiGroup(result) => self.run_multigroup(result, seed, sink)?,
        };

        let point_estimate = index.statistic();
        let (p_value, null_sample) =
            pvalue::finalize(estimates, point_estimate, self.two_tailed, self.iterations)?;
        Ok(InferenceResult {
            p_value,
            null_sample,
            point_estimate,
            index_name: index.label().to_string(),
        })
    }

    fn run_single_group(
        &self,
        result: &SingleGroupResult,
        seed: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<f64>> {
        let data = result.data();
        let index = result.index();

        let sites: Option<Vec<Site>> = if self.approach.requires_sites() {
            match data.sites() {
                Some(sites) => Some(sites.to_vec()),
                None => return Err(Error::MissingSites(self.approach.to_string())),
            }
        } else {
            None
        };

        match self.approach {
            SingleNullApproach::Systematic => {
                let plan = SystematicPlan::new(data)?;
                simulate(self.iterations, seed, sink, |_, rng| {
                    let (group, total) = plan.draw(rng)?;
                    index.evaluate(&data.with_counts(group, total)?)
                })
            }
            SingleNullApproach::Bootstrap => {
                let n_units = data.n_units();
                simulate(self.iterations, seed, sink, |_, rng| {
                    let indices = null::bootstrap_indices(rng, n_units);
                    index.evaluate(&data.resample(&indices))
                })
            }
            SingleNullApproach::Evenness => {
                let plan = EvennessPlan::new(data)?;
                simulate(self.iterations, seed, sink, |_, rng| {
                    let group = plan.draw(rng)?;
                    index.evaluate(&data.with_counts(group, data.total().to_vec())?)
                })
            }
            SingleNullApproach::Permutation => {
                let sites = sites.unwrap_or_default();
                simulate(self.iterations, seed, sink, |_, rng| {
                    let shuffled = null::permuted_sites(rng, &sites);
                    index.evaluate(&data.with_replaced_sites(shuffled)?)
                })
            }
            SingleNullApproach::SystematicPermutation => {
                let plan = SystematicPlan::new(data)?;
                let sites = sites.unwrap_or_default();
                simulate(self.iterations, seed, sink, |_, rng| {
                    let (group, total) = plan.draw(rng)?;
                    let shuffled = null::permuted_sites(rng, &sites);
                    index.evaluate(&data.with_counts(group, total)?.with_replaced_sites(shuffled)?)
                })
            }
            SingleNullApproach::EvenPermutation => {
                let plan = EvennessPlan::new(data)?;
                let sites = sites.unwrap_or_default();
                simulate(self.iterations, seed, sink, |_, rng| {
                    let group = plan.draw(rng)?;
                    let shuffled = null::permuted_sites(rng, &sites);
                    index.evaluate(
                        &data
                            .with_counts(group, data.total().to_vec())?
                            .with_replaced_sites(shuffled)?,
                    )
                })
            }
        }
    }

    fn run_multigroup(
        &self,
        result: &MultiGroupResult,
        seed: u64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<f64>> {
        let data = result.data();
        let index = result.index();

        match self.approach {
            SingleNullApproach::Bootstrap => {
                let n_units = data.n_units();
                simulate(self.iterations, seed, sink, |_, rng| {
                    let indices = null::bootstrap_indices(rng, n_units);
                    index.evaluate(&data.resample(&indices))
                })
            }
            SingleNullApproach::Evenness => {
                let grand_total = data.grand_total();
                if grand_total <= 0.0 {
                    return Err(Error::Computation(
                        "evenness null model requires a positive total population".to_string(),
                    ));
                }
                let probs: Vec<f64> = data
                    .column_sums()
                    .iter()
                    .map(|&sum| sum / grand_total)
                    .collect();
                let trials: Vec<u64> = (0..data.n_units())
                    .map(|unit| data.row_total(unit).round() as u64)
                    .collect();
                simulate(self.iterations, seed, sink, |_, rng| {
                    let counts = trials
                        .iter()
                        .map(|&t| {
                            null::multinomial(rng, t, &probs)
                                .map(|row| row.into_iter().map(|v| v as f64).collect())
                        })
                        .collect::<Result<Vec<Vec<f64>>>>()?;
                    index.evaluate(&data.with_counts(counts)?)
                })
            }
            SingleNullApproach::Systematic
            | SingleNullApproach::Permutation
            | SingleNullApproach::SystematicPermutation
            | SingleNullApproach::EvenPermutation => Err(Error::UnsupportedNullModel {
                model: self.approach.to_string(),
                index_class: "multigroup",
            }),
        }
    }
}

/// Precomputed inputs of the systematic null model
///
/// Both the focal group and its complement are drawn from the same
/// probability vector proportional to each unit's share of total population.
struct SystematicPlan {
    probs: Vec<f64>,
    n_group: u64,
    n_complement: u64,
}

impl SystematicPlan {
    fn new(data: &SingleGroupData) -> Result<Self> {
        let total_sum = data.total_sum();
        if total_sum <= 0.0 {
            return Err(Error::Computation(
                "systematic null model requires a positive total population".to_string(),
            ));
        }
        let probs = data.total().iter().map(|&t| t / total_sum).collect();
        let group_sum = data.group_sum();
        Ok(Self {
            probs,
            n_group: group_sum.round() as u64,
            n_complement: (total_sum - group_sum).round().max(0.0) as u64,
        })
    }

    fn draw(&self, rng: &mut StdRng) -> Result<(Vec<f64>, Vec<f64>)> {
        let focal = null::multinomial(rng, self.n_group, &self.probs)?;
        let complement = null::multinomial(rng, self.n_complement, &self.probs)?;
        let group: Vec<f64> = focal.iter().map(|&v| v as f64).collect();
        let total: Vec<f64> = focal
            .iter()
            .zip(&complement)
            .map(|(&f, &c)| (f + c) as f64)
            .collect();
        Ok((group, total))
    }
}

/// Precomputed inputs of the evenness null model
///
/// Each unit draws its group count from a binomial with the unit's total
/// population as trials and the global focal-group rate as success
/// probability; totals stay fixed.
struct EvennessPlan {
    trials: Vec<u64>,
    p_null: f64,
}

impl EvennessPlan {
    fn new(data: &SingleGroupData) -> Result<Self> {
        let total_sum = data.total_sum();
        if total_sum <= 0.0 {
            return Err(Error::Computation(
                "evenness null model requires a positive total population".to_string(),
            ));
        }
        Ok(Self {
            trials: data.total().iter().map(|&t| t.round() as u64).collect(),
            p_null: data.group_sum() / total_sum,
        })
    }

    fn draw(&self, rng: &mut StdRng) -> Result<Vec<f64>> {
        self.trials
            .iter()
            .map(|&t| null::binomial(rng, t, self.p_null).map(|v| v as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seg_core::{IndexLabel, MultiGroupData, MultiGroupIndex, SingleGroupIndex};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct GroupSum;

    impl SingleGroupIndex for GroupSum {
        fn label(&self) -> IndexLabel {
            IndexLabel("GroupSum")
        }

        fn evaluate(&self, data: &SingleGroupData) -> Result<f64> {
            Ok(data.group_sum())
        }
    }

    struct TotalSum;

    impl SingleGroupIndex for TotalSum {
        fn label(&self) -> IndexLabel {
            IndexLabel("TotalSum")
        }

        fn evaluate(&self, data: &SingleGroupData) -> Result<f64> {
            Ok(data.total_sum())
        }
    }

    struct Dissim;

    impl SingleGroupIndex for Dissim {
        fn label(&self) -> IndexLabel {
            IndexLabel("Dissim")
        }

        fn evaluate(&self, data: &SingleGroupData) -> Result<f64> {
            let group_sum = data.group_sum();
            let complement_sum = data.total_sum() - group_sum;
            let statistic = data
                .group()
                .iter()
                .zip(data.total())
                .map(|(&g, &t)| (g / group_sum - (t - g) / complement_sum).abs())
                .sum::<f64>()
                / 2.0;
            Ok(statistic)
        }
    }

    /// Returns NaN on exactly one evaluation, counting calls across the run
    struct FlakyIndex {
        calls: AtomicUsize,
        nan_on_call: usize,
    }

    impl SingleGroupIndex for FlakyIndex {
        fn label(&self) -> IndexLabel {
            IndexLabel("Flaky")
        }

        fn evaluate(&self, data: &SingleGroupData) -> Result<f64> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == self.nan_on_call {
                Ok(f64::NAN)
            } else {
                Ok(data.group_sum())
            }
        }
    }

    struct RowCount;

    impl MultiGroupIndex for RowCount {
        fn label(&self) -> IndexLabel {
            IndexLabel("RowCount")
        }

        fn evaluate(&self, data: &MultiGroupData) -> Result<f64> {
            Ok(data.grand_total())
        }
    }

    fn sample_data() -> SingleGroupData {
        SingleGroupData::new(
            vec![10.0, 40.0, 5.0, 25.0, 20.0],
            vec![100.0, 100.0, 50.0, 50.0, 80.0],
        )
        .unwrap()
    }

    fn spatial_sample_data() -> SingleGroupData {
        sample_data()
            .with_sites((0..5).map(|i| Site::new(i as f64, 0.0)).collect())
            .unwrap()
    }

    fn single_result<I: SingleGroupIndex + 'static>(
        index: I,
        data: SingleGroupData,
    ) -> IndexResult {
        SingleGroupResult::compute(Arc::new(index), data)
            .unwrap()
            .into()
    }

    #[test]
    fn test_systematic_preserves_group_and_total_mass() {
        let result = single_result(GroupSum, sample_data());
        let outcome = SingleValueTest::new(SingleNullApproach::Systematic)
            .with_iterations(20)
            .with_seed(11)
            .run(&result)
            .unwrap();
        // every multinomial draw redistributes exactly the observed group mass
        assert!(outcome.null_sample.iter().all(|&v| v == 100.0));

        let result = single_result(TotalSum, sample_data());
        let outcome = SingleValueTest::new(SingleNullApproach::Systematic)
            .with_iterations(20)
            .with_seed(11)
            .run(&result)
            .unwrap();
        assert!(outcome.null_sample.iter().all(|&v| v == 380.0));
    }

    #[test]
    fn test_evenness_keeps_totals_fixed() {
        let result = single_result(TotalSum, sample_data());
        let outcome = SingleValueTest::new(SingleNullApproach::Evenness)
            .with_iterations(20)
            .with_seed(3)
            .run(&result)
            .unwrap();
        assert!(outcome.null_sample.iter().all(|&v| v == 380.0));
    }

    #[test]
    fn test_bootstrap_deterministic_given_seed() {
        let result = single_result(Dissim, sample_data());
        let test = SingleValueTest::new(SingleNullApproach::Bootstrap)
            .with_iterations(50)
            .with_seed(42);
        let first = test.run(&result).unwrap();
        let second = test.run(&result).unwrap();
        assert_eq!(first.null_sample, second.null_sample);
        assert_eq!(first.p_value, second.p_value);
        assert!((0.0..=1.0).contains(&first.p_value));
    }

    #[test]
    fn test_permutation_of_aspatial_index_is_invariant() {
        let result = single_result(Dissim, spatial_sample_data());
        let point = result.statistic();
        let outcome = SingleValueTest::new(SingleNullApproach::Permutation)
            .with_iterations(10)
            .with_seed(7)
            .run(&result)
            .unwrap();
        // Dissim ignores sites, so shuffling them reproduces the statistic
        assert!(outcome.null_sample.iter().all(|&v| v == point));
        assert_eq!(outcome.p_value, 0.0);
    }

    #[test]
    fn test_permutation_family_requires_sites() {
        let result = single_result(Dissim, sample_data());
        for approach in [
            SingleNullApproach::Permutation,
            SingleNullApproach::SystematicPermutation,
            SingleNullApproach::EvenPermutation,
        ] {
            let err = SingleValueTest::new(approach)
                .with_iterations(5)
                .with_seed(0)
                .run(&result)
                .unwrap_err();
            assert!(matches!(err, Error::MissingSites(_)));
        }
    }

    #[test]
    fn test_permutation_variants_run_on_spatial_data() {
        let result = single_result(Dissim, spatial_sample_data());
        for approach in [
            SingleNullApproach::SystematicPermutation,
            SingleNullApproach::EvenPermutation,
        ] {
            let outcome = SingleValueTest::new(approach)
                .with_iterations(10)
                .with_seed(5)
                .run(&result)
                .unwrap();
            assert_eq!(outcome.null_sample.len(), 10);
            assert!((0.0..=1.0).contains(&outcome.p_value));
        }
    }

    #[test]
    fn test_one_flaky_round_is_dropped() {
        // call 0 is the point-estimate evaluation inside compute()
        let flaky = FlakyIndex {
            calls: AtomicUsize::new(0),
            nan_on_call: 3,
        };
        let result = single_result(flaky, sample_data());
        let outcome = SingleValueTest::new(SingleNullApproach::Bootstrap)
            .with_iterations(8)
            .with_seed(1)
            .run(&result)
            .unwrap();
        assert_eq!(outcome.null_sample.len(), 7);
        assert!((0.0..=1.0).contains(&outcome.p_value));
    }

    #[test]
    fn test_all_rounds_degenerate_is_fatal() {
        // Dissim divides by the group sum, so an all-zero group column makes
        // every bootstrap round NaN
        let data = SingleGroupData::new(vec![0.0, 0.0], vec![10.0, 10.0]).unwrap();
        let result = single_result(Dissim, data);
        let err = SingleValueTest::new(SingleNullApproach::Bootstrap)
            .with_iterations(5)
            .with_seed(2)
            .run(&result)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateNull(_)));
    }

    #[test]
    fn test_one_tailed_uses_requested_iterations() {
        let result = single_result(Dissim, sample_data());
        let outcome = SingleValueTest::new(SingleNullApproach::Bootstrap)
            .with_iterations(40)
            .two_tailed(false)
            .with_seed(13)
            .run(&result)
            .unwrap();
        assert!((0.0..=1.0).contains(&outcome.p_value));
        let above = outcome
            .null_sample
            .iter()
            .filter(|&&v| v > outcome.point_estimate)
            .count();
        assert_eq!(outcome.p_value, above as f64 / 40.0);
    }

    #[test]
    fn test_multigroup_support_matrix() {
        let data = MultiGroupData::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![10.0, 5.0, 5.0],
                vec![2.0, 8.0, 10.0],
                vec![7.0, 7.0, 6.0],
            ],
        )
        .unwrap();
        let result: IndexResult = MultiGroupResult::compute(Arc::new(RowCount), data)
            .unwrap()
            .into();

        for approach in [
            SingleNullApproach::Systematic,
            SingleNullApproach::Permutation,
            SingleNullApproach::SystematicPermutation,
            SingleNullApproach::EvenPermutation,
        ] {
            let err = SingleValueTest::new(approach)
                .with_iterations(5)
                .with_seed(0)
                .run(&result)
                .unwrap_err();
            assert!(matches!(err, Error::UnsupportedNullModel { .. }));
        }

        // evenness redistributes counts but keeps row totals
        let outcome = SingleValueTest::new(SingleNullApproach::Evenness)
            .with_iterations(10)
            .with_seed(21)
            .run(&result)
            .unwrap();
        assert!(outcome.null_sample.iter().all(|&v| v == 60.0));

        let outcome = SingleValueTest::new(SingleNullApproach::Bootstrap)
            .with_iterations(10)
            .with_seed(21)
            .run(&result)
            .unwrap();
        assert_eq!(outcome.null_sample.len(), 10);
    }

    #[test]
    #[should_panic(expected = "iterations must be positive")]
    fn test_zero_iterations_rejected() {
        let _ = SingleValueTest::new(SingleNullApproach::Bootstrap).with_iterations(0);
    }
}
