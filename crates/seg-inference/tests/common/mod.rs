//! Shared fixtures for integration tests

use seg_core::{
    IndexLabel, IndexResult, MultiGroupData, MultiGroupIndex, MultiGroupResult, Result,
    SingleGroupData, SingleGroupIndex, SingleGroupResult, Site,
};
use std::sync::Arc;

/// Classic index of dissimilarity for a single group
pub struct Dissim;

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

/// Multigroup dissimilarity
pub struct MultiDissim;

impl MultiGroupIndex for MultiDissim {
    fn label(&self) -> IndexLabel {
        IndexLabel("MultiDissim")
    }

    fn evaluate(&self, data: &MultiGroupData) -> Result<f64> {
        let grand_total = data.grand_total();
        let shares: Vec<f64> = data
            .column_sums()
            .iter()
            .map(|&s| s / grand_total)
            .collect();
        let spread: f64 = shares.iter().map(|&p| p * (1.0 - p)).sum();

        let mut deviation = 0.0;
        for unit in 0..data.n_units() {
            let row_total = data.row_total(unit);
            if row_total == 0.0 {
                continue;
            }
            for (j, &share) in shares.iter().enumerate() {
                let local_share = data.counts()[unit][j] / row_total;
                deviation += row_total * (local_share - share).abs();
            }
        }
        Ok(deviation / (2.0 * grand_total * spread))
    }
}

pub fn tract_data() -> SingleGroupData {
    SingleGroupData::new(
        vec![72.0, 18.0, 5.0, 40.0, 66.0, 12.0, 8.0, 31.0, 55.0, 9.0],
        vec![
            120.0, 90.0, 60.0, 110.0, 130.0, 80.0, 70.0, 100.0, 140.0, 60.0,
        ],
    )
    .unwrap()
}

pub fn spatial_tract_data() -> SingleGroupData {
    let sites = (0..10)
        .map(|i| Site::new((i % 5) as f64, (i / 5) as f64))
        .collect();
    tract_data().with_sites(sites).unwrap()
}

pub fn second_tract_data() -> SingleGroupData {
    SingleGroupData::new(
        vec![12.0, 25.0, 30.0, 7.0, 15.0, 44.0, 21.0, 9.0],
        vec![80.0, 90.0, 100.0, 60.0, 75.0, 120.0, 85.0, 70.0],
    )
    .unwrap()
}

pub fn dissim_result(data: SingleGroupData) -> IndexResult {
    SingleGroupResult::compute(Arc::new(Dissim), data)
        .unwrap()
        .into()
}

pub fn multi_tract_data() -> MultiGroupData {
    MultiGroupData::new(
        vec!["a".into(), "b".into(), "c".into()],
        vec![
            vec![40.0, 30.0, 50.0],
            vec![10.0, 60.0, 20.0],
            vec![25.0, 25.0, 25.0],
            vec![5.0, 45.0, 70.0],
            vec![33.0, 12.0, 15.0],
            vec![20.0, 20.0, 40.0],
        ],
    )
    .unwrap()
}

pub fn multi_dissim_result(data: MultiGroupData) -> IndexResult {
    MultiGroupResult::compute(Arc::new(MultiDissim), data)
        .unwrap()
        .into()
}
