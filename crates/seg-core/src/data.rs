//! Tabular population data consumed by the inference and decomposition engines
//!
//! A dataset is a set of spatial units, each carrying population counts and an
//! optional spatial identity. All update operations return fresh values; the
//! baseline dataset handed to an engine is never observably mutated.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Spatial identity of a unit
///
/// The engines treat locations as opaque: they are shuffled by the
/// permutation-family null models and passed through to spatial index
/// formulas, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub x: f64,
    pub y: f64,
}

impl Site {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn check_column(values: &[f64], context: &str) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::non_finite(context));
    }
    if values.iter().any(|&v| v < 0.0) {
        return Err(Error::InvalidInput(format!(
            "{context} contains negative counts"
        )));
    }
    Ok(())
}

/// Core data of a single-group segregation index
///
/// Holds the focal-group population and total population per unit. Presence
/// of sites gates the permutation-family null models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleGroupData {
    group: Vec<f64>,
    total: Vec<f64>,
    sites: Option<Vec<Site>>,
}

impl SingleGroupData {
    /// Create a dataset from group and total population columns
    pub fn new(group: Vec<f64>, total: Vec<f64>) -> Result<Self> {
        if group.is_empty() {
            return Err(Error::empty_input());
        }
        if group.len() != total.len() {
            return Err(Error::size_mismatch(
                group.len(),
                total.len(),
                "total population column",
            ));
        }
        check_column(&group, "group population column")?;
        check_column(&total, "total population column")?;
        Ok(Self {
            group,
            total,
            sites: None,
        })
    }

    /// Attach spatial identities, one per unit
    pub fn with_sites(mut self, sites: Vec<Site>) -> Result<Self> {
        if sites.len() != self.group.len() {
            return Err(Error::size_mismatch(
                self.group.len(),
                sites.len(),
                "site column",
            ));
        }
        self.sites = Some(sites);
        Ok(self)
    }

    pub fn group(&self) -> &[f64] {
        &self.group
    }

    pub fn total(&self) -> &[f64] {
        &self.total
    }

    pub fn sites(&self) -> Option<&[Site]> {
        self.sites.as_deref()
    }

    pub fn n_units(&self) -> usize {
        self.group.len()
    }

    /// Whether units carry spatial identity
    pub fn is_spatial(&self) -> bool {
        self.sites.is_some()
    }

    pub fn group_sum(&self) -> f64 {
        self.group.iter().sum()
    }

    pub fn total_sum(&self) -> f64 {
        self.total.iter().sum()
    }

    /// New dataset with replaced population columns, keeping sites
    pub fn with_counts(&self, group: Vec<f64>, total: Vec<f64>) -> Result<Self> {
        let replaced = Self::new(group, total)?;
        match &self.sites {
            Some(sites) => replaced.with_sites(sites.clone()),
            None => Ok(replaced),
        }
    }

    /// New dataset with replaced sites, keeping population columns
    pub fn with_replaced_sites(&self, sites: Vec<Site>) -> Result<Self> {
        self.clone().with_sites(sites)
    }

    /// New dataset built from whole rows selected by index, with repetition
    pub fn resample(&self, indices: &[usize]) -> Self {
        Self {
            group: indices.iter().map(|&i| self.group[i]).collect(),
            total: indices.iter().map(|&i| self.total[i]).collect(),
            sites: self
                .sites
                .as_ref()
                .map(|s| indices.iter().map(|&i| s[i]).collect()),
        }
    }
}

/// Core data of a multigroup segregation index
///
/// Row-major count matrix: one row per unit, one column per group, with the
/// ordered group names carried alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiGroupData {
    groups: Vec<String>,
    counts: Vec<Vec<f64>>,
}

impl MultiGroupData {
    /// Create a dataset from group names and a row-major count matrix
    pub fn new(groups: Vec<String>, counts: Vec<Vec<f64>>) -> Result<Self> {
        if groups.is_empty() || counts.is_empty() {
            return Err(Error::empty_input());
        }
        for row in &counts {
            if row.len() != groups.len() {
                return Err(Error::size_mismatch(groups.len(), row.len(), "count row"));
            }
            check_column(row, "count row")?;
        }
        Ok(Self { groups, counts })
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    pub fn n_units(&self) -> usize {
        self.counts.len()
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Population total of one unit
    pub fn row_total(&self, unit: usize) -> f64 {
        self.counts[unit].iter().sum()
    }

    /// Per-group totals across all units
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.groups.len()];
        for row in &self.counts {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        sums
    }

    pub fn grand_total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }

    /// New dataset with a replaced count matrix, keeping group names
    pub fn with_counts(&self, counts: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(self.groups.clone(), counts)
    }

    /// New dataset built from whole rows selected by index, with repetition
    pub fn resample(&self, indices: &[usize]) -> Self {
        Self {
            groups: self.groups.clone(),
            counts: indices.iter().map(|&i| self.counts[i].clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group_construction() {
        let data = SingleGroupData::new(vec![1.0, 2.0], vec![5.0, 5.0]).unwrap();
        assert_eq!(data.n_units(), 2);
        assert!(!data.is_spatial());
        assert_eq!(data.group_sum(), 3.0);
        assert_eq!(data.total_sum(), 10.0);
    }

    #[test]
    fn test_single_group_rejects_bad_columns() {
        assert!(SingleGroupData::new(vec![], vec![]).is_err());
        assert!(SingleGroupData::new(vec![1.0], vec![1.0, 2.0]).is_err());
        assert!(SingleGroupData::new(vec![f64::NAN], vec![1.0]).is_err());
        assert!(SingleGroupData::new(vec![-1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_sites_length_checked() {
        let data = SingleGroupData::new(vec![1.0, 2.0], vec![5.0, 5.0]).unwrap();
        assert!(data.clone().with_sites(vec![Site::new(0.0, 0.0)]).is_err());
        let spatial = data
            .with_sites(vec![Site::new(0.0, 0.0), Site::new(1.0, 0.0)])
            .unwrap();
        assert!(spatial.is_spatial());
    }

    #[test]
    fn test_with_counts_keeps_sites() {
        let data = SingleGroupData::new(vec![1.0, 2.0], vec![5.0, 5.0])
            .unwrap()
            .with_sites(vec![Site::new(0.0, 0.0), Site::new(1.0, 0.0)])
            .unwrap();
        let replaced = data.with_counts(vec![3.0, 0.0], vec![4.0, 4.0]).unwrap();
        assert_eq!(replaced.group(), &[3.0, 0.0]);
        assert_eq!(replaced.sites(), data.sites());
    }

    #[test]
    fn test_resample_repeats_rows() {
        let data = SingleGroupData::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0])
            .unwrap()
            .with_sites(vec![
                Site::new(0.0, 0.0),
                Site::new(1.0, 0.0),
                Site::new(2.0, 0.0),
            ])
            .unwrap();
        let resampled = data.resample(&[2, 2, 0]);
        assert_eq!(resampled.group(), &[3.0, 3.0, 1.0]);
        assert_eq!(resampled.total(), &[6.0, 6.0, 4.0]);
        assert_eq!(resampled.sites().unwrap()[0], Site::new(2.0, 0.0));
        // baseline untouched
        assert_eq!(data.group(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_multigroup_construction() {
        let data = MultiGroupData::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(data.n_units(), 2);
        assert_eq!(data.n_groups(), 2);
        assert_eq!(data.row_total(1), 7.0);
        assert_eq!(data.column_sums(), vec![4.0, 6.0]);
        assert_eq!(data.grand_total(), 10.0);
    }

    #[test]
    fn test_multigroup_rejects_ragged_rows() {
        let err = MultiGroupData::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0]],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let data = SingleGroupData::new(vec![1.0, 2.0], vec![5.0, 5.0])
            .unwrap()
            .with_sites(vec![Site::new(0.0, 0.0), Site::new(1.0, 0.0)])
            .unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let back: SingleGroupData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
