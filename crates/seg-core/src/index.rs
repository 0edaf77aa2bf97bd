//! Index formula contract and computed index results
//!
//! Index formulas live outside this workspace; the engines consume them
//! through the evaluator traits below. A formula must be deterministic given
//! identical inputs, and is expected to yield a non-finite statistic (rather
//! than fail) on numerically degenerate data such as zero-total units.

use crate::{MultiGroupData, Result, SingleGroupData};
use std::fmt;
use std::sync::Arc;

/// Explicit tag identifying an index formula
///
/// Set at construction by each evaluator and used for compatibility checks
/// and labeling, never derived from type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexLabel(pub &'static str);

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A single-group segregation index formula
pub trait SingleGroupIndex: Send + Sync {
    /// Tag identifying this formula
    fn label(&self) -> IndexLabel;

    /// Evaluate the statistic on a dataset
    fn evaluate(&self, data: &SingleGroupData) -> Result<f64>;
}

/// A multigroup segregation index formula
pub trait MultiGroupIndex: Send + Sync {
    /// Tag identifying this formula
    fn label(&self) -> IndexLabel;

    /// Evaluate the statistic on a dataset
    fn evaluate(&self, data: &MultiGroupData) -> Result<f64>;
}

/// Computed result of a single-group index
#[derive(Clone)]
pub struct SingleGroupResult {
    statistic: f64,
    data: SingleGroupData,
    index: Arc<dyn SingleGroupIndex>,
}

impl SingleGroupResult {
    /// Evaluate the formula on the dataset and keep both alongside the result
    pub fn compute(index: Arc<dyn SingleGroupIndex>, data: SingleGroupData) -> Result<Self> {
        let statistic = index.evaluate(&data)?;
        Ok(Self {
            statistic,
            data,
            index,
        })
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn data(&self) -> &SingleGroupData {
        &self.data
    }

    pub fn index(&self) -> &Arc<dyn SingleGroupIndex> {
        &self.index
    }

    pub fn label(&self) -> IndexLabel {
        self.index.label()
    }
}

impl fmt::Debug for SingleGroupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleGroupResult")
            .field("label", &self.label())
            .field("statistic", &self.statistic)
            .field("n_units", &self.data.n_units())
            .finish()
    }
}

/// Computed result of a multigroup index
#[derive(Clone)]
pub struct MultiGroupResult {
    statistic: f64,
    data: MultiGroupData,
    index: Arc<dyn MultiGroupIndex>,
}

impl MultiGroupResult {
    /// Evaluate the formula on the dataset and keep both alongside the result
    pub fn compute(index: Arc<dyn MultiGroupIndex>, data: MultiGroupData) -> Result<Self> {
        let statistic = index.evaluate(&data)?;
        Ok(Self {
            statistic,
            data,
            index,
        })
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn data(&self) -> &MultiGroupData {
        &self.data
    }

    pub fn index(&self) -> &Arc<dyn MultiGroupIndex> {
        &self.index
    }

    pub fn label(&self) -> IndexLabel {
        self.index.label()
    }
}

impl fmt::Debug for MultiGroupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiGroupResult")
            .field("label", &self.label())
            .field("statistic", &self.statistic)
            .field("n_units", &self.data.n_units())
            .finish()
    }
}

/// Tagged variant over the two index result classes
///
/// The null-model support matrix is keyed on this variant, so unsupported
/// combinations are an exhaustiveness problem rather than a runtime type
/// inspection.
#[derive(Debug, Clone)]
pub enum IndexResult {
    SingleGroup(SingleGroupResult),
    MultiGroup(MultiGroupResult),
}

impl IndexResult {
    pub fn statistic(&self) -> f64 {
        match self {
            IndexResult::SingleGroup(r) => r.statistic(),
            IndexResult::MultiGroup(r) => r.statistic(),
        }
    }

    pub fn label(&self) -> IndexLabel {
        match self {
            IndexResult::SingleGroup(r) => r.label(),
            IndexResult::MultiGroup(r) => r.label(),
        }
    }

    /// Index class name, for diagnostics
    pub fn class_name(&self) -> &'static str {
        match self {
            IndexResult::SingleGroup(_) => "single-group",
            IndexResult::MultiGroup(_) => "multigroup",
        }
    }

    /// Whether two results were built from the same index formula
    pub fn compatible_with(&self, other: &IndexResult) -> bool {
        matches!(
            (self, other),
            (IndexResult::SingleGroup(_), IndexResult::SingleGroup(_))
                | (IndexResult::MultiGroup(_), IndexResult::MultiGroup(_))
        ) && self.label() == other.label()
    }
}

impl From<SingleGroupResult> for IndexResult {
    fn from(result: SingleGroupResult) -> Self {
        IndexResult::SingleGroup(result)
    }
}

impl From<MultiGroupResult> for IndexResult {
    fn from(result: MultiGroupResult) -> Self {
        IndexResult::MultiGroup(result)
    }
}
