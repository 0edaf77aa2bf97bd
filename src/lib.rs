//! Simulation-based inference and Shapley decomposition for segregation
//! indices
//!
//! This facade re-exports the workspace crates:
//!
//! - [`core`]: datasets, the index evaluator contract, counterfactual
//!   generation
//! - [`inference`]: single-sample and two-sample significance tests against
//!   simulated null distributions
//! - [`decompose`]: Shapley decomposition of a segregation difference into
//!   spatial and attribute components
//!
//! # Examples
//!
//! ```rust
//! use seg_stats::core::{SingleGroupData, SingleGroupIndex, SingleGroupResult, IndexLabel};
//! use seg_stats::inference::{SingleNullApproach, SingleValueTest};
//! use std::sync::Arc;
//!
//! struct GroupShare;
//!
//! impl SingleGroupIndex for GroupShare {
//!     fn label(&self) -> IndexLabel {
//!         IndexLabel("GroupShare")
//!     }
//!
//!     fn evaluate(&self, data: &SingleGroupData) -> seg_stats::core::Result<f64> {
//!         Ok(data.group_sum() / data.total_sum())
//!     }
//! }
//!
//! let data = SingleGroupData::new(vec![10.0, 40.0], vec![100.0, 100.0]).unwrap();
//! let result = SingleGroupResult::compute(Arc::new(GroupShare), data).unwrap().into();
//!
//! let outcome = SingleValueTest::new(SingleNullApproach::Bootstrap)
//!     .with_iterations(100)
//!     .with_seed(42)
//!     .run(&result)
//!     .unwrap();
//! assert!((0.0..=1.0).contains(&outcome.p_value));
//! ```

pub use seg_core as core;
pub use seg_decompose as decompose;
pub use seg_inference as inference;

// Flat re-exports of the types most call sites touch
pub use seg_core::{
    CounterfactualApproach, Error, IndexLabel, IndexResult, MultiGroupData, MultiGroupIndex,
    MultiGroupResult, Result, SingleGroupData, SingleGroupIndex, SingleGroupResult, Site,
};
pub use seg_decompose::{decompose, CrossStatistics, Decomposition};
pub use seg_inference::{
    CompareNullApproach, InferenceResult, SingleNullApproach, SingleValueTest, TwoValueTest,
};
