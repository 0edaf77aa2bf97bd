//! Core building blocks for segregation inference
//!
//! This crate provides the pieces shared by the inference and decomposition
//! engines:
//!
//! - **Data model**: validated single-group and multigroup population
//!   datasets with optional spatial identity per unit
//! - **Index contract**: evaluator traits through which external index
//!   formulas are consumed, plus tagged result variants
//! - **Counterfactual generator**: CDF-matching construction of synthetic
//!   population columns for two datasets
//! - **Progress observation**: an optional observer for long simulation runs
//!
//! # Overview
//!
//! Index formulas themselves live outside this workspace. A formula
//! implements [`SingleGroupIndex`] or [`MultiGroupIndex`] and is carried on
//! the result it produced, so engines can re-evaluate it against synthetic
//! datasets without any string-based type inspection.
//!
//! # Examples
//!
//! ```rust
//! use seg_core::{generate_counterfactual, CounterfactualApproach, SingleGroupData};
//!
//! let city_a = SingleGroupData::new(vec![10.0, 40.0], vec![100.0, 100.0]).unwrap();
//! let city_b = SingleGroupData::new(vec![25.0, 25.0], vec![50.0, 50.0]).unwrap();
//!
//! let (cf_a, cf_b) =
//!     generate_counterfactual(&city_a, &city_b, CounterfactualApproach::Composition).unwrap();
//! assert_eq!(cf_a.counterfactual_total(), city_a.total());
//! assert_eq!(cf_b.counterfactual_total(), city_b.total());
//! ```

mod counterfactual;
mod data;
mod error;
mod index;
pub mod math;
mod progress;

// Re-exports
pub use counterfactual::{generate_counterfactual, CounterfactualApproach, CounterfactualData};
pub use data::{MultiGroupData, SingleGroupData, Site};
pub use error::{Error, Result};
pub use index::{
    IndexLabel, IndexResult, MultiGroupIndex, MultiGroupResult, SingleGroupIndex,
    SingleGroupResult,
};
pub use progress::{NoProgress, ProgressSink, TracingProgress};
