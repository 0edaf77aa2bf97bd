//! Shapley decomposition of segregation differences
//!
//! Splits the difference between two statistics of the same single-group
//! index into a spatial component and an attribute component, using
//! counterfactual datasets built by CDF matching. The two components add up
//! to the observed difference by construction.
//!
//! # Examples
//!
//! ```rust,ignore
//! use seg_core::CounterfactualApproach;
//! use seg_decompose::decompose;
//!
//! let decomposition = decompose(&city_a, &city_b, CounterfactualApproach::Composition)?;
//! println!(
//!     "spatial {:.4}, attribute {:.4}",
//!     decomposition.spatial_component(),
//!     decomposition.attribute_component()
//! );
//! ```

mod decompose;

pub use decompose::{decompose, CrossStatistics, Decomposition};
