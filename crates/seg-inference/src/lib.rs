//! Simulation-based inference for segregation indices
//!
//! Two engines are provided:
//!
//! - [`SingleValueTest`]: is one observed index statistic distinguishable
//!   from a chosen null model of no systematic segregation?
//! - [`TwoValueTest`]: is the difference between two statistics of the same
//!   index distinguishable from a null in which the datasets are
//!   exchangeable?
//!
//! Both engines rebuild the input dataset under the null, re-evaluate the
//! index formula carried on the result, and report a pseudo p-value next to
//! the full simulated null sample. Runs are reproducible given a seed; each
//! round draws from its own RNG stream, so results do not depend on whether
//! the `parallel` feature is enabled.
//!
//! # Examples
//!
//! ```rust,ignore
//! use seg_inference::{SingleNullApproach, SingleValueTest};
//!
//! let outcome = SingleValueTest::new(SingleNullApproach::Systematic)
//!     .with_iterations(1000)
//!     .with_seed(42)
//!     .run(&index_result)?;
//! println!("p = {:.4}", outcome.p_value);
//! ```

mod compare;
mod driver;
mod null;
mod pvalue;
mod single;
mod types;

pub use compare::TwoValueTest;
pub use single::SingleValueTest;
pub use types::{CompareNullApproach, InferenceResult, SingleNullApproach};
