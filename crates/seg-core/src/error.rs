//! Error types for segregation inference
//!
//! Provides a unified error type shared by all seg-stats crates.

use thiserror::Error;

/// Core error type for segregation statistics operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} units, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Two index results cannot be compared or decomposed together
    #[error("Incompatible indices: {0}")]
    IncompatibleIndices(String),

    /// Null model not implemented for the given index class
    #[error("Null approach '{model}' is not implemented for {index_class} indices")]
    UnsupportedNullModel {
        model: String,
        index_class: &'static str,
    },

    /// Permutation-family null model applied to data without spatial identity
    #[error("Null approach '{0}' requires spatial unit locations")]
    MissingSites(String),

    /// Every simulation round was dropped as non-finite
    #[error("Degenerate null distribution: {0}")]
    DegenerateNull(String),

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for empty input
    pub fn empty_input() -> Self {
        Self::InsufficientData {
            expected: 1,
            actual: 0,
        }
    }

    /// Create an error for column length mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::InvalidInput(format!("{context} contains NaN or infinite values"))
    }
}
