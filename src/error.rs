//! Error types for edgereg.

use ndarray::ShapeError;
use thiserror::Error;

/// Result type alias for edgereg operations.
pub type Result<T> = std::result::Result<T, EdgeregError>;

/// Errors that can occur while building datasets, folds, or evaluating the objective.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EdgeregError {
    /// Invalid input data.
    #[error("Invalid input data: {0}")]
    InvalidInput(String),
    /// Invalid parameter value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The hyperparameter vector does not match the searched-weight layout.
    #[error("Hyperparameter vector has length {actual}, expected {expected}")]
    ParameterLength { expected: usize, actual: usize },
    /// Inconsistent or degenerate fold partition.
    #[error("Invalid cross-validation set: {0}")]
    InvalidCvSet(String),
    /// Shape mismatch in arrays.
    #[error("Shape mismatch: expected {expected_shape}, got {actual_shape}")]
    ShapeMismatch {
        expected_shape: String,
        actual_shape: String,
    },
    /// A fit produced non-finite or otherwise unusable numbers.
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// The inner solver hit its iteration limit.
    #[error("Solver did not converge after {iterations} iterations (last change {last_change:e})")]
    ConvergenceError { iterations: usize, last_change: f64 },
    /// A generic error from the argmin crate.
    #[error("Argmin error: {0}")]
    ArgminError(String),
}

impl From<argmin::core::Error> for EdgeregError {
    fn from(err: argmin::core::Error) -> Self {
        // Crate errors raised inside a cost evaluation come back wrapped.
        match err.downcast::<EdgeregError>() {
            Ok(inner) => inner,
            Err(other) => EdgeregError::ArgminError(other.to_string()),
        }
    }
}

impl From<ShapeError> for EdgeregError {
    fn from(err: ShapeError) -> Self {
        EdgeregError::ShapeMismatch {
            expected_shape: "unknown".to_string(),
            actual_shape: err.to_string(),
        }
    }
}
