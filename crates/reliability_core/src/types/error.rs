//! Error types for structured error handling.
//!
//! This module provides:
//! - `ReliabilityError`: fatal errors raised by the numerical primitives and
//!   the reliability methods (bad domain, bad dimensions, empty input, ...)
//! - `format_value`: the numeric formatting used inside error messages
//!
//! Non-convergence of an iterative method is *not* an error: it is reported
//! through [`ConvergenceReport`](super::ConvergenceReport) or a `success` flag
//! on the solver result.

use thiserror::Error;

/// Categorised reliability errors.
///
/// These are raised for malformed mathematical input and are expected to be
/// caught at the outer orchestration boundary, not recovered from.
///
/// # Examples
/// ```
/// use reliability_core::types::ReliabilityError;
///
/// let err = ReliabilityError::InvalidArgument("x < 0 (x = -1.0000)".to_string());
/// assert_eq!(format!("{}", err), "Invalid argument: x < 0 (x = -1.0000)");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReliabilityError {
    /// Argument outside the mathematical domain of an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An iterative primitive exhausted its iteration budget.
    #[error("No convergence: {0}")]
    NoConvergence(String),

    /// Cholesky decomposition failed.
    #[error("Matrix is not positive definite: {0}")]
    NotPositiveDefinite(String),

    /// Operand dimensions do not match.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Element access outside the matrix or vector bounds.
    #[error("Index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// A combiner or integration received no input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Unknown reliability method name.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Unknown distribution name.
    #[error("Unknown distribution: {0}")]
    UnknownDistribution(String),

    /// Distribution parameters outside their domain.
    #[error("Invalid distribution parameters: {0}")]
    InvalidParameters(String),

    /// The limit state model failed in a way that prevents any result.
    #[error("Model failure: {0}")]
    ModelFailure(String),
}

/// Result alias used throughout the reliability crates.
pub type Result<T> = std::result::Result<T, ReliabilityError>;

/// Formats a number for inclusion in an error message.
///
/// Four decimal places, or scientific notation when the magnitude exceeds 1e5.
///
/// # Examples
/// ```
/// use reliability_core::types::format_value;
///
/// assert_eq!(format_value(-1.0), "-1.0000");
/// assert_eq!(format_value(123456.0), "1.2346e5");
/// ```
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.abs() > 1e5 {
        format!("{:.4e}", value)
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_plain() {
        assert_eq!(format_value(0.5), "0.5000");
        assert_eq!(format_value(99999.0), "99999.0000");
    }

    #[test]
    fn test_format_value_scientific() {
        assert_eq!(format_value(-250000.0), "-2.5000e5");
    }

    #[test]
    fn test_format_value_infinite() {
        assert_eq!(format_value(f64::INFINITY), "inf");
    }

    #[test]
    fn test_error_display() {
        let err = ReliabilityError::IndexOutOfRange {
            row: 3,
            col: 0,
            rows: 2,
            cols: 2,
        };
        assert_eq!(format!("{}", err), "Index (3, 0) out of range for 2x2 matrix");

        let err = ReliabilityError::EmptyInput("no design points".to_string());
        assert!(format!("{}", err).contains("no design points"));
    }
}
