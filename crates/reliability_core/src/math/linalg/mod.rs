//! Dense linear algebra.
//!
//! - [`Matrix`]: row-major matrix with Cholesky, Gauss-Jordan inverse and
//!   Householder QR
//! - [`Vector`]: one-dimensional vector with norm, normalisation and dot
//! - [`least_squares`]: regression solve on top of the QR factors
//!
//! Dimension errors are reported as
//! [`ReliabilityError::DimensionMismatch`](crate::types::ReliabilityError).

mod matrix;
mod qr;
mod vector;

pub use matrix::Matrix;
pub use qr::{least_squares, QrDecomposition};
pub use vector::Vector;
