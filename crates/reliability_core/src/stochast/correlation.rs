//! Correlation between stochasts in u-space.
//!
//! Given independent standard normal values `u`, correlated values are
//!
//! ```text
//! c = L · u,    C = L · Lᵀ
//! ```
//!
//! where `L` is the lower triangular Cholesky factor of the correlation
//! matrix `C`. Pairs with `|ρ| = 1` are not part of the factorisation: the
//! dependent stochast copies (or negates) the value of its master.
//!
//! The factors are computed on first use and cached until the matrix changes.

use crate::math::linalg::Matrix;
use crate::types::{format_value, ReliabilityError, Result};
use std::sync::OnceLock;

/// Tolerance on `|ρ| = 1` and on the unit diagonal.
const FULL_CORRELATION_TOLERANCE: f64 = 1e-12;

/// Cholesky factors of the non-dependent part of a correlation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactors {
    /// Indices (into the full matrix) covered by the factorisation
    pub indices: Vec<usize>,
    /// Lower triangular factor `L`
    pub lower: Matrix,
    /// Inverse of `L`
    pub inverse_lower: Matrix,
}

/// Symmetric correlation matrix with unit diagonal.
///
/// # Examples
/// ```
/// use reliability_core::stochast::CorrelationMatrix;
///
/// let mut correlation = CorrelationMatrix::new(2);
/// correlation.set_correlation(0, 1, 0.5).unwrap();
///
/// let c = correlation.apply_correlation(&[1.0, 0.0]).unwrap();
/// assert!((c[1] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    values: Matrix,
    factors: OnceLock<std::result::Result<CholeskyFactors, ReliabilityError>>,
}

impl CorrelationMatrix {
    /// Uncorrelated matrix of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            values: Matrix::identity(dim),
            factors: OnceLock::new(),
        }
    }

    /// Builds a correlation matrix from a full square matrix.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` for a non-square matrix
    /// - `InvalidArgument` for a diagonal other than 1, asymmetry, or values
    ///   outside [-1, 1]
    pub fn from_matrix(values: Matrix) -> Result<Self> {
        if !values.is_square() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "correlation matrix must be square, got {}x{}",
                values.rows(),
                values.cols()
            )));
        }
        let n = values.rows();
        for i in 0..n {
            if (values[(i, i)] - 1.0).abs() > FULL_CORRELATION_TOLERANCE {
                return Err(ReliabilityError::InvalidArgument(format!(
                    "diagonal element {} of correlation matrix is {}, expected 1",
                    i,
                    format_value(values[(i, i)])
                )));
            }
            for j in (i + 1)..n {
                if (values[(i, j)] - values[(j, i)]).abs() > FULL_CORRELATION_TOLERANCE {
                    return Err(ReliabilityError::InvalidArgument(format!(
                        "correlation matrix is not symmetric at ({}, {})",
                        i, j
                    )));
                }
                check_range(i, j, values[(i, j)])?;
            }
        }
        Ok(Self {
            values,
            factors: OnceLock::new(),
        })
    }

    /// Dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.values.rows()
    }

    /// Correlation between `i` and `j`; 0 outside the matrix.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values.get(i, j).unwrap_or(0.0)
    }

    /// Sets the correlation of the pair `(i, j)` symmetrically.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` for an index outside the matrix
    /// - `InvalidArgument` for `i == j` with a value other than 1, or a
    ///   value outside [-1, 1]
    pub fn set_correlation(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        self.values.get(i, j)?;
        if i == j {
            if (value - 1.0).abs() > FULL_CORRELATION_TOLERANCE {
                return Err(ReliabilityError::InvalidArgument(format!(
                    "self correlation of stochast {} must be 1, got {}",
                    i,
                    format_value(value)
                )));
            }
            return Ok(());
        }
        check_range(i, j, value)?;
        self.values.set(i, j, value)?;
        self.values.set(j, i, value)?;
        self.factors = OnceLock::new();
        Ok(())
    }

    /// True when all off-diagonal values are zero.
    pub fn is_identity(&self) -> bool {
        let n = self.dim();
        (0..n).all(|i| (0..n).all(|j| i == j || self.values[(i, j)] == 0.0))
    }

    /// For every index, its master and sign when it is fully correlated with
    /// an earlier index.
    pub fn dependencies(&self) -> Vec<Option<(usize, f64)>> {
        let n = self.dim();
        let mut dependencies: Vec<Option<(usize, f64)>> = vec![None; n];
        for j in 0..n {
            for i in 0..j {
                let rho = self.values[(i, j)];
                if dependencies[i].is_none() && (rho.abs() - 1.0).abs() <= FULL_CORRELATION_TOLERANCE
                {
                    dependencies[j] = Some((i, rho.signum()));
                    break;
                }
            }
        }
        dependencies
    }

    /// Cholesky factors of the non-dependent part, computed once.
    ///
    /// # Errors
    ///
    /// `NotPositiveDefinite` when the remaining matrix cannot be factorised.
    pub fn factors(&self) -> Result<&CholeskyFactors> {
        self.factors
            .get_or_init(|| self.compute_factors())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn compute_factors(&self) -> Result<CholeskyFactors> {
        let indices: Vec<usize> = self
            .dependencies()
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_none())
            .map(|(i, _)| i)
            .collect();

        let reduced = Matrix::from_rows(
            indices
                .iter()
                .map(|&i| indices.iter().map(|&j| self.values[(i, j)]).collect())
                .collect(),
        )?;
        let lower = reduced.cholesky()?;
        let inverse_lower = if indices.is_empty() {
            lower.clone()
        } else {
            lower.inverse()?
        };
        Ok(CholeskyFactors {
            indices,
            lower,
            inverse_lower,
        })
    }

    /// Maps independent standard normal values to correlated ones.
    ///
    /// Entries of dependent indices in `u` are ignored.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `u` does not match the dimension, or the
    /// factorisation error.
    pub fn apply_correlation(&self, u: &[f64]) -> Result<Vec<f64>> {
        self.check_len(u.len())?;
        if self.is_identity() {
            return Ok(u.to_vec());
        }
        let factors = self.factors()?;
        let reduced: Vec<f64> = factors.indices.iter().map(|&i| u[i]).collect();
        let correlated = factors.lower.matvec_slice(&reduced)?;

        let mut result = vec![0.0; u.len()];
        for (&i, value) in factors.indices.iter().zip(correlated) {
            result[i] = value;
        }
        for (j, dependency) in self.dependencies().into_iter().enumerate() {
            if let Some((master, sign)) = dependency {
                result[j] = sign * result[master];
            }
        }
        Ok(result)
    }

    /// Maps correlated standard normal values back to independent ones.
    ///
    /// Dependent indices get 0.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `correlated` does not match the dimension, or
    /// the factorisation error.
    pub fn remove_correlation(&self, correlated: &[f64]) -> Result<Vec<f64>> {
        self.check_len(correlated.len())?;
        if self.is_identity() {
            return Ok(correlated.to_vec());
        }
        let factors = self.factors()?;
        let reduced: Vec<f64> = factors.indices.iter().map(|&i| correlated[i]).collect();
        let independent = factors.inverse_lower.matvec_slice(&reduced)?;

        let mut result = vec![0.0; correlated.len()];
        for (&i, value) in factors.indices.iter().zip(independent) {
            result[i] = value;
        }
        Ok(result)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.dim() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "vector of length {} for correlation matrix of dimension {}",
                len,
                self.dim()
            )));
        }
        Ok(())
    }
}

fn check_range(i: usize, j: usize, value: f64) -> Result<()> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(ReliabilityError::InvalidArgument(format!(
            "correlation at ({}, {}) is {}, must be in [-1, 1]",
            i,
            j,
            format_value(value)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_passthrough() {
        let correlation = CorrelationMatrix::new(3);
        assert!(correlation.is_identity());
        let u = [0.3, -1.0, 2.0];
        assert_eq!(correlation.apply_correlation(&u).unwrap(), u.to_vec());
    }

    #[test]
    fn test_apply_and_remove_roundtrip() {
        let mut correlation = CorrelationMatrix::new(3);
        correlation.set_correlation(0, 1, 0.6).unwrap();
        correlation.set_correlation(1, 2, -0.3).unwrap();
        let u = [0.5, -1.2, 0.8];
        let c = correlation.apply_correlation(&u).unwrap();
        let back = correlation.remove_correlation(&c).unwrap();
        for (a, b) in u.iter().zip(&back) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_factors_are_cached_and_reset() {
        let mut correlation = CorrelationMatrix::new(2);
        correlation.set_correlation(0, 1, 0.5).unwrap();
        let first = correlation.factors().unwrap() as *const CholeskyFactors;
        let second = correlation.factors().unwrap() as *const CholeskyFactors;
        assert_eq!(first, second);

        correlation.set_correlation(0, 1, 0.2).unwrap();
        assert_abs_diff_eq!(
            correlation.factors().unwrap().lower[(1, 0)],
            0.2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fully_correlated_pair() {
        let mut correlation = CorrelationMatrix::new(3);
        correlation.set_correlation(0, 2, -1.0).unwrap();
        assert_eq!(correlation.dependencies(), vec![None, None, Some((0, -1.0))]);

        let c = correlation.apply_correlation(&[1.5, 0.2, 9.0]).unwrap();
        assert_eq!(c, vec![1.5, 0.2, -1.5]);

        let back = correlation.remove_correlation(&c).unwrap();
        assert_eq!(back, vec![1.5, 0.2, 0.0]);
    }

    #[test]
    fn test_invalid_values() {
        let mut correlation = CorrelationMatrix::new(2);
        assert!(correlation.set_correlation(0, 1, 1.5).is_err());
        assert!(correlation.set_correlation(0, 0, 0.5).is_err());
        assert!(matches!(
            correlation.set_correlation(0, 2, 0.5),
            Err(ReliabilityError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_not_positive_definite() {
        let mut correlation = CorrelationMatrix::new(3);
        correlation.set_correlation(0, 1, 0.9).unwrap();
        correlation.set_correlation(0, 2, 0.9).unwrap();
        correlation.set_correlation(1, 2, -0.9).unwrap();
        assert!(matches!(
            correlation.apply_correlation(&[1.0, 1.0, 1.0]),
            Err(ReliabilityError::NotPositiveDefinite(_))
        ));
    }

    #[test]
    fn test_from_matrix_validation() {
        let asymmetric = Matrix::from_rows(vec![vec![1.0, 0.2], vec![0.3, 1.0]]).unwrap();
        assert!(CorrelationMatrix::from_matrix(asymmetric).is_err());

        let valid = Matrix::from_rows(vec![vec![1.0, 0.2], vec![0.2, 1.0]]).unwrap();
        let correlation = CorrelationMatrix::from_matrix(valid).unwrap();
        assert_eq!(correlation.get(1, 0), 0.2);
    }
}
