//! Householder QR decomposition and linear least squares.

use super::{Matrix, Vector};
use crate::types::{ReliabilityError, Result};

/// Result of a QR decomposition: `A = Q · R`.
#[derive(Debug, Clone, PartialEq)]
pub struct QrDecomposition {
    /// Upper-triangular factor (m×n)
    pub r: Matrix,
    /// Orthogonal factor (m×m)
    pub q: Matrix,
}

impl Matrix {
    /// Householder QR decomposition of an m×n matrix with `m - 1 >= n`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the matrix has too few rows.
    ///
    /// # Examples
    /// ```
    /// use reliability_core::math::linalg::Matrix;
    ///
    /// let a = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 2.0], vec![1.0, 3.0]]).unwrap();
    /// let qr = a.qr().unwrap();
    /// let back = qr.q.matmul(&qr.r).unwrap();
    /// assert!((back[(2, 1)] - 3.0).abs() < 1e-12);
    /// ```
    pub fn qr(&self) -> Result<QrDecomposition> {
        let (m, n) = (self.rows(), self.cols());
        if m < n + 1 {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "QR decomposition requires more rows than columns, got {}x{}",
                m, n
            )));
        }

        let mut r = self.clone();
        let mut q = Matrix::identity(m);

        for k in 0..n {
            let column: Vec<f64> = (k..m).map(|i| r[(i, k)]).collect();
            let norm = column.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm == 0.0 {
                continue;
            }
            let alpha = if column[0] > 0.0 { -norm } else { norm };

            let mut v = column;
            v[0] -= alpha;
            let v_norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            if v_norm == 0.0 {
                continue;
            }
            v.iter_mut().for_each(|x| *x /= v_norm);

            // R <- (I - 2vvᵀ) R on rows k..m
            for j in 0..n {
                let projection: f64 = (k..m).map(|i| v[i - k] * r[(i, j)]).sum();
                for i in k..m {
                    r[(i, j)] -= 2.0 * v[i - k] * projection;
                }
            }

            // Q <- Q (I - 2vvᵀ) on columns k..m
            for i in 0..m {
                let projection: f64 = (k..m).map(|j| q[(i, j)] * v[j - k]).sum();
                for j in k..m {
                    q[(i, j)] -= 2.0 * projection * v[j - k];
                }
            }

            for i in (k + 1)..m {
                r[(i, k)] = 0.0;
            }
        }

        Ok(QrDecomposition { r, q })
    }
}

/// Least squares solution of `A · x ≈ b` via QR.
///
/// # Errors
///
/// - `DimensionMismatch` when `b` does not match the rows of `A`, or `A` has
///   too few rows
/// - `InvalidArgument` when `A` is rank deficient
///
/// # Examples
/// ```
/// use reliability_core::math::linalg::{least_squares, Matrix, Vector};
///
/// // fit y = 1 + 2t through exact points
/// let a = Matrix::from_rows(vec![
///     vec![1.0, 0.0],
///     vec![1.0, 1.0],
///     vec![1.0, 2.0],
/// ]).unwrap();
/// let b = Vector::from(vec![1.0, 3.0, 5.0]);
/// let x = least_squares(&a, &b).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-10);
/// assert!((x[1] - 2.0).abs() < 1e-10);
/// ```
pub fn least_squares(a: &Matrix, b: &Vector) -> Result<Vector> {
    if a.rows() != b.len() {
        return Err(ReliabilityError::DimensionMismatch(format!(
            "least squares with {} rows and right-hand side of length {}",
            a.rows(),
            b.len()
        )));
    }
    let QrDecomposition { r, q } = a.qr()?;
    let qtb = q.transpose().matvec(b)?;

    let n = a.cols();
    let mut x = Vector::zeros(n);
    for i in (0..n).rev() {
        let diagonal = r[(i, i)];
        if diagonal.abs() < 1e-12 {
            return Err(ReliabilityError::InvalidArgument(format!(
                "matrix is rank deficient (column {})",
                i
            )));
        }
        let mut sum = qtb[i];
        for j in (i + 1)..n {
            sum -= r[(i, j)] * x[j];
        }
        x[i] = sum / diagonal;
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix {
        Matrix::from_rows(vec![
            vec![2.0, -1.0, 0.5],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 4.0],
            vec![1.0, 0.0, -2.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_qr_reconstructs() {
        let a = sample();
        let QrDecomposition { r, q } = a.qr().unwrap();
        let back = q.matmul(&r).unwrap();
        for i in 0..4 {
            for j in 0..3 {
                assert_abs_diff_eq!(back[(i, j)], a[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_q_orthogonal_r_upper() {
        let QrDecomposition { r, q } = sample().qr().unwrap();
        let qtq = q.transpose().matmul(&q).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(qtq[(i, j)], expected, epsilon = 1e-12);
            }
        }
        for i in 1..4 {
            for j in 0..i.min(3) {
                assert_eq!(r[(i, j)], 0.0);
            }
        }
    }

    #[test]
    fn test_qr_too_few_rows() {
        let a = Matrix::identity(3);
        assert!(matches!(
            a.qr(),
            Err(ReliabilityError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_least_squares_regression() {
        // y = 0.5 + 1.5 t with symmetric noise, exact fit of the mean line
        let ts = [0.0, 1.0, 2.0, 3.0];
        let noise = [0.1, -0.1, -0.1, 0.1];
        let rows = ts.iter().map(|&t| vec![1.0, t]).collect();
        let a = Matrix::from_rows(rows).unwrap();
        let b = Vector::from(
            ts.iter()
                .zip(noise)
                .map(|(&t, e)| 0.5 + 1.5 * t + e)
                .collect::<Vec<_>>(),
        );
        let x = least_squares(&a, &b).unwrap();
        assert_abs_diff_eq!(x[0], 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 1.5, epsilon = 1e-10);
    }

    #[test]
    fn test_least_squares_rank_deficient() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]]).unwrap();
        let b = Vector::from(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            least_squares(&a, &b),
            Err(ReliabilityError::InvalidArgument(_))
        ));
    }
}
