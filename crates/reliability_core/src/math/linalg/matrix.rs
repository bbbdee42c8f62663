//! Dense row-major matrix with Cholesky and Gauss-Jordan inverse.

use super::Vector;
use crate::types::{format_value, ReliabilityError, Result};
use std::ops::{Index, IndexMut};

/// Pivot magnitude below which Gauss-Jordan reorders the remaining rows.
const PIVOT_THRESHOLD: f64 = 1e-10;
const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Dense row-major matrix of `f64` values.
///
/// Element access through [`Matrix::get`] is bounds checked and returns
/// `IndexOutOfRange`; the `[(row, col)]` operator panics instead.
///
/// # Examples
/// ```
/// use reliability_core::math::linalg::Matrix;
///
/// let m = Matrix::from_rows(vec![vec![4.0, 2.0], vec![2.0, 3.0]]).unwrap();
/// let l = m.cholesky().unwrap();
/// let back = l.matmul(&l.transpose()).unwrap();
/// assert!((back[(1, 1)] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Identity matrix of size `n`.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Builds a matrix from a list of equally long rows.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "row {} has {} columns, expected {}",
                bad,
                rows[bad].len(),
                n_cols
            )));
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True for a square matrix.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Bounds-checked element read.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Bounds-checked element write.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` outside the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_index(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(ReliabilityError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        t
    }

    /// Matrix product `self · other`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `self.cols() != other.rows()`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut product = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    product.data[i * other.cols + j] += a * other.data[k * other.cols + j];
                }
            }
        }
        Ok(product)
    }

    /// Matrix-vector product `self · v`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `self.cols() != v.len()`.
    pub fn matvec(&self, v: &Vector) -> Result<Vector> {
        self.matvec_slice(v.as_slice()).map(Vector::from)
    }

    /// Matrix-vector product on a plain slice.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `self.cols() != v.len()`.
    pub fn matvec_slice(&self, v: &[f64]) -> Result<Vec<f64>> {
        if self.cols != v.len() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "cannot multiply {}x{} matrix by vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Lower-triangular Cholesky factor `L` with `L · Lᵀ = self`.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` for a non-square matrix
    /// - `InvalidArgument` for a non-symmetric matrix
    /// - `NotPositiveDefinite` with "negative sqrt argument" or
    ///   "division by zero"
    pub fn cholesky(&self) -> Result<Matrix> {
        if !self.is_square() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "Cholesky decomposition requires a square matrix, got {}x{}",
                self.rows, self.cols
            )));
        }
        if !self.is_symmetric(SYMMETRY_TOLERANCE) {
            return Err(ReliabilityError::InvalidArgument(
                "Cholesky decomposition requires a symmetric matrix".to_string(),
            ));
        }
        let n = self.rows;
        let mut l = Self::zeros(n, n);

        for j in 0..n {
            let mut diagonal = self.data[j * n + j];
            for k in 0..j {
                diagonal -= l.data[j * n + k] * l.data[j * n + k];
            }
            if diagonal < 0.0 {
                return Err(ReliabilityError::NotPositiveDefinite(format!(
                    "negative sqrt argument in Cholesky decomposition (row {}, value {})",
                    j,
                    format_value(diagonal)
                )));
            }
            let pivot = diagonal.sqrt();
            l.data[j * n + j] = pivot;

            for i in (j + 1)..n {
                if pivot == 0.0 {
                    return Err(ReliabilityError::NotPositiveDefinite(format!(
                        "division by zero in Cholesky decomposition (row {})",
                        j
                    )));
                }
                let mut sum = self.data[i * n + j];
                for k in 0..j {
                    sum -= l.data[i * n + k] * l.data[j * n + k];
                }
                l.data[i * n + j] = sum / pivot;
            }
        }
        Ok(l)
    }

    /// Inverse by Gauss-Jordan elimination.
    ///
    /// When a pivot is smaller than 1e-10 the remaining rows are reordered by
    /// ascending number of leading near-zero entries before elimination
    /// continues.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` for a non-square matrix
    /// - `InvalidArgument` when the matrix is singular
    pub fn inverse(&self) -> Result<Matrix> {
        if !self.is_square() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "inverse requires a square matrix, got {}x{}",
                self.rows, self.cols
            )));
        }
        let n = self.rows;
        let mut a: Vec<Vec<f64>> = (0..n).map(|i| self.row(i).to_vec()).collect();
        let mut inv: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();

        for col in 0..n {
            if a[col][col].abs() < PIVOT_THRESHOLD {
                reorder_rows(&mut a, &mut inv, col);
                if a[col][col].abs() < PIVOT_THRESHOLD {
                    return Err(ReliabilityError::InvalidArgument(format!(
                        "matrix is singular (pivot {} in column {})",
                        format_value(a[col][col]),
                        col
                    )));
                }
            }

            let pivot = a[col][col];
            for j in 0..n {
                a[col][j] /= pivot;
                inv[col][j] /= pivot;
            }

            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n {
                    a[row][j] -= factor * a[col][j];
                    inv[row][j] -= factor * inv[col][j];
                }
            }
        }

        Ok(Self {
            rows: n,
            cols: n,
            data: inv.into_iter().flatten().collect(),
        })
    }

    /// True when `|a_ij - a_ji| <= tolerance` for all entries.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.is_square()
            && (0..self.rows).all(|i| {
                (0..i).all(|j| {
                    (self.data[i * self.cols + j] - self.data[j * self.cols + i]).abs()
                        <= tolerance
                })
            })
    }
}

/// Stable reorder of rows `from..` by ascending count of leading near-zero
/// entries, applied to the working matrix and its companion.
fn reorder_rows(a: &mut Vec<Vec<f64>>, companion: &mut Vec<Vec<f64>>, from: usize) {
    let leading_zeros =
        |row: &[f64]| row.iter().take_while(|v| v.abs() < PIVOT_THRESHOLD).count();

    let mut order: Vec<usize> = (from..a.len()).collect();
    order.sort_by_key(|&i| leading_zeros(&a[i]));

    let rows: Vec<Vec<f64>> = order.iter().map(|&i| a[i].clone()).collect();
    let companions: Vec<Vec<f64>> = order.iter().map(|&i| companion[i].clone()).collect();
    a.truncate(from);
    a.extend(rows);
    companion.truncate(from);
    companion.extend(companions);
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of range for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}
