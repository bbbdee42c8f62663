//! Dense one-dimensional vector.

use crate::types::{ReliabilityError, Result};
use std::ops::{Index, IndexMut};

/// Dense vector of `f64` values.
///
/// # Examples
/// ```
/// use reliability_core::math::linalg::Vector;
///
/// let mut v = Vector::from(vec![3.0, 4.0]);
/// assert_eq!(v.norm(), 5.0);
/// v.normalize();
/// assert!((v.sum_of_squares() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Zero vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the vector has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the elements.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consume into the underlying `Vec`.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Bounds-checked element access.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<f64> {
        self.data
            .get(index)
            .copied()
            .ok_or(ReliabilityError::IndexOutOfRange {
                row: index,
                col: 0,
                rows: self.len(),
                cols: 1,
            })
    }

    /// Sum of the squared elements.
    #[inline]
    pub fn sum_of_squares(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.sum_of_squares().sqrt()
    }

    /// Scales the vector to unit length in place.
    ///
    /// A zero vector becomes the uniform vector `1/sqrt(n)` in every entry.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if self.data.is_empty() {
            return;
        }
        if norm == 0.0 || !norm.is_finite() {
            let uniform = 1.0 / (self.len() as f64).sqrt();
            self.data.iter_mut().for_each(|v| *v = uniform);
        } else {
            self.data.iter_mut().for_each(|v| *v /= norm);
        }
    }

    /// Unit-length copy, see [`Vector::normalize`].
    pub fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.normalize();
        copy
    }

    /// Dot product.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the lengths differ.
    pub fn dot(&self, other: &Vector) -> Result<f64> {
        if self.len() != other.len() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "dot product of vectors with length {} and {}",
                self.len(),
                other.len()
            )));
        }
        Ok(self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum())
    }

    /// Copy multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self { data }
    }
}

impl From<&[f64]> for Vector {
    fn from(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_vector_normalizes_to_uniform() {
        let mut v = Vector::zeros(4);
        v.normalize();
        assert_abs_diff_eq!(v.sum_of_squares(), 1.0, epsilon = 1e-12);
        assert!(v.iter().all(|&x| (x - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_empty_vector_normalize() {
        let mut v = Vector::zeros(0);
        v.normalize();
        assert!(v.is_empty());
    }

    #[test]
    fn test_dot_mismatch() {
        let a = Vector::from(vec![1.0, 2.0]);
        let b = Vector::from(vec![1.0]);
        assert!(matches!(
            a.dot(&b),
            Err(ReliabilityError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_dot_and_scaled() {
        let a = Vector::from(vec![1.0, 2.0, 3.0]);
        let b = a.scaled(2.0);
        assert_abs_diff_eq!(a.dot(&b).unwrap(), 28.0);
    }

    #[test]
    fn test_get_out_of_range() {
        let a = Vector::from(vec![1.0]);
        assert_eq!(a.get(0).unwrap(), 1.0);
        assert!(matches!(
            a.get(1),
            Err(ReliabilityError::IndexOutOfRange { row: 1, .. })
        ));
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let a = Vector::zeros(2);
        let _ = a[2];
    }
}
