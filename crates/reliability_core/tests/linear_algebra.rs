//! Integration tests for the dense linear algebra.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use reliability_core::math::linalg::{Matrix, Vector};
use reliability_core::types::ReliabilityError;

/// Symmetric positive definite matrix `A·Aᵀ + n·I` from arbitrary entries.
fn spd_matrix(n: usize, entries: &[f64]) -> Matrix {
    let mut a = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            a[(i, j)] = entries[i * n + j];
        }
    }
    let mut m = a.matmul(&a.transpose()).unwrap();
    for i in 0..n {
        m[(i, i)] += n as f64;
    }
    m
}

#[test]
fn test_identity_products() {
    let m = Matrix::from_rows(vec![
        vec![1.5, -2.0, 0.25],
        vec![3.0, 4.0, -1.0],
        vec![0.0, 2.5, 7.0],
    ])
    .unwrap();
    let identity = Matrix::identity(3);
    assert_eq!(m.matmul(&identity).unwrap(), m);
    assert_eq!(identity.matmul(&m).unwrap(), m);

    let v = Vector::from(vec![0.1, -0.2, 0.3]);
    let product = identity.matvec(&v).unwrap();
    for i in 0..3 {
        assert_abs_diff_eq!(product[i], v[i], epsilon = 1e-12);
    }
}

#[test]
fn test_dimension_checks() {
    let a = Matrix::zeros(2, 3);
    let b = Matrix::zeros(2, 3);
    assert!(matches!(a.matmul(&b), Err(ReliabilityError::DimensionMismatch(_))));
    assert!(matches!(
        a.matvec(&Vector::zeros(2)),
        Err(ReliabilityError::DimensionMismatch(_))
    ));
    assert!(matches!(a.inverse(), Err(ReliabilityError::DimensionMismatch(_))));
    assert!(matches!(a.cholesky(), Err(ReliabilityError::DimensionMismatch(_))));
}

#[test]
fn test_bounds_checked_access() {
    let m = Matrix::identity(2);
    assert!(matches!(
        m.get(2, 0),
        Err(ReliabilityError::IndexOutOfRange { row: 2, col: 0, .. })
    ));
    let v = Vector::zeros(2);
    assert!(v.get(5).is_err());
}

#[test]
#[should_panic(expected = "out of range")]
fn test_index_operator_panics() {
    let m = Matrix::identity(2);
    let _ = m[(0, 3)];
}

#[test]
fn test_cholesky_rejects_indefinite() {
    let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 1.0]]).unwrap();
    let err = m.cholesky().unwrap_err();
    assert!(matches!(err, ReliabilityError::NotPositiveDefinite(_)));
    assert!(err.to_string().contains("negative sqrt argument"));
}

#[test]
fn test_inverse_with_zero_leading_pivot() {
    let m = Matrix::from_rows(vec![
        vec![0.0, 1.0, 2.0],
        vec![1.0, 0.0, 3.0],
        vec![4.0, -3.0, 8.0],
    ])
    .unwrap();
    let inverse = m.inverse().unwrap();
    let product = m.matmul(&inverse).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(product[(i, j)], expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_zero_vector_normalizes_to_uniform() {
    let mut v = Vector::zeros(4);
    v.normalize();
    assert_abs_diff_eq!(v.sum_of_squares(), 1.0, epsilon = 1e-12);
    for value in v.iter() {
        assert_abs_diff_eq!(*value, 0.5, epsilon = 1e-12);
    }
}

proptest! {
    #[test]
    fn prop_normalize_unit_length(values in prop::collection::vec(-1e3f64..1e3, 1..12)) {
        let mut v = Vector::from(values);
        v.normalize();
        prop_assert!((v.sum_of_squares() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn prop_inverse_roundtrip(entries in prop::collection::vec(-1.0f64..1.0, 16)) {
        let m = spd_matrix(4, &entries);
        let back = m.inverse().unwrap().inverse().unwrap();
        for i in 0..4 {
            for j in 0..4 {
                prop_assert!((back[(i, j)] - m[(i, j)]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn prop_cholesky_reconstructs(entries in prop::collection::vec(-1.0f64..1.0, 9)) {
        let m = spd_matrix(3, &entries);
        let l = m.cholesky().unwrap();
        let back = l.matmul(&l.transpose()).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                prop_assert!((back[(i, j)] - m[(i, j)]).abs() < 1e-10);
            }
        }
    }
}
