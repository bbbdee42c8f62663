//! Transformation between independent u-space, correlated u-space and x-space.

use super::{CorrelationMatrix, Stochast};
use crate::types::{ReliabilityError, Result, StochastPointAlpha};
use std::sync::Arc;

/// Maps u-vectors of a model to physical values and back.
///
/// A u-vector has one entry per stochast. Only the entries flagged by
/// [`independent_mask`](Self::independent_mask) carry randomness: entries of
/// deterministic stochasts and of stochasts fully correlated with an earlier
/// one are ignored on the way to x-space.
///
/// # Examples
/// ```
/// use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
/// use std::sync::Arc;
///
/// let r: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("R", 7.0, 1.0).unwrap());
/// let s: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("S", 2.0, 1.0).unwrap());
/// let converter = UConverter::independent(vec![r, s]);
///
/// let x = converter.x_from_u(&[-2.5, 2.5]).unwrap();
/// assert_eq!(x, vec![4.5, 4.5]);
/// ```
#[derive(Debug, Clone)]
pub struct UConverter {
    stochasts: Vec<Arc<dyn Stochast>>,
    correlation: CorrelationMatrix,
    mask: Vec<bool>,
}

impl UConverter {
    /// Creates a converter for correlated stochasts.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` when the correlation matrix does not match the
    ///   number of stochasts
    /// - `InvalidArgument` when a deterministic stochast is correlated
    pub fn new(stochasts: Vec<Arc<dyn Stochast>>, correlation: CorrelationMatrix) -> Result<Self> {
        if correlation.dim() != stochasts.len() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "{} stochasts with a correlation matrix of dimension {}",
                stochasts.len(),
                correlation.dim()
            )));
        }
        for (i, stochast) in stochasts.iter().enumerate() {
            if stochast.is_varying() {
                continue;
            }
            if let Some(j) = (0..stochasts.len()).find(|&j| j != i && correlation.get(i, j) != 0.0) {
                return Err(ReliabilityError::InvalidArgument(format!(
                    "deterministic stochast '{}' is correlated with '{}'",
                    stochast.name(),
                    stochasts[j].name()
                )));
            }
        }

        let mask = correlation
            .dependencies()
            .iter()
            .zip(&stochasts)
            .map(|(dependency, stochast)| dependency.is_none() && stochast.is_varying())
            .collect();

        Ok(Self {
            stochasts,
            correlation,
            mask,
        })
    }

    /// Converter for uncorrelated stochasts.
    pub fn independent(stochasts: Vec<Arc<dyn Stochast>>) -> Self {
        let mask = stochasts.iter().map(|s| s.is_varying()).collect();
        let correlation = CorrelationMatrix::new(stochasts.len());
        Self {
            stochasts,
            correlation,
            mask,
        }
    }

    /// The stochasts, in model order.
    #[inline]
    pub fn stochasts(&self) -> &[Arc<dyn Stochast>] {
        &self.stochasts
    }

    /// Correlation matrix.
    #[inline]
    pub fn correlation(&self) -> &CorrelationMatrix {
        &self.correlation
    }

    /// Number of stochasts.
    #[inline]
    pub fn len(&self) -> usize {
        self.stochasts.len()
    }

    /// True without stochasts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stochasts.is_empty()
    }

    /// Entries of a u-vector that carry randomness.
    #[inline]
    pub fn independent_mask(&self) -> &[bool] {
        &self.mask
    }

    /// Number of entries that carry randomness.
    pub fn independent_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Correlated u-values, with zeros for non-random entries.
    pub fn correlated_u(&self, u: &[f64]) -> Result<Vec<f64>> {
        if u.len() != self.len() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "{} u-values for {} stochasts",
                u.len(),
                self.len()
            )));
        }
        let masked: Vec<f64> = u
            .iter()
            .zip(&self.mask)
            .map(|(&value, &active)| if active { value } else { 0.0 })
            .collect();
        self.correlation.apply_correlation(&masked)
    }

    /// Physical values for a u-vector.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for a u-vector of the wrong length, or a
    /// correlation factorisation error.
    pub fn x_from_u(&self, u: &[f64]) -> Result<Vec<f64>> {
        let correlated = self.correlated_u(u)?;
        Ok(self
            .stochasts
            .iter()
            .zip(correlated)
            .map(|(stochast, value)| stochast.x_from_u(value))
            .collect())
    }

    /// Independent u-values for physical values.
    pub fn u_from_x(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.len() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "{} x-values for {} stochasts",
                x.len(),
                self.len()
            )));
        }
        let correlated: Vec<f64> = self
            .stochasts
            .iter()
            .zip(x)
            .map(|(stochast, &value)| {
                if stochast.is_varying() {
                    stochast.u_from_x(value)
                } else {
                    0.0
                }
            })
            .collect();
        self.correlation.remove_correlation(&correlated)
    }

    /// Alphas of a design point with reliability index `beta` in direction
    /// `alpha` (independent space, unit length).
    ///
    /// `u = -beta * alpha` per stochast; `alpha_correlated` is the direction
    /// of the correlated u-values.
    pub fn design_alphas(&self, alpha: &[f64], beta: f64) -> Result<Vec<StochastPointAlpha>> {
        if alpha.len() != self.len() {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "{} alpha values for {} stochasts",
                alpha.len(),
                self.len()
            )));
        }
        let u: Vec<f64> = alpha.iter().map(|a| -beta * a).collect();
        let correlated = self.correlated_u(&u)?;
        let alpha_correlated: Vec<f64> = if beta != 0.0 {
            correlated.iter().map(|c| -c / beta).collect()
        } else {
            let direction = self.correlated_u(alpha)?;
            let norm = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
            direction
                .iter()
                .map(|d| if norm > 0.0 { d / norm } else { 0.0 })
                .collect()
        };

        Ok(self
            .stochasts
            .iter()
            .enumerate()
            .map(|(i, stochast)| StochastPointAlpha {
                stochast: Arc::clone(stochast),
                alpha: alpha[i],
                alpha_correlated: alpha_correlated[i],
                u: u[i],
                x: stochast.x_from_u(correlated[i]),
                influence_factor: alpha[i] * alpha[i],
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stochast::DistributedStochast;
    use approx::assert_abs_diff_eq;

    fn normal(name: &str, mean: f64) -> Arc<dyn Stochast> {
        Arc::new(DistributedStochast::normal(name, mean, 1.0).unwrap())
    }

    fn deterministic(name: &str, value: f64) -> Arc<dyn Stochast> {
        Arc::new(DistributedStochast::deterministic(name, value).unwrap())
    }

    #[test]
    fn test_mask_skips_deterministic() {
        let converter =
            UConverter::independent(vec![normal("a", 0.0), deterministic("b", 3.0), normal("c", 1.0)]);
        assert_eq!(converter.independent_mask(), &[true, false, true]);
        assert_eq!(converter.independent_count(), 2);

        let x = converter.x_from_u(&[1.0, 5.0, -1.0]).unwrap();
        assert_eq!(x, vec![1.0, 3.0, 0.0]);
    }

    #[test]
    fn test_correlated_roundtrip() {
        let mut correlation = CorrelationMatrix::new(2);
        correlation.set_correlation(0, 1, 0.8).unwrap();
        let converter = UConverter::new(vec![normal("a", 1.0), normal("b", 2.0)], correlation).unwrap();

        let u = [0.4, -1.1];
        let x = converter.x_from_u(&u).unwrap();
        let back = converter.u_from_x(&x).unwrap();
        assert_abs_diff_eq!(back[0], u[0], epsilon = 1e-10);
        assert_abs_diff_eq!(back[1], u[1], epsilon = 1e-10);
    }

    #[test]
    fn test_fully_correlated_pair_is_not_independent() {
        let mut correlation = CorrelationMatrix::new(2);
        correlation.set_correlation(0, 1, 1.0).unwrap();
        let converter = UConverter::new(vec![normal("a", 0.0), normal("b", 10.0)], correlation).unwrap();
        assert_eq!(converter.independent_mask(), &[true, false]);

        let x = converter.x_from_u(&[2.0, -7.0]).unwrap();
        assert_eq!(x, vec![2.0, 12.0]);
    }

    #[test]
    fn test_correlated_deterministic_rejected() {
        let mut correlation = CorrelationMatrix::new(2);
        correlation.set_correlation(0, 1, 0.5).unwrap();
        let result = UConverter::new(vec![normal("a", 0.0), deterministic("b", 1.0)], correlation);
        assert!(matches!(result, Err(ReliabilityError::InvalidArgument(_))));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = UConverter::new(vec![normal("a", 0.0)], CorrelationMatrix::new(2));
        assert!(matches!(result, Err(ReliabilityError::DimensionMismatch(_))));
    }

    #[test]
    fn test_design_alphas() {
        let converter = UConverter::independent(vec![normal("R", 7.0), normal("S", 2.0)]);
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let beta = 5.0 * h;
        let alphas = converter.design_alphas(&[h, -h], beta).unwrap();

        assert_abs_diff_eq!(alphas[0].u, -2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(alphas[0].x, 4.5, epsilon = 1e-12);
        assert_abs_diff_eq!(alphas[1].x, 4.5, epsilon = 1e-12);
        assert_abs_diff_eq!(alphas[1].alpha_correlated, -h, epsilon = 1e-12);
        assert_abs_diff_eq!(alphas[0].influence_factor, 0.5, epsilon = 1e-12);
    }
}
