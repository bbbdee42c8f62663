//! Common types of the design point combiners.

use reliability_core::math::distributions::beta_from_probability;
use reliability_core::stochast::Stochast;
use reliability_core::types::{DesignPoint, ReliabilityError, Result, StochastPointAlpha};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Largest reliability index produced by a combination.
pub const MAX_BETA: f64 = 40.0;

/// Reliability index of a probability, bounded by [`MAX_BETA`].
#[inline]
pub(crate) fn bounded_beta(probability: f64) -> f64 {
    beta_from_probability(probability.clamp(0.0, 1.0)).clamp(-MAX_BETA, MAX_BETA)
}

/// System type of a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CombinationType {
    /// Parallel system: failure when all elements fail
    And,
    /// Series system: failure when any element fails
    #[default]
    Or,
}

impl fmt::Display for CombinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationType::And => f.write_str("and"),
            CombinationType::Or => f.write_str("or"),
        }
    }
}

impl FromStr for CombinationType {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "parallel" => Ok(CombinationType::And),
            "or" | "series" => Ok(CombinationType::Or),
            _ => Err(ReliabilityError::InvalidArgument(format!(
                "unknown combination type '{}'",
                s
            ))),
        }
    }
}

/// Correlation of a stochast with itself between two design points.
///
/// A stochast shared by two design points is fully correlated (1) unless
/// set otherwise, e.g. a load that is partly independent between two
/// cross sections.
#[derive(Debug, Clone, Default)]
pub struct SelfCorrelation {
    values: Vec<(Arc<dyn Stochast>, f64)>,
}

impl SelfCorrelation {
    /// All shared stochasts fully correlated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the self-correlation of `stochast`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `value` is outside `[0, 1]`.
    pub fn set(&mut self, stochast: &Arc<dyn Stochast>, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ReliabilityError::InvalidArgument(format!(
                "self correlation of '{}' must be in [0, 1], got {}",
                stochast.name(),
                value
            )));
        }
        match self.values.iter_mut().find(|(s, _)| Arc::ptr_eq(s, stochast)) {
            Some(entry) => entry.1 = value,
            None => self.values.push((Arc::clone(stochast), value)),
        }
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, stochast: &Arc<dyn Stochast>, value: f64) -> Result<Self> {
        self.set(stochast, value)?;
        Ok(self)
    }

    /// Self-correlation of `stochast`, 1 when not set.
    pub fn get(&self, stochast: &Arc<dyn Stochast>) -> f64 {
        self.values
            .iter()
            .find(|(s, _)| Arc::ptr_eq(s, stochast))
            .map_or(1.0, |(_, v)| *v)
    }
}

/// Combines a set of design points into a system design point.
pub trait DesignPointCombiner {
    /// Combines `design_points`.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for an empty slice.
    fn combine(
        &self,
        design_points: &[DesignPoint],
        self_correlation: &SelfCorrelation,
        combination: CombinationType,
    ) -> Result<DesignPoint>;
}

/// Stochasts of several design points, deduplicated by identity in order of
/// first appearance.
pub(crate) fn union_of_stochasts<'a>(
    design_points: impl IntoIterator<Item = &'a DesignPoint>,
) -> Vec<Arc<dyn Stochast>> {
    let mut stochasts: Vec<Arc<dyn Stochast>> = Vec::new();
    for dp in design_points {
        for alpha in &dp.alphas {
            if !stochasts.iter().any(|s| Arc::ptr_eq(s, &alpha.stochast)) {
                stochasts.push(Arc::clone(&alpha.stochast));
            }
        }
    }
    stochasts
}

/// Alpha of `stochast` in `dp`, 0 when the stochast does not take part.
pub(crate) fn alpha_of(dp: &DesignPoint, stochast: &Arc<dyn Stochast>) -> f64 {
    dp.alpha_for(stochast).map_or(0.0, |a| a.alpha)
}

/// Alpha entries for independent stochasts: `u = −β·α`, `x = x(u)`.
pub(crate) fn independent_alphas(
    stochasts: &[Arc<dyn Stochast>],
    alpha: &[f64],
    beta: f64,
) -> Vec<StochastPointAlpha> {
    stochasts
        .iter()
        .zip(alpha)
        .map(|(stochast, &a)| {
            let u = -beta * a;
            StochastPointAlpha {
                stochast: Arc::clone(stochast),
                alpha: a,
                alpha_correlated: a,
                u,
                x: stochast.x_from_u(u),
                influence_factor: a * a,
            }
        })
        .collect()
}

/// Scales `values` to unit length; a zero vector is left unchanged.
pub(crate) fn normalize(values: &mut [f64]) {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        values.iter_mut().for_each(|v| *v /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliability_core::stochast::DistributedStochast;

    fn stochast(name: &str) -> Arc<dyn Stochast> {
        Arc::new(DistributedStochast::normal(name, 0.0, 1.0).unwrap())
    }

    #[test]
    fn test_self_correlation_defaults_to_one() {
        let a = stochast("a");
        let b = stochast("b");
        let correlation = SelfCorrelation::new().with(&a, 0.3).unwrap();
        assert_eq!(correlation.get(&a), 0.3);
        assert_eq!(correlation.get(&b), 1.0);
    }

    #[test]
    fn test_self_correlation_range() {
        let a = stochast("a");
        assert!(SelfCorrelation::new().with(&a, 1.2).is_err());
    }

    #[test]
    fn test_parse_combination_type() {
        assert_eq!("AND".parse::<CombinationType>().unwrap(), CombinationType::And);
        assert_eq!("series".parse::<CombinationType>().unwrap(), CombinationType::Or);
        assert!("xor".parse::<CombinationType>().is_err());
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut values = [0.0, 0.0];
        normalize(&mut values);
        assert_eq!(values, [0.0, 0.0]);
    }
}
