//! Design point direction from evaluated samples.

use reliability_core::math::distributions::beta_from_probability;
use reliability_core::math::linalg::Vector;
use reliability_core::types::{ReliabilityError, Result};
use std::fmt;
use std::str::FromStr;

/// Largest reliability index reported by the sampling methods.
///
/// Probabilities below `Φ(-40)` are not representable as normal floats.
pub const MAX_BETA: f64 = 40.0;

/// Reliability index for a failure probability, bounded by [`MAX_BETA`].
#[inline]
pub fn bounded_beta(probability_of_failure: f64) -> f64 {
    beta_from_probability(probability_of_failure.clamp(0.0, 1.0)).clamp(-MAX_BETA, MAX_BETA)
}

/// How the design point is derived from the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DesignPointMethod {
    /// Sample closest to the origin
    #[default]
    NearestToMean,
    /// Weighted mean of the samples
    CenterOfGravity,
}

impl fmt::Display for DesignPointMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignPointMethod::NearestToMean => f.write_str("nearest_to_mean"),
            DesignPointMethod::CenterOfGravity => f.write_str("center_of_gravity"),
        }
    }
}

impl FromStr for DesignPointMethod {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "nearest_to_mean" | "nearesttomean" => Ok(DesignPointMethod::NearestToMean),
            "center_of_gravity" | "centerofgravity" => Ok(DesignPointMethod::CenterOfGravity),
            _ => Err(ReliabilityError::InvalidArgument(format!(
                "unknown design point method '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone)]
struct DomainStatistics {
    nearest: Option<(f64, Vec<f64>)>,
    weighted_sum: Vec<f64>,
    count: usize,
}

impl DomainStatistics {
    fn new(size: usize) -> Self {
        Self {
            nearest: None,
            weighted_sum: vec![0.0; size],
            count: 0,
        }
    }

    fn add(&mut self, u: &[f64], weight: f64) {
        self.count += 1;
        let distance = u.iter().map(|v| v * v).sum::<f64>();
        if self.nearest.as_ref().map_or(true, |(d, _)| distance < *d) {
            self.nearest = Some((distance, u.to_vec()));
        }
        for (sum, value) in self.weighted_sum.iter_mut().zip(u) {
            *sum += weight * value;
        }
    }

    fn direction(&self, method: DesignPointMethod) -> Option<Vec<f64>> {
        if self.count == 0 {
            return None;
        }
        let point = match method {
            DesignPointMethod::NearestToMean => self.nearest.as_ref()?.1.clone(),
            DesignPointMethod::CenterOfGravity => self.weighted_sum.clone(),
        };
        Some(Vector::from(point).normalized().into_vec())
    }
}

/// Collects samples of both domains and derives the alpha vector.
///
/// When the failure probability is at most one half the design point lies
/// in the failure domain and `alpha = -u/|u|`; otherwise the origin fails,
/// the design point lies in the safe domain and `alpha = u/|u|`. In both
/// cases `u = -beta * alpha` points at the representative sample.
#[derive(Debug, Clone)]
pub struct DesignPointBuilder {
    method: DesignPointMethod,
    failure: DomainStatistics,
    non_failure: DomainStatistics,
}

impl DesignPointBuilder {
    /// Builder for u-vectors of length `size`.
    pub fn new(size: usize, method: DesignPointMethod) -> Self {
        Self {
            method,
            failure: DomainStatistics::new(size),
            non_failure: DomainStatistics::new(size),
        }
    }

    /// Adds an evaluated sample; NaN values are skipped.
    pub fn add(&mut self, u: &[f64], z: f64, weight: f64) {
        if z.is_nan() {
            return;
        }
        if z < 0.0 {
            self.failure.add(u, weight);
        } else {
            self.non_failure.add(u, weight);
        }
    }

    /// Number of failing samples added.
    pub fn failure_count(&self) -> usize {
        self.failure.count
    }

    /// Unit alpha vector for the given failure probability, `None` when the
    /// relevant domain has no samples.
    pub fn alpha(&self, probability_of_failure: f64) -> Option<Vec<f64>> {
        if probability_of_failure <= 0.5 {
            self.failure
                .direction(self.method)
                .map(|d| d.into_iter().map(|v| -v).collect())
        } else {
            self.non_failure.direction(self.method)
        }
    }
}
