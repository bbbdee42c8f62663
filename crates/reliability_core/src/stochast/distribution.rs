//! Reference marginal distributions.

use super::Stochast;
use crate::math::distributions::{norm_cdf, norm_inv};
use crate::types::{format_value, ReliabilityError, Result};
use statrs::distribution::{Continuous, ContinuousCDF, LogNormal, Normal, Uniform};
use std::fmt;
use std::str::FromStr;

/// Supported distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistributionType {
    /// Fixed value: `[value]`
    Deterministic,
    /// Normal: `[mean, standard deviation]`
    Normal,
    /// Log-normal by the moments of X: `[mean, standard deviation]`
    LogNormal,
    /// Uniform: `[minimum, maximum]`
    Uniform,
    /// Gumbel (maxima): `[location, scale]`
    Gumbel,
}

impl DistributionType {
    /// Number of parameters the family takes.
    pub fn parameter_count(&self) -> usize {
        match self {
            DistributionType::Deterministic => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistributionType::Deterministic => "deterministic",
            DistributionType::Normal => "normal",
            DistributionType::LogNormal => "lognormal",
            DistributionType::Uniform => "uniform",
            DistributionType::Gumbel => "gumbel",
        };
        f.write_str(name)
    }
}

impl FromStr for DistributionType {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deterministic" => Ok(DistributionType::Deterministic),
            "normal" => Ok(DistributionType::Normal),
            "lognormal" | "log_normal" | "log-normal" => Ok(DistributionType::LogNormal),
            "uniform" => Ok(DistributionType::Uniform),
            "gumbel" => Ok(DistributionType::Gumbel),
            _ => Err(ReliabilityError::UnknownDistribution(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
enum Marginal {
    Deterministic(f64),
    Normal {
        mean: f64,
        deviation: f64,
        dist: Normal,
    },
    LogNormal {
        mu: f64,
        sigma: f64,
        dist: LogNormal,
    },
    Uniform(Uniform),
    Gumbel { location: f64, scale: f64 },
}

/// Stochast backed by one of the [`DistributionType`] families.
///
/// # Examples
/// ```
/// use reliability_core::stochast::{DistributedStochast, Stochast};
///
/// let r = DistributedStochast::normal("R", 7.0, 1.0).unwrap();
/// assert_eq!(r.x_from_u(-2.5), 4.5);
/// assert!((r.u_from_x(4.5) + 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct DistributedStochast {
    name: String,
    distribution: DistributionType,
    parameters: Vec<f64>,
    marginal: Marginal,
}

impl DistributedStochast {
    /// Creates a stochast of the given family.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` for a wrong parameter count or parameters outside
    /// the domain of the family.
    pub fn new(
        name: impl Into<String>,
        distribution: DistributionType,
        parameters: &[f64],
    ) -> Result<Self> {
        let name = name.into();
        if parameters.len() != distribution.parameter_count() {
            return Err(ReliabilityError::InvalidParameters(format!(
                "{} distribution of '{}' takes {} parameters, got {}",
                distribution,
                name,
                distribution.parameter_count(),
                parameters.len()
            )));
        }
        let invalid = |e: &dyn fmt::Display| {
            ReliabilityError::InvalidParameters(format!("stochast '{}': {}", name, e))
        };

        let marginal = match distribution {
            DistributionType::Deterministic => Marginal::Deterministic(parameters[0]),
            DistributionType::Normal => {
                let (mean, deviation) = (parameters[0], parameters[1]);
                let dist = Normal::new(mean, deviation).map_err(|e| invalid(&e))?;
                Marginal::Normal {
                    mean,
                    deviation,
                    dist,
                }
            }
            DistributionType::LogNormal => {
                let (mean, deviation) = (parameters[0], parameters[1]);
                if mean.is_nan() || mean <= 0.0 {
                    return Err(invalid(&format!(
                        "log-normal mean must be positive, got {}",
                        format_value(mean)
                    )));
                }
                let sigma_squared = (1.0 + (deviation / mean).powi(2)).ln();
                let mu = mean.ln() - 0.5 * sigma_squared;
                let sigma = sigma_squared.sqrt();
                let dist = LogNormal::new(mu, sigma).map_err(|e| invalid(&e))?;
                Marginal::LogNormal { mu, sigma, dist }
            }
            DistributionType::Uniform => Marginal::Uniform(
                Uniform::new(parameters[0], parameters[1]).map_err(|e| invalid(&e))?,
            ),
            DistributionType::Gumbel => {
                let (location, scale) = (parameters[0], parameters[1]);
                if scale.is_nan() || scale <= 0.0 || !location.is_finite() {
                    return Err(invalid(&format!(
                        "Gumbel scale must be positive, got {}",
                        format_value(scale)
                    )));
                }
                Marginal::Gumbel { location, scale }
            }
        };

        Ok(Self {
            name,
            distribution,
            parameters: parameters.to_vec(),
            marginal,
        })
    }

    /// Deterministic stochast.
    pub fn deterministic(name: impl Into<String>, value: f64) -> Result<Self> {
        Self::new(name, DistributionType::Deterministic, &[value])
    }

    /// Normal stochast.
    pub fn normal(name: impl Into<String>, mean: f64, deviation: f64) -> Result<Self> {
        Self::new(name, DistributionType::Normal, &[mean, deviation])
    }

    /// Log-normal stochast by the mean and standard deviation of X.
    pub fn log_normal(name: impl Into<String>, mean: f64, deviation: f64) -> Result<Self> {
        Self::new(name, DistributionType::LogNormal, &[mean, deviation])
    }

    /// Uniform stochast.
    pub fn uniform(name: impl Into<String>, minimum: f64, maximum: f64) -> Result<Self> {
        Self::new(name, DistributionType::Uniform, &[minimum, maximum])
    }

    /// Gumbel stochast.
    pub fn gumbel(name: impl Into<String>, location: f64, scale: f64) -> Result<Self> {
        Self::new(name, DistributionType::Gumbel, &[location, scale])
    }

    /// Distribution family.
    pub fn distribution(&self) -> DistributionType {
        self.distribution
    }

    /// Parameters as given at construction.
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }
}

impl Stochast for DistributedStochast {
    fn name(&self) -> &str {
        &self.name
    }

    fn x_from_u(&self, u: f64) -> f64 {
        match &self.marginal {
            Marginal::Deterministic(value) => *value,
            Marginal::Normal {
                mean, deviation, ..
            } => mean + deviation * u,
            Marginal::LogNormal { mu, sigma, .. } => (mu + sigma * u).exp(),
            Marginal::Uniform(d) => d.inverse_cdf(norm_cdf(u)),
            Marginal::Gumbel { location, scale } => {
                // ln Φ(u) computed from the upper tail to keep precision
                let log_p = (-norm_cdf(-u)).ln_1p();
                location - scale * (-log_p).ln()
            }
        }
    }

    fn u_from_x(&self, x: f64) -> f64 {
        match &self.marginal {
            Marginal::Deterministic(_) => 0.0,
            Marginal::Normal {
                mean, deviation, ..
            } => (x - mean) / deviation,
            Marginal::LogNormal { mu, sigma, .. } => {
                if x <= 0.0 {
                    f64::NEG_INFINITY
                } else {
                    (x.ln() - mu) / sigma
                }
            }
            Marginal::Uniform(d) => norm_inv(d.cdf(x)),
            Marginal::Gumbel { location, scale } => {
                let t = (-(x - location) / scale).exp();
                // 1 - F = 1 - exp(-t)
                -norm_inv(-(-t).exp_m1())
            }
        }
    }

    fn pdf(&self, x: f64) -> f64 {
        match &self.marginal {
            Marginal::Deterministic(value) => {
                if x == *value {
                    f64::INFINITY
                } else {
                    0.0
                }
            }
            Marginal::Normal { dist, .. } => dist.pdf(x),
            Marginal::LogNormal { dist, .. } => dist.pdf(x),
            Marginal::Uniform(d) => d.pdf(x),
            Marginal::Gumbel { location, scale } => {
                let t = -(x - location) / scale;
                (t - t.exp()).exp() / scale
            }
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        match &self.marginal {
            Marginal::Deterministic(value) => {
                if x < *value {
                    0.0
                } else {
                    1.0
                }
            }
            Marginal::Normal { dist, .. } => dist.cdf(x),
            Marginal::LogNormal { dist, .. } => dist.cdf(x),
            Marginal::Uniform(d) => d.cdf(x),
            Marginal::Gumbel { location, scale } => (-(-(x - location) / scale).exp()).exp(),
        }
    }

    fn is_varying(&self) -> bool {
        !matches!(self.marginal, Marginal::Deterministic(_))
    }
}
