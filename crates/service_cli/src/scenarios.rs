//! Built-in benchmark limit states.
//!
//! Each scenario defines its stochasts, the limit state function and, where
//! one exists, the exact reliability index to compare against.

use reliability_core::math::distributions::beta_from_probability;
use reliability_core::math::special::gamma_upper_regularized;
use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
use reliability_core::types::{ReliabilityError, Result};
use reliability_methods::model::{ModelRunner, RunSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const SPHEROID_SHORT_AXIS: f64 = 3.38;
const SPHEROID_LONG_AXIS: f64 = 6.0;
const SPHERE_RADIUS: f64 = 3.0;
const NOISE_AMPLITUDE: f64 = 0.05;
const NOISE_FREQUENCY: f64 = 40.0;
/// Pf = 4.93e-4, FORM stops at the corner with β = 1.64
const PARALLEL_SYSTEM_BETA: f64 = 3.294;

/// Benchmark limit state run by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// `Z = R − S` with `R ~ N(7, 1)` and `S ~ N(2, 1)`
    #[default]
    LinearResistance,
    /// Four linear components `0.84 + 1.6·uᵢ − 0.6·ū` in parallel
    ParallelSystem,
    /// Failure outside an oblate spheroid in three dimensions
    OblateSpheroid,
    /// Failure outside a sphere of radius 3 with a rippled surface
    NoisySphere,
}

impl Scenario {
    /// All scenarios in display order.
    pub const ALL: [Scenario; 4] = [
        Scenario::LinearResistance,
        Scenario::ParallelSystem,
        Scenario::OblateSpheroid,
        Scenario::NoisySphere,
    ];

    /// Name used on the command line and in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::LinearResistance => "linear-resistance",
            Scenario::ParallelSystem => "parallel-system",
            Scenario::OblateSpheroid => "oblate-spheroid",
            Scenario::NoisySphere => "noisy-sphere",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Scenario::LinearResistance => "Z = R - S, R ~ N(7, 1), S ~ N(2, 1)",
            Scenario::ParallelSystem => "Z = max(0.84 + 1.6 u_i - 0.6 mean(u)), i = 1..4",
            Scenario::OblateSpheroid => "Z = 1 - (u1/3.38)^2 - (u2/6)^2 - (u3/6)^2",
            Scenario::NoisySphere => "Z = 9 - |u|^2 + 0.05 sin(40 u1), three dimensions",
        }
    }

    /// Reference reliability index, exact or from a converged integration.
    pub fn reference_beta(&self) -> Option<f64> {
        match self {
            Scenario::LinearResistance => Some(5.0 / 2f64.sqrt()),
            Scenario::ParallelSystem => Some(PARALLEL_SYSTEM_BETA),
            Scenario::OblateSpheroid | Scenario::NoisySphere => None,
        }
    }

    /// Reliability index of the noise-free sphere in three dimensions.
    pub fn sphere_beta() -> Result<f64> {
        let pf = gamma_upper_regularized(1.5, 0.5 * SPHERE_RADIUS * SPHERE_RADIUS)?;
        Ok(beta_from_probability(pf))
    }

    /// Model runner for this scenario.
    pub fn runner(&self, settings: RunSettings) -> Result<ModelRunner> {
        match self {
            Scenario::LinearResistance => {
                let converter = UConverter::independent(vec![
                    normal("R", 7.0, 1.0)?,
                    normal("S", 2.0, 1.0)?,
                ]);
                ModelRunner::new(|x: &[f64]| x[0] - x[1], converter, settings)
            }
            Scenario::ParallelSystem => ModelRunner::new(
                |x: &[f64]| {
                    let mean = x.iter().sum::<f64>() / x.len() as f64;
                    x.iter()
                        .map(|v| 0.84 + 1.6 * v - 0.6 * mean)
                        .fold(f64::NEG_INFINITY, f64::max)
                },
                standard_normals(4)?,
                settings,
            ),
            Scenario::OblateSpheroid => ModelRunner::new(
                |x: &[f64]| {
                    1.0 - (x[0] / SPHEROID_SHORT_AXIS).powi(2)
                        - (x[1] / SPHEROID_LONG_AXIS).powi(2)
                        - (x[2] / SPHEROID_LONG_AXIS).powi(2)
                },
                standard_normals(3)?,
                settings,
            ),
            Scenario::NoisySphere => ModelRunner::new(
                |x: &[f64]| {
                    SPHERE_RADIUS * SPHERE_RADIUS - x.iter().map(|v| v * v).sum::<f64>()
                        + NOISE_AMPLITUDE * (NOISE_FREQUENCY * x[0]).sin()
                },
                standard_normals(3)?,
                settings,
            ),
        }
    }
}

fn normal(name: &str, mean: f64, deviation: f64) -> Result<Arc<dyn Stochast>> {
    Ok(Arc::new(DistributedStochast::normal(name, mean, deviation)?))
}

fn standard_normals(n: usize) -> Result<UConverter> {
    let stochasts = (1..=n)
        .map(|i| normal(&format!("u{}", i), 0.0, 1.0))
        .collect::<Result<Vec<_>>>()?;
    Ok(UConverter::independent(stochasts))
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == wanted)
            .ok_or_else(|| {
                ReliabilityError::InvalidArgument(format!(
                    "unknown scenario '{}', expected one of: {}",
                    s,
                    Scenario::ALL.map(|s| s.name()).join(", ")
                ))
            })
    }
}
