//! Numerical integration over a tensor grid in u-space.
//!
//! Every independent u-axis is cut into equal intervals on
//! `[minimum_u, maximum_u]`. Each grid cell is evaluated at its centre and
//! carries the mass `Π (Φ(bᵢ) − Φ(aᵢ))`; the failure probability is the sum
//! of the masses of the failing cells.

use super::design_point_builder::{bounded_beta, DesignPointBuilder, DesignPointMethod};
use crate::error::ConfigError;
use crate::method::ReliabilityMethod;
use crate::model::{ModelRunner, ProgressControl, ProgressReport};
use reliability_core::math::distributions::norm_cdf;
use reliability_core::types::{
    ConvergenceReport, DesignPoint, Message, ReliabilityError, Result, Sample,
};
use tracing::{debug, info};

const BATCH_SIZE: usize = 4_096;

/// Settings of [`NumericalIntegration`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NumericalIntegrationSettings {
    /// Lower bound of every u-axis
    pub minimum_u: f64,
    /// Upper bound of every u-axis
    pub maximum_u: f64,
    /// Intervals per axis
    pub intervals: usize,
    /// Largest grid size accepted
    pub max_evaluations: usize,
}

impl Default for NumericalIntegrationSettings {
    fn default() -> Self {
        Self {
            minimum_u: -8.0,
            maximum_u: 8.0,
            intervals: 200,
            max_evaluations: 5_000_000,
        }
    }
}

impl NumericalIntegrationSettings {
    /// Validates the settings.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(self.minimum_u.is_finite() && self.maximum_u.is_finite())
            || self.minimum_u >= self.maximum_u
        {
            return Err(ConfigError::parameter(
                "maximum_u",
                format!(
                    "range [{}, {}] is empty",
                    self.minimum_u, self.maximum_u
                ),
            ));
        }
        if self.intervals == 0 {
            return Err(ConfigError::parameter("intervals", "must be at least 1"));
        }
        if self.max_evaluations == 0 {
            return Err(ConfigError::parameter(
                "max_evaluations",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Number of grid cells for `dimension` independent axes, `None` on
    /// overflow.
    pub fn cell_count(&self, dimension: usize) -> Option<usize> {
        u32::try_from(dimension)
            .ok()
            .and_then(|d| self.intervals.checked_pow(d))
    }
}

/// Cell centres and masses along one axis.
#[derive(Debug, Clone)]
struct AxisGrid {
    centres: Vec<f64>,
    masses: Vec<f64>,
}

impl AxisGrid {
    fn new(settings: &NumericalIntegrationSettings) -> Self {
        let h = (settings.maximum_u - settings.minimum_u) / settings.intervals as f64;
        let (centres, masses) = (0..settings.intervals)
            .map(|i| {
                let a = settings.minimum_u + i as f64 * h;
                let b = a + h;
                (0.5 * (a + b), norm_cdf(b) - norm_cdf(a))
            })
            .unzip();
        Self { centres, masses }
    }
}

/// Numerical integration reliability method.
#[derive(Debug, Clone, Default)]
pub struct NumericalIntegration {
    settings: NumericalIntegrationSettings,
}

impl NumericalIntegration {
    /// Creates the method.
    pub fn new(settings: NumericalIntegrationSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &NumericalIntegrationSettings {
        &self.settings
    }
}

/// Advances a mixed-radix counter; returns false after the last index.
fn next_index(index: &mut [usize], radix: usize) -> bool {
    for digit in index.iter_mut() {
        *digit += 1;
        if *digit < radix {
            return true;
        }
        *digit = 0;
    }
    false
}

impl ReliabilityMethod for NumericalIntegration {
    fn name(&self) -> &'static str {
        "Numerical Integration"
    }

    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint> {
        self.settings.validate()?;
        let s = &self.settings;
        let mask = runner.independent_mask().to_vec();
        let axes: Vec<usize> = (0..mask.len()).filter(|&i| mask[i]).collect();

        let cells = s
            .cell_count(axes.len())
            .filter(|&c| c <= s.max_evaluations)
            .ok_or_else(|| {
                ReliabilityError::InvalidArgument(format!(
                    "{} intervals over {} stochasts exceed {} evaluations",
                    s.intervals,
                    axes.len(),
                    s.max_evaluations
                ))
            })?;
        debug!(cells, dimension = axes.len(), "numerical integration grid");

        let grid = AxisGrid::new(s);
        let mut builder = DesignPointBuilder::new(mask.len(), DesignPointMethod::NearestToMean);
        let mut index = vec![0usize; axes.len()];
        let mut more = true;
        let mut probability = 0.0;
        let mut failed_samples = 0;
        let mut evaluated = 0;

        while more {
            let mut batch = Vec::with_capacity(BATCH_SIZE.min(cells - evaluated));
            while more && batch.len() < BATCH_SIZE {
                let mut values = vec![0.0; mask.len()];
                let mut mass = 1.0;
                for (&axis, &i) in axes.iter().zip(&index) {
                    values[axis] = grid.centres[i];
                    mass *= grid.masses[i];
                }
                let mut sample = Sample::new(values).with_iteration(evaluated + batch.len());
                sample.weight = mass;
                batch.push(sample);
                more = next_index(&mut index, s.intervals);
            }
            evaluated += batch.len();
            runner.z_values(&mut batch)?;

            for sample in &batch {
                if sample.z.is_nan() {
                    failed_samples += 1;
                    continue;
                }
                if sample.is_failure() {
                    probability += sample.weight;
                }
                builder.add(&sample.values, sample.z, sample.weight);
            }

            let report = ProgressReport::new(evaluated, cells, bounded_beta(probability), 0.0);
            if runner.report_progress(report) == ProgressControl::Cancel {
                break;
            }
        }

        let pf = probability.clamp(0.0, 1.0);
        let beta = bounded_beta(pf);
        let alpha = match builder.alpha(pf) {
            Some(alpha) => alpha,
            None => {
                runner.add_message(Message::warning(
                    "no failing grid cells, alpha is undetermined",
                ));
                vec![0.0; mask.len()]
            }
        };
        info!(beta, pf, cells = evaluated, "numerical integration done");

        let report = ConvergenceReport {
            is_converged: evaluated == cells,
            convergence: 0.0,
            total_iterations: evaluated,
            total_directions: 0,
            total_model_runs: evaluated,
            fail_fraction: builder.failure_count() as f64 / evaluated.max(1) as f64,
            failed_samples,
        };
        runner.design_point(beta, &alpha, report, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axis_masses_cover_range() {
        let grid = AxisGrid::new(&NumericalIntegrationSettings::default());
        let total: f64 = grid.masses.iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.centres[0], -7.96, epsilon = 1e-12);
    }

    #[test]
    fn test_counter_visits_all_cells() {
        let mut index = vec![0; 3];
        let mut visited = 1;
        while next_index(&mut index, 4) {
            visited += 1;
        }
        assert_eq!(visited, 64);
        assert_eq!(index, vec![0, 0, 0]);
    }

    #[test]
    fn test_empty_counter() {
        let mut index: Vec<usize> = Vec::new();
        assert!(!next_index(&mut index, 10));
    }

    #[test]
    fn test_cell_count() {
        let settings = NumericalIntegrationSettings::default();
        assert_eq!(settings.cell_count(0), Some(1));
        assert_eq!(settings.cell_count(2), Some(40_000));
        assert_eq!(settings.cell_count(20), None);
    }

    #[test]
    fn test_invalid_range() {
        let settings = NumericalIntegrationSettings {
            minimum_u: 1.0,
            maximum_u: 1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
