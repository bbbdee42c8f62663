//! Directional Sampling.
//!
//! Random directions are drawn uniformly on the unit sphere of the
//! independent u-space. Along each direction the ray root finder locates the
//! radius `r` of the limit state; the probability beyond `r` follows from the
//! chi distribution with `n` degrees of freedom:
//!
//! ```text
//! p(r) = Q(n/2, r²/2)
//! ```
//!
//! The failure probability is the mean of `p` over the directions.

use super::design_point_builder::{bounded_beta, DesignPointMethod};
use crate::error::{require_positive, require_sample_counts, ConfigError};
use crate::method::ReliabilityMethod;
use crate::model::{ModelRunner, ProgressControl, ProgressReport};
use reliability_core::math::linalg::Vector;
use reliability_core::math::solvers::{RayRootFinder, RayRootFinderSettings};
use reliability_core::math::special::gamma_upper_regularized;
use reliability_core::rng::ReliabilityRng;
use reliability_core::types::{
    ConvergenceReport, DesignPoint, Message, ReliabilityError, Result, Sample,
};
use tracing::{debug, info, warn};

/// Settings of [`DirectionalSampling`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectionalSamplingSettings {
    /// Directions before convergence is checked
    pub minimum_samples: usize,
    /// Hard cap on the number of directions
    pub maximum_samples: usize,
    /// Target coefficient of variation of the failure probability
    pub variation_coefficient_failure: f64,
    /// Target coefficient of variation of the non-failure probability
    pub variation_coefficient_no_failure: f64,
    /// Directions per parallel chunk
    pub chunk_size: usize,
    /// Seed of the direction generator
    pub seed: u64,
    /// Direction reported as design point
    pub design_point_method: DesignPointMethod,
    /// Root finder along each direction
    pub root_finder: RayRootFinderSettings,
}

impl Default for DirectionalSamplingSettings {
    fn default() -> Self {
        Self {
            minimum_samples: 10_000,
            maximum_samples: 99_000,
            variation_coefficient_failure: 0.1,
            variation_coefficient_no_failure: 0.1,
            chunk_size: 200,
            seed: 0,
            design_point_method: DesignPointMethod::NearestToMean,
            root_finder: RayRootFinderSettings::default(),
        }
    }
}

impl DirectionalSamplingSettings {
    /// Validates the settings.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        require_sample_counts(self.minimum_samples, self.maximum_samples)?;
        require_positive(
            "variation_coefficient_failure",
            self.variation_coefficient_failure,
        )?;
        require_positive(
            "variation_coefficient_no_failure",
            self.variation_coefficient_no_failure,
        )?;
        if self.chunk_size == 0 {
            return Err(ConfigError::parameter("chunk_size", "must be at least 1"));
        }
        self.root_finder
            .validate()
            .map_err(|e| ConfigError::parameter("root_finder", e.to_string()))
    }
}

/// Running sums of the directional contributions.
#[derive(Debug, Clone, Copy, Default)]
struct DirectionalStatistics {
    sum: f64,
    sum_squares: f64,
    count: usize,
}

impl DirectionalStatistics {
    fn add(&mut self, p: f64) {
        self.sum += p;
        self.sum_squares += p * p;
        self.count += 1;
    }

    fn probability(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Variance of the mean, `(Σp² − 2qΣp + Nq²) / (N(N − 1))`.
    fn variance(&self) -> f64 {
        if self.count < 2 {
            return f64::INFINITY;
        }
        let n = self.count as f64;
        let q = self.probability();
        ((self.sum_squares - 2.0 * q * self.sum + n * q * q) / (n * (n - 1.0))).max(0.0)
    }

    fn is_converged(&self, settings: &DirectionalSamplingSettings) -> bool {
        if self.count < settings.minimum_samples {
            return false;
        }
        let q = self.probability();
        let variance = self.variance();
        variance <= (settings.variation_coefficient_failure * q).powi(2)
            && variance <= (settings.variation_coefficient_no_failure * (1.0 - q)).powi(2)
    }

    fn coefficient_of_variation(&self) -> f64 {
        let q = self.probability();
        if q > 0.0 {
            self.variance().sqrt() / q
        } else {
            0.0
        }
    }
}

/// Outcome of one direction.
#[derive(Debug, Clone)]
struct DirectionResult {
    direction: Vec<f64>,
    radius: Option<f64>,
    probability: f64,
    evaluations: usize,
    failed: bool,
}

/// Tracks the direction reported as design point.
#[derive(Debug, Clone)]
struct DirectionTracker {
    method: DesignPointMethod,
    nearest: Option<(f64, Vec<f64>)>,
    weighted: Vec<f64>,
}

impl DirectionTracker {
    fn new(size: usize, method: DesignPointMethod) -> Self {
        Self {
            method,
            nearest: None,
            weighted: vec![0.0; size],
        }
    }

    fn add(&mut self, result: &DirectionResult) {
        let Some(radius) = result.radius else {
            return;
        };
        if self.nearest.as_ref().map_or(true, |(r, _)| radius < *r) {
            self.nearest = Some((radius, result.direction.clone()));
        }
        for (sum, d) in self.weighted.iter_mut().zip(&result.direction) {
            *sum += result.probability * d;
        }
    }

    fn direction(&self) -> Option<Vec<f64>> {
        match self.method {
            DesignPointMethod::NearestToMean => self.nearest.as_ref().map(|(_, d)| d.clone()),
            DesignPointMethod::CenterOfGravity => {
                let norm = self.weighted.iter().map(|v| v * v).sum::<f64>().sqrt();
                (norm > 0.0).then(|| self.weighted.iter().map(|v| v / norm).collect())
            }
        }
    }
}

/// Directional Sampling reliability method.
///
/// With `max_parallel_processes == 1` directions are solved one at a time and
/// convergence is checked after every direction. Otherwise chunks of
/// `chunk_size` directions are drawn on the calling thread and solved on the
/// runner's pool; progress, cancellation and convergence are checked per
/// chunk, so the two modes are not bit-reproducible against each other.
#[derive(Debug, Clone, Default)]
pub struct DirectionalSampling {
    settings: DirectionalSamplingSettings,
}

impl DirectionalSampling {
    /// Creates the method.
    pub fn new(settings: DirectionalSamplingSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &DirectionalSamplingSettings {
        &self.settings
    }

    fn draw_direction(&self, rng: &mut ReliabilityRng, mask: &[bool]) -> Vec<f64> {
        let mut buffer = vec![0.0; mask.len()];
        loop {
            rng.fill_normal_masked(&mut buffer, mask);
            let norm = buffer.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                return Vector::from(buffer).normalized().into_vec();
            }
        }
    }

    fn solve_direction(
        &self,
        runner: &ModelRunner,
        finder: &RayRootFinder,
        z0: f64,
        dimension: usize,
        direction: Vec<f64>,
    ) -> Result<DirectionResult> {
        let ray = finder.find_root(z0, |r| {
            let mut sample = Sample::new(direction.iter().map(|d| d * r).collect());
            runner.z_value(&mut sample)
        })?;
        let probability = match ray.radius {
            Some(r) => gamma_upper_regularized(0.5 * dimension as f64, 0.5 * r * r)?,
            None => 0.0,
        };
        Ok(DirectionResult {
            direction,
            radius: ray.radius,
            probability,
            evaluations: ray.evaluations,
            failed: ray.failed,
        })
    }
}

impl ReliabilityMethod for DirectionalSampling {
    fn name(&self) -> &'static str {
        "Directional Sampling"
    }

    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint> {
        self.settings.validate()?;
        let s = &self.settings;
        let mask = runner.independent_mask().to_vec();
        let dimension = mask.iter().filter(|&&m| m).count();
        if dimension == 0 {
            return Err(ReliabilityError::EmptyInput(
                "directional sampling needs at least one varying stochast".to_string(),
            ));
        }

        let z0 = runner.z_at(&vec![0.0; mask.len()])?;
        if z0.is_nan() {
            return Err(ReliabilityError::ModelFailure(
                "limit state cannot be evaluated at the origin".to_string(),
            ));
        }
        let sign = if z0 < 0.0 { -1.0 } else { 1.0 };

        let finder = RayRootFinder::new(s.root_finder);
        let mut rng = ReliabilityRng::from_seed(s.seed);
        let mut statistics = DirectionalStatistics::default();
        let mut tracker = DirectionTracker::new(mask.len(), s.design_point_method);
        let mut drawn = 0;
        let mut failed_samples = 0;
        let mut evaluations = 1;
        let mut converged = false;

        let chunk_size = if runner.is_parallel() { s.chunk_size } else { 1 };

        while drawn < s.maximum_samples {
            let count = chunk_size.min(s.maximum_samples - drawn);
            let directions: Vec<Vec<f64>> =
                (0..count).map(|_| self.draw_direction(&mut rng, &mask)).collect();
            drawn += count;

            let results = runner.map_parallel(&directions, |direction| {
                self.solve_direction(runner, &finder, z0, dimension, direction.clone())
            });
            // first error of the chunk wins
            for result in results {
                let result = result?;
                evaluations += result.evaluations;
                if result.failed {
                    failed_samples += 1;
                    continue;
                }
                statistics.add(result.probability);
                tracker.add(&result);
            }

            let q = statistics.probability();
            let pf = if sign > 0.0 { q } else { 1.0 - q };
            if runner.is_parallel() {
                debug!(
                    directions = drawn,
                    pf,
                    cov = statistics.coefficient_of_variation(),
                    "directional sampling chunk done"
                );
            }

            converged = statistics.is_converged(s);
            let report = ProgressReport::new(
                drawn,
                s.maximum_samples,
                bounded_beta(pf),
                statistics.coefficient_of_variation(),
            );
            if converged || runner.report_progress(report) == ProgressControl::Cancel {
                break;
            }
        }

        let q = statistics.probability();
        let pf = if sign > 0.0 { q } else { 1.0 - q };
        let beta = bounded_beta(pf);

        let alpha: Vec<f64> = match tracker.direction() {
            Some(direction) => direction.iter().map(|d| -sign * d).collect(),
            None => {
                runner.add_message(Message::warning(
                    "no limit state found in any direction, alpha is undetermined",
                ));
                let component = -sign / (dimension as f64).sqrt();
                mask.iter()
                    .map(|&active| if active { component } else { 0.0 })
                    .collect()
            }
        };

        if converged {
            info!(beta, pf, directions = drawn, "directional sampling converged");
        } else {
            warn!(beta, pf, directions = drawn, "directional sampling did not converge");
            runner.add_message(Message::warning(format!(
                "directional sampling did not converge after {} directions",
                drawn
            )));
        }
        if failed_samples > 0 {
            runner.add_message(Message::warning(format!(
                "{} directions failed because of model errors",
                failed_samples
            )));
        }

        let report = ConvergenceReport {
            is_converged: converged,
            convergence: statistics.coefficient_of_variation(),
            total_iterations: drawn,
            total_directions: drawn,
            total_model_runs: evaluations,
            fail_fraction: q,
            failed_samples,
        };
        runner.design_point(beta, &alpha, report, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_variance() {
        let mut statistics = DirectionalStatistics::default();
        for p in [0.1, 0.3] {
            statistics.add(p);
        }
        // sample variance 0.02, variance of the mean 0.01
        assert!((statistics.probability() - 0.2).abs() < 1e-12);
        assert!((statistics.variance() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_need_minimum_samples() {
        let settings = DirectionalSamplingSettings {
            minimum_samples: 3,
            ..Default::default()
        };
        let mut statistics = DirectionalStatistics::default();
        statistics.add(0.0);
        statistics.add(0.0);
        assert!(!statistics.is_converged(&settings));
        statistics.add(0.0);
        assert!(statistics.is_converged(&settings));
    }

    #[test]
    fn test_settings_validation() {
        assert!(DirectionalSamplingSettings::default().validate().is_ok());

        let settings = DirectionalSamplingSettings {
            minimum_samples: 10,
            maximum_samples: 5,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSampleCount { .. })
        ));

        let settings = DirectionalSamplingSettings {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_tracker_center_of_gravity() {
        let mut tracker = DirectionTracker::new(2, DesignPointMethod::CenterOfGravity);
        for (direction, probability) in [(vec![1.0, 0.0], 0.3), (vec![0.0, 1.0], 0.3)] {
            tracker.add(&DirectionResult {
                direction,
                radius: Some(1.0),
                probability,
                evaluations: 1,
                failed: false,
            });
        }
        let direction = tracker.direction().unwrap();
        assert!((direction[0] - direction[1]).abs() < 1e-12);
        assert!((direction[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }
}
