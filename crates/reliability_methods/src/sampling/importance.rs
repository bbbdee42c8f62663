//! Importance Sampling with a shifted and scaled normal density.
//!
//! Samples are drawn from `q = N(μ, σ²I)` over the varying entries and
//! weighted back to the standard normal density:
//!
//! ```text
//! w(u) = φ(u) / q(u) = σⁿ · exp(−|u|²/2 + |u − μ|²/(2σ²))
//! ```

use super::design_point_builder::{bounded_beta, DesignPointBuilder, DesignPointMethod};
use crate::error::{require_positive, require_sample_counts, ConfigError};
use crate::method::ReliabilityMethod;
use crate::model::{ModelRunner, ProgressControl, ProgressReport};
use reliability_core::rng::ReliabilityRng;
use reliability_core::types::{
    ConvergenceReport, DesignPoint, Message, ReliabilityError, Result, Sample,
};
use tracing::{debug, info, warn};

/// Settings of [`ImportanceSampling`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImportanceSamplingSettings {
    /// Mean of the sampling density per stochast; empty means the origin
    pub mean: Vec<f64>,
    /// Standard deviation of the sampling density
    pub standard_deviation: f64,
    /// Samples before convergence is checked
    pub minimum_samples: usize,
    /// Hard cap on the number of samples
    pub maximum_samples: usize,
    /// Target coefficient of variation of the failure probability
    pub variation_coefficient: f64,
    /// Samples evaluated per batch
    pub chunk_size: usize,
    /// Seed of the sampler
    pub seed: u64,
    /// Sample reported as design point
    pub design_point_method: DesignPointMethod,
}

impl Default for ImportanceSamplingSettings {
    fn default() -> Self {
        Self {
            mean: Vec::new(),
            standard_deviation: 1.0,
            minimum_samples: 1_000,
            maximum_samples: 100_000,
            variation_coefficient: 0.1,
            chunk_size: 1_000,
            seed: 0,
            design_point_method: DesignPointMethod::NearestToMean,
        }
    }
}

impl ImportanceSamplingSettings {
    /// Validates the settings.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        require_sample_counts(self.minimum_samples, self.maximum_samples)?;
        require_positive("standard_deviation", self.standard_deviation)?;
        require_positive("variation_coefficient", self.variation_coefficient)?;
        if self.chunk_size == 0 {
            return Err(ConfigError::parameter("chunk_size", "must be at least 1"));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ConfigError::parameter("mean", "must be finite"));
        }
        Ok(())
    }
}

/// Weighted indicator sums.
#[derive(Debug, Clone, Copy, Default)]
struct WeightedStatistics {
    sum: f64,
    sum_squares: f64,
    count: usize,
}

impl WeightedStatistics {
    fn add(&mut self, weighted_indicator: f64) {
        self.sum += weighted_indicator;
        self.sum_squares += weighted_indicator * weighted_indicator;
        self.count += 1;
    }

    fn probability(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn coefficient_of_variation(&self) -> f64 {
        let pf = self.probability();
        if pf <= 0.0 || self.count < 2 {
            return f64::INFINITY;
        }
        let n = self.count as f64;
        let variance = ((self.sum_squares / n - pf * pf) / (n - 1.0)).max(0.0);
        variance.sqrt() / pf
    }
}

/// Importance Sampling reliability method.
#[derive(Debug, Clone, Default)]
pub struct ImportanceSampling {
    settings: ImportanceSamplingSettings,
}

impl ImportanceSampling {
    /// Creates the method.
    pub fn new(settings: ImportanceSamplingSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &ImportanceSamplingSettings {
        &self.settings
    }

    /// Density ratio `φ(u) / q(u)` over the active entries.
    fn weight(&self, u: &[f64], mean: &[f64], mask: &[bool]) -> f64 {
        let sigma = self.settings.standard_deviation;
        let mut exponent = 0.0;
        let mut dimension = 0;
        for ((&value, &m), &active) in u.iter().zip(mean).zip(mask) {
            if active {
                let shifted = (value - m) / sigma;
                exponent += -0.5 * value * value + 0.5 * shifted * shifted;
                dimension += 1;
            }
        }
        sigma.powi(dimension) * exponent.exp()
    }
}

impl ReliabilityMethod for ImportanceSampling {
    fn name(&self) -> &'static str {
        "Importance Sampling"
    }

    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint> {
        self.settings.validate()?;
        let s = &self.settings;
        let mask = runner.independent_mask().to_vec();
        let mean = if s.mean.is_empty() {
            vec![0.0; mask.len()]
        } else if s.mean.len() == mask.len() {
            s.mean.clone()
        } else {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "importance sampling mean has {} values for {} stochasts",
                s.mean.len(),
                mask.len()
            )));
        };

        let mut rng = ReliabilityRng::from_seed(s.seed);
        let mut builder = DesignPointBuilder::new(mask.len(), s.design_point_method);
        let mut statistics = WeightedStatistics::default();
        let mut failed_samples = 0;
        let mut drawn = 0;
        let mut converged = false;

        while drawn < s.maximum_samples {
            let size = s.chunk_size.min(s.maximum_samples - drawn);
            let mut samples: Vec<Sample> = (0..size)
                .map(|i| {
                    let mut values = vec![0.0; mask.len()];
                    rng.fill_normal_masked(&mut values, &mask);
                    for ((value, &m), &active) in values.iter_mut().zip(&mean).zip(&mask) {
                        if active {
                            *value = m + s.standard_deviation * *value;
                        }
                    }
                    let mut sample = Sample::new(values).with_iteration(drawn + i);
                    sample.weight = self.weight(&sample.values, &mean, &mask);
                    sample
                })
                .collect();
            drawn += size;
            runner.z_values(&mut samples)?;

            for sample in &samples {
                if sample.z.is_nan() {
                    failed_samples += 1;
                    continue;
                }
                let indicator = if sample.is_failure() { 1.0 } else { 0.0 };
                statistics.add(sample.weight * indicator);
                builder.add(&sample.values, sample.z, sample.weight);
            }

            let pf = statistics.probability();
            let cov = statistics.coefficient_of_variation();
            debug!(samples = drawn, pf, cov, "importance sampling chunk done");

            converged = statistics.count >= s.minimum_samples && cov <= s.variation_coefficient;
            let report = ProgressReport::new(drawn, s.maximum_samples, bounded_beta(pf), cov);
            if converged || runner.report_progress(report) == ProgressControl::Cancel {
                break;
            }
        }

        let pf = statistics.probability().min(1.0);
        let beta = bounded_beta(pf);
        let alpha = match builder.alpha(pf) {
            Some(alpha) => alpha,
            None => {
                runner.add_message(Message::warning(
                    "no failing samples, alpha is undetermined",
                ));
                vec![0.0; mask.len()]
            }
        };

        if converged {
            info!(beta, pf, samples = drawn, "importance sampling converged");
        } else {
            warn!(beta, pf, samples = drawn, "importance sampling did not converge");
        }

        let report = ConvergenceReport {
            is_converged: converged,
            convergence: statistics.coefficient_of_variation(),
            total_iterations: drawn,
            total_directions: 0,
            total_model_runs: drawn,
            fail_fraction: builder.failure_count() as f64 / statistics.count.max(1) as f64,
            failed_samples,
        };
        runner.design_point(beta, &alpha, report, self.name())
    }
}
