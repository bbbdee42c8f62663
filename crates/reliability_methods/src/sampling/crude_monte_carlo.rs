//! Crude Monte Carlo.
//!
//! `Pf = failures / N` with coefficient of variation
//! `sqrt((1 − Pf) / (N · Pf))`.

use super::design_point_builder::{bounded_beta, DesignPointBuilder, DesignPointMethod};
use crate::error::{require_positive, require_sample_counts, ConfigError};
use crate::method::ReliabilityMethod;
use crate::model::{ModelRunner, ProgressControl, ProgressReport};
use reliability_core::rng::NormalSampler;
use reliability_core::types::{ConvergenceReport, DesignPoint, Message, Result, Sample};
use tracing::{debug, info, warn};

/// Source of the random numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SamplerKind {
    /// Seeded pseudo-random numbers
    #[default]
    Pseudo,
    /// Sobol quasi-random points (at most 21 varying stochasts)
    Sobol,
}

/// Settings of [`CrudeMonteCarlo`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CrudeMonteCarloSettings {
    /// Samples before convergence is checked
    pub minimum_samples: usize,
    /// Hard cap on the number of samples
    pub maximum_samples: usize,
    /// Target coefficient of variation of the failure probability
    pub variation_coefficient: f64,
    /// Samples evaluated per batch
    pub chunk_size: usize,
    /// Seed of the pseudo-random sampler
    pub seed: u64,
    /// Random number source
    pub sampler: SamplerKind,
    /// Sample reported as design point
    pub design_point_method: DesignPointMethod,
}

impl Default for CrudeMonteCarloSettings {
    fn default() -> Self {
        Self {
            minimum_samples: 1_000,
            maximum_samples: 100_000,
            variation_coefficient: 0.1,
            chunk_size: 1_000,
            seed: 0,
            sampler: SamplerKind::Pseudo,
            design_point_method: DesignPointMethod::NearestToMean,
        }
    }
}

impl CrudeMonteCarloSettings {
    /// Validates the settings.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        require_sample_counts(self.minimum_samples, self.maximum_samples)?;
        require_positive("variation_coefficient", self.variation_coefficient)?;
        if self.chunk_size == 0 {
            return Err(ConfigError::parameter("chunk_size", "must be at least 1"));
        }
        Ok(())
    }
}

/// Coefficient of variation of a Monte Carlo probability estimate.
pub(crate) fn binomial_cov(probability: f64, count: usize) -> f64 {
    if probability <= 0.0 || count == 0 {
        return f64::INFINITY;
    }
    ((1.0 - probability) / (count as f64 * probability)).sqrt()
}

/// Crude Monte Carlo reliability method.
#[derive(Debug, Clone, Default)]
pub struct CrudeMonteCarlo {
    settings: CrudeMonteCarloSettings,
}

impl CrudeMonteCarlo {
    /// Creates the method.
    pub fn new(settings: CrudeMonteCarloSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &CrudeMonteCarloSettings {
        &self.settings
    }
}

impl ReliabilityMethod for CrudeMonteCarlo {
    fn name(&self) -> &'static str {
        "Crude Monte Carlo"
    }

    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint> {
        self.settings.validate()?;
        let s = &self.settings;
        let mask = runner.independent_mask().to_vec();
        let mut sampler = match s.sampler {
            SamplerKind::Pseudo => NormalSampler::pseudo(s.seed),
            SamplerKind::Sobol => NormalSampler::sobol(mask.iter().filter(|&&m| m).count())?,
        };

        let mut builder = DesignPointBuilder::new(mask.len(), s.design_point_method);
        let mut count = 0;
        let mut failures = 0;
        let mut failed_samples = 0;
        let mut drawn = 0;
        let mut converged = false;

        while drawn < s.maximum_samples {
            let size = s.chunk_size.min(s.maximum_samples - drawn);
            let mut samples: Vec<Sample> = (0..size)
                .map(|i| {
                    let mut values = vec![0.0; mask.len()];
                    sampler.fill(&mut values, &mask);
                    Sample::new(values).with_iteration(drawn + i)
                })
                .collect();
            drawn += size;
            runner.z_values(&mut samples)?;

            for sample in &samples {
                if sample.z.is_nan() {
                    failed_samples += 1;
                    continue;
                }
                count += 1;
                if sample.is_failure() {
                    failures += 1;
                }
                builder.add(&sample.values, sample.z, sample.weight);
            }

            let pf = if count > 0 {
                failures as f64 / count as f64
            } else {
                0.0
            };
            let cov = binomial_cov(pf, count);
            debug!(samples = drawn, pf, cov, "crude monte carlo chunk done");

            converged = count >= s.minimum_samples && cov <= s.variation_coefficient;
            let report = ProgressReport::new(drawn, s.maximum_samples, bounded_beta(pf), cov);
            if converged || runner.report_progress(report) == ProgressControl::Cancel {
                break;
            }
        }

        let pf = if count > 0 {
            failures as f64 / count as f64
        } else {
            0.0
        };
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
            info!(beta, pf, samples = drawn, "crude monte carlo converged");
        } else {
            warn!(beta, pf, samples = drawn, "crude monte carlo did not converge");
        }

        let report = ConvergenceReport {
            is_converged: converged,
            convergence: binomial_cov(pf, count),
            total_iterations: drawn,
            total_directions: 0,
            total_model_runs: drawn,
            fail_fraction: pf,
            failed_samples,
        };
        runner.design_point(beta, &alpha, report, self.name())
    }
}
