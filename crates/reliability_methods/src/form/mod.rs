//! First Order Reliability Method.
//!
//! This module provides:
//!
//! - [`Form`]: Hasofer-Lind / Rackwitz-Fiessler iteration with relaxation
//! - [`gradient`]: batched finite difference gradient in u-space
//! - [`find_start_point`]: fixed, ray, sphere and sensitivity start points
//!
//! # Algorithm
//!
//! At the iterate `u` with `z = Z(u)` and gradient `g`:
//!
//! ```text
//! β  = (z − g·u) / |g|
//! α  = g / |g|
//! u* = −β·α
//! u ← rf·u* + (1 − rf)·u
//! ```
//!
//! The iteration has converged when `|Δβ| < epsilon_beta` and
//! `|z| / |g| < epsilon_z`. Without convergence the relaxation factor is
//! halved and the iteration restarts, up to `relaxation_loops` times.

mod gradient;
mod settings;
mod start_point;

pub use gradient::{gradient, GradientResult};
pub use settings::{FormSettings, GradientSettings, GradientType, StartMethod, StartPointSettings};
pub use start_point::{find_start_point, sphere_directions};

use crate::method::ReliabilityMethod;
use crate::model::{ModelRunner, ProgressControl, ProgressReport};
use reliability_core::math::linalg::Vector;
use reliability_core::types::{ConvergenceReport, DesignPoint, Message, Result};
use tracing::{debug, info, warn};

/// Last estimate of an HL-RF run.
#[derive(Debug, Clone, Default)]
struct Estimate {
    beta: f64,
    alpha: Vec<f64>,
    convergence: f64,
    iterations: usize,
}

/// How a relaxation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopOutcome {
    Converged,
    Exhausted,
    Failed,
    Cancelled,
}

/// FORM reliability method.
///
/// # Examples
/// ```
/// use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
/// use reliability_methods::form::{Form, FormSettings};
/// use reliability_methods::method::ReliabilityMethod;
/// use reliability_methods::model::{ModelRunner, RunSettings};
/// use std::sync::Arc;
///
/// let r: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("R", 7.0, 1.0).unwrap());
/// let s: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("S", 2.0, 1.0).unwrap());
/// let runner = ModelRunner::new(
///     |x: &[f64]| x[0] - x[1],
///     UConverter::independent(vec![r, s]),
///     RunSettings::default(),
/// )
/// .unwrap();
///
/// let design_point = Form::new(FormSettings::default()).design_point(&runner).unwrap();
/// assert!(design_point.convergence_report.is_converged);
/// assert!((design_point.beta - 5.0 / 2f64.sqrt()).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Form {
    settings: FormSettings,
}

impl Form {
    /// Creates the method.
    pub fn new(settings: FormSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    fn relaxation_loop(
        &self,
        runner: &ModelRunner,
        start: &[f64],
        relaxation_factor: f64,
        estimate: &mut Estimate,
    ) -> Result<LoopOutcome> {
        let s = &self.settings;
        let mut u = start.to_vec();
        let mut previous_beta: Option<f64> = None;

        for iteration in 1..=s.maximum_iterations {
            let result = gradient(runner, &u, &s.gradient)?;
            if result.has_nan() {
                runner.add_message(Message::error(format!(
                    "model failed at FORM iteration {}",
                    iteration
                )));
                return Ok(LoopOutcome::Failed);
            }
            let g = Vector::from(result.gradient);
            let norm = g.norm();
            if norm == 0.0 {
                runner.add_message(Message::error(format!(
                    "zero gradient at FORM iteration {}",
                    iteration
                )));
                return Ok(LoopOutcome::Failed);
            }

            let beta = (result.z - g.dot(&Vector::from(u.clone()))?) / norm;
            let alpha = g.scaled(1.0 / norm).into_vec();
            let convergence = result.z.abs() / norm;
            *estimate = Estimate {
                beta,
                alpha,
                convergence,
                iterations: estimate.iterations + 1,
            };
            debug!(iteration, beta, z = result.z, convergence, "FORM iteration");

            let beta_converged =
                previous_beta.is_some_and(|previous| (beta - previous).abs() < s.epsilon_beta);
            if beta_converged && convergence < s.epsilon_z {
                return Ok(LoopOutcome::Converged);
            }
            previous_beta = Some(beta);

            for (value, a) in u.iter_mut().zip(&estimate.alpha) {
                let target = -beta * a;
                *value = relaxation_factor * target + (1.0 - relaxation_factor) * *value;
            }

            let report = ProgressReport::new(iteration, s.maximum_iterations, beta, convergence);
            if runner.report_progress(report) == ProgressControl::Cancel {
                return Ok(LoopOutcome::Cancelled);
            }
        }
        Ok(LoopOutcome::Exhausted)
    }
}

impl ReliabilityMethod for Form {
    fn name(&self) -> &'static str {
        "FORM"
    }

    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint> {
        self.settings.validate()?;
        let s = &self.settings;
        let start = find_start_point(runner, &s.start_point)?;

        let mut estimate = Estimate {
            alpha: vec![0.0; runner.stochast_count()],
            ..Default::default()
        };
        let mut relaxation_factor = s.relaxation_factor;
        let mut outcome = LoopOutcome::Exhausted;
        for relaxation_loop in 0..s.relaxation_loops {
            outcome = self.relaxation_loop(runner, &start, relaxation_factor, &mut estimate)?;
            if outcome != LoopOutcome::Exhausted {
                break;
            }
            debug!(relaxation_loop, relaxation_factor, "FORM restarts with smaller relaxation");
            relaxation_factor *= 0.5;
        }

        let converged = outcome == LoopOutcome::Converged;
        if converged {
            info!(beta = estimate.beta, iterations = estimate.iterations, "FORM converged");
        } else {
            warn!(beta = estimate.beta, ?outcome, "FORM did not converge");
            if outcome == LoopOutcome::Exhausted {
                runner.add_message(Message::warning(format!(
                    "FORM did not converge in {} iterations",
                    estimate.iterations
                )));
            }
        }

        let report = ConvergenceReport {
            is_converged: converged,
            convergence: estimate.convergence,
            total_iterations: estimate.iterations,
            total_directions: 0,
            total_model_runs: runner.model_runs(),
            fail_fraction: 0.0,
            failed_samples: 0,
        };
        runner.design_point(estimate.beta, &estimate.alpha, report, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunSettings;
    use approx::assert_abs_diff_eq;
    use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
    use std::sync::Arc;

    fn runner(n: usize, model: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> ModelRunner {
        let stochasts: Vec<Arc<dyn Stochast>> = (0..n)
            .map(|i| {
                Arc::new(DistributedStochast::normal(format!("u{}", i), 0.0, 1.0).unwrap())
                    as Arc<dyn Stochast>
            })
            .collect();
        ModelRunner::new(model, UConverter::independent(stochasts), RunSettings::default())
            .unwrap()
    }

    #[test]
    fn test_linear_limit_state() {
        let runner = runner(2, |x: &[f64]| 3.0 - 0.6 * x[0] - 0.8 * x[1]);
        let dp = Form::default().design_point(&runner).unwrap();

        assert!(dp.convergence_report.is_converged);
        assert_abs_diff_eq!(dp.beta, 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dp.alphas[0].alpha, -0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(dp.alphas[1].alpha, -0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(dp.alphas[1].u, 2.4, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_gradient_is_reported() {
        let runner = runner(2, |_: &[f64]| 1.0);
        let dp = Form::default().design_point(&runner).unwrap();

        assert!(!dp.convergence_report.is_converged);
        assert!(dp.messages.iter().any(|m| m.text.contains("zero gradient")));
    }

    #[test]
    fn test_exhausted_iterations_halve_relaxation() {
        let runner = runner(1, |x: &[f64]| 2.0 - x[0]);
        let settings = FormSettings {
            maximum_iterations: 2,
            relaxation_loops: 3,
            ..Default::default()
        };
        let dp = Form::new(settings).design_point(&runner).unwrap();

        assert!(!dp.convergence_report.is_converged);
        assert_eq!(dp.convergence_report.total_iterations, 6);
        assert_abs_diff_eq!(dp.beta, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_settings() {
        let runner = runner(1, |x: &[f64]| x[0]);
        let settings = FormSettings {
            maximum_iterations: 0,
            ..Default::default()
        };
        assert!(Form::new(settings).design_point(&runner).is_err());
    }
}
