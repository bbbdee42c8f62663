//! Hohenbichler combination of two design points.
//!
//! Each design point is read as a linear limit state `Z = β + Σ αᵢuᵢ`. A
//! stochast shared by both points is split into a common part and two
//! independent parts,
//!
//! ```text
//! uᵢ = √ρᵢ·vᵢ + √(1 − ρᵢ)·wᵢ
//! ```
//!
//! so that the limit states have correlation `ρ₁₂ = Σ α₁ᵢα₂ᵢρᵢ`. The system
//! probability follows from the bivariate normal distribution. The alpha of
//! the system is the gradient of the system β with respect to a shift of
//! each of the parts `v`, `w₁` and `w₂`.

use crate::combiner::{
    alpha_of, bounded_beta, independent_alphas, normalize, union_of_stochasts, CombinationType,
    DesignPointCombiner, SelfCorrelation,
};
use reliability_core::math::distributions::{bivariate_norm_cdf, probability_from_beta};
use reliability_core::math::numeric::prevailing_sign;
use reliability_core::types::{ConvergenceReport, DesignPoint, ReliabilityError, Result};
use tracing::debug;

/// Shift of a part in the alpha computation.
const PERTURBATION: f64 = 1e-3;

/// System probability of two linear limit states with correlation `rho`.
fn system_probability(beta1: f64, beta2: f64, rho: f64, combination: CombinationType) -> f64 {
    let both = bivariate_norm_cdf(-beta1, -beta2, rho);
    match combination {
        CombinationType::And => both,
        CombinationType::Or => {
            probability_from_beta(beta1) + probability_from_beta(beta2) - both
        }
    }
}

/// Pairwise Hohenbichler combiner, folded over a list of design points.
///
/// # Examples
/// ```
/// use reliability_combine::{CombinationType, DesignPointCombiner, Hohenbichler2Combiner, SelfCorrelation};
/// use reliability_core::math::distributions::probability_from_beta;
/// use reliability_core::stochast::{DistributedStochast, Stochast};
/// use reliability_core::types::{DesignPoint, StochastPointAlpha};
/// use std::sync::Arc;
///
/// let point = |name: &str, beta: f64| {
///     let stochast: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal(name, 0.0, 1.0).unwrap());
///     DesignPoint {
///         beta,
///         alphas: vec![StochastPointAlpha {
///             stochast,
///             alpha: 1.0,
///             alpha_correlated: 1.0,
///             u: -beta,
///             x: -beta,
///             influence_factor: 1.0,
///         }],
///         ..Default::default()
///     }
/// };
///
/// // two independent elements in series
/// let points = [point("a", 3.0), point("b", 3.0)];
/// let system = Hohenbichler2Combiner
///     .combine(&points, &SelfCorrelation::new(), CombinationType::Or)
///     .unwrap();
/// let p = probability_from_beta(3.0);
/// assert!((system.probability_of_failure() - (2.0 * p - p * p)).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Hohenbichler2Combiner;

impl Hohenbichler2Combiner {
    /// Combines two design points.
    pub fn combine_pair(
        &self,
        first: &DesignPoint,
        second: &DesignPoint,
        self_correlation: &SelfCorrelation,
        combination: CombinationType,
    ) -> DesignPoint {
        let stochasts = union_of_stochasts([first, second]);
        let alpha1: Vec<f64> = stochasts.iter().map(|s| alpha_of(first, s)).collect();
        let alpha2: Vec<f64> = stochasts.iter().map(|s| alpha_of(second, s)).collect();
        let rho: Vec<f64> = stochasts
            .iter()
            .zip(alpha1.iter().zip(&alpha2))
            .map(|(s, (&a1, &a2))| {
                if a1 != 0.0 && a2 != 0.0 {
                    self_correlation.get(s)
                } else {
                    0.0
                }
            })
            .collect();

        let rho12 = alpha1
            .iter()
            .zip(&alpha2)
            .zip(&rho)
            .map(|((a1, a2), r)| a1 * a2 * r)
            .sum::<f64>()
            .clamp(-1.0, 1.0);

        let (beta1, beta2) = (first.beta, second.beta);
        let probability = system_probability(beta1, beta2, rho12, combination);
        let beta = bounded_beta(probability);
        debug!(beta1, beta2, rho12, beta, %combination, "hohenbichler pair");

        // β after shifting a part with coefficients (c1, c2) by the perturbation
        let shifted_beta = |c1: f64, c2: f64| {
            let p = system_probability(
                beta1 + c1 * PERTURBATION,
                beta2 + c2 * PERTURBATION,
                rho12,
                combination,
            );
            bounded_beta(p)
        };

        let mut alpha: Vec<f64> = (0..stochasts.len())
            .map(|i| {
                let shared = rho[i].sqrt();
                let own = (1.0 - rho[i]).max(0.0).sqrt();
                let parts = [
                    shifted_beta(alpha1[i] * shared, alpha2[i] * shared),
                    shifted_beta(alpha1[i] * own, 0.0),
                    shifted_beta(0.0, alpha2[i] * own),
                ]
                .map(|b| (b - beta) / PERTURBATION);
                let magnitude = parts.iter().map(|p| p * p).sum::<f64>().sqrt();
                prevailing_sign(&parts) * magnitude
            })
            .collect();
        normalize(&mut alpha);

        let convergence_report = ConvergenceReport {
            is_converged: first.convergence_report.is_converged
                && second.convergence_report.is_converged,
            total_model_runs: first.convergence_report.total_model_runs
                + second.convergence_report.total_model_runs,
            ..Default::default()
        };

        DesignPoint {
            identifier: format!("Hohenbichler {}", combination),
            beta,
            alphas: independent_alphas(&stochasts, &alpha, beta),
            convergence_report,
            contributing_design_points: vec![first.clone(), second.clone()],
            messages: Vec::new(),
        }
    }
}

impl DesignPointCombiner for Hohenbichler2Combiner {
    fn combine(
        &self,
        design_points: &[DesignPoint],
        self_correlation: &SelfCorrelation,
        combination: CombinationType,
    ) -> Result<DesignPoint> {
        let (first, rest) = design_points.split_first().ok_or_else(|| {
            ReliabilityError::EmptyInput("no design points to combine".to_string())
        })?;
        Ok(rest.iter().fold(first.clone(), |combined, next| {
            self.combine_pair(&combined, next, self_correlation, combination)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_probability_limits() {
        let p = probability_from_beta(2.0);
        let and = system_probability(2.0, 2.0, 0.0, CombinationType::And);
        let or = system_probability(2.0, 2.0, 0.0, CombinationType::Or);
        assert!((and - p * p).abs() < 1e-12);
        assert!((or - (2.0 * p - p * p)).abs() < 1e-12);

        let full = system_probability(2.0, 3.0, 1.0, CombinationType::Or);
        assert!((full - p).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let result = Hohenbichler2Combiner.combine(&[], &SelfCorrelation::new(), CombinationType::And);
        assert!(matches!(result, Err(ReliabilityError::EmptyInput(_))));
    }
}
