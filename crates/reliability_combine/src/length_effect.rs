//! Upscaling of a cross-section design point to a length.
//!
//! The limit state along the length is a stationary Gaussian process. The
//! part of `Z` that is common over the length (`ρ_Z = Σ αᵢ²ρᵢ`) is
//! integrated out explicitly; the remaining part crosses the limit with the
//! Rice up-crossing rate of a process with equivalent correlation length
//! `d_eq`:
//!
//! ```text
//! P(L) = ∫ φ(v) · [1 − Φ(b) · exp(−L·ν(b))] dv,   b = (β + √ρ_Z·v) / √(1 − ρ_Z)
//! ν(b) = exp(−b²/2) / (π·√2·d_eq)
//! ```

use crate::combiner::{bounded_beta, independent_alphas, normalize};
use reliability_core::math::distributions::{norm_cdf, norm_pdf, probability_from_beta};
use reliability_core::types::{ConvergenceReport, DesignPoint, ReliabilityError, Result};
use std::f64::consts::{PI, SQRT_2};
use tracing::debug;

const INTEGRATION_LIMIT: f64 = 8.0;
const INTEGRATION_STEP: f64 = 0.01;
const BETA_STEP: f64 = 1e-3;

/// Length-effect upscaling of cross-section design points.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthEffect;

/// Parameters of the process along the length.
#[derive(Debug, Clone, Copy)]
struct Process {
    rho_z: f64,
    correlation_length: f64,
}

impl Process {
    /// Composite Simpson rule over `v ∈ [−8, 8]`.
    fn probability(&self, beta: f64, length: f64) -> f64 {
        let shared = self.rho_z.sqrt();
        let own = (1.0 - self.rho_z).sqrt();
        let rate_factor = 1.0 / (PI * SQRT_2 * self.correlation_length);

        // even number of intervals
        let intervals = 2 * (INTEGRATION_LIMIT / INTEGRATION_STEP).round() as usize;
        let h = 2.0 * INTEGRATION_LIMIT / intervals as f64;
        let sum: f64 = (0..=intervals)
            .map(|k| {
                let v = -INTEGRATION_LIMIT + k as f64 * h;
                let b = (beta + shared * v) / own;
                let crossings = length * rate_factor * (-0.5 * b * b).exp();
                // 1 − Φ(b)·exp(−n) without cancellation
                let conditional = norm_cdf(-b) - norm_cdf(b) * (-crossings).exp_m1();
                let weight = if k == 0 || k == intervals {
                    1.0
                } else if k % 2 == 1 {
                    4.0
                } else {
                    2.0
                };
                weight * norm_pdf(v) * conditional
            })
            .sum();
        (sum * h / 3.0).clamp(0.0, 1.0)
    }
}

impl LengthEffect {
    /// Upscales `cross_section` to `length`.
    ///
    /// `self_correlations` and `correlation_lengths` hold one value per
    /// alpha of the cross section: the correlation of the stochast between
    /// distant cross sections and its correlation length.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the slices do not match the alphas,
    /// `InvalidArgument` for correlations outside `[0, 1]` or non-positive
    /// correlation lengths.
    ///
    /// # Examples
    /// ```
    /// use reliability_combine::LengthEffect;
    /// use reliability_core::stochast::{DistributedStochast, Stochast};
    /// use reliability_core::types::{DesignPoint, StochastPointAlpha};
    /// use std::sync::Arc;
    ///
    /// let stochast: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("R", 0.0, 1.0).unwrap());
    /// let cross_section = DesignPoint {
    ///     beta: 4.0,
    ///     alphas: vec![StochastPointAlpha {
    ///         stochast,
    ///         alpha: 1.0,
    ///         alpha_correlated: 1.0,
    ///         u: -4.0,
    ///         x: -4.0,
    ///         influence_factor: 1.0,
    ///     }],
    ///     ..Default::default()
    /// };
    ///
    /// let section = LengthEffect.upscale_length(&cross_section, &[0.5], &[100.0], 1_000.0).unwrap();
    /// assert!(section.beta < 4.0);
    /// ```
    pub fn upscale_length(
        &self,
        cross_section: &DesignPoint,
        self_correlations: &[f64],
        correlation_lengths: &[f64],
        length: f64,
    ) -> Result<DesignPoint> {
        let n = cross_section.alphas.len();
        if self_correlations.len() != n || correlation_lengths.len() != n {
            return Err(ReliabilityError::DimensionMismatch(format!(
                "{} self correlations and {} correlation lengths for {} alphas",
                self_correlations.len(),
                correlation_lengths.len(),
                n
            )));
        }
        if let Some(rho) = self_correlations.iter().find(|r| !(0.0..=1.0).contains(*r)) {
            return Err(ReliabilityError::InvalidArgument(format!(
                "self correlation must be in [0, 1], got {}",
                rho
            )));
        }
        if let Some(d) = correlation_lengths.iter().find(|d| !(**d > 0.0)) {
            return Err(ReliabilityError::InvalidArgument(format!(
                "correlation length must be positive, got {}",
                d
            )));
        }
        if length <= 0.0 {
            return Ok(cross_section.clone());
        }

        let alpha = cross_section.alpha_values();
        let rho_z: f64 = alpha
            .iter()
            .zip(self_correlations)
            .map(|(a, r)| a * a * r)
            .sum();
        let independent: Vec<f64> = alpha
            .iter()
            .zip(self_correlations)
            .map(|(a, r)| a * a * (1.0 - r))
            .collect();
        let denominator: f64 = independent
            .iter()
            .zip(correlation_lengths)
            .map(|(w, d)| w / (d * d))
            .sum();
        if rho_z >= 1.0 || denominator <= 0.0 {
            debug!("fully correlated cross section, no length effect");
            return Ok(cross_section.clone());
        }

        let process = Process {
            rho_z,
            correlation_length: ((1.0 - rho_z) / denominator).sqrt(),
        };
        let beta_cross = cross_section.beta;
        let probability = process
            .probability(beta_cross, length)
            .max(cross_section.probability_of_failure());
        let beta = bounded_beta(probability);
        debug!(
            rho_z,
            correlation_length = process.correlation_length,
            beta_cross,
            beta,
            length,
            "length effect"
        );

        // dβ_L/dβ for the common parts
        let shifted = bounded_beta(
            process
                .probability(beta_cross + BETA_STEP, length)
                .max(probability_from_beta(beta_cross + BETA_STEP)),
        );
        let slope = (shifted - beta) / BETA_STEP;

        let common: Vec<f64> = alpha
            .iter()
            .zip(self_correlations)
            .map(|(a, r)| a * r.sqrt() * slope)
            .collect();
        let remaining = (1.0 - common.iter().map(|c| c * c).sum::<f64>()).max(0.0);
        let independent_total: f64 = independent.iter().sum();

        let mut upscaled: Vec<f64> = alpha
            .iter()
            .zip(common.iter().zip(&independent))
            .map(|(a, (c, w))| {
                let share = if independent_total > 0.0 {
                    remaining * w / independent_total
                } else {
                    0.0
                };
                a.signum() * (c * c + share).sqrt()
            })
            .collect();
        normalize(&mut upscaled);

        let stochasts: Vec<_> = cross_section
            .alphas
            .iter()
            .map(|a| a.stochast.clone())
            .collect();
        Ok(DesignPoint {
            identifier: format!("Length effect ({})", length),
            beta,
            alphas: independent_alphas(&stochasts, &upscaled, beta),
            convergence_report: ConvergenceReport {
                is_converged: cross_section.convergence_report.is_converged,
                ..Default::default()
            },
            contributing_design_points: vec![cross_section.clone()],
            messages: Vec::new(),
        })
    }
}
