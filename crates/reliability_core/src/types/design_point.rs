//! Result of a reliability calculation.

use super::{ConvergenceReport, Message};
use crate::math::distributions::probability_from_beta;
use crate::stochast::Stochast;
use std::sync::Arc;

/// Contribution of one stochast to a design point.
///
/// `u = -beta * alpha`; `x` is the physical value at the design point.
#[derive(Debug, Clone)]
pub struct StochastPointAlpha {
    /// The stochast, shared with the model definition
    pub stochast: Arc<dyn Stochast>,
    /// Direction cosine in independent u-space
    pub alpha: f64,
    /// Direction cosine after correlation
    pub alpha_correlated: f64,
    /// u-value at the design point
    pub u: f64,
    /// x-value at the design point
    pub x: f64,
    /// Share of the variance of Z, `alpha²`
    pub influence_factor: f64,
}

impl StochastPointAlpha {
    /// Whether this alpha belongs to `stochast` (identity, not equality).
    #[inline]
    pub fn is_for(&self, stochast: &Arc<dyn Stochast>) -> bool {
        Arc::ptr_eq(&self.stochast, stochast)
    }
}

/// Design point: reliability index, alpha vector and diagnostics.
///
/// Failure corresponds to negative Z. When populated, the alphas satisfy
/// `Σ alpha² = 1` and `u = -beta * alpha`.
#[derive(Debug, Clone, Default)]
pub struct DesignPoint {
    /// Name of the calculation or combination that produced this point
    pub identifier: String,
    /// Reliability index
    pub beta: f64,
    /// Alpha per stochast
    pub alphas: Vec<StochastPointAlpha>,
    /// Convergence diagnostics
    pub convergence_report: ConvergenceReport,
    /// Design points this one was derived from
    pub contributing_design_points: Vec<DesignPoint>,
    /// Messages collected during the calculation
    pub messages: Vec<Message>,
}

impl DesignPoint {
    /// Failure probability `Φ(-β)`.
    #[inline]
    pub fn probability_of_failure(&self) -> f64 {
        probability_from_beta(self.beta)
    }

    /// Non-failure probability `Φ(β)`.
    #[inline]
    pub fn probability_of_non_failure(&self) -> f64 {
        probability_from_beta(-self.beta)
    }

    /// Alpha values in stochast order.
    pub fn alpha_values(&self) -> Vec<f64> {
        self.alphas.iter().map(|a| a.alpha).collect()
    }

    /// u-values in stochast order.
    pub fn u_values(&self) -> Vec<f64> {
        self.alphas.iter().map(|a| a.u).collect()
    }

    /// x-values in stochast order.
    pub fn x_values(&self) -> Vec<f64> {
        self.alphas.iter().map(|a| a.x).collect()
    }

    /// Alpha entry of `stochast`, matched by identity.
    pub fn alpha_for(&self, stochast: &Arc<dyn Stochast>) -> Option<&StochastPointAlpha> {
        self.alphas.iter().find(|a| a.is_for(stochast))
    }

    /// Sum of squared alphas.
    pub fn alpha_sum_of_squares(&self) -> f64 {
        self.alphas.iter().map(|a| a.alpha * a.alpha).sum()
    }
}
