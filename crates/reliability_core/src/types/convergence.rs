//! Convergence diagnostics of a reliability calculation.

/// Convergence report produced once per method run.
///
/// `convergence` holds the method's own indicator: the coefficient of
/// variation for sampling methods, the last `|z| / |∇z|` for FORM.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceReport {
    /// Whether the method met its convergence criterion
    pub is_converged: bool,
    /// Method specific convergence indicator
    pub convergence: f64,
    /// Iterations or samples used
    pub total_iterations: usize,
    /// Directions sampled (Directional Sampling only)
    pub total_directions: usize,
    /// Limit state evaluations
    pub total_model_runs: usize,
    /// Fraction of samples in the failure domain
    pub fail_fraction: f64,
    /// Samples whose evaluation failed (NaN)
    pub failed_samples: usize,
}

impl ConvergenceReport {
    /// Report for a converged run.
    pub fn converged(convergence: f64, total_iterations: usize, total_model_runs: usize) -> Self {
        Self {
            is_converged: true,
            convergence,
            total_iterations,
            total_model_runs,
            ..Default::default()
        }
    }
}
