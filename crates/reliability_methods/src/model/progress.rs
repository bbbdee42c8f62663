//! Progress reporting and cooperative cancellation.

/// Snapshot passed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    /// Fraction of the sample or iteration budget spent, in [0, 1]
    pub fraction: f64,
    /// Iterations, samples or directions done so far
    pub iteration: usize,
    /// Current estimate of the reliability index
    pub beta: f64,
    /// Current convergence indicator
    pub convergence: f64,
}

impl ProgressReport {
    /// Report at `iteration` out of `budget`.
    pub fn new(iteration: usize, budget: usize, beta: f64, convergence: f64) -> Self {
        let fraction = if budget == 0 {
            1.0
        } else {
            (iteration as f64 / budget as f64).min(1.0)
        };
        Self {
            fraction,
            iteration,
            beta,
            convergence,
        }
    }
}

/// Answer of the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressControl {
    /// Keep going
    #[default]
    Continue,
    /// Stop after the work in flight
    Cancel,
}

/// Progress callback shared with worker threads.
pub type ProgressCallback = Box<dyn Fn(&ProgressReport) -> ProgressControl + Send + Sync>;
