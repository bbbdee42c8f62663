//! Solver configuration types.

use num_traits::Float;

/// Configuration for the bracketing root finder.
///
/// # Type Parameters
///
/// * `T` - Floating-point type for tolerances (e.g., `f64`)
///
/// # Example
///
/// ```
/// use reliability_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance <= 1e-6);
/// assert_eq!(config.max_iterations, 50);
///
/// let custom = SolverConfig {
///     tolerance: 1e-10,
///     x_tolerance: 1e-10,
///     max_iterations: 200,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Residual tolerance: the solver stops when `|f(x)| < tolerance`.
    pub tolerance: T,

    /// Abscissa tolerance: the solver stops when the last two points are
    /// closer than this.
    pub x_tolerance: T,

    /// Maximum number of iterations before returning an unsuccessful result.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Default values:
    /// - `tolerance`: 1e-6
    /// - `x_tolerance`: 1e-6
    /// - `max_iterations`: 50
    fn default() -> Self {
        let eps = T::from(1e-6).unwrap_or_else(T::epsilon);
        Self {
            tolerance: eps,
            x_tolerance: eps,
            max_iterations: 50,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a new configuration with specified values.
    ///
    /// # Panics
    ///
    /// Panics if a tolerance is negative or `max_iterations == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use reliability_core::math::solvers::SolverConfig;
    ///
    /// let config = SolverConfig::new(1e-8, 1e-4, 100);
    /// assert_eq!(config.max_iterations, 100);
    /// ```
    pub fn new(tolerance: T, x_tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance >= T::zero(), "tolerance must be non-negative");
        assert!(x_tolerance >= T::zero(), "x_tolerance must be non-negative");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            x_tolerance,
            max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: SolverConfig<f64> = SolverConfig::default();
        assert!((config.tolerance - 1e-6).abs() < 1e-15);
        assert!((config.x_tolerance - 1e-6).abs() < 1e-15);
        assert_eq!(config.max_iterations, 50);
    }

    #[test]
    fn test_new_config() {
        let config: SolverConfig<f64> = SolverConfig::new(1e-12, 1e-3, 200);
        assert_eq!(config.x_tolerance, 1e-3);
        assert_eq!(config.max_iterations, 200);
    }

    #[test]
    #[should_panic(expected = "tolerance must be non-negative")]
    fn test_new_config_negative_tolerance_panics() {
        let _: SolverConfig<f64> = SolverConfig::new(-1e-10, 1e-3, 100);
    }

    #[test]
    #[should_panic(expected = "max_iterations must be > 0")]
    fn test_new_config_zero_iterations_panics() {
        let _: SolverConfig<f64> = SolverConfig::new(1e-10, 1e-3, 0);
    }

    #[test]
    fn test_config_with_f32() {
        let config: SolverConfig<f32> = SolverConfig::default();
        assert!(config.tolerance > 0.0);
    }
}
