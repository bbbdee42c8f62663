//! Secant / regula falsi root finder that keeps a bracket once found.

use super::SolverConfig;
use num_traits::Float;

/// Outcome of a root search.
///
/// `success = false` is a regular outcome ("no root found in range"), not an
/// error; `x`/`y` then hold the best point seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult<T> {
    /// Whether a tolerance was met
    pub success: bool,
    /// Best abscissa
    pub x: T,
    /// Function value at `x`
    pub y: T,
    /// Number of function evaluations spent
    pub iterations: usize,
}

/// Root finder started from two evaluated points.
///
/// Uses secant extrapolation until a sign change is bracketed, then regula
/// falsi with the Illinois modification. While no bracket exists the older
/// point with the larger residual is discarded.
///
/// # Example
///
/// ```
/// use reliability_core::math::solvers::{BracketingRootFinder, SolverConfig};
///
/// let finder = BracketingRootFinder::new(SolverConfig::new(1e-10, 1e-12, 100));
/// let f = |x: f64| x * x - 2.0;
///
/// let result = finder.find_root(f, 0.0, f(0.0), 2.0, f(2.0));
/// assert!(result.success);
/// assert!((result.x - std::f64::consts::SQRT_2).abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct BracketingRootFinder<T: Float> {
    config: SolverConfig<T>,
    must_be_in_between: bool,
}

impl<T: Float> BracketingRootFinder<T> {
    /// Create a root finder with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self {
            config,
            must_be_in_between: false,
        }
    }

    /// Create a root finder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Require the two start points to bracket the root.
    ///
    /// With this set, start points of equal sign return `success = false`
    /// without any evaluation.
    pub fn must_be_in_between(mut self, value: bool) -> Self {
        self.must_be_in_between = value;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Search a root of `f` starting from `(x0, y0)` and `(x1, y1)`.
    ///
    /// A NaN function value stops the search unsuccessfully.
    pub fn find_root<F>(&self, mut f: F, x0: T, y0: T, x1: T, y1: T) -> RootResult<T>
    where
        F: FnMut(T) -> T,
    {
        let (mut xa, mut ya, mut xb, mut yb) = (x0, y0, x1, y1);
        let mut best = best_of((xa, ya), (xb, yb));
        let result = |success: bool, (x, y): (T, T), iterations: usize| RootResult {
            success,
            x,
            y,
            iterations,
        };

        if ya.abs() < self.config.tolerance {
            return result(true, (xa, ya), 0);
        }
        if yb.abs() < self.config.tolerance {
            return result(true, (xb, yb), 0);
        }

        let mut bracketed = opposite_signs(ya, yb);
        if self.must_be_in_between && !bracketed {
            return result(false, best, 0);
        }

        let half = T::from(0.5).unwrap_or_else(T::one);
        // Illinois scaling applied to the retained endpoint
        let mut retained_scale = T::one();

        for iteration in 1..=self.config.max_iterations {
            if (xb - xa).abs() < self.config.x_tolerance {
                return result(true, best, iteration - 1);
            }

            let slope_denominator = yb - ya * retained_scale;
            let x = if slope_denominator == T::zero() {
                if !bracketed {
                    return result(false, best, iteration - 1);
                }
                (xa + xb) * half
            } else {
                xb - yb * (xb - xa) / slope_denominator
            };

            let y = f(x);
            if y.is_nan() {
                return result(false, best, iteration);
            }
            best = best_of(best, (x, y));
            if y.abs() < self.config.tolerance {
                return result(true, (x, y), iteration);
            }

            if bracketed {
                if opposite_signs(y, yb) {
                    xa = xb;
                    ya = yb;
                    retained_scale = T::one();
                } else {
                    retained_scale = retained_scale * half;
                }
            } else if opposite_signs(y, yb) {
                xa = xb;
                ya = yb;
                bracketed = true;
            } else if opposite_signs(y, ya) {
                bracketed = true;
            } else if ya.abs() >= yb.abs() {
                xa = xb;
                ya = yb;
            }
            xb = x;
            yb = y;

            if (xb - xa).abs() < self.config.x_tolerance {
                return result(true, best, iteration);
            }
        }

        result(false, best, self.config.max_iterations)
    }
}

#[inline]
fn opposite_signs<T: Float>(a: T, b: T) -> bool {
    (a < T::zero() && b > T::zero()) || (a > T::zero() && b < T::zero())
}

#[inline]
fn best_of<T: Float>(a: (T, T), b: (T, T)) -> (T, T) {
    if b.1.abs() < a.1.abs() {
        b
    } else {
        a
    }
}
