//! Stochastic variables and the transformation between u-space and x-space.
//!
//! - [`Stochast`]: the capability set of one random variable
//! - [`DistributedStochast`]: reference marginals (normal, log-normal, ...)
//! - [`CorrelationMatrix`]: correlation with cached Cholesky factors
//! - [`UConverter`]: independent u ↔ correlated u ↔ x for a whole model
//!
//! Stochasts are shared as `Arc<dyn Stochast>` between the model definition
//! and every design point that refers to them.

mod converter;
mod correlation;
mod distribution;

pub use converter::UConverter;
pub use correlation::{CholeskyFactors, CorrelationMatrix};
pub use distribution::{DistributedStochast, DistributionType};

use std::fmt::Debug;

/// A named random variable.
///
/// Implementations must keep `u_from_x(x_from_u(u)) ≈ u` for every finite
/// `u` of a varying stochast.
pub trait Stochast: Send + Sync + Debug {
    /// Name used in reports.
    fn name(&self) -> &str;

    /// Physical value for a standard normal value.
    fn x_from_u(&self, u: f64) -> f64;

    /// Standard normal value for a physical value.
    fn u_from_x(&self, x: f64) -> f64;

    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative probability at `x`.
    fn cdf(&self, x: f64) -> f64;

    /// False for stochasts without spread; these take no part in sampling.
    fn is_varying(&self) -> bool {
        true
    }
}
