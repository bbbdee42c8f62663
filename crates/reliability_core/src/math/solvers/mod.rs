//! Root finders.
//!
//! ## Available Solvers
//!
//! - [`BracketingRootFinder`]: secant extrapolation that switches to regula
//!   falsi (Illinois) once a sign change is bracketed; used by the start
//!   point search
//! - [`RayRootFinder`]: outward stepping plus refinement along a ray from the
//!   origin of u-space; used by Directional Sampling
//!
//! ## Configuration
//!
//! The bracketing finder uses [`SolverConfig`]:
//! - `tolerance`: residual tolerance (default: 1e-6)
//! - `x_tolerance`: abscissa tolerance (default: 1e-6)
//! - `max_iterations`: evaluation budget (default: 50)
//!
//! The ray finder uses [`RayRootFinderSettings`] and a [`DsIterationMethod`].
//!
//! Not finding a root is a regular outcome, reported through
//! [`RootResult::success`] or [`RayResult::radius`], never as an error.
//!
//! ## Examples
//!
//! ```
//! use reliability_core::math::solvers::{BracketingRootFinder, SolverConfig};
//!
//! let finder = BracketingRootFinder::new(SolverConfig::default()).must_be_in_between(true);
//! let f = |x: f64| 1.0 - x;
//!
//! let result = finder.find_root(f, 0.0, f(0.0), 3.0, f(3.0));
//! assert!(result.success);
//! assert!((result.x - 1.0).abs() < 1e-6);
//! ```

mod bracketing;
mod config;
mod ray;

pub use bracketing::{BracketingRootFinder, RootResult};
pub use config::SolverConfig;
pub use ray::{DsIterationMethod, RayResult, RayRootFinder, RayRootFinderSettings};
