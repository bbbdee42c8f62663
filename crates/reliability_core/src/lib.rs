//! # reliability_core: Numerical Foundation for Structural Reliability
//!
//! ## Layer 1 (Foundation) Role
//!
//! reliability_core is the bottom layer of the reliability workspace, providing:
//! - Special functions: incomplete gamma and beta, log-gamma (`math::special`)
//! - Normal distribution helpers, including the bivariate CDF (`math::distributions`)
//! - Dense linear algebra: Cholesky, Gauss-Jordan inverse, QR (`math::linalg`)
//! - Root finders: generic bracketing and the directional sampling ray finder (`math::solvers`)
//! - Seeded pseudo-random and Sobol sequences (`rng`)
//! - Stochasts, correlation and the u-space converter (`stochast`)
//! - Samples, design points, convergence reports and errors (`types`)
//!
//! ## Dependencies
//!
//! Layer 1 has no dependencies on other reliability_* crates:
//! - num-traits: generic floating point in the root finder
//! - statrs: error function and reference marginals
//! - rand / rand_distr: seeded standard normal draws
//! - thiserror: error types
//! - serde: serialisation of settings (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use reliability_core::math::distributions::{beta_from_probability, norm_cdf};
//! use reliability_core::math::special::gamma_upper_regularized;
//!
//! // probability mass beyond radius 3 in 2-d standard normal space
//! let tail = gamma_upper_regularized(1.0, 4.5).unwrap();
//! assert!((tail - (-4.5_f64).exp()).abs() < 1e-6);
//!
//! let beta = beta_from_probability(norm_cdf(-3.0));
//! assert!((beta - 3.0).abs() < 1e-10);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialisation for settings and reports

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod math;
pub mod rng;
pub mod stochast;
pub mod types;
