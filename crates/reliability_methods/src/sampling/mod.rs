//! Sampling based reliability methods.
//!
//! This module provides:
//!
//! - [`DirectionalSampling`]: random directions with a root search per ray
//! - [`CrudeMonteCarlo`]: plain indicator sampling (pseudo-random or Sobol)
//! - [`ImportanceSampling`]: sampling from a shifted, scaled normal density
//! - [`NumericalIntegration`]: tensor grid over the independent u-axes
//! - [`DesignPointBuilder`]: alpha vector from the evaluated samples
//!
//! # Architecture
//!
//! ```text
//! ReliabilityMethod::design_point(&ModelRunner)
//! ├── draw samples / directions  (calling thread, seeded)
//! ├── ModelRunner::z_values()     (batched, rayon pool)
//! ├── statistics + convergence    (per chunk)
//! └── DesignPointBuilder → DesignPoint
//! ```
//!
//! Every method reports `β = −Φ⁻¹(Pf)`, bounded by [`MAX_BETA`].

mod crude_monte_carlo;
mod design_point_builder;
mod directional;
mod importance;
mod numerical_integration;

pub use crude_monte_carlo::{CrudeMonteCarlo, CrudeMonteCarloSettings, SamplerKind};
pub use design_point_builder::{bounded_beta, DesignPointBuilder, DesignPointMethod, MAX_BETA};
pub use directional::{DirectionalSampling, DirectionalSamplingSettings};
pub use importance::{ImportanceSampling, ImportanceSamplingSettings};
pub use numerical_integration::{NumericalIntegration, NumericalIntegrationSettings};
