//! # reliability_methods: Reliability Methods
//!
//! ## Layer 2 (Methods) Role
//!
//! reliability_methods computes design points on top of reliability_core:
//! - Limit state evaluation with caching and rayon batches (`model`)
//! - FORM with start point search (`form`)
//! - Directional Sampling, Crude Monte Carlo, Importance Sampling and
//!   Numerical Integration (`sampling`)
//! - The [`ReliabilityMethod`](method::ReliabilityMethod) trait and dispatch by name (`method`)
//!
//! ## Dependencies
//!
//! - reliability_core: numerics, stochasts and result types
//! - rayon: thread pool for batched Z evaluations
//! - tracing: per-iteration debug and completion logging
//! - thiserror: settings validation errors
//! - serde: settings (de)serialisation (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
//! use reliability_methods::method::{MethodKind, MethodSettings, ReliabilityMethod};
//! use reliability_methods::model::{ModelRunner, RunSettings};
//! use std::sync::Arc;
//!
//! let r: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("R", 7.0, 1.0).unwrap());
//! let s: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("S", 2.0, 1.0).unwrap());
//! let runner = ModelRunner::new(
//!     |x: &[f64]| x[0] - x[1],
//!     UConverter::independent(vec![r, s]),
//!     RunSettings::default(),
//! )
//! .unwrap();
//!
//! let method = MethodSettings::default_for("form".parse::<MethodKind>().unwrap());
//! let design_point = method.design_point(&runner).unwrap();
//! assert!((design_point.beta - 3.5355).abs() < 1e-3);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialisation of all method settings

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod form;
pub mod method;
pub mod model;
pub mod sampling;

pub use error::ConfigError;
pub use method::{MethodKind, MethodSettings, ReliabilityMethod};
