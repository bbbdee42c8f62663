//! # reliability_combine: System Reliability from Design Points
//!
//! ## Layer 3 (Combination) Role
//!
//! reliability_combine builds system results on top of the design points
//! produced by reliability_methods:
//! - Hohenbichler combination of elements in series or parallel (`hohenbichler`)
//! - Upscaling of a cross section to a length (`length_effect`)
//! - Integration of fragility curves over a conditioning stochast (`fragility`)
//!
//! Combiners never evaluate a limit state: every result follows from the
//! reliability indices, alphas and self-correlations of the inputs.
//!
//! ## Dependencies
//!
//! - reliability_core: design points, stochasts, normal distribution helpers
//! - tracing: debug output of the combination steps
//! - serde: serialisation of settings (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use reliability_combine::{CombinationType, DesignPointCombiner, Hohenbichler2Combiner, SelfCorrelation};
//! use reliability_core::stochast::{DistributedStochast, Stochast};
//! use reliability_core::types::{DesignPoint, StochastPointAlpha};
//! use std::sync::Arc;
//!
//! let load: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("load", 0.0, 1.0).unwrap());
//! let section = DesignPoint {
//!     beta: 3.0,
//!     alphas: vec![StochastPointAlpha {
//!         stochast: load,
//!         alpha: 1.0,
//!         alpha_correlated: 1.0,
//!         u: -3.0,
//!         x: -3.0,
//!         influence_factor: 1.0,
//!     }],
//!     ..Default::default()
//! };
//!
//! // two fully correlated sections behave as one
//! let system = Hohenbichler2Combiner
//!     .combine(&[section.clone(), section], &SelfCorrelation::new(), CombinationType::Or)
//!     .unwrap();
//! assert!((system.beta - 3.0).abs() < 1e-6);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: serialisation for the combination type and integration settings

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod combiner;
pub mod fragility;
pub mod hohenbichler;
pub mod length_effect;

pub use combiner::{CombinationType, DesignPointCombiner, SelfCorrelation, MAX_BETA};
pub use fragility::{
    FragilityCurve, FragilityCurveIntegration, FragilityIntegrationSettings, FragilityValue,
    FRAGILITY_STOCHAST,
};
pub use hohenbichler::Hohenbichler2Combiner;
pub use length_effect::LengthEffect;
