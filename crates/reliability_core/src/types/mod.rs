//! Core data types of the reliability engine.
//!
//! This module provides:
//! - `error`: [`ReliabilityError`] and the crate [`Result`] alias
//! - `sample`: [`Sample`], a point in u-space with its Z value
//! - `design_point`: [`DesignPoint`] and [`StochastPointAlpha`]
//! - `convergence`: [`ConvergenceReport`]
//! - `message`: [`Message`] and [`MessageKind`]

pub mod convergence;
pub mod design_point;
pub mod error;
pub mod message;
pub mod sample;

pub use convergence::ConvergenceReport;
pub use design_point::{DesignPoint, StochastPointAlpha};
pub use error::{format_value, ReliabilityError, Result};
pub use message::{Message, MessageKind};
pub use sample::Sample;
