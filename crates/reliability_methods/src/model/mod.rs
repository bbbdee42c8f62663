//! Limit state evaluation shared by all reliability methods.
//!
//! This module provides:
//! - [`ZModel`]: the limit state function contract
//! - [`ModelRunner`]: u → x conversion, counting, caching and batched
//!   parallel evaluation
//! - [`ProgressReport`] / [`ProgressControl`]: progress callback with
//!   cooperative cancellation

mod progress;
mod runner;

pub use progress::{ProgressCallback, ProgressControl, ProgressReport};
pub use runner::{ModelContext, ModelRunner, RunSettings, ZModel};
