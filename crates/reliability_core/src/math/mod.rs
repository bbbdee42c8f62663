//! Numerical primitives.
//!
//! - `special`: incomplete gamma and beta functions, log-gamma
//! - `distributions`: standard normal and bivariate normal functions
//! - `linalg`: dense matrix and vector types
//! - `solvers`: bracketing and ray root finders
//! - `numeric`: sign and interpolation helpers

pub mod distributions;
pub mod linalg;
pub mod numeric;
pub mod solvers;
pub mod special;
