//! # Random Number Generation
//!
//! Random number generation for the sampling methods.
//!
//! - **Reproducibility**: every generator is created from an explicit seed and
//!   owned by the method that uses it; there is no global generator state
//! - **Shared tables**: the Sobol direction numbers are built once per process
//!   and only read afterwards
//!
//! ## Module Structure
//!
//! - [`ReliabilityRng`]: seeded PRNG wrapper around `rand::StdRng`
//! - [`SobolSequence`]: Sobol sequence implementing [`LowDiscrepancySequence`]
//! - [`NormalSampler`]: standard normal vectors from either source
//!
//! ## Usage Example
//!
//! ```rust
//! use reliability_core::rng::NormalSampler;
//!
//! let mut sampler = NormalSampler::pseudo(12345);
//! let mut u = vec![0.0; 3];
//! // the second entry is not random (deterministic stochast)
//! sampler.fill(&mut u, &[true, false, true]);
//! assert_eq!(u[1], 0.0);
//! ```

mod prng;
mod qmc;
mod sampler;

pub use prng::ReliabilityRng;
pub use qmc::{LowDiscrepancySequence, SobolSequence, SOBOL_MAX_DIMENSION};
pub use sampler::NormalSampler;
