//! Standard normal vectors from a pseudo-random or a Sobol source.

use super::{LowDiscrepancySequence, ReliabilityRng, SobolSequence};
use crate::math::distributions::norm_inv;
use crate::types::Result;

/// Source of standard normal sample vectors.
///
/// The Sobol variant maps each coordinate through Φ⁻¹; its dimension is the
/// number of active entries of the mask passed to [`NormalSampler::fill`].
#[derive(Debug, Clone)]
pub enum NormalSampler {
    /// Seeded pseudo-random draws
    Pseudo(ReliabilityRng),
    /// Quasi-random Sobol points
    Sobol(SobolSequence),
}

impl NormalSampler {
    /// Pseudo-random sampler with the given seed.
    pub fn pseudo(seed: u64) -> Self {
        NormalSampler::Pseudo(ReliabilityRng::from_seed(seed))
    }

    /// Sobol sampler over `dimension` active coordinates.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the dimension is not supported.
    pub fn sobol(dimension: usize) -> Result<Self> {
        Ok(NormalSampler::Sobol(SobolSequence::new(dimension)?))
    }

    /// Fills the active entries of `buffer` with standard normal values and
    /// sets the others to zero.
    pub fn fill(&mut self, buffer: &mut [f64], mask: &[bool]) {
        match self {
            NormalSampler::Pseudo(rng) => rng.fill_normal_masked(buffer, mask),
            NormalSampler::Sobol(sobol) => {
                let point = sobol.next_point();
                let mut coordinates = point.iter();
                for (value, &active) in buffer.iter_mut().zip(mask) {
                    *value = if active {
                        coordinates.next().map_or(0.0, |&p| norm_inv(p))
                    } else {
                        0.0
                    };
                }
            }
        }
    }
}
