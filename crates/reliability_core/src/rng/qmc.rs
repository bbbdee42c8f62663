//! Sobol low-discrepancy sequence.
//!
//! Direction numbers are the Joe-Kuo "new-joe-kuo-6" set for the first 21
//! dimensions. The table is built once per process and shared read-only by
//! all sequences.

use crate::types::{ReliabilityError, Result};
use std::sync::OnceLock;

/// Trait for low-discrepancy sequences used in quasi-Monte Carlo sampling.
pub trait LowDiscrepancySequence {
    /// Returns the dimensionality of the sequence.
    fn dimension(&self) -> usize;

    /// Advances the sequence and returns the next point, each coordinate in
    /// the open interval (0, 1).
    fn next_point(&mut self) -> &[f64];

    /// Resets the sequence to its initial state.
    fn reset(&mut self);

    /// Skips ahead by `n` points in the sequence.
    fn skip(&mut self, n: usize);
}

/// Bits per coordinate.
const BITS: usize = 32;

/// Largest supported dimension.
pub const SOBOL_MAX_DIMENSION: usize = 21;

/// Joe-Kuo parameters `(s, a, m)` for dimensions 2 to 21.
const JOE_KUO: [(u32, u32, &[u32]); SOBOL_MAX_DIMENSION - 1] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
    (6, 19, &[1, 1, 1, 15, 7, 5]),
    (6, 22, &[1, 3, 1, 15, 13, 25]),
    (6, 25, &[1, 1, 5, 5, 19, 61]),
    (7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    (7, 4, &[1, 3, 7, 13, 13, 15, 69]),
];

static DIRECTION_NUMBERS: OnceLock<Vec<[u32; BITS]>> = OnceLock::new();

fn direction_numbers() -> &'static [[u32; BITS]] {
    DIRECTION_NUMBERS.get_or_init(|| {
        let mut table = Vec::with_capacity(SOBOL_MAX_DIMENSION);

        let mut first = [0u32; BITS];
        for (k, v) in first.iter_mut().enumerate() {
            *v = 1 << (BITS - 1 - k);
        }
        table.push(first);

        for &(s, a, m) in JOE_KUO.iter() {
            let s = s as usize;
            let mut v = [0u32; BITS];
            for k in 0..BITS {
                if k < s {
                    v[k] = m[k] << (BITS - 1 - k);
                } else {
                    let mut value = v[k - s] ^ (v[k - s] >> s);
                    for j in 1..s {
                        if (a >> (s - 1 - j)) & 1 == 1 {
                            value ^= v[k - j];
                        }
                    }
                    v[k] = value;
                }
            }
            table.push(v);
        }
        table
    })
}

/// Sobol sequence in Gray-code order, skipping the origin.
///
/// Two sequences of equal dimension produce identical output.
///
/// # Examples
///
/// ```
/// use reliability_core::rng::{LowDiscrepancySequence, SobolSequence};
///
/// let mut sobol = SobolSequence::new(2).unwrap();
/// assert_eq!(sobol.next_point(), &[0.5, 0.5]);
/// assert_eq!(sobol.next_point(), &[0.75, 0.25]);
/// ```
#[derive(Debug, Clone)]
pub struct SobolSequence {
    dimension: usize,
    index: u64,
    state: Vec<u32>,
    point: Vec<f64>,
}

impl SobolSequence {
    /// Creates a sequence of the given dimension.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for dimension 0 or above [`SOBOL_MAX_DIMENSION`].
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 || dimension > SOBOL_MAX_DIMENSION {
            return Err(ReliabilityError::InvalidArgument(format!(
                "Sobol sequence supports 1 to {} dimensions, got {}",
                SOBOL_MAX_DIMENSION, dimension
            )));
        }
        Ok(Self {
            dimension,
            index: 0,
            state: vec![0; dimension],
            point: vec![0.0; dimension],
        })
    }

    fn advance(&mut self) {
        let bit = self.index.trailing_ones() as usize;
        if bit >= BITS {
            self.reset();
            return self.advance();
        }
        let directions = direction_numbers();
        for (state, v) in self.state.iter_mut().zip(directions) {
            *state ^= v[bit];
        }
        self.index += 1;
    }
}

impl LowDiscrepancySequence for SobolSequence {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn next_point(&mut self) -> &[f64] {
        self.advance();
        let scale = 1.0 / (1u64 << BITS) as f64;
        for (p, &s) in self.point.iter_mut().zip(&self.state) {
            *p = s as f64 * scale;
        }
        &self.point
    }

    fn reset(&mut self) {
        self.index = 0;
        self.state.iter_mut().for_each(|s| *s = 0);
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }
}
