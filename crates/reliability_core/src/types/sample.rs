//! A point in u-space together with its limit state value.

/// Sample in standard normal space.
///
/// `values` has one entry per stochast of the model. `z` is NaN until the
/// sample has been evaluated.
///
/// # Examples
/// ```
/// use reliability_core::types::Sample;
///
/// let sample = Sample::new(vec![3.0, 4.0]);
/// assert_eq!(sample.beta(), 5.0);
/// assert!(sample.z.is_nan());
///
/// let unit = sample.normalized();
/// assert!((unit.values[0] - 0.6).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// u-values, one per stochast
    pub values: Vec<f64>,
    /// Limit state value, NaN when not evaluated or failed
    pub z: f64,
    /// Sampling weight
    pub weight: f64,
    /// Iteration (or sample number) that produced this sample
    pub iteration_index: usize,
    /// Worker that evaluated the sample
    pub thread_id: usize,
}

impl Sample {
    /// Unevaluated sample with unit weight.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            z: f64::NAN,
            weight: 1.0,
            iteration_index: 0,
            thread_id: 0,
        }
    }

    /// Sample at the origin of a space of `size` stochasts.
    pub fn origin(size: usize) -> Self {
        Self::new(vec![0.0; size])
    }

    /// Builder style iteration index.
    pub fn with_iteration(mut self, iteration_index: usize) -> Self {
        self.iteration_index = iteration_index;
        self
    }

    /// Number of u-values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the sample has no u-values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distance to the origin.
    #[inline]
    pub fn beta(&self) -> f64 {
        self.values.iter().map(|u| u * u).sum::<f64>().sqrt()
    }

    /// Unevaluated copy scaled to unit distance. The origin is returned as is.
    pub fn normalized(&self) -> Self {
        let beta = self.beta();
        if beta == 0.0 {
            return Self::new(self.values.clone());
        }
        self.scaled(1.0 / beta)
    }

    /// Unevaluated copy with every u-value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            values: self.values.iter().map(|u| u * factor).collect(),
            z: f64::NAN,
            weight: self.weight,
            iteration_index: self.iteration_index,
            thread_id: self.thread_id,
        }
    }

    /// Whether the sample lies in the failure domain.
    #[inline]
    pub fn is_failure(&self) -> bool {
        self.z < 0.0
    }
}
