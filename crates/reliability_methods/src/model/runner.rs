//! Evaluation of the limit state function for samples in u-space.

use super::progress::{ProgressCallback, ProgressControl, ProgressReport};
use crate::error::ConfigError;
use rayon::prelude::*;
use reliability_core::stochast::UConverter;
use reliability_core::types::{
    ConvergenceReport, DesignPoint, Message, ReliabilityError, Result, Sample,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Context handed to the limit state function with every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelContext {
    /// Sequence number of this evaluation
    pub computation_id: usize,
    /// Worker thread evaluating the sample
    pub thread_id: usize,
    /// Number of model errors logged before this evaluation
    pub logging_counter: usize,
}

/// Limit state function `Z(x)`; failure for `Z < 0`.
///
/// Implementations are called concurrently from the runner's worker threads
/// and must be reentrant. An `Err` marks a failed evaluation: the sample gets
/// `Z = NaN` and the text is kept as a message, the calculation continues.
///
/// Plain closures `Fn(&[f64]) -> f64` implement this trait.
pub trait ZModel: Send + Sync {
    /// Evaluates Z for the physical values `x`.
    fn evaluate(&self, x: &[f64], context: &ModelContext) -> std::result::Result<f64, String>;
}

impl<F> ZModel for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: &[f64], _context: &ModelContext) -> std::result::Result<f64, String> {
        Ok(self(x))
    }
}

/// Execution settings of the model runner.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunSettings {
    /// Worker threads for batched evaluations; 1 runs everything inline
    pub max_parallel_processes: usize,
    /// Reuse results for identical x-vectors
    pub cache_evaluations: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_parallel_processes: 1,
            cache_evaluations: false,
        }
    }
}

impl RunSettings {
    /// Validates the settings.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_parallel_processes == 0 {
            return Err(ConfigError::parameter(
                "max_parallel_processes",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Runs the limit state function for the reliability methods.
///
/// Owns the u ↔ x conversion, the evaluation counter, the optional result
/// cache and the rayon pool used for batches.
///
/// # Examples
/// ```
/// use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
/// use reliability_core::types::Sample;
/// use reliability_methods::model::{ModelRunner, RunSettings};
/// use std::sync::Arc;
///
/// let r: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("R", 7.0, 1.0).unwrap());
/// let s: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("S", 2.0, 1.0).unwrap());
/// let converter = UConverter::independent(vec![r, s]);
///
/// let runner = ModelRunner::new(|x: &[f64]| x[0] - x[1], converter, RunSettings::default()).unwrap();
/// let mut sample = Sample::origin(2);
/// assert_eq!(runner.z_value(&mut sample).unwrap(), 5.0);
/// assert_eq!(runner.model_runs(), 1);
/// ```
pub struct ModelRunner {
    model: Box<dyn ZModel>,
    converter: UConverter,
    settings: RunSettings,
    pool: Option<rayon::ThreadPool>,
    model_runs: AtomicUsize,
    cache: Option<Mutex<HashMap<Vec<u64>, f64>>>,
    messages: Mutex<Vec<Message>>,
    progress: Option<ProgressCallback>,
    cancelled: AtomicBool,
}

impl ModelRunner {
    /// Creates a runner for `model` over the stochasts of `converter`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for invalid settings or when the thread pool cannot
    /// be created.
    pub fn new(
        model: impl ZModel + 'static,
        converter: UConverter,
        settings: RunSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let pool = if settings.max_parallel_processes > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(settings.max_parallel_processes)
                .build()
                .map_err(|e| {
                    ReliabilityError::InvalidArgument(format!("cannot create thread pool: {}", e))
                })?;
            Some(pool)
        } else {
            None
        };
        let cache = settings
            .cache_evaluations
            .then(|| Mutex::new(HashMap::new()));

        Ok(Self {
            model: Box::new(model),
            converter,
            settings,
            pool,
            model_runs: AtomicUsize::new(0),
            cache,
            messages: Mutex::new(Vec::new()),
            progress: None,
            cancelled: AtomicBool::new(false),
        })
    }

    /// Installs a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressReport) -> ProgressControl + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// The u ↔ x converter.
    #[inline]
    pub fn converter(&self) -> &UConverter {
        &self.converter
    }

    /// Execution settings.
    #[inline]
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Number of stochasts, the length of every u-vector.
    #[inline]
    pub fn stochast_count(&self) -> usize {
        self.converter.len()
    }

    /// Entries of a u-vector that carry randomness.
    #[inline]
    pub fn independent_mask(&self) -> &[bool] {
        self.converter.independent_mask()
    }

    /// True when batches run on a thread pool.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Limit state evaluations so far (cache hits excluded).
    #[inline]
    pub fn model_runs(&self) -> usize {
        self.model_runs.load(Ordering::Relaxed)
    }

    /// Evaluates one sample and stores `z` in it.
    ///
    /// A failing model gives `z = NaN` and an error message; this is not an
    /// error of this function.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the sample does not match the stochasts.
    pub fn z_value(&self, sample: &mut Sample) -> Result<f64> {
        let x = self.converter.x_from_u(&sample.values)?;
        let thread_id = rayon::current_thread_index().unwrap_or(0);
        let z = self.evaluate_x(&x, thread_id);
        sample.z = z;
        sample.thread_id = thread_id;
        Ok(z)
    }

    /// Evaluates Z at a u-vector.
    pub fn z_at(&self, u: &[f64]) -> Result<f64> {
        let mut sample = Sample::new(u.to_vec());
        self.z_value(&mut sample)
    }

    /// Evaluates a batch of samples, in parallel when a pool is configured.
    ///
    /// Model failures are isolated per sample.
    pub fn z_values(&self, samples: &mut [Sample]) -> Result<()> {
        let evaluate = |sample: &mut Sample| self.z_value(sample).map(|_| ());
        match &self.pool {
            Some(pool) => pool.install(|| samples.par_iter_mut().try_for_each(evaluate)),
            None => samples.iter_mut().try_for_each(evaluate),
        }
    }

    /// Maps `items` through `f`, on the pool when one is configured.
    ///
    /// Output order follows input order.
    pub fn map_parallel<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(f).collect()),
            None => items.iter().map(f).collect(),
        }
    }

    /// Passes a progress report to the callback.
    ///
    /// Once a callback has answered [`ProgressControl::Cancel`] every further
    /// call answers `Cancel` as well.
    pub fn report_progress(&self, report: ProgressReport) -> ProgressControl {
        if self.is_cancelled() {
            return ProgressControl::Cancel;
        }
        let control = self
            .progress
            .as_ref()
            .map_or(ProgressControl::Continue, |callback| callback(&report));
        if control == ProgressControl::Cancel {
            self.cancelled.store(true, Ordering::Relaxed);
        }
        control
    }

    /// Whether the calculation was cancelled through the progress callback.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Adds a message for the next design point.
    pub fn add_message(&self, message: Message) {
        lock(&self.messages).push(message);
    }

    /// Removes and returns the collected messages.
    pub fn take_messages(&self) -> Vec<Message> {
        std::mem::take(&mut *lock(&self.messages))
    }

    /// Builds a design point from a reliability index and an alpha vector in
    /// independent u-space. Collected messages move into the design point.
    pub fn design_point(
        &self,
        beta: f64,
        alpha: &[f64],
        convergence_report: ConvergenceReport,
        identifier: &str,
    ) -> Result<DesignPoint> {
        let alphas = self.converter.design_alphas(alpha, beta)?;
        Ok(DesignPoint {
            identifier: identifier.to_string(),
            beta,
            alphas,
            convergence_report,
            contributing_design_points: Vec::new(),
            messages: self.take_messages(),
        })
    }

    fn evaluate_x(&self, x: &[f64], thread_id: usize) -> f64 {
        let Some(cache) = &self.cache else {
            return self.run_model(x, thread_id);
        };
        let key: Vec<u64> = x.iter().map(|v| v.to_bits()).collect();
        if let Some(&z) = lock(cache).get(&key) {
            return z;
        }
        let z = self.run_model(x, thread_id);
        lock(cache).insert(key, z);
        z
    }

    fn run_model(&self, x: &[f64], thread_id: usize) -> f64 {
        let computation_id = self.model_runs.fetch_add(1, Ordering::Relaxed);
        let context = ModelContext {
            computation_id,
            thread_id,
            logging_counter: lock(&self.messages).len(),
        };
        match self.model.evaluate(x, &context) {
            Ok(z) => z,
            Err(text) => {
                warn!(computation_id, thread_id, "model evaluation failed: {}", text);
                self.add_message(Message::error(format!(
                    "model evaluation {} failed: {}",
                    computation_id, text
                )));
                f64::NAN
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliability_core::stochast::{DistributedStochast, Stochast};
    use std::sync::Arc;

    fn converter(n: usize) -> UConverter {
        let stochasts: Vec<Arc<dyn Stochast>> = (0..n)
            .map(|i| {
                Arc::new(DistributedStochast::normal(format!("u{}", i), 0.0, 1.0).unwrap())
                    as Arc<dyn Stochast>
            })
            .collect();
        UConverter::independent(stochasts)
    }

    struct FailingModel;

    impl ZModel for FailingModel {
        fn evaluate(&self, x: &[f64], _context: &ModelContext) -> std::result::Result<f64, String> {
            if x[0] > 1.0 {
                Err("out of range".to_string())
            } else {
                Ok(x[0])
            }
        }
    }

    #[test]
    fn test_closure_model() {
        let runner = ModelRunner::new(|x: &[f64]| x[0] + x[1], converter(2), RunSettings::default())
            .unwrap();
        assert_eq!(runner.z_at(&[1.0, 2.0]).unwrap(), 3.0);
        assert!(!runner.is_parallel());
    }

    #[test]
    fn test_dimension_mismatch() {
        let runner =
            ModelRunner::new(|x: &[f64]| x[0], converter(2), RunSettings::default()).unwrap();
        assert!(runner.z_at(&[1.0]).is_err());
    }

    #[test]
    fn test_batch_isolates_failures() {
        let settings = RunSettings {
            max_parallel_processes: 3,
            cache_evaluations: false,
        };
        let runner = ModelRunner::new(FailingModel, converter(1), settings).unwrap();
        let mut samples: Vec<Sample> = [0.5, 2.0, -1.0, 3.0]
            .iter()
            .map(|&u| Sample::new(vec![u]))
            .collect();
        runner.z_values(&mut samples).unwrap();

        assert_eq!(samples[0].z, 0.5);
        assert!(samples[1].z.is_nan());
        assert_eq!(samples[2].z, -1.0);
        assert!(samples[3].z.is_nan());
        assert_eq!(runner.model_runs(), 4);
        assert_eq!(runner.take_messages().len(), 2);
        assert!(runner.take_messages().is_empty());
    }

    #[test]
    fn test_cache_skips_repeated_runs() {
        let settings = RunSettings {
            max_parallel_processes: 1,
            cache_evaluations: true,
        };
        let runner = ModelRunner::new(|x: &[f64]| x[0] * 2.0, converter(1), settings).unwrap();
        for _ in 0..3 {
            assert_eq!(runner.z_at(&[1.5]).unwrap(), 3.0);
        }
        assert_eq!(runner.model_runs(), 1);
    }

    #[test]
    fn test_progress_cancel_is_sticky() {
        let runner = ModelRunner::new(|x: &[f64]| x[0], converter(1), RunSettings::default())
            .unwrap()
            .with_progress(|report| {
                if report.iteration >= 2 {
                    ProgressControl::Cancel
                } else {
                    ProgressControl::Continue
                }
            });
        assert_eq!(
            runner.report_progress(ProgressReport::new(1, 10, 0.0, 0.0)),
            ProgressControl::Continue
        );
        assert_eq!(
            runner.report_progress(ProgressReport::new(2, 10, 0.0, 0.0)),
            ProgressControl::Cancel
        );
        assert!(runner.is_cancelled());
        assert_eq!(
            runner.report_progress(ProgressReport::new(0, 10, 0.0, 0.0)),
            ProgressControl::Cancel
        );
    }

    #[test]
    fn test_map_parallel_keeps_order() {
        let settings = RunSettings {
            max_parallel_processes: 4,
            cache_evaluations: false,
        };
        let runner = ModelRunner::new(|x: &[f64]| x[0], converter(1), settings).unwrap();
        let items: Vec<usize> = (0..100).collect();
        let doubled = runner.map_parallel(&items, |&i| i * 2);
        assert_eq!(doubled, (0..100).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let settings = RunSettings {
            max_parallel_processes: 0,
            cache_evaluations: false,
        };
        assert!(ModelRunner::new(|x: &[f64]| x[0], converter(1), settings).is_err());
    }
}
