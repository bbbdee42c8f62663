//! Finite difference gradient of Z in independent u-space.

use super::settings::{GradientSettings, GradientType};
use crate::model::ModelRunner;
use reliability_core::types::{Result, Sample};

/// Z and its gradient at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientResult {
    /// Z at the point
    pub z: f64,
    /// `∂Z/∂u` per stochast; zero for entries without randomness
    pub gradient: Vec<f64>,
}

impl GradientResult {
    /// Whether any value is NaN.
    pub fn has_nan(&self) -> bool {
        self.z.is_nan() || self.gradient.iter().any(|g| g.is_nan())
    }
}

/// Evaluates Z at `u` and its gradient as one batch.
///
/// The centre and all perturbed points go through
/// [`ModelRunner::z_values`], so they run concurrently on a parallel runner.
pub fn gradient(
    runner: &ModelRunner,
    u: &[f64],
    settings: &GradientSettings,
) -> Result<GradientResult> {
    let mask = runner.independent_mask();
    let h = settings.step_size;
    let active: Vec<usize> = (0..u.len()).filter(|&i| mask.get(i) == Some(&true)).collect();

    let shifted = |i: usize, delta: f64| {
        let mut values = u.to_vec();
        values[i] += delta;
        Sample::new(values)
    };

    let mut samples = Vec::with_capacity(1 + 2 * active.len());
    samples.push(Sample::new(u.to_vec()));
    for &i in &active {
        samples.push(shifted(i, h));
        if settings.gradient_type == GradientType::TwoDirections {
            samples.push(shifted(i, -h));
        }
    }
    runner.z_values(&mut samples)?;

    let z = samples[0].z;
    let mut gradient = vec![0.0; u.len()];
    match settings.gradient_type {
        GradientType::OneDirection => {
            for (k, &i) in active.iter().enumerate() {
                gradient[i] = (samples[1 + k].z - z) / h;
            }
        }
        GradientType::TwoDirections => {
            for (k, &i) in active.iter().enumerate() {
                let up = samples[1 + 2 * k].z;
                let down = samples[2 + 2 * k].z;
                gradient[i] = (up - down) / (2.0 * h);
            }
        }
    }
    Ok(GradientResult { z, gradient })
}
