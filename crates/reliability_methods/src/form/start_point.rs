//! Start point search for FORM.
//!
//! A start point close to the limit state keeps FORM away from regions where
//! the linearisation is poor. Four strategies are available, see
//! [`StartMethod`].

use super::gradient::gradient;
use super::settings::{GradientSettings, GradientType, StartMethod, StartPointSettings};
use crate::model::ModelRunner;
use reliability_core::math::linalg::Vector;
use reliability_core::math::numeric::linear_root;
use reliability_core::math::solvers::{BracketingRootFinder, SolverConfig};
use reliability_core::types::{Message, ReliabilityError, Result, Sample};
use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

/// Levels of the radius grid of the sphere search.
const SPHERE_LEVELS: usize = 10;

/// Finds the first FORM iterate in independent u-space.
///
/// # Errors
///
/// `DimensionMismatch` when `start_values` does not match the stochasts,
/// `ModelFailure` when Z cannot be evaluated at the origin.
pub fn find_start_point(runner: &ModelRunner, settings: &StartPointSettings) -> Result<Vec<f64>> {
    let size = runner.stochast_count();
    let mask = runner.independent_mask().to_vec();
    if !settings.start_values.is_empty() && settings.start_values.len() != size {
        return Err(ReliabilityError::DimensionMismatch(format!(
            "{} start values for {} stochasts",
            settings.start_values.len(),
            size
        )));
    }
    let masked = |values: &[f64]| -> Vec<f64> {
        values
            .iter()
            .zip(&mask)
            .map(|(&v, &active)| if active { v } else { 0.0 })
            .collect()
    };

    if settings.method == StartMethod::FixedValue {
        return Ok(if settings.start_values.is_empty() {
            vec![0.0; size]
        } else {
            masked(&settings.start_values)
        });
    }

    let origin = vec![0.0; size];
    let z0 = runner.z_at(&origin)?;
    if z0.is_nan() {
        return Err(ReliabilityError::ModelFailure(
            "Z cannot be evaluated at the origin".to_string(),
        ));
    }

    let start = match settings.method {
        StartMethod::FixedValue => origin,
        StartMethod::RaySearch => {
            let values: Vec<f64> = if settings.start_values.iter().all(|&v| v == 0.0) {
                vec![1.0; size]
            } else {
                settings.start_values.clone()
            };
            let direction = Vector::from(masked(&values)).normalized().into_vec();
            ray_search(runner, &direction, z0, settings)?
        }
        StartMethod::SphereSearch => sphere_search(runner, z0, settings)?,
        StartMethod::SensitivitySearch => sensitivity_search(runner, z0, settings)?,
    };
    debug!(method = %settings.method, beta = Vector::from(start.clone()).norm(), "start point found");
    Ok(start)
}

/// Steps along `direction` until Z changes sign with respect to `z0`, then
/// refines the crossing. Without a sign change the far end of the ray is
/// returned.
fn ray_search(
    runner: &ModelRunner,
    direction: &[f64],
    z0: f64,
    settings: &StartPointSettings,
) -> Result<Vec<f64>> {
    let length = settings.maximum_length_start_point;
    let point = |r: f64| direction.iter().map(|d| r * d).collect::<Vec<f64>>();

    let (mut r_prev, mut z_prev) = (0.0, z0);
    loop {
        let r = (r_prev + settings.ray_step).min(length);
        let z = runner.z_at(&point(r))?;
        if z.is_nan() {
            runner.add_message(Message::warning(
                "ray search stopped at a failed model evaluation",
            ));
            return Ok(point(r_prev));
        }
        if (z < 0.0) != (z0 < 0.0) {
            let radius = refine_crossing(runner, direction, (r_prev, z_prev), (r, z))?;
            return Ok(point(radius));
        }
        if r >= length {
            return Ok(point(length));
        }
        r_prev = r;
        z_prev = z;
    }
}

fn refine_crossing(
    runner: &ModelRunner,
    direction: &[f64],
    (r0, z0): (f64, f64),
    (r1, z1): (f64, f64),
) -> Result<f64> {
    let finder =
        BracketingRootFinder::new(SolverConfig::new(1e-4, 1e-3, 50)).must_be_in_between(true);
    let mut first_error = None;
    let result = finder.find_root(
        |r: f64| {
            let u: Vec<f64> = direction.iter().map(|d| r * d).collect();
            match runner.z_at(&u) {
                Ok(z) => z,
                Err(e) => {
                    first_error.get_or_insert(e);
                    f64::NAN
                }
            }
        },
        r0,
        z0,
        r1,
        z1,
    );
    if let Some(e) = first_error {
        return Err(e);
    }
    if result.success && result.x.is_finite() {
        Ok(result.x)
    } else {
        Ok(linear_root(r0, z0, r1, z1).unwrap_or(r1))
    }
}

fn sensitivity_search(
    runner: &ModelRunner,
    z0: f64,
    settings: &StartPointSettings,
) -> Result<Vec<f64>> {
    let origin = vec![0.0; runner.stochast_count()];
    let gradient_settings = GradientSettings {
        gradient_type: GradientType::TwoDirections,
        step_size: settings.gradient_step,
    };
    let result = gradient(runner, &origin, &gradient_settings)?;
    let norm = Vector::from(result.gradient.clone()).norm();
    if result.has_nan() || norm == 0.0 {
        runner.add_message(Message::warning(
            "no gradient at the origin, sensitivity search starts at the origin",
        ));
        return Ok(origin);
    }
    let sign = if z0 < 0.0 { 1.0 } else { -1.0 };
    let direction: Vec<f64> = result.gradient.iter().map(|g| sign * g / norm).collect();
    ray_search(runner, &direction, z0, settings)
}

fn sphere_search(runner: &ModelRunner, z0: f64, settings: &StartPointSettings) -> Result<Vec<f64>> {
    let size = runner.stochast_count();
    let active: Vec<usize> = (0..size)
        .filter(|&i| runner.independent_mask()[i])
        .collect();
    if active.is_empty() {
        return Ok(vec![0.0; size]);
    }

    let mut reduced = sphere_directions(
        active.len(),
        settings.max_steps_sphere_search,
        settings.all_quadrants,
    );
    if !settings.all_quadrants {
        let signs = quadrant_signs(runner, z0, settings)?;
        for direction in &mut reduced {
            for (value, &i) in direction.iter_mut().zip(&active) {
                *value *= signs[i];
            }
        }
    }
    let directions: Vec<Vec<f64>> = reduced
        .iter()
        .map(|d| {
            let mut full = vec![0.0; size];
            for (&value, &i) in d.iter().zip(&active) {
                full[i] = value;
            }
            full
        })
        .collect();
    debug!(directions = directions.len(), "sphere search directions");

    let length = settings.maximum_length_start_point;
    let mut previous = vec![(0.0, z0); directions.len()];
    for level in 1..=SPHERE_LEVELS {
        let r = level as f64 / SPHERE_LEVELS as f64 * length;
        let mut samples: Vec<Sample> = directions
            .iter()
            .map(|d| Sample::new(d.iter().map(|v| r * v).collect()))
            .collect();
        runner.z_values(&mut samples)?;

        let crossing = samples
            .iter()
            .zip(&previous)
            .enumerate()
            .filter(|(_, (sample, _))| !sample.z.is_nan() && (sample.z < 0.0) != (z0 < 0.0))
            .filter_map(|(k, (sample, &(r_prev, z_prev)))| {
                linear_root(r_prev, z_prev, r, sample.z).map(|root| (k, root))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((k, radius)) = crossing {
            return Ok(directions[k].iter().map(|v| radius * v).collect());
        }

        for (prev, sample) in previous.iter_mut().zip(&samples) {
            if !sample.z.is_nan() {
                *prev = (r, sample.z);
            }
        }
    }

    runner.add_message(Message::warning(
        "sphere search found no sign change, using the direction closest to failure",
    ));
    let sign = if z0 < 0.0 { -1.0 } else { 1.0 };
    let best = previous
        .iter()
        .enumerate()
        .min_by(|a, b| (sign * a.1 .1).total_cmp(&(sign * b.1 .1)))
        .map(|(k, _)| k)
        .unwrap_or(0);
    Ok(directions[best].iter().map(|v| length * v).collect())
}

/// Component signs pointing from the origin towards the other domain.
fn quadrant_signs(runner: &ModelRunner, z0: f64, settings: &StartPointSettings) -> Result<Vec<f64>> {
    let origin = vec![0.0; runner.stochast_count()];
    let gradient_settings = GradientSettings {
        gradient_type: GradientType::TwoDirections,
        step_size: settings.gradient_step,
    };
    let result = gradient(runner, &origin, &gradient_settings)?;
    Ok(result
        .gradient
        .iter()
        .map(|&g| {
            if g.is_nan() || g * z0 <= 0.0 {
                1.0
            } else {
                -1.0
            }
        })
        .collect())
}

/// Unit directions in `dimension` dimensions from hyperspherical angles.
///
/// The angles run over `[0, π/2]` in `steps` increments, giving the
/// positive orthant. With `all_quadrants` the polar angles run over `[0, π]`
/// and the last azimuth over `[0, 2π)`. Duplicates are removed.
///
/// # Examples
/// ```
/// use reliability_methods::form::sphere_directions;
///
/// // quarter circle in 2 steps: 0°, 45°, 90°
/// assert_eq!(sphere_directions(2, 2, false).len(), 3);
/// // full circle in 2 steps: 0°, 90°, 180°, 270°
/// assert_eq!(sphere_directions(2, 2, true).len(), 4);
/// ```
pub fn sphere_directions(dimension: usize, steps: usize, all_quadrants: bool) -> Vec<Vec<f64>> {
    let mut directions = Vec::new();
    let mut seen = HashSet::new();
    for direction in angular_subdivision(dimension, steps.max(1), all_quadrants) {
        let key: Vec<i64> = direction.iter().map(|v| (v * 1e9).round() as i64).collect();
        if seen.insert(key) {
            directions.push(direction);
        }
    }
    directions
}

fn angular_subdivision(dimension: usize, steps: usize, all_quadrants: bool) -> Vec<Vec<f64>> {
    match dimension {
        0 => Vec::new(),
        1 if all_quadrants => vec![vec![1.0], vec![-1.0]],
        1 => vec![vec![1.0]],
        _ => {
            let angles: Vec<f64> = if !all_quadrants {
                (0..=steps).map(|k| k as f64 * FRAC_PI_2 / steps as f64).collect()
            } else if dimension == 2 {
                (0..2 * steps).map(|k| k as f64 * PI / steps as f64).collect()
            } else {
                (0..=steps).map(|k| k as f64 * PI / steps as f64).collect()
            };
            let tails = angular_subdivision(dimension - 1, steps, all_quadrants);
            let mut result = Vec::with_capacity(angles.len() * tails.len());
            for &angle in &angles {
                let (sin, cos) = angle.sin_cos();
                for tail in &tails {
                    let mut direction = Vec::with_capacity(dimension);
                    direction.push(cos);
                    direction.extend(tail.iter().map(|t| sin * t));
                    result.push(direction);
                }
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunSettings;
    use approx::assert_abs_diff_eq;
    use reliability_core::stochast::{DistributedStochast, Stochast, UConverter};
    use std::sync::Arc;

    fn runner(n: usize, model: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> ModelRunner {
        let stochasts: Vec<Arc<dyn Stochast>> = (0..n)
            .map(|i| {
                Arc::new(DistributedStochast::normal(format!("u{}", i), 0.0, 1.0).unwrap())
                    as Arc<dyn Stochast>
            })
            .collect();
        ModelRunner::new(model, UConverter::independent(stochasts), RunSettings::default())
            .unwrap()
    }

    fn settings(method: StartMethod) -> StartPointSettings {
        StartPointSettings {
            method,
            ..Default::default()
        }
    }

    #[test]
    fn test_sphere_directions_are_unit_and_unique() {
        let directions = sphere_directions(3, 4, false);
        // (steps + 1)² minus the 4 duplicates of the pole
        assert_eq!(directions.len(), 21);
        for d in &directions {
            let norm: f64 = d.iter().map(|v| v * v).sum();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
            assert!(d.iter().all(|&v| v >= -1e-12));
        }
    }

    #[test]
    fn test_full_sphere_has_both_signs() {
        let directions = sphere_directions(3, 2, true);
        assert!(directions.iter().any(|d| d[2] < -0.5));
        assert!(directions.iter().any(|d| d[0] < -0.5));
    }

    #[test]
    fn test_fixed_value() {
        let runner = runner(2, |x: &[f64]| x[0]);
        let mut s = settings(StartMethod::FixedValue);
        s.start_values = vec![0.5, -1.0];
        assert_eq!(find_start_point(&runner, &s).unwrap(), vec![0.5, -1.0]);
        assert_eq!(runner.model_runs(), 0);

        s.start_values = vec![1.0];
        assert!(find_start_point(&runner, &s).is_err());
    }

    #[test]
    fn test_ray_search_finds_plane() {
        // plane at distance 3 along (1, 1)/√2
        let runner = runner(2, |x: &[f64]| 3.0 * std::f64::consts::SQRT_2 - x[0] - x[1]);
        let start = find_start_point(&runner, &settings(StartMethod::RaySearch)).unwrap();
        assert_abs_diff_eq!(start[0], 2.121320343559643, epsilon = 1e-3);
        assert_abs_diff_eq!(start[1], 2.121320343559643, epsilon = 1e-3);
    }

    #[test]
    fn test_ray_search_without_crossing_stops_at_maximum_length() {
        let runner = runner(1, |_: &[f64]| 1.0);
        let start = find_start_point(&runner, &settings(StartMethod::RaySearch)).unwrap();
        assert_abs_diff_eq!(start[0], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sensitivity_search_follows_gradient() {
        let runner = runner(2, |x: &[f64]| 2.0 + x[1]);
        let start = find_start_point(&runner, &settings(StartMethod::SensitivitySearch)).unwrap();
        assert_abs_diff_eq!(start[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(start[1], -2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sphere_search_picks_nearest_crossing() {
        let runner = runner(2, |x: &[f64]| 3.0 + x[0]);
        let start = find_start_point(&runner, &settings(StartMethod::SphereSearch)).unwrap();
        assert_abs_diff_eq!(start[0], -3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(start[1], 0.0, epsilon = 1e-9);
    }
}
