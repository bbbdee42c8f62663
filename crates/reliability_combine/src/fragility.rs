//! Integration of a fragility curve over a conditioning stochast.
//!
//! A fragility curve gives the reliability index of a structure conditional
//! on a value `x` of the conditioning stochast, typically a water level:
//!
//! ```text
//! Pf = ∫ f(x) · Φ(−β(x)) dx
//! ```
//!
//! The integration runs over the u-space of the conditioning stochast. The
//! failure domain is read in two dimensions `(u_c, u_f)` with failure when
//! `u_f < −β(x(u_c))`; the design point lies in the direction of the centre
//! of mass of that domain.

use crate::combiner::{bounded_beta, independent_alphas, normalize, union_of_stochasts};
use reliability_core::math::distributions::{norm_cdf, norm_pdf, probability_from_beta};
use reliability_core::math::numeric::interpolate_table;
use reliability_core::stochast::{DistributedStochast, Stochast};
use reliability_core::types::{
    ConvergenceReport, DesignPoint, Message, ReliabilityError, Result,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the stochast that carries the fragility axis.
pub const FRAGILITY_STOCHAST: &str = "fragility";

/// Point of a fragility curve.
#[derive(Debug, Clone)]
pub struct FragilityValue {
    /// Value of the conditioning stochast
    pub x: f64,
    /// Conditional reliability index
    pub beta: f64,
    /// Design point of the conditional calculation, if available
    pub design_point: Option<DesignPoint>,
}

impl FragilityValue {
    /// Curve point without a design point.
    pub fn new(x: f64, beta: f64) -> Self {
        Self {
            x,
            beta,
            design_point: None,
        }
    }

    /// Curve point taken from a conditional design point.
    pub fn from_design_point(x: f64, design_point: DesignPoint) -> Self {
        Self {
            x,
            beta: design_point.beta,
            design_point: Some(design_point),
        }
    }
}

/// Fragility curve, sorted by ascending `x`.
#[derive(Debug, Clone)]
pub struct FragilityCurve {
    values: Vec<FragilityValue>,
    xs: Vec<f64>,
    betas: Vec<f64>,
}

impl FragilityCurve {
    /// Builds a curve from its points in any order.
    ///
    /// # Errors
    ///
    /// `EmptyInput` without points, `InvalidArgument` for a NaN value.
    pub fn new(mut values: Vec<FragilityValue>) -> Result<Self> {
        if values.is_empty() {
            return Err(ReliabilityError::EmptyInput(
                "fragility curve has no points".to_string(),
            ));
        }
        if let Some(v) = values.iter().find(|v| v.x.is_nan() || v.beta.is_nan()) {
            return Err(ReliabilityError::InvalidArgument(format!(
                "fragility point ({}, {}) is not a number",
                v.x, v.beta
            )));
        }
        values.sort_by(|a, b| a.x.total_cmp(&b.x));
        let xs = values.iter().map(|v| v.x).collect();
        let betas = values.iter().map(|v| v.beta).collect();
        Ok(Self { values, xs, betas })
    }

    /// Builds a curve from `(x, β)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(x, beta)| FragilityValue::new(x, beta))
                .collect(),
        )
    }

    /// Points of the curve.
    pub fn values(&self) -> &[FragilityValue] {
        &self.values
    }

    /// Reliability index at `x`, flat outside the curve.
    pub fn beta_at(&self, x: f64) -> f64 {
        interpolate_table(x, &self.xs, &self.betas)
    }

    /// Interpolation weights of the curve points at `x`.
    fn weights_at(&self, x: f64) -> Vec<(usize, f64)> {
        let last = self.xs.len() - 1;
        if x <= self.xs[0] {
            return vec![(0, 1.0)];
        }
        if x >= self.xs[last] {
            return vec![(last, 1.0)];
        }
        let upper = self.xs.partition_point(|&xi| xi <= x);
        let lower = upper - 1;
        let span = self.xs[upper] - self.xs[lower];
        let t = if span > 0.0 {
            (x - self.xs[lower]) / span
        } else {
            0.0
        };
        vec![(lower, 1.0 - t), (upper, t)]
    }
}

/// Settings of [`FragilityCurveIntegration`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FragilityIntegrationSettings {
    /// Width of the integration bins in u-space
    pub step: f64,
    /// Integration range `[−u_max, u_max]`
    pub u_max: f64,
}

impl Default for FragilityIntegrationSettings {
    fn default() -> Self {
        Self {
            step: 0.001,
            u_max: 8.0,
        }
    }
}

impl FragilityIntegrationSettings {
    fn validate(&self) -> Result<()> {
        if !(self.step > 0.0) || !(self.u_max > 0.0) || self.step >= self.u_max {
            return Err(ReliabilityError::InvalidArgument(format!(
                "fragility integration needs 0 < step < u_max, got step {} and u_max {}",
                self.step, self.u_max
            )));
        }
        Ok(())
    }
}

/// Integration of a fragility curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragilityCurveIntegration;

impl FragilityCurveIntegration {
    /// Integrates `curve` over `conditioning`.
    ///
    /// With a `normalizing` curve only the failures beyond those of the
    /// normalizing curve count: `q(x) = Φ(−β(x)) − Φ(−β_n(x))`, bounded below
    /// by zero.
    ///
    /// The design point has the conditioning stochast as its first alpha. The
    /// fragility axis follows as a single standard normal stochast named
    /// [`FRAGILITY_STOCHAST`], or, when the curve points carry design points,
    /// spread over their stochasts in proportion to their mean alphas.
    ///
    /// # Examples
    /// ```
    /// use reliability_combine::{FragilityCurve, FragilityCurveIntegration, FragilityIntegrationSettings};
    /// use reliability_core::stochast::{DistributedStochast, Stochast};
    /// use std::sync::Arc;
    ///
    /// let level: Arc<dyn Stochast> = Arc::new(DistributedStochast::normal("h", 0.0, 1.0).unwrap());
    /// let curve = FragilityCurve::from_pairs(&[(-10.0, 13.0), (10.0, -7.0)]).unwrap();
    /// let dp = FragilityCurveIntegration
    ///     .integrate(level, &curve, None, &FragilityIntegrationSettings::default())
    ///     .unwrap();
    /// assert!((dp.beta - 3.0 / 2f64.sqrt()).abs() < 1e-3);
    /// ```
    pub fn integrate(
        &self,
        conditioning: Arc<dyn Stochast>,
        curve: &FragilityCurve,
        normalizing: Option<&FragilityCurve>,
        settings: &FragilityIntegrationSettings,
    ) -> Result<DesignPoint> {
        settings.validate()?;

        // bin centres at −u_max, −u_max + h, ..., u_max
        let bins = (2.0 * settings.u_max / settings.step).round() as usize + 1;
        let mut probability = 0.0;
        let mut moment_conditioning = 0.0;
        let mut moment_fragility = 0.0;
        let mut point_weights = vec![0.0; curve.values.len()];

        for k in 0..bins {
            let u = -settings.u_max + k as f64 * settings.step;
            let low = u - 0.5 * settings.step;
            let high = u + 0.5 * settings.step;
            let mass = norm_cdf(high) - norm_cdf(low);
            let x = conditioning.x_from_u(u);

            let beta = curve.beta_at(x);
            let beta_normalizing = normalizing.map(|c| c.beta_at(x));
            let q = (probability_from_beta(beta)
                - beta_normalizing.map_or(0.0, probability_from_beta))
            .max(0.0);
            if q <= 0.0 {
                continue;
            }

            // failure band on the fragility axis: lower < u_f < upper
            let upper = -beta;
            let lower = beta_normalizing.map_or(f64::NEG_INFINITY, |b| -b);
            let contribution = mass * q;

            probability += contribution;
            moment_conditioning += q * (norm_pdf(low) - norm_pdf(high));
            if upper > lower {
                moment_fragility += mass * (norm_pdf(lower) - norm_pdf(upper));
            }
            for (index, weight) in curve.weights_at(x) {
                point_weights[index] += contribution * weight;
            }
        }

        let beta = bounded_beta(probability);
        debug!(probability, beta, "fragility curve integrated");

        let mut messages = Vec::new();
        let axes = if probability > 0.0 {
            let mut axes = [
                -moment_conditioning / probability,
                -moment_fragility / probability,
            ];
            normalize(&mut axes);
            axes
        } else {
            warn!("fragility curve gives no failure probability");
            messages.push(Message::warning(
                "no failure probability, alpha values are zero",
            ));
            [0.0, 0.0]
        };

        let (fragility_stochasts, fragility_alpha) =
            Self::fragility_axis(&conditioning, curve, &point_weights, axes[1])?;

        let mut stochasts = vec![conditioning];
        stochasts.extend(fragility_stochasts);
        let mut alpha = vec![axes[0]];
        alpha.extend(fragility_alpha);

        let contributing_design_points = curve
            .values
            .iter()
            .filter_map(|v| v.design_point.clone())
            .collect();

        Ok(DesignPoint {
            identifier: "Fragility curve".to_string(),
            beta,
            alphas: independent_alphas(&stochasts, &alpha, beta),
            convergence_report: ConvergenceReport {
                is_converged: true,
                total_iterations: bins,
                ..Default::default()
            },
            contributing_design_points,
            messages,
        })
    }

    /// Stochasts and alphas carrying the fragility axis.
    fn fragility_axis(
        conditioning: &Arc<dyn Stochast>,
        curve: &FragilityCurve,
        point_weights: &[f64],
        alpha_fragility: f64,
    ) -> Result<(Vec<Arc<dyn Stochast>>, Vec<f64>)> {
        let stochasts: Vec<Arc<dyn Stochast>> =
            union_of_stochasts(curve.values.iter().filter_map(|v| v.design_point.as_ref()))
                .into_iter()
                .filter(|s| !Arc::ptr_eq(s, conditioning))
                .collect();

        let mut mean_alpha: Vec<f64> = stochasts
            .iter()
            .map(|s| {
                curve
                    .values
                    .iter()
                    .zip(point_weights)
                    .filter_map(|(v, w)| {
                        let dp = v.design_point.as_ref()?;
                        Some(w * dp.alpha_for(s).map_or(0.0, |a| a.alpha))
                    })
                    .sum()
            })
            .collect();
        normalize(&mut mean_alpha);

        if mean_alpha.iter().all(|a| *a == 0.0) {
            let fragility: Arc<dyn Stochast> =
                Arc::new(DistributedStochast::normal(FRAGILITY_STOCHAST, 0.0, 1.0)?);
            return Ok((vec![fragility], vec![alpha_fragility]));
        }

        let alpha = mean_alpha.iter().map(|a| a * alpha_fragility.abs()).collect();
        Ok((stochasts, alpha))
    }
}
