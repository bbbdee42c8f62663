//! Root finder along a ray from the origin of u-space.
//!
//! Directional Sampling needs the radius `r` at which the limit state changes
//! sign along a direction. Each evaluation is one model run, so the search
//! first steps outward until a sign change is bracketed (or the outer radius
//! is reached) and only then refines. The outward stepping tolerates
//! non-monotonic `z(r)` shapes.

use crate::math::numeric::linear_root;
use crate::types::{ReliabilityError, Result};
use std::fmt;
use std::str::FromStr;

/// Stepping and refinement strategy of the ray root finder.
///
/// The prefix selects the outward stepping, the suffix the refinement of a
/// bracketed root:
///
/// | Prefix   | Stepping |
/// |----------|----------|
/// | `Robust` | fixed steps of `du1` |
/// | `Fast`   | linear extrapolation, clamped to `max_step_size` |
/// | `Faster` | as `Fast`, but a non-advancing extrapolation jumps to the outer radius |
///
/// | Suffix      | Refinement |
/// |-------------|------------|
/// | (none)      | regula falsi with the Illinois modification |
/// | `Bisection` | bisection, then a final secant polish |
/// | `Auto`      | secant, switching to bisection on a slope mismatch, then a final secant polish |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DsIterationMethod {
    /// Fixed steps, regula falsi
    #[default]
    Robust,
    /// Fixed steps, bisection
    RobustBisection,
    /// Fixed steps, secant/bisection hybrid
    RobustAuto,
    /// Extrapolated steps, regula falsi
    Fast,
    /// Extrapolated steps, bisection
    FastBisection,
    /// Extrapolated steps, secant/bisection hybrid
    FastAuto,
    /// Extrapolated steps with a jump to the outer radius, regula falsi
    Faster,
    /// Extrapolated steps with a jump to the outer radius, bisection
    FasterBisection,
    /// Extrapolated steps with a jump to the outer radius, hybrid refinement
    FasterAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stepping {
    Robust,
    Fast,
    Faster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refinement {
    RegulaFalsi,
    Bisection,
    Auto,
}

impl DsIterationMethod {
    /// All variants, in declaration order.
    pub const ALL: [DsIterationMethod; 9] = [
        DsIterationMethod::Robust,
        DsIterationMethod::RobustBisection,
        DsIterationMethod::RobustAuto,
        DsIterationMethod::Fast,
        DsIterationMethod::FastBisection,
        DsIterationMethod::FastAuto,
        DsIterationMethod::Faster,
        DsIterationMethod::FasterBisection,
        DsIterationMethod::FasterAuto,
    ];

    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            DsIterationMethod::Robust => "robust",
            DsIterationMethod::RobustBisection => "robust_bisection",
            DsIterationMethod::RobustAuto => "robust_auto",
            DsIterationMethod::Fast => "fast",
            DsIterationMethod::FastBisection => "fast_bisection",
            DsIterationMethod::FastAuto => "fast_auto",
            DsIterationMethod::Faster => "faster",
            DsIterationMethod::FasterBisection => "faster_bisection",
            DsIterationMethod::FasterAuto => "faster_auto",
        }
    }

    fn stepping(&self) -> Stepping {
        match self {
            DsIterationMethod::Robust
            | DsIterationMethod::RobustBisection
            | DsIterationMethod::RobustAuto => Stepping::Robust,
            DsIterationMethod::Fast
            | DsIterationMethod::FastBisection
            | DsIterationMethod::FastAuto => Stepping::Fast,
            DsIterationMethod::Faster
            | DsIterationMethod::FasterBisection
            | DsIterationMethod::FasterAuto => Stepping::Faster,
        }
    }

    fn refinement(&self) -> Refinement {
        match self {
            DsIterationMethod::Robust | DsIterationMethod::Fast | DsIterationMethod::Faster => {
                Refinement::RegulaFalsi
            }
            DsIterationMethod::RobustBisection
            | DsIterationMethod::FastBisection
            | DsIterationMethod::FasterBisection => Refinement::Bisection,
            DsIterationMethod::RobustAuto
            | DsIterationMethod::FastAuto
            | DsIterationMethod::FasterAuto => Refinement::Auto,
        }
    }
}

impl fmt::Display for DsIterationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DsIterationMethod {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        DsIterationMethod::ALL
            .into_iter()
            .find(|m| m.name() == normalized || m.name().replace('_', "") == normalized)
            .ok_or_else(|| {
                ReliabilityError::InvalidArgument(format!("unknown ray iteration method '{}'", s))
            })
    }
}

/// Settings of the ray root finder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RayRootFinderSettings {
    /// Outer radius `rB` of the search
    pub maximum_length_u: f64,
    /// Largest extrapolated step
    pub max_step_size: f64,
    /// First (and, for `Robust*`, every) outward step
    pub du1: f64,
    /// Radius resolution at which the search stops
    pub epsilon_du: f64,
    /// Slope ratio above which `*Auto` refinement bisects
    pub slope_criterion: f64,
    /// Evaluation budget of each phase
    pub max_iterations: usize,
    /// Stepping and refinement strategy
    pub iteration_method: DsIterationMethod,
}

impl Default for RayRootFinderSettings {
    fn default() -> Self {
        Self {
            maximum_length_u: 20.0,
            max_step_size: 3.0,
            du1: 1.0,
            epsilon_du: 1e-3,
            slope_criterion: 4.0,
            max_iterations: 50,
            iteration_method: DsIterationMethod::default(),
        }
    }
}

impl RayRootFinderSettings {
    /// Checks that all lengths are positive.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("maximum_length_u", self.maximum_length_u),
            ("max_step_size", self.max_step_size),
            ("du1", self.du1),
            ("epsilon_du", self.epsilon_du),
            ("slope_criterion", self.slope_criterion),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ReliabilityError::InvalidArgument(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.max_iterations == 0 {
            return Err(ReliabilityError::InvalidArgument(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one ray search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayResult {
    /// Radius of the sign change, `None` when no failure lies within the
    /// outer radius
    pub radius: Option<f64>,
    /// Number of limit state evaluations spent on this ray
    pub evaluations: usize,
    /// A NaN limit state value aborted the search
    pub failed: bool,
}

impl RayResult {
    fn found(radius: f64, evaluations: usize) -> Self {
        Self {
            radius: Some(radius),
            evaluations,
            failed: false,
        }
    }

    fn none(evaluations: usize) -> Self {
        Self {
            radius: None,
            evaluations,
            failed: false,
        }
    }

    fn failed(evaluations: usize) -> Self {
        Self {
            radius: None,
            evaluations,
            failed: true,
        }
    }
}

/// Root finder for `z(r)` along a ray.
///
/// # Example
///
/// ```
/// use reliability_core::math::solvers::{RayRootFinder, RayRootFinderSettings};
///
/// let finder = RayRootFinder::new(RayRootFinderSettings::default());
/// // z = 3.5 - r crosses zero at r = 3.5
/// let result = finder.find_root(3.5, |r| Ok(3.5 - r)).unwrap();
/// assert!((result.radius.unwrap() - 3.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct RayRootFinder {
    settings: RayRootFinderSettings,
}

/// Evaluated point on the ray, z sign-normalised so that the origin is safe.
#[derive(Debug, Clone, Copy)]
struct RayPoint {
    r: f64,
    z: f64,
}

impl RayRootFinder {
    /// Create a ray root finder.
    pub fn new(settings: RayRootFinderSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    pub fn settings(&self) -> &RayRootFinderSettings {
        &self.settings
    }

    /// Finds the radius at which `z` changes sign relative to `z0 = z(0)`.
    ///
    /// `z` is called with radii in `(0, maximum_length_u]`; `z0` is not
    /// re-evaluated. A negative `z0` flips the sign of all values so that
    /// the search always looks for the first negative value.
    ///
    /// # Errors
    ///
    /// Errors returned by `z` are propagated.
    pub fn find_root<F>(&self, z0: f64, mut z: F) -> Result<RayResult>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        if z0.is_nan() {
            return Ok(RayResult::failed(0));
        }
        let sign = if z0 < 0.0 { -1.0 } else { 1.0 };
        let mut evaluations = 0;
        let mut eval = |r: f64| -> Result<f64> {
            evaluations += 1;
            Ok(sign * z(r)?)
        };

        let bracket = self.bracket(sign * z0, &mut eval)?;
        let (low, high, jumped) = match bracket {
            Bracket::Found(low, high, jumped) => (low, high, jumped),
            Bracket::Root(radius) => return Ok(RayResult::found(radius, evaluations)),
            Bracket::None => return Ok(RayResult::none(evaluations)),
            Bracket::Failed => return Ok(RayResult::failed(evaluations)),
        };

        let radius = self.refine(low, high, jumped, &mut eval)?;
        Ok(match radius {
            Some(r) => RayResult::found(r, evaluations),
            None => RayResult::failed(evaluations),
        })
    }

    /// Outward stepping until `z` turns negative.
    fn bracket<F>(&self, z0: f64, eval: &mut F) -> Result<Bracket>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        let s = &self.settings;
        let rb = s.maximum_length_u;
        let stepping = s.iteration_method.stepping();

        let mut previous = RayPoint { r: 0.0, z: z0 };
        let mut r = s.du1.min(rb);
        let mut jumped = false;
        // fixed steps must be able to reach rB
        let steps_to_rb = (rb / s.du1.min(s.max_step_size)).ceil() as usize + 1;

        for _ in 0..s.max_iterations.max(steps_to_rb) {
            let z = eval(r)?;
            if z.is_nan() {
                return Ok(Bracket::Failed);
            }
            let current = RayPoint { r, z };
            if z < 0.0 {
                return Ok(Bracket::Found(previous, current, jumped));
            }
            if r >= rb {
                return Ok(Bracket::None);
            }

            let next = match stepping {
                Stepping::Robust => r + s.du1,
                Stepping::Fast | Stepping::Faster => {
                    match linear_root(previous.r, previous.z, current.r, current.z) {
                        Some(root) if root > current.r => {
                            let step = root - current.r;
                            if step < s.epsilon_du {
                                return Ok(Bracket::Root(root));
                            }
                            current.r + step.min(s.max_step_size)
                        }
                        _ if stepping == Stepping::Faster => {
                            jumped = true;
                            rb
                        }
                        _ => current.r + s.max_step_size,
                    }
                }
            };

            let next = if stepping != Stepping::Robust && rb - next < 0.5 * s.max_step_size {
                rb
            } else {
                next.min(rb)
            };

            previous = current;
            r = next;
        }

        Ok(Bracket::None)
    }

    /// Narrows `[low, high]` (z(low) >= 0 > z(high)) down to `epsilon_du`.
    fn refine<F>(
        &self,
        mut low: RayPoint,
        mut high: RayPoint,
        jumped: bool,
        eval: &mut F,
    ) -> Result<Option<f64>>
    where
        F: FnMut(f64) -> Result<f64>,
    {
        let s = &self.settings;
        let refinement = s.iteration_method.refinement();

        // After a jump to the outer radius, bisect back to a normal step size
        if jumped {
            while high.r - low.r > s.max_step_size {
                let mid = 0.5 * (low.r + high.r);
                let z = eval(mid)?;
                if z.is_nan() {
                    return Ok(None);
                }
                if z < 0.0 {
                    high = RayPoint { r: mid, z };
                } else {
                    low = RayPoint { r: mid, z };
                }
            }
        }

        let mut last_estimate: Option<f64> = None;
        let mut illinois_low = 1.0;
        let mut illinois_high = 1.0;
        let mut latest = high;
        let mut before_latest = low;

        for _ in 0..s.max_iterations {
            if high.r - low.r < s.epsilon_du {
                break;
            }

            let secant = || {
                linear_root(low.r, low.z * illinois_low, high.r, high.z * illinois_high)
                    .filter(|r| *r > low.r && *r < high.r)
            };
            let bisection = 0.5 * (low.r + high.r);

            let r = match refinement {
                Refinement::RegulaFalsi => secant().unwrap_or(bisection),
                Refinement::Bisection => bisection,
                Refinement::Auto => {
                    let bracket_slope = (high.z - low.z) / (high.r - low.r);
                    let local_slope =
                        (latest.z - before_latest.z) / (latest.r - before_latest.r);
                    let ratio = local_slope / bracket_slope;
                    if ratio.is_nan()
                        || ratio <= 0.0
                        || ratio > s.slope_criterion
                        || ratio < 1.0 / s.slope_criterion
                    {
                        bisection
                    } else {
                        secant().unwrap_or(bisection)
                    }
                }
            };

            let z = eval(r)?;
            if z.is_nan() {
                return Ok(None);
            }
            if z == 0.0 {
                return Ok(Some(r));
            }

            before_latest = latest;
            latest = RayPoint { r, z };
            if z < 0.0 {
                high = latest;
                illinois_high = 1.0;
                illinois_low *= 0.5;
            } else {
                low = latest;
                illinois_low = 1.0;
                illinois_high *= 0.5;
            }

            if refinement == Refinement::RegulaFalsi {
                if let Some(previous) = last_estimate {
                    if (r - previous).abs() < s.epsilon_du {
                        return Ok(Some(r));
                    }
                }
                last_estimate = Some(r);
            }
        }

        // final secant polish inside the last bracket
        let polished = linear_root(low.r, low.z, high.r, high.z)
            .filter(|r| *r >= low.r && *r <= high.r)
            .unwrap_or(0.5 * (low.r + high.r));
        Ok(Some(polished))
    }
}

/// Outcome of the outward stepping.
enum Bracket {
    /// Sign change between the two points; flag set after a jump to `rB`
    Found(RayPoint, RayPoint, bool),
    /// Extrapolated step below resolution: root taken at this radius
    Root(f64),
    /// No sign change up to the outer radius
    None,
    /// NaN limit state value
    Failed,
}
