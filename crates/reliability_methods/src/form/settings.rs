//! FORM settings.

use crate::error::{require_positive, ConfigError};
use reliability_core::types::ReliabilityError;
use std::fmt;
use std::str::FromStr;

/// Finite difference scheme of the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GradientType {
    /// Forward differences, one extra evaluation per stochast
    #[default]
    OneDirection,
    /// Central differences, two extra evaluations per stochast
    TwoDirections,
}

/// Gradient settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GradientSettings {
    /// Difference scheme
    pub gradient_type: GradientType,
    /// Step in u-space
    pub step_size: f64,
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            gradient_type: GradientType::OneDirection,
            step_size: 0.3,
        }
    }
}

/// How FORM finds its first iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StartMethod {
    /// Start at the configured values
    #[default]
    FixedValue,
    /// Root search along one ray
    RaySearch,
    /// Sign change search over a set of sphere directions
    SphereSearch,
    /// Ray search along the gradient at the origin
    SensitivitySearch,
}

impl fmt::Display for StartMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartMethod::FixedValue => "fixed_value",
            StartMethod::RaySearch => "ray_search",
            StartMethod::SphereSearch => "sphere_search",
            StartMethod::SensitivitySearch => "sensitivity_search",
        };
        f.write_str(name)
    }
}

impl FromStr for StartMethod {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fixed_value" | "fixed" | "none" => Ok(StartMethod::FixedValue),
            "ray_search" | "ray" => Ok(StartMethod::RaySearch),
            "sphere_search" | "sphere" => Ok(StartMethod::SphereSearch),
            "sensitivity_search" | "sensitivity" => Ok(StartMethod::SensitivitySearch),
            _ => Err(ReliabilityError::InvalidArgument(format!(
                "unknown start point method '{}'",
                s
            ))),
        }
    }
}

/// Start point search settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StartPointSettings {
    /// Search method
    pub method: StartMethod,
    /// Start values (FixedValue) or ray direction (RaySearch); empty means
    /// the origin or the all-ones direction
    pub start_values: Vec<f64>,
    /// Largest radius searched
    pub maximum_length_start_point: f64,
    /// Radius step of the ray search
    pub ray_step: f64,
    /// Search the full sphere instead of the quadrant given by the gradient
    pub all_quadrants: bool,
    /// Angle subdivisions of the sphere search
    pub max_steps_sphere_search: usize,
    /// Difference step of the sensitivity search
    pub gradient_step: f64,
}

impl Default for StartPointSettings {
    fn default() -> Self {
        Self {
            method: StartMethod::FixedValue,
            start_values: Vec::new(),
            maximum_length_start_point: 6.0,
            ray_step: 1.0,
            all_quadrants: false,
            max_steps_sphere_search: 5,
            gradient_step: 0.5,
        }
    }
}

impl StartPointSettings {
    /// Validates the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(
            "maximum_length_start_point",
            self.maximum_length_start_point,
        )?;
        require_positive("ray_step", self.ray_step)?;
        require_positive("gradient_step", self.gradient_step)?;
        if self.max_steps_sphere_search == 0 {
            return Err(ConfigError::parameter(
                "max_steps_sphere_search",
                "must be at least 1",
            ));
        }
        if self.start_values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::parameter("start_values", "must be finite"));
        }
        Ok(())
    }
}

/// FORM settings.
///
/// # Examples
/// ```
/// use reliability_methods::form::{FormSettings, GradientType};
///
/// let mut settings = FormSettings::default();
/// settings.gradient.gradient_type = GradientType::TwoDirections;
/// assert!(settings.validate().is_ok());
///
/// settings.relaxation_factor = 1.5;
/// assert!(settings.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormSettings {
    /// Fraction of the HL-RF step taken per iteration, in (0, 1]
    pub relaxation_factor: f64,
    /// Restarts with a halved relaxation factor
    pub relaxation_loops: usize,
    /// Iterations per relaxation loop
    pub maximum_iterations: usize,
    /// Convergence tolerance on the change of beta
    pub epsilon_beta: f64,
    /// Convergence tolerance on `|z| / |∇z|`
    pub epsilon_z: f64,
    /// Gradient scheme
    pub gradient: GradientSettings,
    /// Start point search
    pub start_point: StartPointSettings,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            relaxation_factor: 0.75,
            relaxation_loops: 1,
            maximum_iterations: 50,
            epsilon_beta: 0.01,
            epsilon_z: 0.01,
            gradient: GradientSettings::default(),
            start_point: StartPointSettings::default(),
        }
    }
}

impl FormSettings {
    /// Validates the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.relaxation_factor > 0.0 && self.relaxation_factor <= 1.0) {
            return Err(ConfigError::parameter(
                "relaxation_factor",
                format!("must be in (0, 1], got {}", self.relaxation_factor),
            ));
        }
        if self.relaxation_loops == 0 {
            return Err(ConfigError::parameter(
                "relaxation_loops",
                "must be at least 1",
            ));
        }
        if self.maximum_iterations == 0 {
            return Err(ConfigError::parameter(
                "maximum_iterations",
                "must be at least 1",
            ));
        }
        require_positive("epsilon_beta", self.epsilon_beta)?;
        require_positive("epsilon_z", self.epsilon_z)?;
        require_positive("step_size", self.gradient.step_size)?;
        self.start_point.validate()
    }
}
