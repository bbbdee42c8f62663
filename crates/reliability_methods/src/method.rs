//! Common interface of the reliability methods and dispatch by name.

use crate::error::ConfigError;
use crate::form::{Form, FormSettings};
use crate::model::ModelRunner;
use crate::sampling::{
    CrudeMonteCarlo, CrudeMonteCarloSettings, DirectionalSampling, DirectionalSamplingSettings,
    ImportanceSampling, ImportanceSamplingSettings, NumericalIntegration,
    NumericalIntegrationSettings,
};
use reliability_core::types::{DesignPoint, ReliabilityError, Result};
use std::fmt;
use std::str::FromStr;

/// A method that computes a design point for the model of a runner.
///
/// Methods hold only their settings; all state of a calculation lives in
/// the call, so one method value can serve several runners.
pub trait ReliabilityMethod: Send + Sync {
    /// Display name, also used as design point identifier.
    fn name(&self) -> &'static str;

    /// Runs the method.
    ///
    /// # Errors
    ///
    /// Invalid settings, dimension mismatches and errors of the numerical
    /// primitives. Non-convergence is not an error; it is reported in
    /// [`DesignPoint::convergence_report`].
    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint>;
}

/// Reliability method identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MethodKind {
    /// First Order Reliability Method
    Form,
    /// Directional Sampling
    DirectionalSampling,
    /// Crude Monte Carlo
    CrudeMonteCarlo,
    /// Importance Sampling
    ImportanceSampling,
    /// Numerical Integration
    NumericalIntegration,
}

impl MethodKind {
    /// All methods.
    pub const ALL: [MethodKind; 5] = [
        MethodKind::Form,
        MethodKind::DirectionalSampling,
        MethodKind::CrudeMonteCarlo,
        MethodKind::ImportanceSampling,
        MethodKind::NumericalIntegration,
    ];

    /// Short name accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Form => "form",
            MethodKind::DirectionalSampling => "directional_sampling",
            MethodKind::CrudeMonteCarlo => "crude_monte_carlo",
            MethodKind::ImportanceSampling => "importance_sampling",
            MethodKind::NumericalIntegration => "numerical_integration",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = ReliabilityError;

    /// Parses a method name; case, `-` and `_` are ignored and the usual
    /// abbreviations (`ds`, `cm`, `mc`, `is`, `ni`) are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "form" => Ok(MethodKind::Form),
            "ds" | "directionalsampling" => Ok(MethodKind::DirectionalSampling),
            "cm" | "mc" | "crudemontecarlo" | "montecarlo" => Ok(MethodKind::CrudeMonteCarlo),
            "is" | "importancesampling" => Ok(MethodKind::ImportanceSampling),
            "ni" | "numericalintegration" => Ok(MethodKind::NumericalIntegration),
            _ => Err(ReliabilityError::UnknownMethod(s.to_string())),
        }
    }
}

/// Settings of any reliability method.
///
/// In configuration files the variant is selected by a `method` key:
///
/// ```toml
/// method = "directional_sampling"
/// minimum_samples = 1000
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", rename_all = "snake_case"))]
pub enum MethodSettings {
    /// FORM
    Form(FormSettings),
    /// Directional Sampling
    DirectionalSampling(DirectionalSamplingSettings),
    /// Crude Monte Carlo
    CrudeMonteCarlo(CrudeMonteCarloSettings),
    /// Importance Sampling
    ImportanceSampling(ImportanceSamplingSettings),
    /// Numerical Integration
    NumericalIntegration(NumericalIntegrationSettings),
}

impl Default for MethodSettings {
    fn default() -> Self {
        MethodSettings::Form(FormSettings::default())
    }
}

impl MethodSettings {
    /// Default settings of a method.
    pub fn default_for(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Form => MethodSettings::Form(Default::default()),
            MethodKind::DirectionalSampling => MethodSettings::DirectionalSampling(Default::default()),
            MethodKind::CrudeMonteCarlo => MethodSettings::CrudeMonteCarlo(Default::default()),
            MethodKind::ImportanceSampling => MethodSettings::ImportanceSampling(Default::default()),
            MethodKind::NumericalIntegration => {
                MethodSettings::NumericalIntegration(Default::default())
            }
        }
    }

    /// The method these settings belong to.
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodSettings::Form(_) => MethodKind::Form,
            MethodSettings::DirectionalSampling(_) => MethodKind::DirectionalSampling,
            MethodSettings::CrudeMonteCarlo(_) => MethodKind::CrudeMonteCarlo,
            MethodSettings::ImportanceSampling(_) => MethodKind::ImportanceSampling,
            MethodSettings::NumericalIntegration(_) => MethodKind::NumericalIntegration,
        }
    }

    /// Validates the settings of the selected method.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self {
            MethodSettings::Form(s) => s.validate(),
            MethodSettings::DirectionalSampling(s) => s.validate(),
            MethodSettings::CrudeMonteCarlo(s) => s.validate(),
            MethodSettings::ImportanceSampling(s) => s.validate(),
            MethodSettings::NumericalIntegration(s) => s.validate(),
        }
    }

    /// Overrides the seed of the sampling methods; FORM and Numerical
    /// Integration are deterministic and ignore it.
    pub fn set_seed(&mut self, seed: u64) {
        match self {
            MethodSettings::DirectionalSampling(s) => s.seed = seed,
            MethodSettings::CrudeMonteCarlo(s) => s.seed = seed,
            MethodSettings::ImportanceSampling(s) => s.seed = seed,
            MethodSettings::Form(_) | MethodSettings::NumericalIntegration(_) => {}
        }
    }

    /// Method object for these settings.
    pub fn build(&self) -> Box<dyn ReliabilityMethod> {
        match self {
            MethodSettings::Form(s) => Box::new(Form::new(s.clone())),
            MethodSettings::DirectionalSampling(s) => Box::new(DirectionalSampling::new(s.clone())),
            MethodSettings::CrudeMonteCarlo(s) => Box::new(CrudeMonteCarlo::new(s.clone())),
            MethodSettings::ImportanceSampling(s) => Box::new(ImportanceSampling::new(s.clone())),
            MethodSettings::NumericalIntegration(s) => {
                Box::new(NumericalIntegration::new(s.clone()))
            }
        }
    }
}

impl ReliabilityMethod for MethodSettings {
    fn name(&self) -> &'static str {
        self.build().name()
    }

    fn design_point(&self, runner: &ModelRunner) -> Result<DesignPoint> {
        self.build().design_point(runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_names() {
        assert_eq!("FORM".parse::<MethodKind>().unwrap(), MethodKind::Form);
        assert_eq!(
            "directional-sampling".parse::<MethodKind>().unwrap(),
            MethodKind::DirectionalSampling
        );
        assert_eq!("MC".parse::<MethodKind>().unwrap(), MethodKind::CrudeMonteCarlo);
        assert_eq!(
            "Numerical_Integration".parse::<MethodKind>().unwrap(),
            MethodKind::NumericalIntegration
        );
    }

    #[test]
    fn test_unknown_method() {
        let err = "subset_simulation".parse::<MethodKind>().unwrap_err();
        assert_eq!(
            err,
            ReliabilityError::UnknownMethod("subset_simulation".to_string())
        );
    }

    #[test]
    fn test_names_round_trip() {
        for kind in MethodKind::ALL {
            assert_eq!(kind.as_str().parse::<MethodKind>().unwrap(), kind);
            let settings = MethodSettings::default_for(kind);
            assert_eq!(settings.kind(), kind);
            assert!(settings.validate().is_ok());
        }
    }

    #[test]
    fn test_dispatch_names() {
        assert_eq!(MethodSettings::default().name(), "FORM");
        assert_eq!(
            MethodSettings::default_for(MethodKind::DirectionalSampling).name(),
            "Directional Sampling"
        );
    }

    #[test]
    fn test_set_seed() {
        let mut settings = MethodSettings::default_for(MethodKind::CrudeMonteCarlo);
        settings.set_seed(42);
        match settings {
            MethodSettings::CrudeMonteCarlo(s) => assert_eq!(s.seed, 42),
            _ => unreachable!(),
        }
    }
}
