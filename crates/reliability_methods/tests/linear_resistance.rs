//! Integration tests: every method on a linear resistance - load model.
//!
//! `Z = R − S` with `R ~ N(7, 1)` and `S ~ N(2, 1)` has the exact solution
//! `β = 5/√2`, `α = (1/√2, −1/√2)` and design point `x = (4.5, 4.5)`.

use approx::assert_abs_diff_eq;
use reliability_core::math::distributions::norm_cdf;
use reliability_core::stochast::{CorrelationMatrix, DistributedStochast, Stochast, UConverter};
use reliability_core::types::DesignPoint;
use reliability_methods::form::{Form, FormSettings, GradientType, StartMethod};
use reliability_methods::method::{MethodKind, MethodSettings, ReliabilityMethod};
use reliability_methods::model::{ModelRunner, RunSettings};
use reliability_methods::sampling::{
    CrudeMonteCarlo, CrudeMonteCarloSettings, DirectionalSampling, DirectionalSamplingSettings,
    ImportanceSampling, ImportanceSamplingSettings, NumericalIntegration,
    NumericalIntegrationSettings, SamplerKind,
};
use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::Arc;

const EXACT_BETA: f64 = 3.5355339059327378;

fn normal(name: &str, mean: f64) -> Arc<dyn Stochast> {
    Arc::new(DistributedStochast::normal(name, mean, 1.0).unwrap())
}

fn resistance_runner(resistance: f64, settings: RunSettings) -> ModelRunner {
    let converter = UConverter::independent(vec![normal("R", resistance), normal("S", 2.0)]);
    ModelRunner::new(|x: &[f64]| x[0] - x[1], converter, settings).unwrap()
}

fn runner() -> ModelRunner {
    resistance_runner(7.0, RunSettings::default())
}

fn assert_unit_alpha(dp: &DesignPoint) {
    assert_abs_diff_eq!(dp.alpha_sum_of_squares(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_form() {
    let dp = Form::default().design_point(&runner()).unwrap();

    assert!(dp.convergence_report.is_converged);
    assert_abs_diff_eq!(dp.beta, EXACT_BETA, epsilon = 1e-3);
    assert_abs_diff_eq!(dp.alphas[0].alpha, FRAC_1_SQRT_2, epsilon = 1e-6);
    assert_abs_diff_eq!(dp.alphas[1].alpha, -FRAC_1_SQRT_2, epsilon = 1e-6);
    assert_abs_diff_eq!(dp.alphas[0].x, 4.5, epsilon = 1e-3);
    assert_abs_diff_eq!(dp.alphas[1].x, 4.5, epsilon = 1e-3);
    assert_unit_alpha(&dp);
    assert_eq!(dp.identifier, "FORM");
}

#[test]
fn test_form_with_start_point_searches() {
    for method in [
        StartMethod::RaySearch,
        StartMethod::SphereSearch,
        StartMethod::SensitivitySearch,
    ] {
        let mut settings = FormSettings::default();
        settings.start_point.method = method;
        settings.gradient.gradient_type = GradientType::TwoDirections;

        let dp = Form::new(settings).design_point(&runner()).unwrap();
        assert!(dp.convergence_report.is_converged, "{}", method);
        assert_abs_diff_eq!(dp.beta, EXACT_BETA, epsilon = 1e-3);
    }
}

#[test]
fn test_directional_sampling() {
    let settings = DirectionalSamplingSettings {
        minimum_samples: 2_000,
        maximum_samples: 10_000,
        ..Default::default()
    };
    let dp = DirectionalSampling::new(settings).design_point(&runner()).unwrap();

    assert!(dp.convergence_report.is_converged);
    assert_abs_diff_eq!(dp.beta, EXACT_BETA, epsilon = 0.06);
    assert_abs_diff_eq!(dp.alphas[0].alpha, FRAC_1_SQRT_2, epsilon = 0.02);
    assert_abs_diff_eq!(dp.alphas[1].alpha, -FRAC_1_SQRT_2, epsilon = 0.02);
    assert_unit_alpha(&dp);
    assert_eq!(dp.convergence_report.total_directions, 2_000);
}

#[test]
fn test_directional_sampling_is_reproducible() {
    let method = DirectionalSampling::new(DirectionalSamplingSettings {
        minimum_samples: 500,
        maximum_samples: 500,
        seed: 7,
        ..Default::default()
    });
    let first = method.design_point(&runner()).unwrap();
    let second = method.design_point(&runner()).unwrap();
    assert_eq!(first.beta, second.beta);
    assert_eq!(first.alpha_values(), second.alpha_values());
}

#[test]
fn test_crude_monte_carlo() {
    // R ~ N(4, 1): β = √2, large enough Pf for plain sampling
    let runner = resistance_runner(4.0, RunSettings::default());
    let settings = CrudeMonteCarloSettings {
        variation_coefficient: 0.02,
        ..Default::default()
    };
    let dp = CrudeMonteCarlo::new(settings).design_point(&runner).unwrap();

    assert!(dp.convergence_report.is_converged);
    assert_abs_diff_eq!(dp.beta, std::f64::consts::SQRT_2, epsilon = 0.06);
    assert!(dp.alphas[0].alpha > 0.0);
    assert!(dp.alphas[1].alpha < 0.0);
    assert_unit_alpha(&dp);
    assert_eq!(
        dp.convergence_report.total_model_runs,
        dp.convergence_report.total_iterations
    );
}

#[test]
fn test_crude_monte_carlo_with_sobol() {
    let runner = resistance_runner(4.0, RunSettings::default());
    let settings = CrudeMonteCarloSettings {
        minimum_samples: 20_000,
        maximum_samples: 20_000,
        sampler: SamplerKind::Sobol,
        ..Default::default()
    };
    let dp = CrudeMonteCarlo::new(settings).design_point(&runner).unwrap();
    assert_abs_diff_eq!(dp.beta, std::f64::consts::SQRT_2, epsilon = 0.05);
}

#[test]
fn test_importance_sampling_around_design_point() {
    let settings = ImportanceSamplingSettings {
        mean: vec![-2.5, 2.5],
        variation_coefficient: 0.05,
        ..Default::default()
    };
    let dp = ImportanceSampling::new(settings).design_point(&runner()).unwrap();

    assert!(dp.convergence_report.is_converged);
    assert_abs_diff_eq!(dp.beta, EXACT_BETA, epsilon = 0.06);
    assert_abs_diff_eq!(dp.alphas[0].alpha, FRAC_1_SQRT_2, epsilon = 0.15);
    assert_abs_diff_eq!(dp.alphas[1].alpha, -FRAC_1_SQRT_2, epsilon = 0.15);
}

#[test]
fn test_importance_sampling_mean_length_is_checked() {
    let settings = ImportanceSamplingSettings {
        mean: vec![1.0],
        ..Default::default()
    };
    assert!(ImportanceSampling::new(settings).design_point(&runner()).is_err());
}

#[test]
fn test_numerical_integration() {
    let runner = runner();
    let dp = NumericalIntegration::default().design_point(&runner).unwrap();

    assert!(dp.convergence_report.is_converged);
    assert_abs_diff_eq!(dp.beta, EXACT_BETA, epsilon = 0.02);
    assert_abs_diff_eq!(dp.alphas[0].alpha, FRAC_1_SQRT_2, epsilon = 0.02);
    assert_abs_diff_eq!(dp.alphas[1].alpha, -FRAC_1_SQRT_2, epsilon = 0.02);
    assert_eq!(runner.model_runs(), 40_000);
}

#[test]
fn test_numerical_integration_grid_limit() {
    let settings = NumericalIntegrationSettings {
        max_evaluations: 1_000,
        ..Default::default()
    };
    assert!(NumericalIntegration::new(settings)
        .design_point(&runner())
        .is_err());
}

#[test]
fn test_dispatch_by_name() {
    for name in ["form", "ds", "ni"] {
        let kind: MethodKind = name.parse().unwrap();
        let mut settings = MethodSettings::default_for(kind);
        if let MethodSettings::DirectionalSampling(s) = &mut settings {
            s.minimum_samples = 1_000;
        }
        let dp = settings.design_point(&runner()).unwrap();
        assert_abs_diff_eq!(dp.beta, EXACT_BETA, epsilon = 0.1);
    }
}

#[test]
fn test_deterministic_stochast_takes_no_part() {
    let converter = UConverter::independent(vec![
        normal("R", 5.0),
        Arc::new(DistributedStochast::deterministic("S", 2.0).unwrap()) as Arc<dyn Stochast>,
    ]);
    let runner =
        ModelRunner::new(|x: &[f64]| x[0] - x[1], converter, RunSettings::default()).unwrap();
    let dp = Form::default().design_point(&runner).unwrap();

    assert_abs_diff_eq!(dp.beta, 3.0, epsilon = 1e-3);
    assert_abs_diff_eq!(dp.alphas[0].alpha, 1.0, epsilon = 1e-9);
    assert_eq!(dp.alphas[1].alpha, 0.0);
    assert_eq!(dp.alphas[1].x, 2.0);
}

#[test]
fn test_correlated_load_and_resistance() {
    // Z = 6 − X1 − X2 with ρ = 0.5: Var(Z) = 3
    let stochasts = vec![normal("X1", 0.0), normal("X2", 0.0)];
    let mut correlation = CorrelationMatrix::new(2);
    correlation.set_correlation(0, 1, 0.5).unwrap();
    let converter = UConverter::new(stochasts, correlation).unwrap();
    let runner =
        ModelRunner::new(|x: &[f64]| 6.0 - x[0] - x[1], converter, RunSettings::default())
            .unwrap();

    let dp = Form::default().design_point(&runner).unwrap();
    assert_abs_diff_eq!(dp.beta, 6.0 / 3f64.sqrt(), epsilon = 1e-3);
    assert_unit_alpha(&dp);
    assert_abs_diff_eq!(dp.alphas[0].x, 3.0, epsilon = 1e-3);
    assert_abs_diff_eq!(dp.alphas[1].x, 3.0, epsilon = 1e-3);
    assert_abs_diff_eq!(
        dp.probability_of_failure(),
        norm_cdf(-6.0 / 3f64.sqrt()),
        epsilon = 1e-6
    );
}
