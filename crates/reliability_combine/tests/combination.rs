//! Integration tests: system combination, length effect and fragility curves.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use reliability_combine::{
    CombinationType, DesignPointCombiner, FragilityCurve, FragilityCurveIntegration,
    FragilityIntegrationSettings, FragilityValue, Hohenbichler2Combiner, LengthEffect,
    SelfCorrelation, FRAGILITY_STOCHAST,
};
use reliability_core::math::distributions::{beta_from_probability, probability_from_beta};
use reliability_core::stochast::{DistributedStochast, Stochast};
use reliability_core::types::{DesignPoint, ReliabilityError, StochastPointAlpha};
use std::sync::Arc;

fn standard_normal(name: &str) -> Arc<dyn Stochast> {
    Arc::new(DistributedStochast::normal(name, 0.0, 1.0).unwrap())
}

fn design_point(beta: f64, alphas: &[(&Arc<dyn Stochast>, f64)]) -> DesignPoint {
    DesignPoint {
        identifier: "element".to_string(),
        beta,
        alphas: alphas
            .iter()
            .map(|&(stochast, alpha)| StochastPointAlpha {
                stochast: Arc::clone(stochast),
                alpha,
                alpha_correlated: alpha,
                u: -beta * alpha,
                x: -beta * alpha,
                influence_factor: alpha * alpha,
            })
            .collect(),
        ..Default::default()
    }
}

fn alpha_values(dp: &DesignPoint) -> Vec<f64> {
    dp.alphas.iter().map(|a| a.alpha).collect()
}

// ============================================================
// Hohenbichler
// ============================================================

#[test]
fn test_parallel_system_of_itself() {
    let r = standard_normal("r");
    let s = standard_normal("s");
    let element = design_point(3.0, &[(&r, 0.6), (&s, 0.8)]);

    let system = Hohenbichler2Combiner
        .combine(
            &[element.clone(), element],
            &SelfCorrelation::new(),
            CombinationType::And,
        )
        .unwrap();

    assert_abs_diff_eq!(system.beta, 3.0, epsilon = 1e-6);
    let alpha = alpha_values(&system);
    assert_abs_diff_eq!(alpha[0], 0.6, epsilon = 1e-4);
    assert_abs_diff_eq!(alpha[1], 0.8, epsilon = 1e-4);
    assert_eq!(system.contributing_design_points.len(), 2);
}

#[test]
fn test_independent_elements() {
    let a = standard_normal("a");
    let b = standard_normal("b");
    let first = design_point(2.5, &[(&a, 1.0)]);
    let second = design_point(3.0, &[(&b, -1.0)]);
    let (p1, p2) = (probability_from_beta(2.5), probability_from_beta(3.0));

    let points = [first, second];
    let series = Hohenbichler2Combiner
        .combine(&points, &SelfCorrelation::new(), CombinationType::Or)
        .unwrap();
    assert_abs_diff_eq!(
        series.probability_of_failure(),
        p1 + p2 - p1 * p2,
        epsilon = 1e-12
    );
    // the weaker element dominates
    let alpha = alpha_values(&series);
    assert!(alpha[0] > 0.0 && alpha[1] < 0.0);
    assert!(alpha[0].abs() > alpha[1].abs());

    let parallel = Hohenbichler2Combiner
        .combine(&points, &SelfCorrelation::new(), CombinationType::And)
        .unwrap();
    assert_abs_diff_eq!(parallel.beta, beta_from_probability(p1 * p2), epsilon = 1e-6);
    assert_abs_diff_eq!(parallel.alpha_sum_of_squares(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_zero_self_correlation_acts_as_independent() {
    let load = standard_normal("load");
    let element = design_point(2.0, &[(&load, 1.0)]);
    let correlation = SelfCorrelation::new().with(&load, 0.0).unwrap();

    let system = Hohenbichler2Combiner
        .combine(&[element.clone(), element], &correlation, CombinationType::And)
        .unwrap();

    let p = probability_from_beta(2.0);
    assert_abs_diff_eq!(system.beta, beta_from_probability(p * p), epsilon = 1e-6);
    assert_eq!(system.alphas.len(), 1);
    assert_abs_diff_eq!(system.alphas[0].alpha, 1.0, epsilon = 1e-9);
}

#[test]
fn test_single_design_point_is_returned() {
    let a = standard_normal("a");
    let element = design_point(1.5, &[(&a, -1.0)]);
    let system = Hohenbichler2Combiner
        .combine(&[element], &SelfCorrelation::new(), CombinationType::Or)
        .unwrap();
    assert_eq!(system.beta, 1.5);
    assert_eq!(system.identifier, "element");
}

#[test]
fn test_series_of_three() {
    let stochasts: Vec<_> = ["a", "b", "c"].iter().map(|n| standard_normal(n)).collect();
    let points: Vec<_> = stochasts.iter().map(|s| design_point(3.0, &[(s, 1.0)])).collect();
    let system = Hohenbichler2Combiner
        .combine(&points, &SelfCorrelation::new(), CombinationType::Or)
        .unwrap();

    let p = probability_from_beta(3.0);
    let exact = 1.0 - (1.0 - p).powi(3);
    assert_abs_diff_eq!(system.probability_of_failure(), exact, epsilon = 1e-10);
    assert_eq!(system.alphas.len(), 3);
}

proptest! {
    #[test]
    fn prop_combined_alphas_are_normalized(
        beta1 in 0.5f64..3.5,
        beta2 in 0.5f64..3.5,
        angle1 in 0.1f64..1.4,
        angle2 in 0.1f64..1.4,
        rho in 0.0f64..1.0,
        parallel in any::<bool>(),
    ) {
        let shared = standard_normal("shared");
        let a = standard_normal("a");
        let b = standard_normal("b");
        let first = design_point(beta1, &[(&shared, angle1.cos()), (&a, angle1.sin())]);
        let second = design_point(beta2, &[(&shared, angle2.cos()), (&b, angle2.sin())]);
        let correlation = SelfCorrelation::new().with(&shared, rho).unwrap();
        let combination = if parallel { CombinationType::And } else { CombinationType::Or };

        let system = Hohenbichler2Combiner
            .combine(&[first, second], &correlation, combination)
            .unwrap();
        prop_assert!((system.alpha_sum_of_squares() - 1.0).abs() < 1e-9);
        prop_assert_eq!(system.alphas.len(), 3);
    }
}

// ============================================================
// Length effect
// ============================================================

#[test]
fn test_length_effect_decreases_beta() {
    let r = standard_normal("r");
    let s = standard_normal("s");
    let section = design_point(4.0, &[(&r, 0.6), (&s, 0.8)]);
    let rho = [1.0, 0.5];
    let lengths = [200.0, 200.0];

    let betas: Vec<f64> = [0.0, 100.0, 1_000.0, 10_000.0]
        .iter()
        .map(|&l| {
            LengthEffect
                .upscale_length(&section, &rho, &lengths, l)
                .unwrap()
                .beta
        })
        .collect();

    assert_eq!(betas[0], 4.0);
    for pair in betas.windows(2) {
        assert!(pair[1] < pair[0], "{:?}", betas);
    }
}

#[test]
fn test_length_effect_alphas() {
    let r = standard_normal("r");
    let s = standard_normal("s");
    let section = design_point(4.0, &[(&r, 0.6), (&s, -0.8)]);

    let upscaled = LengthEffect
        .upscale_length(&section, &[1.0, 0.2], &[100.0, 100.0], 5_000.0)
        .unwrap();

    assert_abs_diff_eq!(upscaled.alpha_sum_of_squares(), 1.0, epsilon = 1e-9);
    assert!(upscaled.alphas[0].alpha > 0.0);
    assert!(upscaled.alphas[1].alpha < 0.0);
    assert_eq!(upscaled.contributing_design_points.len(), 1);
}

#[test]
fn test_fully_correlated_section_has_no_length_effect() {
    let r = standard_normal("r");
    let section = design_point(3.0, &[(&r, 1.0)]);
    let upscaled = LengthEffect
        .upscale_length(&section, &[1.0], &[50.0], 10_000.0)
        .unwrap();
    assert_eq!(upscaled.beta, 3.0);
}

#[test]
fn test_length_effect_dimension_mismatch() {
    let r = standard_normal("r");
    let section = design_point(3.0, &[(&r, 1.0)]);
    let result = LengthEffect.upscale_length(&section, &[0.5, 0.5], &[50.0], 100.0);
    assert!(matches!(result, Err(ReliabilityError::DimensionMismatch(_))));
}

// ============================================================
// Fragility curves
// ============================================================

#[test]
fn test_constant_fragility_curve() {
    let level = standard_normal("h");
    let curve = FragilityCurve::from_pairs(&[(-1.0, 2.0), (1.0, 2.0)]).unwrap();
    let dp = FragilityCurveIntegration
        .integrate(level, &curve, None, &FragilityIntegrationSettings::default())
        .unwrap();

    assert_abs_diff_eq!(dp.beta, 2.0, epsilon = 1e-6);
    assert_eq!(dp.alphas.len(), 2);
    assert_eq!(dp.alphas[1].stochast.name(), FRAGILITY_STOCHAST);
    assert_abs_diff_eq!(dp.alphas[0].alpha, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(dp.alphas[1].alpha, 1.0, epsilon = 1e-9);
}

#[test]
fn test_linear_fragility_curve() {
    // β(h) = 3 − h with h ~ N(0, 1): Z = 3 − h + u_f
    let level = standard_normal("h");
    let curve = FragilityCurve::from_pairs(&[(-10.0, 13.0), (10.0, -7.0)]).unwrap();
    let dp = FragilityCurveIntegration
        .integrate(level, &curve, None, &FragilityIntegrationSettings::default())
        .unwrap();

    let half = 0.5f64.sqrt();
    assert_abs_diff_eq!(dp.beta, 3.0 * half, epsilon = 1e-4);
    assert_abs_diff_eq!(dp.alphas[0].alpha, -half, epsilon = 1e-3);
    assert_abs_diff_eq!(dp.alphas[1].alpha, half, epsilon = 1e-3);
    // the design water level lies above the mean
    assert_abs_diff_eq!(dp.alphas[0].x, 1.5, epsilon = 1e-2);
}

#[test]
fn test_linear_fragility_curve_with_negative_beta() {
    // β(h) = −3 − h: failure is more likely than not, the alphas keep their sign
    let level = standard_normal("h");
    let curve = FragilityCurve::from_pairs(&[(-10.0, 7.0), (10.0, -13.0)]).unwrap();
    let dp = FragilityCurveIntegration
        .integrate(level, &curve, None, &FragilityIntegrationSettings::default())
        .unwrap();

    let half = 0.5f64.sqrt();
    assert_abs_diff_eq!(dp.beta, -3.0 * half, epsilon = 1e-4);
    assert_abs_diff_eq!(dp.alphas[0].alpha, -half, epsilon = 1e-3);
    assert_abs_diff_eq!(dp.alphas[1].alpha, half, epsilon = 1e-3);
    // u = −β·α puts the design water level below the mean
    assert_abs_diff_eq!(dp.alphas[0].x, -1.5, epsilon = 1e-2);
}

#[test]
fn test_normalizing_curve() {
    let level = standard_normal("h");
    let curve = FragilityCurve::from_pairs(&[(0.0, 2.0)]).unwrap();
    let normalizing = FragilityCurve::from_pairs(&[(0.0, 3.0)]).unwrap();
    let dp = FragilityCurveIntegration
        .integrate(
            level,
            &curve,
            Some(&normalizing),
            &FragilityIntegrationSettings::default(),
        )
        .unwrap();

    let pf = probability_from_beta(2.0) - probability_from_beta(3.0);
    assert_abs_diff_eq!(dp.probability_of_failure(), pf, epsilon = 1e-9);
    assert!(dp.alphas[1].alpha > 0.0);
}

#[test]
fn test_fragility_alphas_follow_conditional_design_points() {
    let level = standard_normal("h");
    let r = standard_normal("r");
    let s = standard_normal("s");
    let curve = FragilityCurve::new(vec![
        FragilityValue::from_design_point(-5.0, design_point(4.0, &[(&r, 0.6), (&s, 0.8)])),
        FragilityValue::from_design_point(5.0, design_point(1.0, &[(&r, 0.8), (&s, 0.6)])),
    ])
    .unwrap();

    let dp = FragilityCurveIntegration
        .integrate(
            Arc::clone(&level),
            &curve,
            None,
            &FragilityIntegrationSettings::default(),
        )
        .unwrap();

    let names: Vec<&str> = dp.alphas.iter().map(|a| a.stochast.name()).collect();
    assert_eq!(names, vec!["h", "r", "s"]);
    assert_abs_diff_eq!(dp.alpha_sum_of_squares(), 1.0, epsilon = 1e-9);
    assert!(dp.alphas[1].alpha > 0.0 && dp.alphas[2].alpha > 0.0);
    assert_eq!(dp.contributing_design_points.len(), 2);
}
