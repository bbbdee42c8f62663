//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`, `norm_pdf`, `norm_inv`: univariate standard normal
//! - `beta_from_probability`, `probability_from_beta`: the β ↔ Pf mapping
//! - `bivariate_norm_cdf`: Φ₂(x, y; ρ), needed to combine design points
//!
//! The error function and its inverse come from `statrs`, which keeps the
//! tail accuracy that reliability indices of 5 or more require.

use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{PI, SQRT_2};

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function Φ(x).
///
/// # Examples
/// ```
/// use reliability_core::math::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
/// assert!(norm_cdf(-3.0) < 0.01);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal probability density φ(x).
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse of the standard normal CDF.
///
/// Returns `-inf` for `p <= 0` and `+inf` for `p >= 1`.
///
/// # Examples
/// ```
/// use reliability_core::math::distributions::norm_inv;
///
/// assert!((norm_inv(0.975) - 1.959964).abs() < 1e-6);
/// ```
#[inline]
pub fn norm_inv(p: f64) -> f64 {
    if p.is_nan() {
        f64::NAN
    } else if p <= 0.0 {
        f64::NEG_INFINITY
    } else if p >= 1.0 {
        f64::INFINITY
    } else {
        -SQRT_2 * erfc_inv(2.0 * p)
    }
}

/// Reliability index for a failure probability: β = -Φ⁻¹(Pf).
#[inline]
pub fn beta_from_probability(probability_of_failure: f64) -> f64 {
    -norm_inv(probability_of_failure)
}

/// Failure probability for a reliability index: Pf = Φ(-β).
#[inline]
pub fn probability_from_beta(beta: f64) -> f64 {
    norm_cdf(-beta)
}

/// Gauss-Legendre abscissae (negative half) for 6, 12 and 20 points.
const GL_X: [&[f64]; 3] = [
    &[-0.932_469_514_203_152_2, -0.661_209_386_466_264_7, -0.238_619_186_083_197],
    &[
        -0.981_560_634_246_719_1,
        -0.904_117_256_370_475,
        -0.769_902_674_194_305,
        -0.587_317_954_286_617_1,
        -0.367_831_498_998_180_2,
        -0.125_233_408_511_469_2,
    ],
    &[
        -0.993_128_599_185_094_9,
        -0.963_971_927_277_913_8,
        -0.912_234_428_251_325_9,
        -0.839_116_971_822_218_8,
        -0.746_331_906_460_150_8,
        -0.636_053_680_726_515,
        -0.510_867_001_950_827_1,
        -0.373_706_088_715_419_6,
        -0.227_785_851_141_645_1,
        -0.076_526_521_133_497_33,
    ],
];

/// Gauss-Legendre weights matching [`GL_X`].
const GL_W: [&[f64]; 3] = [
    &[0.171_324_492_379_170_5, 0.360_761_573_048_138_4, 0.467_913_934_572_690_4],
    &[
        0.047_175_336_386_511_77,
        0.106_939_325_995_318_3,
        0.160_078_328_543_346_4,
        0.203_167_426_723_065_9,
        0.233_492_536_538_354_7,
        0.249_147_045_813_402_9,
    ],
    &[
        0.017_614_007_139_152_12,
        0.040_601_429_800_386_94,
        0.062_672_048_334_109_06,
        0.083_276_741_576_704_75,
        0.101_930_119_817_240_4,
        0.118_194_531_961_518_4,
        0.131_688_638_449_176_6,
        0.142_096_109_318_382_1,
        0.149_172_986_472_603_7,
        0.152_753_387_130_725_9,
    ],
];

/// Bivariate standard normal CDF Φ₂(x, y; ρ) = P(X ≤ x, Y ≤ y).
///
/// Genz's BVND algorithm (Drezner-Wesolowsky with Gauss-Legendre rules);
/// absolute accuracy around 1e-15. Exact limits are used for `|ρ| = 1`.
///
/// # Examples
/// ```
/// use reliability_core::math::distributions::{bivariate_norm_cdf, norm_cdf};
///
/// // independent variables
/// let p = bivariate_norm_cdf(0.3, -1.0, 0.0);
/// assert!((p - norm_cdf(0.3) * norm_cdf(-1.0)).abs() < 1e-12);
/// ```
pub fn bivariate_norm_cdf(x: f64, y: f64, rho: f64) -> f64 {
    let rho = rho.clamp(-1.0, 1.0);
    upper_bivariate(-x, -y, rho).clamp(0.0, 1.0)
}

/// P(X > h, Y > k) for correlation r.
fn upper_bivariate(h: f64, k: f64, r: f64) -> f64 {
    let rule = if r.abs() < 0.3 {
        0
    } else if r.abs() < 0.75 {
        1
    } else {
        2
    };
    let xs_nodes = GL_X[rule];
    let weights = GL_W[rule];
    let two_pi = 2.0 * PI;

    let mut k = k;
    let mut hk = h * k;
    let mut bvn = 0.0;

    if r.abs() < 0.925 {
        let hs = (h * h + k * k) / 2.0;
        let asr = r.asin();
        for (&node, &weight) in xs_nodes.iter().zip(weights) {
            let sn = (asr * (node + 1.0) / 2.0).sin();
            bvn += weight * ((sn * hk - hs) / (1.0 - sn * sn)).exp();
            let sn = (asr * (-node + 1.0) / 2.0).sin();
            bvn += weight * ((sn * hk - hs) / (1.0 - sn * sn)).exp();
        }
        return bvn * asr / (2.0 * two_pi) + norm_cdf(-h) * norm_cdf(-k);
    }

    if r < 0.0 {
        k = -k;
        hk = -hk;
    }

    if r.abs() < 1.0 {
        let a_s = (1.0 - r) * (1.0 + r);
        let mut a = a_s.sqrt();
        let bs = (h - k) * (h - k);
        let c = (4.0 - hk) / 8.0;
        let d = (12.0 - hk) / 16.0;

        bvn = a
            * (-(bs / a_s + hk) / 2.0).exp()
            * (1.0 - c * (bs - a_s) * (1.0 - d * bs / 5.0) / 3.0 + c * d * a_s * a_s / 5.0);
        if hk > -160.0 {
            let b = bs.sqrt();
            bvn -= (-hk / 2.0).exp()
                * two_pi.sqrt()
                * norm_cdf(-b / a)
                * b
                * (1.0 - c * bs * (1.0 - d * bs / 5.0) / 3.0);
        }

        a /= 2.0;
        for (&node, &weight) in xs_nodes.iter().zip(weights) {
            for sign in [1.0, -1.0] {
                let xs = (a * (sign * node + 1.0)).powi(2);
                let rs = (1.0 - xs).sqrt();
                let asr = -(bs / xs + hk) / 2.0;
                if asr > -100.0 {
                    bvn += a
                        * weight
                        * asr.exp()
                        * ((-hk * xs / (2.0 * (1.0 + rs).powi(2))).exp() / rs
                            - (1.0 + c * xs * (1.0 + d * xs)));
                }
            }
        }
        bvn = -bvn / two_pi;
    }

    if r > 0.0 {
        bvn + norm_cdf(-h.max(k))
    } else {
        let mut result = -bvn;
        if k > h {
            if h < 0.0 {
                result += norm_cdf(k) - norm_cdf(h);
            } else {
                result += norm_cdf(-h) - norm_cdf(-k);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0), 0.841_344_746_068_542_9, max_relative = 1e-10);
        assert_relative_eq!(norm_cdf(-2.0), 0.022_750_131_948_179_195, max_relative = 1e-10);
    }

    #[test]
    fn test_norm_cdf_deep_tail() {
        // Φ(-8) ≈ 6.22e-16, only reachable with an accurate erfc
        let p = norm_cdf(-8.0);
        assert_relative_eq!(p, 6.220_960_574_271_785e-16, max_relative = 1e-6);
    }

    #[test]
    fn test_norm_inv_roundtrip() {
        for p in [1e-10, 1e-4, 0.1, 0.5, 0.8, 0.999] {
            assert_relative_eq!(norm_cdf(norm_inv(p)), p, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_norm_inv_limits() {
        assert_eq!(norm_inv(0.0), f64::NEG_INFINITY);
        assert_eq!(norm_inv(1.0), f64::INFINITY);
        assert!(norm_inv(f64::NAN).is_nan());
    }

    #[test]
    fn test_beta_probability_mapping() {
        let beta = 3.5355;
        let pf = probability_from_beta(beta);
        assert_relative_eq!(beta_from_probability(pf), beta, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_pdf_peak() {
        assert_abs_diff_eq!(norm_pdf(0.0), FRAC_1_SQRT_2PI, epsilon = 1e-15);
    }

    #[test]
    fn test_bivariate_origin() {
        // Φ₂(0, 0; ρ) = 1/4 + asin(ρ) / (2π)
        for rho in [-0.95, -0.5, 0.0, 0.2, 0.6, 0.8, 0.95] {
            let expected = 0.25 + f64::asin(rho) / (2.0 * PI);
            assert_abs_diff_eq!(bivariate_norm_cdf(0.0, 0.0, rho), expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_bivariate_independent() {
        let p = bivariate_norm_cdf(-1.5, 0.7, 0.0);
        assert_abs_diff_eq!(p, norm_cdf(-1.5) * norm_cdf(0.7), epsilon = 1e-14);
    }

    #[test]
    fn test_bivariate_perfect_correlation() {
        assert_abs_diff_eq!(
            bivariate_norm_cdf(-1.0, 0.5, 1.0),
            norm_cdf(-1.0),
            epsilon = 1e-14
        );
        // ρ = -1: max(0, Φ(x) + Φ(y) - 1)
        assert_abs_diff_eq!(
            bivariate_norm_cdf(1.0, 0.5, -1.0),
            norm_cdf(1.0) + norm_cdf(0.5) - 1.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(bivariate_norm_cdf(-1.0, -0.5, -1.0), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_bivariate_symmetry() {
        let a = bivariate_norm_cdf(-2.0, -1.0, 0.85);
        let b = bivariate_norm_cdf(-1.0, -2.0, 0.85);
        assert_abs_diff_eq!(a, b, epsilon = 1e-14);
        assert!(a < norm_cdf(-2.0));
    }
}
