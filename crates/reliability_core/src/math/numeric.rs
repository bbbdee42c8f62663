//! Small numeric helpers shared by the methods and combiners.

/// Sign that dominates a set of values, as `1.0` or `-1.0`.
///
/// - one value: its own sign
/// - two values: the sign of the one with the larger magnitude
/// - more values: positive when the squares of the positive values sum to at
///   least the squares of the negative values
///
/// Ties resolve to positive. An empty slice is positive.
///
/// # Examples
/// ```
/// use reliability_core::math::numeric::prevailing_sign;
///
/// assert_eq!(prevailing_sign(&[-0.2]), -1.0);
/// assert_eq!(prevailing_sign(&[0.3, -0.5]), -1.0);
/// assert_eq!(prevailing_sign(&[0.6, -0.5, -0.3]), 1.0);
/// ```
pub fn prevailing_sign(values: &[f64]) -> f64 {
    let sign = |positive: bool| if positive { 1.0 } else { -1.0 };
    match values {
        [] => 1.0,
        [single] => sign(*single >= 0.0),
        [first, second] => {
            if first.abs() == second.abs() {
                sign(*first >= 0.0 || *second >= 0.0)
            } else if first.abs() > second.abs() {
                sign(*first >= 0.0)
            } else {
                sign(*second >= 0.0)
            }
        }
        _ => {
            let (positive, negative) = values.iter().fold((0.0, 0.0), |(p, n), &v| {
                if v >= 0.0 {
                    (p + v * v, n)
                } else {
                    (p, n + v * v)
                }
            });
            sign(positive >= negative)
        }
    }
}

/// Linear interpolation through `(x0, y0)` and `(x1, y1)`, evaluated at `x`.
///
/// Coinciding abscissae return `y0`.
#[inline]
pub fn interpolate(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if x1 == x0 {
        y0
    } else {
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Abscissa where the line through `(x0, y0)` and `(x1, y1)` crosses zero.
///
/// Returns `None` for a horizontal line.
#[inline]
pub fn linear_root(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<f64> {
    if y1 == y0 {
        None
    } else {
        Some(x0 - y0 * (x1 - x0) / (y1 - y0))
    }
}

/// Piecewise linear interpolation in a table sorted by ascending `xs`,
/// with flat extrapolation outside the table.
///
/// Returns NaN for an empty table.
pub fn interpolate_table(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let upper = xs[..n].partition_point(|&v| v <= x);
    let lower = upper - 1;
    interpolate(x, xs[lower], ys[lower], xs[upper], ys[upper])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_prevailing_sign_single() {
        assert_eq!(prevailing_sign(&[2.0]), 1.0);
        assert_eq!(prevailing_sign(&[0.0]), 1.0);
        assert_eq!(prevailing_sign(&[-1e-9]), -1.0);
    }

    #[test]
    fn test_prevailing_sign_pair_tie_is_positive() {
        assert_eq!(prevailing_sign(&[-0.5, 0.5]), 1.0);
        assert_eq!(prevailing_sign(&[0.5, -0.5]), 1.0);
        assert_eq!(prevailing_sign(&[-0.5, -0.5]), -1.0);
    }

    #[test]
    fn test_prevailing_sign_sum_of_squares() {
        // 1 vs 4 * 0.25: tie resolves positive
        assert_eq!(prevailing_sign(&[1.0, -0.5, -0.5, -0.5, -0.5]), 1.0);
        assert_eq!(prevailing_sign(&[1.0, -0.5, -0.5, -0.5, -0.75]), -1.0);
        assert_eq!(prevailing_sign(&[0.1, 0.2, -0.9]), -1.0);
    }

    #[test]
    fn test_interpolate() {
        assert_abs_diff_eq!(interpolate(1.5, 1.0, 2.0, 2.0, 4.0), 3.0);
        assert_abs_diff_eq!(interpolate(3.0, 1.0, 2.0, 1.0, 4.0), 2.0);
    }

    #[test]
    fn test_linear_root() {
        assert_abs_diff_eq!(linear_root(0.0, 2.0, 1.0, -2.0).unwrap(), 0.5);
        assert!(linear_root(0.0, 1.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_interpolate_table_flat_extrapolation() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [3.0, 2.0, 0.0];
        assert_abs_diff_eq!(interpolate_table(-5.0, &xs, &ys), 3.0);
        assert_abs_diff_eq!(interpolate_table(0.5, &xs, &ys), 2.5);
        assert_abs_diff_eq!(interpolate_table(1.0, &xs, &ys), 2.0);
        assert_abs_diff_eq!(interpolate_table(1.75, &xs, &ys), 0.5);
        assert_abs_diff_eq!(interpolate_table(9.0, &xs, &ys), 0.0);
        assert!(interpolate_table(0.0, &[], &[]).is_nan());
    }
}
