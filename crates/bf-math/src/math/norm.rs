//! Vector norms and the normalization noise floor.

/// Normalized magnitudes strictly below this are forced to exactly zero.
pub const NOISE_FLOOR: f64 = 0.1;

/// Euclidean norm sqrt(sum(v^2)).
///
/// Scales by the largest magnitude first so large components do not
/// overflow the sum of squares. Returns 0 for empty input and NaN if any
/// value is NaN.
pub fn euclidean_norm(values: &[f64]) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if max == 0.0 {
        return 0.0;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        let scaled = v / max;
        sum += scaled * scaled;
    }
    max * sum.sqrt()
}

/// Divide every value by `norm`.
///
/// A zero norm yields an all-zero vector instead of NaN.
pub fn scale_by_norm(values: &[f64], norm: f64) -> Vec<f64> {
    if norm == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / norm).collect()
}

/// Force values with |v| < [`NOISE_FLOOR`] to exactly zero.
///
/// This is a hard floor, not rounding: 0.1 survives unchanged, 0.0999 does not.
pub fn suppress_noise(value: f64) -> f64 {
    if value.abs() < NOISE_FLOOR {
        0.0
    } else {
        value
    }
}

/// Divide by `norm`, then apply the noise floor to each result.
pub fn scale_with_floor(values: &[f64], norm: f64) -> Vec<f64> {
    scale_by_norm(values, norm)
        .into_iter()
        .map(suppress_noise)
        .collect()
}
