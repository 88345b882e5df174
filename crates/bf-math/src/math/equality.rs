//! Loose equality between phase magnitudes.

/// Values closer than this are equal regardless of scale.
pub const ABS_TOLERANCE: f64 = 0.1;

/// Positive values whose ratio (larger / smaller) is below this are equal.
pub const RATIO_TOLERANCE: f64 = 1.5;

/// Loose equality used by the BF-type rules.
///
/// `|a - b| < 0.1`, or both strictly positive with `max / min < 1.5`.
/// When `min(a, b) <= 0` only the absolute test applies.
pub fn is_equal(a: f64, b: f64) -> bool {
    if (a - b).abs() < ABS_TOLERANCE {
        return true;
    }
    let lo = a.min(b);
    let hi = a.max(b);
    lo > 0.0 && hi / lo < RATIO_TOLERANCE
}
