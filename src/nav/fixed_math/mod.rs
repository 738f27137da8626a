//! Deterministic fixed-point arithmetic for path costs.
//!
//! Costs, heuristic estimates and search thresholds all use the same
//! fixed-point type so that threshold comparisons are exact and a search
//! produces identical results on every platform.

use fixed::types::I48F16;

/// Fixed-point number type used for every cost in the search.
///
/// Uses I48F16 format: 48 bits for the integer part, 16 bits for the fractional part.
/// This provides a range of approximately ±140 trillion with a precision of ~0.000015.
pub type FixedNum = I48F16;

/// Convert a floating-point value (typically read from config) into a cost.
///
/// NaN maps to zero and out-of-range values saturate.
pub fn cost_from_f64(value: f64) -> FixedNum {
    if value.is_nan() {
        return FixedNum::ZERO;
    }
    FixedNum::saturating_from_num(value)
}
