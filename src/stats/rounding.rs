//! Decimal rounding shared by every view.

/// Round `value` to `decimals` places, with halves rounded away from zero.
///
/// Non-finite input (for example from a zero divisor) rounds to 0.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid printing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Divide, returning 0 when `denominator` is 0.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
