// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clamping and rounding shared by the calculators

/// Payback reported when savings never cover the cost
pub const NO_PAYBACK_YEARS: f64 = 99.0;

/// Negative and non-finite values become zero
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Whole units, truncated
pub fn whole(value: f64) -> f64 {
    non_negative(value).trunc()
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Clamp a score into `[0, max]`
pub fn clamp_score(score: f64, max: f64) -> f64 {
    non_negative(score).min(max)
}

/// Years until savings repay the cost, one decimal
///
/// Returns [`NO_PAYBACK_YEARS`] when savings are not positive.
pub fn payback_years(cost: f64, annual_savings: f64) -> f64 {
    if annual_savings.is_nan() || annual_savings <= 0.0 {
        return NO_PAYBACK_YEARS;
    }
    let years = round_to(non_negative(cost) / annual_savings, 1);
    if years.is_finite() {
        years
    } else {
        NO_PAYBACK_YEARS
    }
}

/// Accept a computed or parsed payback only when it is meaningful
pub fn sanitize_payback(years: f64) -> f64 {
    if years.is_finite() && years >= 0.0 {
        years
    } else {
        NO_PAYBACK_YEARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payback_sentinel() {
        assert_eq!(payback_years(1000.0, 0.0), NO_PAYBACK_YEARS);
        assert_eq!(payback_years(1000.0, -5.0), NO_PAYBACK_YEARS);
        assert_eq!(payback_years(1000.0, f64::NAN), NO_PAYBACK_YEARS);
        assert_eq!(payback_years(1000.0, 300.0), 3.3);
        assert_eq!(payback_years(0.0, 300.0), 0.0);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(non_negative(-3.0), 0.0);
        assert_eq!(non_negative(f64::INFINITY), 0.0);
        assert_eq!(whole(63174.04), 63174.0);
        assert_eq!(clamp_score(12.0, 10.0), 10.0);
        assert_eq!(round_to(0.125 * 3.0, 2), 0.38);
        assert_eq!(sanitize_payback(-1.0), NO_PAYBACK_YEARS);
    }
}
