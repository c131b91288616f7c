//! Cent rounding helpers shared by the tax, debt and projection code

/// Balances with a magnitude below this are treated as exactly zero
pub const ZERO_EPSILON: f64 = 0.005;

/// Round a dollar amount to cents (half away from zero)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Snap floating residue to exactly zero
pub fn clamp_near_zero(value: f64, epsilon: f64) -> f64 {
    if value.abs() < epsilon {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235001), 1.24);
        assert_eq!(round2(-2.499), -2.5);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_clamp_near_zero() {
        assert_eq!(clamp_near_zero(0.004, ZERO_EPSILON), 0.0);
        assert_eq!(clamp_near_zero(-0.0049, ZERO_EPSILON), 0.0);
        assert_eq!(clamp_near_zero(0.005, ZERO_EPSILON), 0.005);
        assert_eq!(clamp_near_zero(-12.5, ZERO_EPSILON), -12.5);
    }
}
