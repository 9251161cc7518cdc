//! Number formatting shared by providers.

/// Round `value` to `places` decimals and drop trailing zeros.
///
/// `17.86` with one place renders as `17.9`; `20.0` renders as `20`.
pub fn format_decimal(value: f64, places: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let factor = 10f64.powi(places as i32);
    let mut rounded = (value * factor).round() / factor;
    // Avoid printing "-0".
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{rounded}")
}

/// Integer with `,` thousands separators (`1234567` -> `1,234,567`).
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_rounds_half_away_from_zero() {
        assert_eq!(format_decimal(17.86, 1), "17.9");
        assert_eq!(format_decimal(-3.25, 1), "-3.3");
        assert_eq!(format_decimal(0.04, 1), "0");
        assert_eq!(format_decimal(-0.04, 1), "0");
    }

    #[test]
    fn decimal_drops_trailing_zero() {
        assert_eq!(format_decimal(20.0, 1), "20");
        assert_eq!(format_decimal(19.999, 2), "20");
        assert_eq!(format_decimal(64.5, 1), "64.5");
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(500), "500");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-98765), "-98,765");
        assert_eq!(format_thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }
}
