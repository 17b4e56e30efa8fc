// Utility helpers for parsing, safe arithmetic and number rendering.
//
// This module centralizes the "dirty" spreadsheet number handling so the
// engine modules can assume clean `f64` values.
use num_format::{Locale, ToFormattedString};

/// Parse a spreadsheet cell into `f64` while being forgiving about the
/// formatting that ad platform exports produce.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for blanks, text, and anything non-finite (`"inf"`, `"NaN"`).
pub fn parse_f64_safe(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Same as [`parse_f64_safe`] but degrades to `0` for malformed input.
pub fn parse_f64_or_zero(s: &str) -> f64 {
    parse_f64_safe(s).unwrap_or(0.0)
}

/// Division that never produces NaN or infinity: a zero denominator yields `0`.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let v = numerator / denominator;
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    // Avoid rendering "-0.00".
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values such as
    // impression counts and row counts in console messages.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousands_separators() {
        assert_eq!(parse_f64_safe("1,234,567.5"), Some(1_234_567.5));
        assert_eq!(parse_f64_safe("  42 "), Some(42.0));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert_eq!(parse_f64_safe(""), None);
        assert_eq!(parse_f64_safe("   "), None);
        assert_eq!(parse_f64_safe("n/a"), None);
        assert_eq!(parse_f64_safe("inf"), None);
        assert_eq!(parse_f64_safe("NaN"), None);
        assert_eq!(parse_f64_or_zero("--"), 0.0);
    }

    #[test]
    fn safe_div_handles_zero_denominator() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
    }

    #[test]
    fn round2_rounds_and_clears_negative_zero() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(-2.005_1), -2.01);
        assert_eq!(round2(-0.001).to_string(), "0");
    }

    #[test]
    fn format_number_inserts_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_int(9855_i64), "9,855");
    }
}
