pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

/// Round to a fixed number of decimal places, half away from zero.
pub fn round_to(x: f64, places: u32) -> f64 {
    let pow10 = 10f64.powi(places as i32);
    (x * pow10).round() / pow10
}

/// Render a float the way catalog key derivation expects: shortest decimal
/// form with no trailing zeros (`3.14`, `-20.25`, `3`).
pub fn format_float(x: f64) -> String {
    format!("{}", x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 10), "");
    }

    #[test]
    fn test_truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("1234567890", 5), "12...");
    }

    #[test]
    fn test_round_to_two_places() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.71828, 2), 2.72);
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.125, 2), -0.13);
    }

    #[test]
    fn test_format_float_drops_trailing_zeros() {
        assert_eq!(format_float(10.5), "10.5");
        assert_eq!(format_float(-20.25), "-20.25");
        assert_eq!(format_float(3.0), "3");
    }
}
