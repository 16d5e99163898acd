//! Number formatting and parsing shared by the layout engine and the codec.

/// Format a number with the shortest text that parses back to the same `f64`.
///
/// Rust's `Display` for `f64` never uses exponent notation and drops a
/// trailing `.0`, so `1.0` becomes `"1"` and `2.50` becomes `"2.5"`.
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        // Collapses -0.0 as well.
        return "0".to_string();
    }
    format!("{v}")
}

/// Format a number with a fixed number of decimals, then drop trailing zeros.
pub fn format_fixed(v: f64, decimals: usize) -> String {
    let text = format!("{v:.decimals$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" { "0".to_string() } else { text }
}

/// Count digits after the decimal point of formatted number text.
pub fn fraction_digits(text: &str) -> usize {
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

/// Parse a finite `f64`, returning `None` for blank, invalid or non-finite text.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when the text is empty after trimming.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_formatting() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(2.5), "2.5");
        assert_eq!(format_numeric(-0.0), "0");
        assert_eq!(format_numeric(0.1), "0.1");
    }

    #[test]
    fn shortest_formatting_round_trips() {
        for v in [0.1 + 0.2, 1.0 / 3.0, 123_456.789, -7.25e-5] {
            let text = format_numeric(v);
            assert_eq!(text.parse::<f64>().unwrap(), v);
        }
    }

    #[test]
    fn fixed_formatting() {
        assert_eq!(format_fixed(1.23456, 2), "1.23");
        assert_eq!(format_fixed(1.5, 3), "1.5");
        assert_eq!(format_fixed(2.0, 4), "2");
        assert_eq!(format_fixed(100.0, 0), "100");
        assert_eq!(format_fixed(-0.0001, 2), "0");
    }

    #[test]
    fn counts_fraction_digits() {
        assert_eq!(fraction_digits("12"), 0);
        assert_eq!(fraction_digits("1.250"), 3);
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_f64(" 4.5 "), Some(4.5));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("abc"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("NaN"), None);
    }
}
