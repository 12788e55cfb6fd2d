/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parse a cleaned cell as f64. Blank, non-numeric, NaN and ±inf all yield
/// `None`; zero is a real value and is kept.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Text that stands for "no value" once a missing cell has been stringified.
pub fn is_missing_text(raw: &str) -> bool {
    let cleaned = clean_str(raw);
    cleaned.is_empty()
        || ["nan", "none", "null"]
            .iter()
            .any(|m| cleaned.eq_ignore_ascii_case(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_quoted_numbers() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("\"55\""), Some(55.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn rejects_blank_malformed_and_non_finite() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12,5"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-infinity"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn missing_text_markers() {
        assert!(is_missing_text(""));
        assert!(is_missing_text("nan"));
        assert!(is_missing_text(" NaN "));
        assert!(is_missing_text("None"));
        assert!(!is_missing_text("Otimista"));
        assert!(!is_missing_text("0"));
    }
}
