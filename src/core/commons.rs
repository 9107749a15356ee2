// src/core/commons.rs

/// Wraps a string in quotes, escaping internal quotes.
pub fn wrap_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Formats a number the way scripts expect to read it back: `2` rather than `2.0`.
pub fn format_number(value: f64) -> String {
    // Avoid printing "-0".
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_value_escapes_quotes() {
        assert_eq!(wrap_value(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
