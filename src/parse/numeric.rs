//! Loose numeric extraction for human-formatted report values.

use crate::error::GateError;

/// Extracts an unsigned integer by discarding every non-digit character,
/// so `"1,024 entries"` yields `1024`.
///
/// Fails with `MalformedNumber` when the text holds no ASCII digit or the
/// digits overflow `u64`.
pub fn parse_integer_loose(text: &str) -> Result<u64, GateError> {
    let digits: String = text.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(GateError::malformed("integer", text.trim()));
    }

    digits
        .parse::<u64>()
        .map_err(|_| GateError::malformed("integer", text.trim()))
}

/// Extracts a non-negative real from values such as `"0.8 m"`, `"12cm"`,
/// `"3.5 %"` or `"1,25"`.
///
/// Unit suffixes and percent signs are dropped without conversion and a comma
/// decimal separator becomes a period. Fails with `MalformedNumber` when the
/// remainder does not parse, is not finite, or is negative.
pub fn parse_decimal_loose(text: &str) -> Result<f64, GateError> {
    let cleaned = text
        .trim()
        .replace(" m", "")
        .replace("cm", "")
        .replace(' ', "")
        .replace('%', "")
        .replace(',', ".");

    let value = cleaned
        .parse::<f64>()
        .map_err(|_| GateError::malformed("decimal", text.trim()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(GateError::malformed("decimal", text.trim()));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_keeps_only_digits() {
        assert_eq!(parse_integer_loose(" 42 ").unwrap(), 42);
        assert_eq!(parse_integer_loose("1,024 entries").unwrap(), 1024);
        assert_eq!(parse_integer_loose("n=7").unwrap(), 7);
    }

    #[test]
    fn integer_without_digits_is_malformed() {
        for text in ["", "   ", "n/a", "-"] {
            let error = parse_integer_loose(text).expect_err("no digits should fail");
            assert!(matches!(error, GateError::MalformedNumber { .. }));
        }
    }

    #[test]
    fn integer_overflow_is_malformed() {
        let error = parse_integer_loose("99999999999999999999999")
            .expect_err("overflow should fail");
        assert!(matches!(error, GateError::MalformedNumber { .. }));
    }

    #[test]
    fn decimal_strips_units_and_normalizes_separator() {
        assert_eq!(parse_decimal_loose("0.8 m").unwrap(), 0.8);
        assert_eq!(parse_decimal_loose(" 12.5cm ").unwrap(), 12.5);
        assert_eq!(parse_decimal_loose("3.25 %").unwrap(), 3.25);
        assert_eq!(parse_decimal_loose("1,5 m").unwrap(), 1.5);
        assert_eq!(parse_decimal_loose("2").unwrap(), 2.0);
    }

    #[test]
    fn decimal_rejects_non_numeric_remainder() {
        for text in ["", "n/a", "fast", "1.2.3", "NaN", "inf", "-0.5 m"] {
            let error = parse_decimal_loose(text)
                .expect_err(&format!("'{text}' should not parse"));
            assert!(matches!(error, GateError::MalformedNumber { .. }));
        }
    }
}
