//! Normalization of free-form nutrient value strings.
//!
//! Nutrient fields are stored verbatim as the user typed them (or as the
//! lookup mapper formatted them), typically a leading decimal number followed
//! by a unit suffix like `"18.2g"`. Everything that needs a number out of one
//! of those strings goes through [`parse_leading_number`].

/// Extracts the leading decimal value from a nutrient string.
///
/// Accepts the longest prefix matching an optional sign, digits, and an
/// optional decimal point followed by more digits; any trailing unit text is
/// ignored. Returns 0.0 when no such prefix exists. This is a total function:
/// it never fails, whatever the input.
///
/// # Examples
///
/// ```
/// use smartplate::core::nutrition::parse_leading_number;
///
/// assert_eq!(parse_leading_number("18.2g"), 18.2);
/// assert_eq!(parse_leading_number("150mg"), 150.0);
/// assert_eq!(parse_leading_number("abc"), 0.0);
/// assert_eq!(parse_leading_number(""), 0.0);
/// ```
#[must_use]
pub fn parse_leading_number(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == int_start {
        // No digits at all; a bare sign or "." does not count.
        return 0.0;
    }

    // A decimal point is only part of the number if digits follow it,
    // so "12.g" parses as 12, not as a malformed "12.".
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            end = frac_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}

/// Coerces a calories input to a number at write time.
///
/// Same prefix rule as [`parse_leading_number`] but tolerant of surrounding
/// whitespace, since this path takes raw form input. Unparsable input becomes
/// 0.0 rather than an error; the meal log favors always-recordable entries
/// over rejecting imperfect input.
#[must_use]
pub fn coerce_calories(text: &str) -> f64 {
    parse_leading_number(text.trim())
}
