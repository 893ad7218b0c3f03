// Utility helpers for numeric coercion and formatting.
//
// This module centralizes all the "dirty" cell/number handling so the rest
// of the code can assume clean, typed values.
use crate::grid::Cell;
use num_format::{Locale, ToFormattedString};

/// Coerce a cell into `f64` while being forgiving about formatting issues
/// that are common in KPI spreadsheet exports.
///
/// - Numeric cells pass through unchanged.
/// - Text is trimmed; thousands separators (`","`) and percent signs are
///   stripped before parsing.
/// - Values containing alphabetic characters are rejected so that strings
///   like `"nan"` or `"n/a"` become missing instead of parsing as floats.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v),
        Cell::Empty => None,
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if s.chars().any(|c| c.is_ascii_alphabetic()) {
                return None;
            }
            let s = s.replace(',', "").replace('%', "");
            s.parse::<f64>().ok()
        }
    }
}

/// Render a cell the way a header or category value should read: numbers
/// without a spurious `.0`, text as-is, empty cells as the empty string.
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(v) => {
            if v.fract() == 0.0 && v.abs() < 1e15 {
                format!("{}", *v as i64)
            } else {
                format!("{}", v)
            }
        }
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    // Non-finite values (NaN contributions from a zero denominator) are
    // rendered literally so they stay visible in exports.
    if !n.is_finite() {
        return format!("{}", n);
    }
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Like [`format_number`] but with an explicit leading sign, as used by the
/// narrative (`+1,234.56` / `-0.75`).
pub fn format_signed(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return format!("{}", n);
    }
    if n.is_sign_negative() {
        format_number(n, decimals)
    } else {
        format!("+{}", format_number(n, decimals))
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `12 tables scanned`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_strips_separators_and_percent() {
        assert_eq!(parse_numeric(&Cell::Text("1,234.5".into())), Some(1234.5));
        assert_eq!(parse_numeric(&Cell::Text(" -3.2% ".into())), Some(-3.2));
        assert_eq!(parse_numeric(&Cell::Number(7.0)), Some(7.0));
    }

    #[test]
    fn parse_numeric_rejects_text_and_blanks() {
        assert_eq!(parse_numeric(&Cell::Text("n/a".into())), None);
        assert_eq!(parse_numeric(&Cell::Text("nan".into())), None);
        assert_eq!(parse_numeric(&Cell::Text("   ".into())), None);
        assert_eq!(parse_numeric(&Cell::Empty), None);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 2), "-42.00");
        assert_eq!(format_number(f64::NAN, 2), "NaN");
    }

    #[test]
    fn format_signed_always_carries_a_sign() {
        assert_eq!(format_signed(20.0, 2), "+20.00");
        assert_eq!(format_signed(-10.5, 2), "-10.50");
    }

    #[test]
    fn cell_text_drops_integer_fraction() {
        assert_eq!(cell_text(&Cell::Number(2021.0)), "2021");
        assert_eq!(cell_text(&Cell::Number(0.25)), "0.25");
        assert_eq!(cell_text(&Cell::Text("Smartphone".into())), "Smartphone");
    }
}
