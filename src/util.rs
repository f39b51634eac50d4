// Text and number helpers shared by the loaders, filters and outputs.
//
// Spreadsheet exports are full of stray newlines, double spaces and codes
// that went through a float column on the way out ("482.0"). Everything
// that compares text goes through one of the normalizers below.
use num_format::{Locale, ToFormattedString};

/// Collapse newlines, carriage returns and whitespace runs into single
/// spaces and trim the result.
///
/// Missing values normalize to the empty string. Applying it twice is the
/// same as applying it once.
pub fn normalize_cell(value: Option<&str>) -> String {
    match value {
        Some(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

/// Site codes are compared trimmed and uppercased.
pub fn normalize_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Chain codes are compared like site codes, minus one trailing `.0` left
/// behind by numeric-to-text export.
pub fn normalize_chain_code(value: &str) -> String {
    let code = normalize_code(value);
    match code.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => code,
    }
}

/// Parse a decimal number out of a text cell.
///
/// Returns `None` for blanks, anything `f64` cannot parse, and non-finite
/// results such as `inf` or `NaN`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with thousands separators, e.g. `1,234.57`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
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
    n.to_formatted_string(&Locale::en)
}
