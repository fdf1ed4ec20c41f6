use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

const NUMBER_ESCAPE_CHAR: &[char] = &[',', ' ', '"', '\n', '\u{a0}'];

/// 逗號只能是千分位，例︰"1,118.5825" 可以，"118,5825" 不行
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$").expect("NUMBER regex")
});

/// Parses an `f64` value from a given string.
///
/// Thousands separators and the characters in `NUMBER_ESCAPE_CHAR` are removed before
/// parsing, as well as any `escape_chars` supplied by the caller. Values that are not
/// finite are rejected.
///
/// # Example
///
/// ```
/// let value = parse_f64("1,118.5825", None).unwrap();
/// assert_eq!(value, 1118.5825);
/// ```
pub fn parse_f64(s: &str, escape_chars: Option<Vec<char>>) -> Result<f64> {
    let cleaned = clean_escape_chars(s, escape_chars);
    let value = f64::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as f64 because {:?}", cleaned, why))?;

    if !value.is_finite() {
        return Err(anyhow!("'{}' is not a finite number", cleaned));
    }

    Ok(value)
}

/// Returns the first whitespace separated token of `s` that holds a digit, e.g.
/// `"118.5825"` out of `"USD 118.5825"`.
///
/// The token must be a plain decimal number. Commas are accepted only as thousands
/// separators, so a decimal comma such as `118,5825` is an error instead of being read
/// as `1185825`.
pub fn extract_number(s: &str) -> Result<&str> {
    let token = s
        .split_whitespace()
        .find(|t| t.chars().any(|c| c.is_ascii_digit()))
        .ok_or_else(|| anyhow!("No number in '{}'", s))?;

    if NUMBER.is_match(token) {
        Ok(token)
    } else {
        Err(anyhow!("'{}' is not a decimal number in '{}'", token, s))
    }
}

/// Removes a set of escape characters from a given string.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}
