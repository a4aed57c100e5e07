//! Per-field coercion rules
//!
//! Pure functions from a raw value (absent, null, scalar, or structured
//! timestamp) to a typed value. Defaulting rules never fail; only the ID rule
//! can refuse a value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use review_common::records::as_timestamp;
use serde_json::Value;

/// Formats tried in order before the ISO-8601 fallback
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];
const US_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M"];
const US_DATE_FORMATS: &[&str] = &["%m/%d/%Y"];

const ISO_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const ISO_OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Render a scalar as text; `None` for null, absent, arrays and objects
///
/// Structured timestamps render as `YYYY-MM-DD HH:MM:SS`.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    let value = value?;
    match value {
        Value::Null | Value::Array(_) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Object(_) => {
            as_timestamp(value).map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }
}

/// Upper-case the first letter of each word, lower-case the rest
///
/// Word characters are letters, digits and apostrophes, so `"o'neil"` stays
/// one word and `"winston-salem"` is two.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphanumeric() || c == '\'' {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Grouping-safe text: null stays null, otherwise trimmed and title-cased
pub fn normalize_text(value: Option<&Value>) -> Option<String> {
    scalar_text(value).map(|text| title_case(text.trim()))
}

/// Rating: numeric coercion, 0.0 for anything missing or invalid
pub fn coerce_rating(value: Option<&Value>) -> f64 {
    let rating = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    rating.filter(|r| r.is_finite()).unwrap_or(0.0)
}

/// Review count: integer coercion, 0 for anything missing or invalid
///
/// Finite floats truncate toward zero.
pub fn coerce_review_count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// Optional integer; `Err` when a present value is not integral
pub fn coerce_id(value: Option<&Value>) -> Result<Option<i64>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(Some(f as i64))
                }
                _ => Err(n.to_string()),
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed.parse::<i64>().map(Some).map_err(|_| s.clone())
            }
        }
        Some(other) => Err(other.to_string()),
    }
}

/// Timestamp from known formats, then ISO-8601; `None` if nothing matches
pub fn parse_timestamp(value: Option<&Value>) -> Option<NaiveDateTime> {
    let value = value?;
    if let Some(ts) = as_timestamp(value) {
        return Some(ts);
    }
    let text = value.as_str()?;
    if text.is_empty() {
        return None;
    }

    parse_datetime(text, DATETIME_FORMATS)
        .or_else(|| parse_date(text, DATE_FORMATS))
        .or_else(|| parse_datetime(text, US_DATETIME_FORMATS))
        .or_else(|| parse_date(text, US_DATE_FORMATS))
        .or_else(|| parse_iso8601(text))
}

fn parse_datetime(text: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn parse_date(text: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// ISO-8601 fallback; offsets are converted to UTC and dropped
fn parse_iso8601(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = ISO_OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.naive_utc());
    }
    parse_datetime(text, ISO_NAIVE_FORMATS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("NEW YORK"), "New York");
        assert_eq!(title_case("st. louis"), "St. Louis");
        assert_eq!(title_case("winston-salem"), "Winston-Salem");
        assert_eq!(title_case("o'neil"), "O'neil");
        assert_eq!(title_case("3rd street"), "3rd Street");
        assert_eq!(title_case("münchen"), "München");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(Some(&json!(" new york "))), Some("New York".to_string()));
        assert_eq!(normalize_text(Some(&json!("NEW YORK"))), Some("New York".to_string()));
        assert_eq!(normalize_text(Some(&Value::Null)), None);
        assert_eq!(normalize_text(None), None);
        assert_eq!(normalize_text(Some(&json!("   "))), Some(String::new()));
        assert_eq!(normalize_text(Some(&json!(10001))), Some("10001".to_string()));
        assert_eq!(normalize_text(Some(&json!(true))), Some("True".to_string()));
    }

    #[test]
    fn test_coerce_rating() {
        assert_eq!(coerce_rating(Some(&json!(4.5))), 4.5);
        assert_eq!(coerce_rating(Some(&json!(4))), 4.0);
        assert_eq!(coerce_rating(Some(&json!("3.5"))), 3.5);
        assert_eq!(coerce_rating(Some(&json!(" 2 "))), 2.0);
        assert_eq!(coerce_rating(Some(&json!(""))), 0.0);
        assert_eq!(coerce_rating(Some(&json!("five"))), 0.0);
        assert_eq!(coerce_rating(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_rating(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_rating(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_rating(None), 0.0);
        assert_eq!(coerce_rating(Some(&json!(true))), 1.0);
    }

    #[test]
    fn test_coerce_review_count() {
        assert_eq!(coerce_review_count(Some(&json!(12))), 12);
        assert_eq!(coerce_review_count(Some(&json!("12"))), 12);
        assert_eq!(coerce_review_count(Some(&json!(" 7 "))), 7);
        assert_eq!(coerce_review_count(Some(&json!(3.7))), 3);
        assert_eq!(coerce_review_count(Some(&json!("3.7"))), 0);
        assert_eq!(coerce_review_count(Some(&json!("many"))), 0);
        assert_eq!(coerce_review_count(Some(&json!(""))), 0);
        assert_eq!(coerce_review_count(None), 0);
    }

    #[test]
    fn test_coerce_id() {
        assert_eq!(coerce_id(Some(&json!(42))), Ok(Some(42)));
        assert_eq!(coerce_id(Some(&json!(42.0))), Ok(Some(42)));
        assert_eq!(coerce_id(Some(&json!(" 42 "))), Ok(Some(42)));
        assert_eq!(coerce_id(Some(&json!(""))), Ok(None));
        assert_eq!(coerce_id(Some(&Value::Null)), Ok(None));
        assert_eq!(coerce_id(None), Ok(None));
        assert!(coerce_id(Some(&json!(4.5))).is_err());
        assert!(coerce_id(Some(&json!("abc"))).is_err());
        assert!(coerce_id(Some(&json!(true))).is_err());
    }

    #[test]
    fn test_parse_timestamp_known_formats() {
        assert_eq!(
            parse_timestamp(Some(&json!("2024-01-05 10:00:00"))),
            Some(ts(2024, 1, 5, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp(Some(&json!("2024-01-05"))),
            Some(ts(2024, 1, 5, 0, 0, 0))
        );
        assert_eq!(
            parse_timestamp(Some(&json!("01/05/2024 10:30"))),
            Some(ts(2024, 1, 5, 10, 30, 0))
        );
        assert_eq!(
            parse_timestamp(Some(&json!("1/5/2024"))),
            Some(ts(2024, 1, 5, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_iso_fallback() {
        assert_eq!(
            parse_timestamp(Some(&json!("2024-01-05T10:00:00"))),
            Some(ts(2024, 1, 5, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp(Some(&json!("2024-01-05T10:00:00Z"))),
            Some(ts(2024, 1, 5, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp(Some(&json!("2024-01-05T12:00:00+02:00"))),
            Some(ts(2024, 1, 5, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp(Some(&json!("2024-01-05 10:15"))),
            Some(ts(2024, 1, 5, 10, 15, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_failures_are_null() {
        assert_eq!(parse_timestamp(Some(&json!("not-a-date"))), None);
        assert_eq!(parse_timestamp(Some(&json!(""))), None);
        assert_eq!(parse_timestamp(Some(&json!(20240105))), None);
        assert_eq!(parse_timestamp(Some(&Value::Null)), None);
        assert_eq!(parse_timestamp(None), None);
    }

    #[test]
    fn test_parse_timestamp_structured_passthrough() {
        let value = json!({"$date": "2023-07-04T08:09:10"});
        assert_eq!(parse_timestamp(Some(&value)), Some(ts(2023, 7, 4, 8, 9, 10)));
    }
}
