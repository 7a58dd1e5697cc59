//! Parse-with-fallback decoding for loosely typed backend fields.
//!
//! Every decoder here is total: it always yields a usable value, and reports
//! whether that value was actually decoded or is the fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Why a field fell back to its default.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The payload was not valid JSON for the target type.
    #[error("malformed JSON: {0}")]
    Json(String),

    /// The field held a JSON type the decoder does not accept.
    #[error("unexpected value type: {0}")]
    UnexpectedType(String),

    /// A numeric field could not be read as a number.
    #[error("not a number: {0}")]
    NotANumber(String),

    /// A timestamp field could not be read.
    #[error("unrecognized timestamp: {0}")]
    Timestamp(String),
}

/// Result of a parse-with-fallback decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The input decoded cleanly.
    Parsed(T),
    /// The input was malformed; `value` is the fallback.
    Fallback { value: T, error: ParseError },
}

impl<T> Decoded<T> {
    /// The decoded value or the fallback.
    pub fn into_inner(self) -> T {
        match self {
            Decoded::Parsed(value) | Decoded::Fallback { value, .. } => value,
        }
    }

    /// Borrow the value regardless of outcome.
    pub fn value(&self) -> &T {
        match self {
            Decoded::Parsed(value) | Decoded::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decoded::Fallback { .. })
    }

    /// The parse error, if the fallback was used.
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Decoded::Parsed(_) => None,
            Decoded::Fallback { error, .. } => Some(error),
        }
    }

    /// Transform the carried value, keeping the outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Parsed(value) => Decoded::Parsed(f(value)),
            Decoded::Fallback { value, error } => Decoded::Fallback {
                value: f(value),
                error,
            },
        }
    }
}

/// Decode a JSON string, falling back to `T::default()` on failure.
///
/// ```
/// use course_commerce::parse::parse_with_fallback;
/// let list: Vec<String> = parse_with_fallback("not json").into_inner();
/// assert!(list.is_empty());
/// ```
pub fn parse_with_fallback<T: DeserializeOwned + Default>(raw: &str) -> Decoded<T> {
    match serde_json::from_str::<T>(raw) {
        Ok(value) => Decoded::Parsed(value),
        Err(e) => Decoded::Fallback {
            value: T::default(),
            error: ParseError::Json(e.to_string()),
        },
    }
}

/// Decode a JSON value that may itself be a JSON-encoded string.
///
/// `null` decodes to the default without being treated as an error.
pub fn decode_embedded<T: DeserializeOwned + Default>(value: &Value) -> Decoded<T> {
    match value {
        Value::Null => Decoded::Parsed(T::default()),
        Value::String(raw) if raw.trim().is_empty() => Decoded::Parsed(T::default()),
        Value::String(raw) => parse_with_fallback(raw),
        other => match serde_json::from_value::<T>(other.clone()) {
            Ok(value) => Decoded::Parsed(value),
            Err(e) => Decoded::Fallback {
                value: T::default(),
                error: ParseError::Json(e.to_string()),
            },
        },
    }
}

/// Read a decimal from a JSON number or numeric string.
///
/// `null` and a missing value decode to `None`. Anything else that is not
/// numeric falls back to `None` with an error.
pub fn decimal_from_value(value: &Value) -> Decoded<Option<f64>> {
    match value {
        Value::Null => Decoded::Parsed(None),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Decoded::Parsed(Some(f)),
            _ => Decoded::Fallback {
                value: None,
                error: ParseError::NotANumber(n.to_string()),
            },
        },
        Value::String(s) if s.trim().is_empty() => Decoded::Parsed(None),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Decoded::Parsed(Some(f)),
            _ => Decoded::Fallback {
                value: None,
                error: ParseError::NotANumber(s.clone()),
            },
        },
        other => Decoded::Fallback {
            value: None,
            error: ParseError::UnexpectedType(other.to_string()),
        },
    }
}

/// Read a flag from a JSON bool, `0`/`1`, or `"true"`/`"false"`/`"1"`/`"0"`.
pub fn flag_from_value(value: &Value) -> Decoded<bool> {
    match value {
        Value::Null => Decoded::Parsed(false),
        Value::Bool(b) => Decoded::Parsed(*b),
        Value::Number(n) => Decoded::Parsed(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Decoded::Parsed(true),
            "false" | "0" | "no" | "" => Decoded::Parsed(false),
            _ => Decoded::Fallback {
                value: false,
                error: ParseError::UnexpectedType(s.clone()),
            },
        },
        other => Decoded::Fallback {
            value: false,
            error: ParseError::UnexpectedType(other.to_string()),
        },
    }
}

/// Which end of a window a timestamp bounds. Date-only values cover the whole
/// day, so an end bound resolves to the last second of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Start,
    End,
}

/// Parse a backend timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), or a
/// bare `YYYY-MM-DD`.
pub fn timestamp_from_str(raw: &str, side: BoundSide) -> Result<DateTime<Utc>, ParseError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = match side {
            BoundSide::Start => date.and_hms_opt(0, 0, 0),
            BoundSide::End => date.and_hms_opt(23, 59, 59),
        };
        if let Some(naive) = time {
            return Ok(naive.and_utc());
        }
    }
    Err(ParseError::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_parse_with_fallback_success() {
        let decoded: Decoded<Vec<u32>> = parse_with_fallback("[1,2,3]");
        assert!(!decoded.is_fallback());
        assert_eq!(decoded.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_with_fallback_failure_reports_error() {
        let decoded: Decoded<HashMap<String, bool>> = parse_with_fallback("{broken");
        assert!(decoded.is_fallback());
        assert!(matches!(decoded.error(), Some(ParseError::Json(_))));
        assert!(decoded.into_inner().is_empty());
    }

    #[test]
    fn test_decode_embedded_string() {
        let value = json!("{\"all_courses_access\": true}");
        let decoded: Decoded<HashMap<String, bool>> = decode_embedded(&value);
        assert_eq!(decoded.into_inner().get("all_courses_access"), Some(&true));
    }

    #[test]
    fn test_decode_embedded_null_is_not_an_error() {
        let decoded: Decoded<HashMap<String, bool>> = decode_embedded(&Value::Null);
        assert!(!decoded.is_fallback());
    }

    #[test]
    fn test_decimal_from_value() {
        assert_eq!(decimal_from_value(&json!(49.99)).into_inner(), Some(49.99));
        assert_eq!(decimal_from_value(&json!("12.50")).into_inner(), Some(12.5));
        assert_eq!(decimal_from_value(&Value::Null).into_inner(), None);

        let bad = decimal_from_value(&json!("abc"));
        assert!(bad.is_fallback());
        assert_eq!(bad.into_inner(), None);
    }

    #[test]
    fn test_flag_from_value() {
        assert!(flag_from_value(&json!(true)).into_inner());
        assert!(flag_from_value(&json!(1)).into_inner());
        assert!(flag_from_value(&json!("1")).into_inner());
        assert!(!flag_from_value(&json!(0)).into_inner());
        assert!(!flag_from_value(&Value::Null).into_inner());
        assert!(flag_from_value(&json!("maybe")).is_fallback());
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = timestamp_from_str("2026-03-01T10:00:00Z", BoundSide::Start).unwrap();
        let sql = timestamp_from_str("2026-03-01 10:00:00", BoundSide::Start).unwrap();
        assert_eq!(rfc, sql);

        let end = timestamp_from_str("2026-03-01", BoundSide::End).unwrap();
        assert_eq!(end.to_rfc3339(), "2026-03-01T23:59:59+00:00");

        assert!(timestamp_from_str("next tuesday", BoundSide::Start).is_err());
    }
}
