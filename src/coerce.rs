// Safe conversions from raw query values.
//
// Nothing in here fails: dirty or missing input resolves to the caller's
// default so a single bad cell never breaks a whole report.
use crate::util::{parse_f64_safe, parse_i64_safe};
use crate::value::Value;

/// Numeric view of a value, or `None` when it has no sensible number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(x) if x.is_finite() => Some(*x),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => parse_f64_safe(Some(s.as_str())),
        _ => None,
    }
}

/// Integer view of a value, truncating toward zero.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Text(s) => parse_i64_safe(Some(s.as_str()))
            .or_else(|| truncate(parse_f64_safe(Some(s.as_str()))?)),
        other => truncate(as_number(other)?),
    }
}

fn truncate(x: f64) -> Option<i64> {
    let t = x.trunc();
    if t >= i64::MIN as f64 && t <= i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

pub fn to_number(value: &Value, default: f64) -> f64 {
    as_number(value).unwrap_or(default)
}

pub fn to_integer(value: &Value, default: i64) -> i64 {
    as_integer(value).unwrap_or(default)
}

/// `YYYY-MM-DD` for date-like values, the plain string form for anything
/// else, `None` for null.
pub fn format_date(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Some(dt.date().format("%Y-%m-%d").to_string()),
        other => Some(other.to_string()),
    }
}

/// Grouping key for a value. Null and blank text have no key.
pub fn to_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) if s.trim().is_empty() => None,
        Value::Date(_) | Value::DateTime(_) => format_date(value),
        other => Some(other.to_string()),
    }
}

/// Round half away from zero to `decimals` places.
///
/// Only used when a metric is written into a report.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
