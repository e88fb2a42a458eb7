// 3rd party imports
use polars::prelude::AnyValue;
use serde_json::{Number, Value as JsonValue};

/// Parses a float, accepting `inf`, `-inf`, `infinity` and `nan` in any case.
///
/// # Arguments
/// * `raw` - Text to parse, surrounding whitespace is ignored
///
pub fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => trimmed.parse::<f64>().ok(),
    }
}

/// Formats a float the way tabular tools print them, e.g. `5.0`, `7.545`, `inf`.
///
/// # Arguments
/// * `value` - Float to format
///
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        }
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Text of a cell, `None` for null. Strings are not quoted, floats use [format_float].
///
/// # Arguments
/// * `value` - Cell value
///
pub fn format_any_value(value: &AnyValue) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(text) => Some(text.to_string()),
        AnyValue::StringOwned(text) => Some(text.to_string()),
        AnyValue::Float32(float) => Some(format_float(*float as f64)),
        AnyValue::Float64(float) => Some(format_float(*float)),
        other => Some(other.to_string()),
    }
}

/// JSON representation of a cell. Non-finite floats become strings (`"inf"`, `"NaN"`)
/// as JSON has no representation for them.
///
/// # Arguments
/// * `value` - Cell value
///
pub fn any_value_to_json(value: &AnyValue) -> JsonValue {
    match value {
        AnyValue::Null => JsonValue::Null,
        AnyValue::Boolean(flag) => JsonValue::Bool(*flag),
        AnyValue::String(text) => JsonValue::String(text.to_string()),
        AnyValue::StringOwned(text) => JsonValue::String(text.to_string()),
        AnyValue::Float32(_) | AnyValue::Float64(_) => match value.extract::<f64>() {
            Some(float) => match Number::from_f64(float) {
                Some(number) => JsonValue::Number(number),
                None => JsonValue::String(format_float(float)),
            },
            None => JsonValue::Null,
        },
        other => match other.extract::<i64>() {
            Some(integer) => JsonValue::from(integer),
            None => JsonValue::String(other.to_string()),
        },
    }
}

/// Numeric value of a JSON scalar, strings are parsed with [parse_float]
///
pub fn json_to_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => parse_float(text),
        JsonValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Text of a JSON scalar as it would appear in a table cell
///
pub fn json_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(number) => match number.as_i64() {
            Some(integer) => Some(integer.to_string()),
            None => number.as_f64().map(format_float),
        },
        JsonValue::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use serde_json::json;

    // internal imports
    use super::*;

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(" 30.5 "), Some(30.5));
        assert_eq!(parse_float("Inf"), Some(f64::INFINITY));
        assert_eq!(parse_float("-infinity"), Some(f64::NEG_INFINITY));
        assert!(parse_float("nan").unwrap().is_nan());
        assert_eq!(parse_float("15s"), None);
        assert_eq!(parse_float(""), None);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(30.0), "30.0");
        assert_eq!(format_float(7.545), "7.545");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn test_format_any_value() {
        assert_eq!(format_any_value(&AnyValue::Null), None);
        assert_eq!(format_any_value(&AnyValue::Int64(3)), Some("3".to_string()));
        assert_eq!(
            format_any_value(&AnyValue::Float64(5.0)),
            Some("5.0".to_string())
        );
        assert_eq!(
            format_any_value(&AnyValue::String("SecB WT apo")),
            Some("SecB WT apo".to_string())
        );
    }

    #[test]
    fn test_any_value_to_json() {
        assert_eq!(any_value_to_json(&AnyValue::Int64(10)), json!(10));
        assert_eq!(any_value_to_json(&AnyValue::Float64(0.5)), json!(0.5));
        assert_eq!(
            any_value_to_json(&AnyValue::Float64(f64::INFINITY)),
            json!("inf")
        );
        assert_eq!(any_value_to_json(&AnyValue::Null), JsonValue::Null);
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(json_to_f64(&json!("inf")), Some(f64::INFINITY));
        assert_eq!(json_to_f64(&json!(3)), Some(3.0));
        assert_eq!(json_to_f64(&json!("apo")), None);
        assert_eq!(json_to_string(&json!(3)), Some("3".to_string()));
        assert_eq!(json_to_string(&json!(30.0)), Some("30.0".to_string()));
        assert_eq!(json_to_string(&JsonValue::Null), None);
    }
}
