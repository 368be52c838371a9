//! Value conversions.
//!
//! Two flavours exist. Lenient casts back the `to*` conversion functions and
//! implicit widening: anything that can't be converted becomes null. Strict
//! coercion is used for datatable literals and errors on anything lossy.

use kestrel_error::{DbError, Result};
use serde_json::Value as JsonValue;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64};
use crate::arrays::builder::ArrayBuilder;
use crate::arrays::datatype::DataType;
use crate::arrays::executor::UnaryExecutor;
use crate::arrays::scalar::ScalarValue;
use crate::arrays::scalar::dynamic::parse_json_lenient;
use crate::arrays::scalar::temporal::{parse_datetime, parse_timespan};

/// Cast every value in the array to `to`.
pub fn cast_array(array: &Array, to: DataType) -> Result<Array> {
    let from = array.datatype();
    if from == to {
        return Ok(array.clone());
    }

    // Widening numeric casts are by far the most common, keep them on the
    // vectorized path.
    match (from, to) {
        (DataType::Int32, DataType::Int64) => {
            return UnaryExecutor::execute::<PhysicalI32, PhysicalI64, _>(array, to, |&v, buf| {
                buf.put(i64::from(v))
            });
        }
        (DataType::Int32, DataType::Float64) => {
            return UnaryExecutor::execute::<PhysicalI32, PhysicalF64, _>(array, to, |&v, buf| {
                buf.put(f64::from(v))
            });
        }
        (DataType::Int64, DataType::Float64) => {
            return UnaryExecutor::execute::<PhysicalI64, PhysicalF64, _>(array, to, |&v, buf| {
                buf.put(v as f64)
            });
        }
        _ => (),
    }

    let mut builder = ArrayBuilder::with_capacity(to, array.len());
    for value in array.iter_scalars() {
        builder.add(&cast_scalar(&value?, to))?;
    }
    Ok(builder.finish())
}

/// Lenient conversion of a single value, null when not convertible.
pub fn cast_scalar(value: &ScalarValue, to: DataType) -> ScalarValue {
    if value.datatype() == to {
        return value.clone();
    }
    if to == DataType::Utf8 {
        // Missing values render as the empty string.
        return ScalarValue::Utf8(Some(value.to_text()));
    }
    if value.is_null() {
        return ScalarValue::null(to);
    }

    match to {
        DataType::Boolean => ScalarValue::Boolean(to_bool(value)),
        DataType::Int32 => ScalarValue::Int32(to_i64(value).and_then(|v| i32::try_from(v).ok())),
        DataType::Int64 => ScalarValue::Int64(to_i64(value)),
        DataType::Float64 => ScalarValue::Float64(to_f64(value)),
        DataType::DateTime => ScalarValue::DateTime(to_datetime(value)),
        DataType::TimeSpan => ScalarValue::TimeSpan(to_timespan(value)),
        DataType::Dynamic => ScalarValue::Dynamic(to_json(value)),
        DataType::Utf8 => ScalarValue::Utf8(Some(value.to_text())),
    }
}

fn truncate_f64(v: f64) -> Option<i64> {
    if !v.is_finite() {
        return None;
    }
    let truncated = v.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

fn parse_i64(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn to_bool(value: &ScalarValue) -> Option<bool> {
    match value {
        ScalarValue::Boolean(v) => *v,
        ScalarValue::Int32(v) => v.map(|v| v != 0),
        ScalarValue::Int64(v) => v.map(|v| v != 0),
        ScalarValue::Float64(v) => v.map(|v| v != 0.0),
        ScalarValue::Utf8(v) => v.as_deref().and_then(parse_bool),
        ScalarValue::Dynamic(JsonValue::Bool(b)) => Some(*b),
        ScalarValue::Dynamic(JsonValue::Number(n)) => n.as_f64().map(|v| v != 0.0),
        ScalarValue::Dynamic(JsonValue::String(s)) => parse_bool(s),
        _ => None,
    }
}

fn to_i64(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::Boolean(v) => v.map(i64::from),
        ScalarValue::Int32(v) => v.map(i64::from),
        ScalarValue::Int64(v) | ScalarValue::DateTime(v) | ScalarValue::TimeSpan(v) => *v,
        ScalarValue::Float64(v) => v.and_then(truncate_f64),
        ScalarValue::Utf8(v) => v.as_deref().and_then(parse_i64),
        ScalarValue::Dynamic(JsonValue::Bool(b)) => Some(i64::from(*b)),
        ScalarValue::Dynamic(JsonValue::Number(n)) => {
            n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64))
        }
        ScalarValue::Dynamic(JsonValue::String(s)) => parse_i64(s),
        ScalarValue::Dynamic(_) => None,
    }
}

fn to_f64(value: &ScalarValue) -> Option<f64> {
    match value {
        ScalarValue::Boolean(v) => v.map(|b| if b { 1.0 } else { 0.0 }),
        ScalarValue::Int32(v) => v.map(f64::from),
        ScalarValue::Int64(v) | ScalarValue::DateTime(v) | ScalarValue::TimeSpan(v) => {
            v.map(|v| v as f64)
        }
        ScalarValue::Float64(v) => *v,
        ScalarValue::Utf8(v) => v.as_deref().and_then(parse_f64),
        ScalarValue::Dynamic(JsonValue::Number(n)) => n.as_f64(),
        ScalarValue::Dynamic(JsonValue::String(s)) => parse_f64(s),
        ScalarValue::Dynamic(_) => None,
    }
}

fn to_datetime(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::DateTime(v) => *v,
        ScalarValue::Utf8(v) => v.as_deref().and_then(parse_datetime),
        ScalarValue::Dynamic(JsonValue::String(s)) => parse_datetime(s),
        _ => None,
    }
}

fn to_timespan(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::TimeSpan(v) => *v,
        ScalarValue::Int32(v) => v.map(i64::from),
        ScalarValue::Int64(v) => *v,
        ScalarValue::Float64(v) => v.and_then(|v| truncate_f64(v.round())),
        ScalarValue::Utf8(v) => v.as_deref().and_then(parse_timespan),
        ScalarValue::Dynamic(JsonValue::String(s)) => parse_timespan(s),
        ScalarValue::Dynamic(JsonValue::Number(n)) => n.as_i64(),
        _ => None,
    }
}

fn to_json(value: &ScalarValue) -> JsonValue {
    match value {
        ScalarValue::Utf8(Some(v)) => parse_json_lenient(v),
        other => other.to_json(),
    }
}

/// Strict conversion of a literal into a column of kind `to`.
///
/// Integers widen into `long` and `real` columns, `long` narrows into `int`
/// only when the value fits, and strings are parsed. Nulls of any kind
/// become nulls of the target kind.
pub fn coerce_literal(value: &ScalarValue, to: DataType) -> Result<ScalarValue> {
    if value.datatype() == to {
        return Ok(value.clone());
    }
    if value.is_null() && value.datatype() != DataType::Utf8 {
        return Ok(ScalarValue::null(to));
    }

    let mismatch = || {
        DbError::type_mismatch("Literal cannot be coerced to column type")
            .with_field("value", value)
            .with_field("kind", value.datatype())
            .with_field("column", to)
    };

    let coerced = match (value, to) {
        (ScalarValue::Int32(Some(v)), DataType::Int64) => ScalarValue::from(i64::from(*v)),
        (ScalarValue::Int32(Some(v)), DataType::Float64) => ScalarValue::from(f64::from(*v)),
        (ScalarValue::Int64(Some(v)), DataType::Float64) => ScalarValue::from(*v as f64),
        (ScalarValue::Int64(Some(v)), DataType::Int32) => {
            ScalarValue::from(i32::try_from(*v).map_err(|_| mismatch())?)
        }
        (ScalarValue::Utf8(v), to) => {
            let text = v.as_deref().unwrap_or("");
            match to {
                DataType::Boolean => {
                    ScalarValue::Boolean(Some(parse_bool(text).ok_or_else(mismatch)?))
                }
                DataType::Int32 => {
                    ScalarValue::Int32(Some(text.trim().parse().map_err(|_| mismatch())?))
                }
                DataType::Int64 => ScalarValue::Int64(Some(parse_i64(text).ok_or_else(mismatch)?)),
                DataType::Float64 => {
                    ScalarValue::Float64(Some(parse_f64(text).ok_or_else(mismatch)?))
                }
                DataType::DateTime => {
                    ScalarValue::DateTime(Some(parse_datetime(text).ok_or_else(mismatch)?))
                }
                DataType::TimeSpan => {
                    ScalarValue::TimeSpan(Some(parse_timespan(text).ok_or_else(mismatch)?))
                }
                DataType::Dynamic => ScalarValue::Dynamic(
                    serde_json::from_str(text).map_err(|_| mismatch())?,
                ),
                DataType::Utf8 => value.clone(),
            }
        }
        _ => return Err(mismatch()),
    };

    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::temporal::TICKS_PER_SECOND;

    #[test]
    fn lenient_to_int() {
        let test_cases = [
            (ScalarValue::from(""), ScalarValue::Int32(None)),
            (ScalarValue::from("123"), ScalarValue::from(123_i32)),
            (ScalarValue::from("nan"), ScalarValue::Int32(None)),
            (ScalarValue::from(123.5), ScalarValue::from(123_i32)),
            (ScalarValue::from(-1.9), ScalarValue::from(-1_i32)),
            (ScalarValue::from(f64::NAN), ScalarValue::Int32(None)),
            (ScalarValue::from(5_000_000_000_i64), ScalarValue::Int32(None)),
        ];

        for case in test_cases {
            assert_eq!(case.1, cast_scalar(&case.0, DataType::Int32), "case: {case:?}");
        }
    }

    #[test]
    fn lenient_to_real() {
        assert_eq!(ScalarValue::Float64(None), cast_scalar(&ScalarValue::from(""), DataType::Float64));
        assert_eq!(ScalarValue::from(123.5), cast_scalar(&ScalarValue::from("123.5"), DataType::Float64));
        assert!(matches!(
            cast_scalar(&ScalarValue::from("nan"), DataType::Float64),
            ScalarValue::Float64(Some(v)) if v.is_nan()
        ));
    }

    #[test]
    fn lenient_to_string() {
        let test_cases = [
            (ScalarValue::from(123_i32), "123"),
            (ScalarValue::from(1.5), "1.5"),
            (ScalarValue::timespan(10 * TICKS_PER_SECOND), "00:00:10"),
            (ScalarValue::datetime(parse_datetime("2023-08-30 23:00").unwrap()), "8/30/2023 11:00:00 PM"),
            (ScalarValue::Int64(None), ""),
            (ScalarValue::Dynamic(serde_json::json!("abc def")), "abc def"),
            (ScalarValue::Dynamic(serde_json::json!({"a": 1})), r#"{"a":1}"#),
            (ScalarValue::Dynamic(JsonValue::Null), ""),
        ];

        for case in test_cases {
            assert_eq!(ScalarValue::from(case.1), cast_scalar(&case.0, DataType::Utf8), "case: {case:?}");
        }
    }

    #[test]
    fn widening_array_cast() {
        let array = Array::try_from_scalars(
            DataType::Int32,
            &[ScalarValue::from(1_i32), ScalarValue::Int32(None)],
        )
        .unwrap();
        let out = cast_array(&array, DataType::Float64).unwrap();
        assert_eq!(ScalarValue::from(1.0), out.get(0).unwrap());
        assert_eq!(ScalarValue::Float64(None), out.get(1).unwrap());
    }

    #[test]
    fn strict_literals() {
        assert_eq!(
            ScalarValue::from(1_i32),
            coerce_literal(&ScalarValue::from(1_i64), DataType::Int32).unwrap()
        );
        assert!(coerce_literal(&ScalarValue::from(5_000_000_000_i64), DataType::Int32).is_err());
        assert_eq!(
            ScalarValue::from(2.0),
            coerce_literal(&ScalarValue::from(2_i64), DataType::Float64).unwrap()
        );
        assert_eq!(
            ScalarValue::Int64(None),
            coerce_literal(&ScalarValue::Float64(None), DataType::Int64).unwrap()
        );

        let err = coerce_literal(&ScalarValue::from(1.5), DataType::Int64).unwrap_err();
        assert_eq!(kestrel_error::ErrorKind::TypeMismatch, err.kind());
        assert!(coerce_literal(&ScalarValue::from("abc"), DataType::Int64).is_err());
    }
}
