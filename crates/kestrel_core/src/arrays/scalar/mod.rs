pub mod dynamic;
pub mod key;
pub mod temporal;

use std::cmp::Ordering;
use std::fmt;

use kestrel_error::{DbError, Result};
use serde_json::Value as JsonValue;

use crate::arrays::datatype::DataType;

/// A single nullable value of one kind.
///
/// Every kind carries its own null so the kind of a value never depends on
/// whether it's null. Dynamic values use json `null` as their null.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Utf8(Option<String>),
    DateTime(Option<i64>),
    TimeSpan(Option<i64>),
    Dynamic(JsonValue),
}

impl ScalarValue {
    pub const fn null(datatype: DataType) -> Self {
        match datatype {
            DataType::Boolean => Self::Boolean(None),
            DataType::Int32 => Self::Int32(None),
            DataType::Int64 => Self::Int64(None),
            DataType::Float64 => Self::Float64(None),
            DataType::Utf8 => Self::Utf8(None),
            DataType::DateTime => Self::DateTime(None),
            DataType::TimeSpan => Self::TimeSpan(None),
            DataType::Dynamic => Self::Dynamic(JsonValue::Null),
        }
    }

    pub const fn datatype(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
            Self::DateTime(_) => DataType::DateTime,
            Self::TimeSpan(_) => DataType::TimeSpan,
            Self::Dynamic(_) => DataType::Dynamic,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Boolean(v) => v.is_none(),
            Self::Int32(v) => v.is_none(),
            Self::Int64(v) => v.is_none(),
            Self::Float64(v) => v.is_none(),
            Self::Utf8(v) => v.is_none(),
            Self::DateTime(v) => v.is_none(),
            Self::TimeSpan(v) => v.is_none(),
            Self::Dynamic(v) => v.is_null(),
        }
    }

    pub fn datetime(ticks: i64) -> Self {
        Self::DateTime(Some(ticks))
    }

    pub fn timespan(ticks: i64) -> Self {
        Self::TimeSpan(Some(ticks))
    }

    fn kind_error(&self, expected: DataType) -> DbError {
        DbError::type_mismatch("Unexpected scalar kind")
            .with_field("expected", expected)
            .with_field("got", self.datatype())
    }

    pub fn try_as_bool(&self) -> Result<Option<bool>> {
        match self {
            Self::Boolean(v) => Ok(*v),
            _ => Err(self.kind_error(DataType::Boolean)),
        }
    }

    /// Get an integer, widening int to long.
    pub fn try_as_i64(&self) -> Result<Option<i64>> {
        match self {
            Self::Int32(v) => Ok(v.map(i64::from)),
            Self::Int64(v) => Ok(*v),
            _ => Err(self.kind_error(DataType::Int64)),
        }
    }

    /// Get a number as a float, widening integers.
    pub fn try_as_f64(&self) -> Result<Option<f64>> {
        match self {
            Self::Int32(v) => Ok(v.map(f64::from)),
            Self::Int64(v) => Ok(v.map(|v| v as f64)),
            Self::Float64(v) => Ok(*v),
            _ => Err(self.kind_error(DataType::Float64)),
        }
    }

    pub fn try_as_usize(&self) -> Result<usize> {
        let v = self
            .try_as_i64()?
            .ok_or_else(|| DbError::type_mismatch("Expected a non-null integer"))?;
        usize::try_from(v).map_err(|_| {
            DbError::type_mismatch("Expected a non-negative integer").with_field("value", v)
        })
    }

    /// Ticks of a datetime or timespan.
    pub fn try_as_ticks(&self) -> Result<Option<i64>> {
        match self {
            Self::DateTime(v) | Self::TimeSpan(v) => Ok(*v),
            _ => Err(self.kind_error(DataType::TimeSpan)),
        }
    }

    pub fn try_as_dynamic(&self) -> Result<&JsonValue> {
        match self {
            Self::Dynamic(v) => Ok(v),
            _ => Err(self.kind_error(DataType::Dynamic)),
        }
    }

    /// Canonical text form, as produced by `tostring` and string
    /// concatenation. Nulls render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::DateTime(Some(v)) => temporal::format_datetime_general(*v),
            Self::Dynamic(v) => dynamic::json_to_text(v),
            v if v.is_null() => String::new(),
            v => v.to_string(),
        }
    }

    /// The value as json. Strings stay strings, temporal values use their
    /// display form and nulls become json `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Boolean(Some(v)) => JsonValue::Bool(*v),
            Self::Int32(Some(v)) => JsonValue::from(*v),
            Self::Int64(Some(v)) => JsonValue::from(*v),
            Self::Float64(Some(v)) => {
                serde_json::Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number)
            }
            Self::Utf8(Some(v)) => JsonValue::String(v.clone()),
            Self::DateTime(Some(v)) => JsonValue::String(temporal::format_datetime(*v)),
            Self::TimeSpan(Some(v)) => JsonValue::String(temporal::format_timespan(*v)),
            Self::Dynamic(v) => v.clone(),
            _ => JsonValue::Null,
        }
    }

    /// Compare two non-null values of the same kind.
    ///
    /// Nulls compare less than any value. Values of different kinds compare by
    /// kind.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => (),
        }

        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Int32(a), Self::Int32(b)) => a.cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Float64(Some(a)), Self::Float64(Some(b))) => a.total_cmp(b),
            (Self::Utf8(a), Self::Utf8(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::TimeSpan(a), Self::TimeSpan(b)) => a.cmp(b),
            (Self::Dynamic(a), Self::Dynamic(b)) => dynamic::compare_json(a, b),
            (a, b) => (a.datatype() as u8).cmp(&(b.datatype() as u8)),
        }
    }
}

pub fn format_f64(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        write!(f, "NaN")
    } else if v == f64::INFINITY {
        write!(f, "Infinity")
    } else if v == f64::NEG_INFINITY {
        write!(f, "-Infinity")
    } else if v != 0.0 && !(1e-4..1e15).contains(&v.abs()) {
        // Shortest round-trip mantissa with a signed, two digit minimum
        // exponent: 1E+300, 2.5E-07.
        let sci = format!("{v:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        write!(f, "{mantissa}E{sign}{digits:0>2}")
    } else {
        write!(f, "{v}")
    }
}

/// Display form used when dumping tables.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8(v) => write!(f, "{}", v.as_deref().unwrap_or("")),
            Self::Boolean(Some(v)) => write!(f, "{}", if *v { "True" } else { "False" }),
            Self::Int32(Some(v)) => write!(f, "{v}"),
            Self::Int64(Some(v)) => write!(f, "{v}"),
            Self::Float64(Some(v)) => format_f64(f, *v),
            Self::DateTime(Some(v)) => write!(f, "{}", temporal::format_datetime(*v)),
            Self::TimeSpan(Some(v)) => write!(f, "{}", temporal::format_timespan(*v)),
            Self::Dynamic(v) if !v.is_null() => write!(f, "{v}"),
            _ => write!(f, "(null)"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Boolean(Some(value))
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int32(Some(value))
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int64(Some(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float64(Some(value))
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Utf8(Some(value.to_string()))
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Utf8(Some(value))
    }
}

impl From<JsonValue> for ScalarValue {
    fn from(value: JsonValue) -> Self {
        Self::Dynamic(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn display_values() {
        let test_cases = [
            (ScalarValue::from(true), "True"),
            (ScalarValue::Boolean(None), "(null)"),
            (ScalarValue::from(50.0), "50"),
            (ScalarValue::from(1.5), "1.5"),
            (ScalarValue::from(0.1 + 0.2), "0.30000000000000004"),
            (ScalarValue::from(123456789012345.0), "123456789012345"),
            (ScalarValue::from(1e15), "1E+15"),
            (ScalarValue::from(1e300), "1E+300"),
            (ScalarValue::from(-2.5e-7), "-2.5E-07"),
            (ScalarValue::from(0.0001), "0.0001"),
            (ScalarValue::from(0.0), "0"),
            (ScalarValue::from(f64::NEG_INFINITY), "-Infinity"),
            (ScalarValue::from(f64::NAN), "NaN"),
            (ScalarValue::Int64(None), "(null)"),
            (ScalarValue::Utf8(None), ""),
            (ScalarValue::from("abc"), "abc"),
            (ScalarValue::timespan(10 * temporal::TICKS_PER_SECOND), "00:00:10"),
            (ScalarValue::from(json!([1, 2, 3])), "[1,2,3]"),
            (ScalarValue::Dynamic(JsonValue::Null), "(null)"),
        ];

        for case in test_cases {
            assert_eq!(case.1, case.0.to_string(), "case: {case:?}");
        }
    }

    #[test]
    fn text_values() {
        let dt = temporal::parse_datetime("2023-08-30 23:00").unwrap();
        assert_eq!("8/30/2023 11:00:00 PM", ScalarValue::datetime(dt).to_text());
        assert_eq!("", ScalarValue::Int32(None).to_text());
        assert_eq!("abc", ScalarValue::from(json!("abc")).to_text());
        assert_eq!("1.5", ScalarValue::from(1.5).to_text());
    }

    #[test]
    fn nulls_sort_first() {
        let null = ScalarValue::Int64(None);
        let one = ScalarValue::from(1_i64);
        assert_eq!(Ordering::Less, null.total_cmp(&one));
        assert_eq!(Ordering::Greater, one.total_cmp(&null));
        assert_eq!(Ordering::Equal, null.total_cmp(&null));
    }

    #[test]
    fn kind_errors() {
        let err = ScalarValue::from("a").try_as_i64().unwrap_err();
        assert_eq!(kestrel_error::ErrorKind::TypeMismatch, err.kind());
    }
}
