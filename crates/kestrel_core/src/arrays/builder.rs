use kestrel_error::{DbError, Result};
use serde_json::Value as JsonValue;

use super::array::Array;
use super::array::array_data::ArrayData;
use super::array::validity::Validity;
use super::datatype::DataType;
use super::scalar::ScalarValue;

/// Append-only builder for an array of a single type.
///
/// Finishing the builder consumes it.
#[derive(Debug)]
pub struct ArrayBuilder {
    datatype: DataType,
    data: ArrayData,
    valid: Vec<bool>,
}

impl ArrayBuilder {
    pub fn new(datatype: DataType) -> Self {
        Self::with_capacity(datatype, 0)
    }

    pub fn with_capacity(datatype: DataType, capacity: usize) -> Self {
        ArrayBuilder {
            datatype,
            data: ArrayData::with_capacity(datatype.physical_type(), capacity),
            valid: Vec::with_capacity(capacity),
        }
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Append a value, erroring if the value's kind doesn't match the
    /// builder's type.
    pub fn add(&mut self, value: &ScalarValue) -> Result<()> {
        if value.datatype() != self.datatype {
            return Err(DbError::type_mismatch("Value kind does not match builder type")
                .with_field("builder", self.datatype)
                .with_field("value", value.datatype()));
        }

        let valid = match (&mut self.data, value) {
            (ArrayData::Boolean(v), ScalarValue::Boolean(x)) => push(v, *x),
            (ArrayData::Int32(v), ScalarValue::Int32(x)) => push(v, *x),
            (ArrayData::Int64(v), ScalarValue::Int64(x))
            | (ArrayData::Int64(v), ScalarValue::DateTime(x))
            | (ArrayData::Int64(v), ScalarValue::TimeSpan(x)) => push(v, *x),
            (ArrayData::Float64(v), ScalarValue::Float64(x)) => push(v, *x),
            (ArrayData::Utf8(v), ScalarValue::Utf8(x)) => {
                v.push(x.clone().unwrap_or_default());
                true
            }
            (ArrayData::Dynamic(v), ScalarValue::Dynamic(x)) => {
                v.push(x.clone());
                !x.is_null()
            }
            (data, value) => {
                return Err(DbError::new("Builder storage mismatch")
                    .with_field("storage", format!("{:?}", data.physical_type()))
                    .with_field("value", value.datatype()));
            }
        };

        self.valid.push(valid);
        Ok(())
    }

    pub fn add_null(&mut self) -> Result<()> {
        self.add(&ScalarValue::null(self.datatype))
    }

    /// Append an owned json value to a dynamic builder.
    pub fn add_json(&mut self, value: JsonValue) -> Result<()> {
        match &mut self.data {
            ArrayData::Dynamic(v) => {
                self.valid.push(!value.is_null());
                v.push(value);
                Ok(())
            }
            _ => Err(DbError::type_mismatch("Builder does not hold dynamic values")
                .with_field("builder", self.datatype)),
        }
    }

    pub fn finish(self) -> Array {
        let validity = Validity::from_iter_valid(self.valid);
        Array::from_parts(self.datatype, self.data, validity)
    }
}

fn push<T: Default>(values: &mut Vec<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            values.push(v);
            true
        }
        None => {
            values.push(T::default());
            false
        }
    }
}
