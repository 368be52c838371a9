use std::fmt::Debug;

use kestrel_error::{DbError, Result};
use serde_json::Value as JsonValue;

use super::array_data::ArrayData;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

/// How values are physically laid out in memory.
///
/// Several logical types may share a physical type, e.g. datetime and
/// timespan are both stored as `i64` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
    Dynamic,
}

/// Compile-time access to the typed storage of an array.
pub trait ScalarStorage: Debug + Sync + Send + Clone + Copy + 'static {
    const PHYSICAL_TYPE: PhysicalType;

    type StorageType: Debug + Default + Clone + Sync + Send + 'static;

    /// Get the typed values from array data.
    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]>;

    /// Wrap typed values as array data.
    fn into_data(values: Vec<Self::StorageType>) -> ArrayData;

    /// Convert a single typed value into a scalar of the given logical type.
    fn into_scalar(datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue;
}

fn physical_mismatch(expected: PhysicalType, data: &ArrayData) -> DbError {
    DbError::type_mismatch("Unexpected physical storage")
        .with_field("expected", format!("{expected:?}"))
        .with_field("got", format!("{:?}", data.physical_type()))
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalBool;

impl ScalarStorage for PhysicalBool {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Boolean;
    type StorageType = bool;

    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]> {
        match data {
            ArrayData::Boolean(v) => Ok(v),
            other => Err(physical_mismatch(Self::PHYSICAL_TYPE, other)),
        }
    }

    fn into_data(values: Vec<Self::StorageType>) -> ArrayData {
        ArrayData::Boolean(values)
    }

    fn into_scalar(_datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue {
        ScalarValue::Boolean(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalI32;

impl ScalarStorage for PhysicalI32 {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Int32;
    type StorageType = i32;

    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]> {
        match data {
            ArrayData::Int32(v) => Ok(v),
            other => Err(physical_mismatch(Self::PHYSICAL_TYPE, other)),
        }
    }

    fn into_data(values: Vec<Self::StorageType>) -> ArrayData {
        ArrayData::Int32(values)
    }

    fn into_scalar(_datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue {
        ScalarValue::Int32(value)
    }
}

/// Storage for long, datetime and timespan.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalI64;

impl ScalarStorage for PhysicalI64 {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Int64;
    type StorageType = i64;

    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]> {
        match data {
            ArrayData::Int64(v) => Ok(v),
            other => Err(physical_mismatch(Self::PHYSICAL_TYPE, other)),
        }
    }

    fn into_data(values: Vec<Self::StorageType>) -> ArrayData {
        ArrayData::Int64(values)
    }

    fn into_scalar(datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue {
        match datatype {
            DataType::DateTime => ScalarValue::DateTime(value),
            DataType::TimeSpan => ScalarValue::TimeSpan(value),
            _ => ScalarValue::Int64(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalF64;

impl ScalarStorage for PhysicalF64 {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Float64;
    type StorageType = f64;

    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]> {
        match data {
            ArrayData::Float64(v) => Ok(v),
            other => Err(physical_mismatch(Self::PHYSICAL_TYPE, other)),
        }
    }

    fn into_data(values: Vec<Self::StorageType>) -> ArrayData {
        ArrayData::Float64(values)
    }

    fn into_scalar(_datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue {
        ScalarValue::Float64(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalUtf8;

impl ScalarStorage for PhysicalUtf8 {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Utf8;
    type StorageType = String;

    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]> {
        match data {
            ArrayData::Utf8(v) => Ok(v),
            other => Err(physical_mismatch(Self::PHYSICAL_TYPE, other)),
        }
    }

    fn into_data(values: Vec<Self::StorageType>) -> ArrayData {
        ArrayData::Utf8(values)
    }

    fn into_scalar(_datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue {
        ScalarValue::Utf8(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalDynamic;

impl ScalarStorage for PhysicalDynamic {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Dynamic;
    type StorageType = JsonValue;

    fn get_storage(data: &ArrayData) -> Result<&[Self::StorageType]> {
        match data {
            ArrayData::Dynamic(v) => Ok(v),
            other => Err(physical_mismatch(Self::PHYSICAL_TYPE, other)),
        }
    }

    fn into_data(values: Vec<Self::StorageType>) -> ArrayData {
        ArrayData::Dynamic(values)
    }

    fn into_scalar(_datatype: DataType, value: Option<Self::StorageType>) -> ScalarValue {
        ScalarValue::Dynamic(value.unwrap_or(JsonValue::Null))
    }
}
