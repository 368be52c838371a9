pub mod array_data;
pub mod physical_type;
pub mod validity;

use array_data::ArrayData;
use kestrel_error::{DbError, Result};
use physical_type::{
    PhysicalBool,
    PhysicalDynamic,
    PhysicalF64,
    PhysicalI32,
    PhysicalI64,
    PhysicalType,
    PhysicalUtf8,
    ScalarStorage,
};
use serde_json::Value as JsonValue;
use validity::Validity;

use crate::arrays::builder::ArrayBuilder;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

/// An immutable column of values of a single type.
///
/// String arrays never hold nulls: a missing string is the empty string.
/// Dynamic arrays mark json `null` entries as invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    datatype: DataType,
    data: ArrayData,
    validity: Validity,
}

impl Array {
    pub fn try_new(datatype: DataType, data: ArrayData, validity: Validity) -> Result<Self> {
        if datatype.physical_type() != data.physical_type() {
            return Err(DbError::type_mismatch("Array data does not match datatype")
                .with_field("datatype", datatype)
                .with_field("physical", format!("{:?}", data.physical_type())));
        }
        if data.len() != validity.len() {
            return Err(DbError::new("Array data and validity lengths differ")
                .with_field("data", data.len())
                .with_field("validity", validity.len()));
        }

        Ok(Self::from_parts(datatype, data, validity))
    }

    /// Construct from parts already known to agree in type and length.
    pub(crate) fn from_parts(datatype: DataType, data: ArrayData, mut validity: Validity) -> Self {
        match &data {
            ArrayData::Utf8(_) if !validity.all_valid() => {
                validity = Validity::new_all_valid(data.len());
            }
            ArrayData::Dynamic(values) => {
                for (idx, value) in values.iter().enumerate() {
                    if value.is_null() {
                        validity.set_invalid(idx);
                    }
                }
            }
            _ => (),
        }

        Array {
            datatype,
            data,
            validity,
        }
    }

    /// Create an array from typed values with all rows valid.
    pub fn try_from_values<S: ScalarStorage>(
        datatype: DataType,
        values: Vec<S::StorageType>,
    ) -> Result<Self> {
        let validity = Validity::new_all_valid(values.len());
        Self::try_new(datatype, S::into_data(values), validity)
    }

    pub fn try_from_scalars<'a>(
        datatype: DataType,
        values: impl IntoIterator<Item = &'a ScalarValue>,
    ) -> Result<Self> {
        let values = values.into_iter();
        let mut builder = ArrayBuilder::with_capacity(datatype, values.size_hint().0);
        for value in values {
            builder.add(value)?;
        }
        Ok(builder.finish())
    }

    pub fn new_null(datatype: DataType, len: usize) -> Self {
        let data = ArrayData::new_default(datatype.physical_type(), len);
        let validity = match datatype {
            DataType::Utf8 => Validity::new_all_valid(len),
            _ => Validity::new_all_invalid(len),
        };
        Array {
            datatype,
            data,
            validity,
        }
    }

    /// Repeat a scalar `len` times.
    pub fn repeat_scalar(value: &ScalarValue, len: usize) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::new_null(value.datatype(), len));
        }
        let datatype = value.datatype();
        let data = match value {
            ScalarValue::Boolean(Some(v)) => ArrayData::Boolean(vec![*v; len]),
            ScalarValue::Int32(Some(v)) => ArrayData::Int32(vec![*v; len]),
            ScalarValue::Int64(Some(v))
            | ScalarValue::DateTime(Some(v))
            | ScalarValue::TimeSpan(Some(v)) => ArrayData::Int64(vec![*v; len]),
            ScalarValue::Float64(Some(v)) => ArrayData::Float64(vec![*v; len]),
            ScalarValue::Utf8(Some(v)) => ArrayData::Utf8(vec![v.clone(); len]),
            ScalarValue::Dynamic(v) => ArrayData::Dynamic(vec![v.clone(); len]),
            other => return Err(DbError::new(format!("Unexpected null scalar: {other:?}"))),
        };
        Self::try_new(datatype, data, Validity::new_all_valid(len))
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_valid(&self, idx: usize) -> bool {
        self.validity.is_valid(idx)
    }

    /// Get the value at `idx`.
    pub fn get(&self, idx: usize) -> Result<ScalarValue> {
        if idx >= self.len() {
            return Err(DbError::index_out_of_range("Row index out of range")
                .with_field("idx", idx)
                .with_field("len", self.len()));
        }

        let valid = self.validity.is_valid(idx);
        Ok(match self.datatype.physical_type() {
            PhysicalType::Boolean => self.get_typed::<PhysicalBool>(idx, valid)?,
            PhysicalType::Int32 => self.get_typed::<PhysicalI32>(idx, valid)?,
            PhysicalType::Int64 => self.get_typed::<PhysicalI64>(idx, valid)?,
            PhysicalType::Float64 => self.get_typed::<PhysicalF64>(idx, valid)?,
            PhysicalType::Utf8 => self.get_typed::<PhysicalUtf8>(idx, valid)?,
            PhysicalType::Dynamic => self.get_typed::<PhysicalDynamic>(idx, valid)?,
        })
    }

    fn get_typed<S: ScalarStorage>(&self, idx: usize, valid: bool) -> Result<ScalarValue> {
        let values = S::get_storage(&self.data)?;
        let value = if valid { Some(values[idx].clone()) } else { None };
        Ok(S::into_scalar(self.datatype, value))
    }

    /// Iterate all values as scalars.
    pub fn iter_scalars(&self) -> impl Iterator<Item = Result<ScalarValue>> + '_ {
        (0..self.len()).map(|idx| self.get(idx))
    }

    /// New array containing the rows at `indices`, in order.
    pub fn select(&self, indices: &[usize]) -> Array {
        Array {
            datatype: self.datatype,
            data: self.data.select(indices),
            validity: self.validity.select(indices),
        }
    }

    /// Like `select`, but `None` produces a null row.
    pub fn select_or_null(&self, indices: &[Option<usize>]) -> Array {
        let dense: Vec<usize> = indices.iter().map(|idx| idx.unwrap_or(0)).collect();
        let mut data = if self.is_empty() {
            ArrayData::new_default(self.datatype.physical_type(), indices.len())
        } else {
            self.data.select(&dense)
        };
        // Missing strings are empty rather than a copy of the first row.
        if let ArrayData::Utf8(values) = &mut data {
            for (value, idx) in values.iter_mut().zip(indices) {
                if idx.is_none() {
                    value.clear();
                }
            }
        }
        let validity = Validity::from_iter_valid(
            indices
                .iter()
                .map(|idx| idx.is_some_and(|idx| self.validity.is_valid(idx))),
        );
        Self::from_parts(self.datatype, data, validity)
    }

    pub fn slice(&self, offset: usize, len: usize) -> Array {
        let indices: Vec<_> = (offset..offset + len).collect();
        self.select(&indices)
    }

    /// Concatenate arrays of the same type.
    pub fn concat(datatype: DataType, arrays: &[&Array]) -> Result<Array> {
        let total: usize = arrays.iter().map(|a| a.len()).sum();
        let mut data = ArrayData::with_capacity(datatype.physical_type(), total);
        let mut valid = Vec::with_capacity(total);

        for array in arrays {
            if array.datatype != datatype || !data.extend_from(&array.data) {
                return Err(DbError::type_mismatch("Cannot concatenate arrays of different types")
                    .with_field("expected", datatype)
                    .with_field("got", array.datatype));
            }
            valid.extend(array.validity.iter());
        }

        Self::try_new(datatype, data, Validity::from_iter_valid(valid))
    }

    /// Json values for a dynamic array, json `null` for invalid rows.
    pub fn dynamic_values(&self) -> Result<Vec<JsonValue>> {
        let values = PhysicalDynamic::get_storage(&self.data)?;
        Ok(values
            .iter()
            .enumerate()
            .map(|(idx, v)| {
                if self.is_valid(idx) {
                    v.clone()
                } else {
                    JsonValue::Null
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_out_of_range() {
        let array = Array::try_from_values::<PhysicalI64>(DataType::Int64, vec![1, 2]).unwrap();
        assert_eq!(ScalarValue::from(2_i64), array.get(1).unwrap());

        let err = array.get(2).unwrap_err();
        assert_eq!(kestrel_error::ErrorKind::IndexOutOfRange, err.kind());
    }

    #[test]
    fn datetime_uses_i64_storage() {
        let array = Array::try_from_values::<PhysicalI64>(DataType::DateTime, vec![5]).unwrap();
        assert_eq!(ScalarValue::datetime(5), array.get(0).unwrap());
    }

    #[test]
    fn null_strings_are_empty() {
        let array = Array::new_null(DataType::Utf8, 2);
        assert_eq!(ScalarValue::from(""), array.get(0).unwrap());

        let array = Array::repeat_scalar(&ScalarValue::Utf8(None), 1).unwrap();
        assert_eq!(ScalarValue::from(""), array.get(0).unwrap());
    }

    #[test]
    fn repeat_and_select() {
        let array = Array::repeat_scalar(&ScalarValue::from(1.5), 3).unwrap();
        assert_eq!(3, array.len());

        let nulls = Array::new_null(DataType::Int32, 3);
        assert_eq!(ScalarValue::Int32(None), nulls.get(2).unwrap());

        let array = Array::try_from_scalars(
            DataType::Int64,
            &[
                ScalarValue::from(1_i64),
                ScalarValue::Int64(None),
                ScalarValue::from(3_i64),
            ],
        )
        .unwrap();
        let selected = array.select(&[2, 1]);
        assert_eq!(ScalarValue::from(3_i64), selected.get(0).unwrap());
        assert_eq!(ScalarValue::Int64(None), selected.get(1).unwrap());
    }

    #[test]
    fn select_or_null_fills() {
        let array = Array::try_from_values::<PhysicalI64>(DataType::Int64, vec![7]).unwrap();
        let out = array.select_or_null(&[Some(0), None]);
        assert_eq!(ScalarValue::from(7_i64), out.get(0).unwrap());
        assert_eq!(ScalarValue::Int64(None), out.get(1).unwrap());

        let empty = Array::new_null(DataType::Utf8, 0);
        let out = empty.select_or_null(&[None]);
        assert_eq!(ScalarValue::from(""), out.get(0).unwrap());

        let strings = Array::try_from_values::<PhysicalUtf8>(DataType::Utf8, vec!["b".to_string()]).unwrap();
        let out = strings.select_or_null(&[None, Some(0)]);
        assert_eq!(ScalarValue::from(""), out.get(0).unwrap());
        assert_eq!(ScalarValue::from("b"), out.get(1).unwrap());
    }

    #[test]
    fn concat_mismatched_types() {
        let a = Array::new_null(DataType::Int32, 1);
        let b = Array::new_null(DataType::Int64, 1);
        assert!(Array::concat(DataType::Int32, &[&a, &b]).is_err());

        let joined = Array::concat(DataType::Int32, &[&a, &a]).unwrap();
        assert_eq!(2, joined.len());
    }
}
