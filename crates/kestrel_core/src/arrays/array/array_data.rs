use serde_json::Value as JsonValue;

use super::physical_type::PhysicalType;

/// Dense typed backing storage for an array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
    Dynamic(Vec<JsonValue>),
}

impl ArrayData {
    pub fn with_capacity(physical: PhysicalType, capacity: usize) -> Self {
        match physical {
            PhysicalType::Boolean => Self::Boolean(Vec::with_capacity(capacity)),
            PhysicalType::Int32 => Self::Int32(Vec::with_capacity(capacity)),
            PhysicalType::Int64 => Self::Int64(Vec::with_capacity(capacity)),
            PhysicalType::Float64 => Self::Float64(Vec::with_capacity(capacity)),
            PhysicalType::Utf8 => Self::Utf8(Vec::with_capacity(capacity)),
            PhysicalType::Dynamic => Self::Dynamic(Vec::with_capacity(capacity)),
        }
    }

    /// Storage with `len` default values.
    pub fn new_default(physical: PhysicalType, len: usize) -> Self {
        match physical {
            PhysicalType::Boolean => Self::Boolean(vec![false; len]),
            PhysicalType::Int32 => Self::Int32(vec![0; len]),
            PhysicalType::Int64 => Self::Int64(vec![0; len]),
            PhysicalType::Float64 => Self::Float64(vec![0.0; len]),
            PhysicalType::Utf8 => Self::Utf8(vec![String::new(); len]),
            PhysicalType::Dynamic => Self::Dynamic(vec![JsonValue::Null; len]),
        }
    }

    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Self::Boolean(_) => PhysicalType::Boolean,
            Self::Int32(_) => PhysicalType::Int32,
            Self::Int64(_) => PhysicalType::Int64,
            Self::Float64(_) => PhysicalType::Float64,
            Self::Utf8(_) => PhysicalType::Utf8,
            Self::Dynamic(_) => PhysicalType::Dynamic,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Utf8(v) => v.len(),
            Self::Dynamic(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the rows at `indices`.
    pub fn select(&self, indices: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&idx| values[idx].clone()).collect()
        }

        match self {
            Self::Boolean(v) => Self::Boolean(pick(v, indices)),
            Self::Int32(v) => Self::Int32(pick(v, indices)),
            Self::Int64(v) => Self::Int64(pick(v, indices)),
            Self::Float64(v) => Self::Float64(pick(v, indices)),
            Self::Utf8(v) => Self::Utf8(pick(v, indices)),
            Self::Dynamic(v) => Self::Dynamic(pick(v, indices)),
        }
    }

    /// Append all values from `other`, which must share the physical type.
    pub(crate) fn extend_from(&mut self, other: &ArrayData) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.extend_from_slice(b),
            (Self::Int32(a), Self::Int32(b)) => a.extend_from_slice(b),
            (Self::Int64(a), Self::Int64(b)) => a.extend_from_slice(b),
            (Self::Float64(a), Self::Float64(b)) => a.extend_from_slice(b),
            (Self::Utf8(a), Self::Utf8(b)) => a.extend_from_slice(b),
            (Self::Dynamic(a), Self::Dynamic(b)) => a.extend_from_slice(b),
            _ => return false,
        }
        true
    }
}
