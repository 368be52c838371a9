use std::fmt;

use kestrel_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::array::physical_type::PhysicalType;

/// Type ids used in function signatures.
///
/// `Any` matches every data type and is only meaningful in signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeId {
    Any,
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
    DateTime,
    TimeSpan,
    Dynamic,
}

impl DataTypeId {
    /// The concrete data type for this id, None for `Any`.
    pub const fn to_datatype(&self) -> Option<DataType> {
        Some(match self {
            Self::Any => return None,
            Self::Boolean => DataType::Boolean,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
            Self::DateTime => DataType::DateTime,
            Self::TimeSpan => DataType::TimeSpan,
            Self::Dynamic => DataType::Dynamic,
        })
    }
}

/// The closed set of value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
    /// Ticks (100ns) since the unix epoch.
    DateTime,
    /// Duration in ticks (100ns).
    TimeSpan,
    /// JSON-like value.
    Dynamic,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::Boolean,
        DataType::Int32,
        DataType::Int64,
        DataType::Float64,
        DataType::Utf8,
        DataType::DateTime,
        DataType::TimeSpan,
        DataType::Dynamic,
    ];

    pub const fn id(&self) -> DataTypeId {
        match self {
            Self::Boolean => DataTypeId::Boolean,
            Self::Int32 => DataTypeId::Int32,
            Self::Int64 => DataTypeId::Int64,
            Self::Float64 => DataTypeId::Float64,
            Self::Utf8 => DataTypeId::Utf8,
            Self::DateTime => DataTypeId::DateTime,
            Self::TimeSpan => DataTypeId::TimeSpan,
            Self::Dynamic => DataTypeId::Dynamic,
        }
    }

    pub const fn physical_type(&self) -> PhysicalType {
        match self {
            Self::Boolean => PhysicalType::Boolean,
            Self::Int32 => PhysicalType::Int32,
            Self::Int64 | Self::DateTime | Self::TimeSpan => PhysicalType::Int64,
            Self::Float64 => PhysicalType::Float64,
            Self::Utf8 => PhysicalType::Utf8,
            Self::Dynamic => PhysicalType::Dynamic,
        }
    }

    /// Name used when rendering schemas, e.g. `long` for `Int64`.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Int32 => "int",
            Self::Int64 => "long",
            Self::Float64 => "real",
            Self::Utf8 => "string",
            Self::DateTime => "datetime",
            Self::TimeSpan => "timespan",
            Self::Dynamic => "dynamic",
        }
    }

    /// Parse a type name as written in schema declarations.
    pub fn from_kind_name(name: &str) -> Result<Self> {
        Ok(match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Boolean,
            "int" => Self::Int32,
            "long" => Self::Int64,
            "real" | "double" => Self::Float64,
            "string" => Self::Utf8,
            "datetime" | "date" => Self::DateTime,
            "timespan" | "time" => Self::TimeSpan,
            "dynamic" => Self::Dynamic,
            other => {
                return Err(DbError::type_mismatch(format!("Unknown type name '{other}'")));
            }
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind_name())
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Boolean => write!(f, "bool"),
            Self::Int32 => write!(f, "int"),
            Self::Int64 => write!(f, "long"),
            Self::Float64 => write!(f, "real"),
            Self::Utf8 => write!(f, "string"),
            Self::DateTime => write!(f, "datetime"),
            Self::TimeSpan => write!(f, "timespan"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for datatype in DataType::ALL {
            let parsed = DataType::from_kind_name(datatype.kind_name()).unwrap();
            assert_eq!(datatype, parsed);
        }
    }

    #[test]
    fn aliases() {
        assert_eq!(DataType::Float64, DataType::from_kind_name("double").unwrap());
        assert_eq!(DataType::Boolean, DataType::from_kind_name("Boolean").unwrap());
        assert!(DataType::from_kind_name("decimal").is_err());
    }
}
