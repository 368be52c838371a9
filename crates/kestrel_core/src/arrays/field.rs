use std::fmt;

use kestrel_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use super::datatype::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Field {
            name: name.into(),
            datatype,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.datatype)
    }
}

/// Ordered set of uniquely named fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn try_new(fields: impl IntoIterator<Item = Field>) -> Result<Self> {
        let fields: Vec<Field> = fields.into_iter().collect();
        for (idx, field) in fields.iter().enumerate() {
            if fields[..idx].iter().any(|f| f.name == field.name) {
                return Err(DbError::new("Duplicate column name in schema")
                    .with_field("name", &field.name));
            }
        }
        Ok(Schema { fields })
    }

    pub fn empty() -> Self {
        Schema { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Result<&Field> {
        self.fields.get(idx).ok_or_else(|| {
            DbError::index_out_of_range("Column index out of range")
                .with_field("idx", idx)
                .with_field("len", self.fields.len())
        })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Find a column by name, erroring if it doesn't exist.
    pub fn resolve(&self, name: &str) -> Result<(usize, &Field)> {
        match self.index_of(name) {
            Some(idx) => Ok((idx, &self.fields[idx])),
            None => Err(DbError::index_out_of_range("Missing column")
                .with_field("name", name)
                .with_field("schema", self)),
        }
    }

    pub fn datatypes(&self) -> impl Iterator<Item = DataType> + '_ {
        self.fields.iter().map(|f| f.datatype)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Renders as `name:kind; name:kind`.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
