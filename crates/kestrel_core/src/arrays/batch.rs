use kestrel_error::{DbError, Result};

use super::array::Array;
use super::field::Schema;
use super::scalar::ScalarValue;

/// A chunk of rows: equal length arrays, one per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    arrays: Vec<Array>,
    num_rows: usize,
}

impl Batch {
    pub fn try_new(arrays: Vec<Array>) -> Result<Self> {
        let num_rows = arrays.first().map(|a| a.len()).unwrap_or(0);
        Self::try_new_with_rows(arrays, num_rows)
    }

    /// Create a batch with an explicit row count. Needed for batches with no
    /// columns.
    pub fn try_new_with_rows(arrays: Vec<Array>, num_rows: usize) -> Result<Self> {
        for (idx, array) in arrays.iter().enumerate() {
            if array.len() != num_rows {
                return Err(DbError::new("Arrays in batch have different lengths")
                    .with_field("column", idx)
                    .with_field("expected", num_rows)
                    .with_field("got", array.len()));
            }
        }
        Ok(Batch { arrays, num_rows })
    }

    /// A batch with all-null columns for the schema.
    pub fn new_null(schema: &Schema, num_rows: usize) -> Self {
        Batch {
            arrays: schema
                .datatypes()
                .map(|d| Array::new_null(d, num_rows))
                .collect(),
            num_rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.arrays.len()
    }

    pub fn arrays(&self) -> &[Array] {
        &self.arrays
    }

    pub fn array(&self, idx: usize) -> Result<&Array> {
        self.arrays.get(idx).ok_or_else(|| {
            DbError::index_out_of_range("Column index out of range")
                .with_field("idx", idx)
                .with_field("columns", self.arrays.len())
        })
    }

    pub fn row(&self, idx: usize) -> Result<Vec<ScalarValue>> {
        if idx >= self.num_rows {
            return Err(DbError::index_out_of_range("Row index out of range")
                .with_field("idx", idx)
                .with_field("rows", self.num_rows));
        }
        self.arrays.iter().map(|a| a.get(idx)).collect()
    }

    pub fn select(&self, indices: &[usize]) -> Batch {
        Batch {
            arrays: self.arrays.iter().map(|a| a.select(indices)).collect(),
            num_rows: indices.len(),
        }
    }

    pub fn slice(&self, offset: usize, len: usize) -> Batch {
        Batch {
            arrays: self.arrays.iter().map(|a| a.slice(offset, len)).collect(),
            num_rows: len,
        }
    }

    /// Concatenate batches sharing `schema` into a single batch.
    pub fn concat(schema: &Schema, batches: &[Batch]) -> Result<Batch> {
        let num_rows = batches.iter().map(|b| b.num_rows).sum();
        let mut arrays = Vec::with_capacity(schema.len());
        for (col, field) in schema.fields().iter().enumerate() {
            let cols = batches
                .iter()
                .map(|b| b.array(col))
                .collect::<Result<Vec<_>>>()?;
            arrays.push(Array::concat(field.datatype, &cols)?);
        }
        Self::try_new_with_rows(arrays, num_rows)
    }

    /// Split into batches of at most `batch_size` rows.
    pub fn split(self, batch_size: usize) -> Vec<Batch> {
        if self.num_rows <= batch_size || batch_size == 0 {
            return vec![self];
        }
        (0..self.num_rows)
            .step_by(batch_size)
            .map(|offset| self.slice(offset, usize::min(batch_size, self.num_rows - offset)))
            .collect()
    }

    /// Check the batch conforms to the schema.
    pub fn verify_schema(&self, schema: &Schema) -> Result<()> {
        if self.arrays.len() != schema.len() {
            return Err(DbError::new("Batch column count does not match schema")
                .with_field("batch", self.arrays.len())
                .with_field("schema", schema));
        }
        for (array, field) in self.arrays.iter().zip(schema.fields()) {
            if array.datatype() != field.datatype {
                return Err(DbError::type_mismatch("Batch column type does not match schema")
                    .with_field("column", &field.name)
                    .with_field("expected", field.datatype)
                    .with_field("got", array.datatype()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::physical_type::PhysicalI64;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;

    fn longs(values: Vec<i64>) -> Array {
        Array::try_from_values::<PhysicalI64>(DataType::Int64, values).unwrap()
    }

    #[test]
    fn mismatched_lengths() {
        assert!(Batch::try_new(vec![longs(vec![1]), longs(vec![1, 2])]).is_err());
    }

    #[test]
    fn split_and_concat() {
        let schema = Schema::try_new([Field::new("a", DataType::Int64)]).unwrap();
        let batch = Batch::try_new(vec![longs(vec![1, 2, 3, 4, 5])]).unwrap();

        let parts = batch.clone().split(2);
        assert_eq!(vec![2, 2, 1], parts.iter().map(|b| b.num_rows()).collect::<Vec<_>>());

        let joined = Batch::concat(&schema, &parts).unwrap();
        assert_eq!(batch, joined);
    }

    #[test]
    fn verify_against_schema() {
        let schema = Schema::try_new([Field::new("a", DataType::Int32)]).unwrap();
        let batch = Batch::try_new(vec![longs(vec![1])]).unwrap();
        assert!(batch.verify_schema(&schema).is_err());
    }
}
