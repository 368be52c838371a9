use kestrel_error::{DbError, Result};

use super::{OutBuffer, PutBuffer};
use crate::arrays::array::Array;
use crate::arrays::array::physical_type::ScalarStorage;
use crate::arrays::datatype::DataType;

#[derive(Debug, Clone)]
pub struct TernaryExecutor;

impl TernaryExecutor {
    /// Execute an operation over three inputs, skipping rows where any input
    /// is null.
    pub fn execute<S1, S2, S3, O, Op>(
        a: &Array,
        b: &Array,
        c: &Array,
        out_type: DataType,
        mut op: Op,
    ) -> Result<Array>
    where
        S1: ScalarStorage,
        S2: ScalarStorage,
        S3: ScalarStorage,
        O: ScalarStorage,
        Op: FnMut(&S1::StorageType, &S2::StorageType, &S3::StorageType, PutBuffer<O::StorageType>),
    {
        if a.len() != b.len() || a.len() != c.len() {
            return Err(DbError::new("Ternary executor inputs have different lengths"));
        }

        let a_values = S1::get_storage(a.data())?;
        let b_values = S2::get_storage(b.data())?;
        let c_values = S3::get_storage(c.data())?;
        let mut out = OutBuffer::<O>::new(a.len());

        for idx in 0..a.len() {
            if a.is_valid(idx) && b.is_valid(idx) && c.is_valid(idx) {
                op(
                    &a_values[idx],
                    &b_values[idx],
                    &c_values[idx],
                    out.put_buffer(idx),
                );
            }
        }

        out.into_array(out_type)
    }
}
