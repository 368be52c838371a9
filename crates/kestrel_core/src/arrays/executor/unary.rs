use kestrel_error::Result;

use super::{OutBuffer, PutBuffer};
use crate::arrays::array::Array;
use crate::arrays::array::physical_type::ScalarStorage;
use crate::arrays::datatype::DataType;

#[derive(Debug, Clone)]
pub struct UnaryExecutor;

impl UnaryExecutor {
    /// Execute a unary operation on every valid row of `array`.
    ///
    /// Null rows produce null outputs without invoking `op`.
    pub fn execute<S, O, Op>(array: &Array, out_type: DataType, mut op: Op) -> Result<Array>
    where
        S: ScalarStorage,
        O: ScalarStorage,
        Op: FnMut(&S::StorageType, PutBuffer<O::StorageType>),
    {
        let input = S::get_storage(array.data())?;
        let validity = array.validity();
        let mut out = OutBuffer::<O>::new(array.len());

        if validity.all_valid() {
            for (idx, value) in input.iter().enumerate() {
                op(value, out.put_buffer(idx));
            }
        } else {
            for (idx, value) in input.iter().enumerate() {
                if validity.is_valid(idx) {
                    op(value, out.put_buffer(idx));
                }
            }
        }

        out.into_array(out_type)
    }

    /// Visit the rows at `rows`, in order.
    pub fn for_each_selected<S, Op>(array: &Array, rows: &[usize], mut op: Op) -> Result<()>
    where
        S: ScalarStorage,
        Op: FnMut(Option<&S::StorageType>) -> Result<()>,
    {
        let input = S::get_storage(array.data())?;
        let validity = array.validity();

        for &idx in rows {
            if validity.is_valid(idx) {
                op(Some(&input[idx]))?;
            } else {
                op(None)?;
            }
        }

        Ok(())
    }
}
