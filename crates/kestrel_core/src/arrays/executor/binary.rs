use kestrel_error::{DbError, Result};

use super::{OutBuffer, PutBuffer};
use crate::arrays::array::Array;
use crate::arrays::array::physical_type::ScalarStorage;
use crate::arrays::datatype::DataType;

#[derive(Debug, Clone)]
pub struct BinaryExecutor;

impl BinaryExecutor {
    /// Execute a binary operation row by row. A null on either side produces
    /// a null output.
    pub fn execute<S1, S2, O, Op>(
        left: &Array,
        right: &Array,
        out_type: DataType,
        mut op: Op,
    ) -> Result<Array>
    where
        S1: ScalarStorage,
        S2: ScalarStorage,
        O: ScalarStorage,
        Op: FnMut(&S1::StorageType, &S2::StorageType, PutBuffer<O::StorageType>),
    {
        if left.len() != right.len() {
            return Err(DbError::new("Binary executor inputs have different lengths")
                .with_field("left", left.len())
                .with_field("right", right.len()));
        }

        let left_values = S1::get_storage(left.data())?;
        let right_values = S2::get_storage(right.data())?;
        let mut out = OutBuffer::<O>::new(left.len());

        let all_valid = left.validity().all_valid() && right.validity().all_valid();

        for idx in 0..left.len() {
            if all_valid || (left.is_valid(idx) && right.is_valid(idx)) {
                op(&left_values[idx], &right_values[idx], out.put_buffer(idx));
            }
        }

        out.into_array(out_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::physical_type::PhysicalF64;
    use crate::arrays::scalar::ScalarValue;

    #[test]
    fn null_on_either_side() {
        let left = Array::try_from_scalars(
            DataType::Float64,
            &[ScalarValue::from(1.0), ScalarValue::Float64(None), ScalarValue::from(3.0)],
        )
        .unwrap();
        let right = Array::try_from_scalars(
            DataType::Float64,
            &[ScalarValue::from(2.0), ScalarValue::from(2.0), ScalarValue::Float64(None)],
        )
        .unwrap();

        let out = BinaryExecutor::execute::<PhysicalF64, PhysicalF64, PhysicalF64, _>(
            &left,
            &right,
            DataType::Float64,
            |a, b, buf| buf.put(a + b),
        )
        .unwrap();

        assert_eq!(ScalarValue::from(3.0), out.get(0).unwrap());
        assert_eq!(ScalarValue::Float64(None), out.get(1).unwrap());
        assert_eq!(ScalarValue::Float64(None), out.get(2).unwrap());
    }
}
