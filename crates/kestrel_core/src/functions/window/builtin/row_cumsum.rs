use std::marker::PhantomData;

use kestrel_error::{DbError, Result};

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::OutBuffer;
use crate::functions::Signature;
use crate::functions::aggregate::builtin::sum::SumValue;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::WindowFunctionSet;
use crate::functions::window::{
    RawWindowFunction,
    WindowFunction,
    WindowState,
    check_rows,
    restart_at,
};

pub const FUNCTION_SET_ROW_CUMSUM: WindowFunctionSet = WindowFunctionSet {
    name: "row_cumsum",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Window,
        description: "Running sum of the value over the rows of the table. A true restart flag starts a new sum at that row.",
        arguments: &["value", "restart"],
        example: Some(Example {
            call: "row_cumsum(v, false)",
            output: "1, 3, 6",
        }),
    }],
    functions: &[
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Int32),
            &RowCumSum::<PhysicalI32>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &RowCumSum::<PhysicalI64>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &RowCumSum::<PhysicalF64>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan], DataTypeId::TimeSpan),
            &RowCumSum::<PhysicalI64>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Boolean], DataTypeId::Int32),
            &RowCumSum::<PhysicalI32>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Boolean], DataTypeId::Int64),
            &RowCumSum::<PhysicalI64>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Float64, DataTypeId::Boolean], DataTypeId::Float64),
            &RowCumSum::<PhysicalF64>::new(),
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan, DataTypeId::Boolean], DataTypeId::TimeSpan),
            &RowCumSum::<PhysicalI64>::new(),
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct RowCumSum<S> {
    _s: PhantomData<S>,
}

impl<S> RowCumSum<S> {
    pub const fn new() -> Self {
        RowCumSum { _s: PhantomData }
    }
}

impl<S> WindowFunction for RowCumSum<S>
where
    S: ScalarStorage,
    S::StorageType: SumValue,
{
    fn new_state(&self, return_type: DataType) -> Box<dyn WindowState> {
        Box::new(RowCumSumState::<S> {
            sum: S::StorageType::default(),
            return_type,
        })
    }
}

#[derive(Debug)]
struct RowCumSumState<S: ScalarStorage> {
    sum: S::StorageType,
    return_type: DataType,
}

impl<S> WindowState for RowCumSumState<S>
where
    S: ScalarStorage,
    S::StorageType: SumValue,
{
    fn apply(&mut self, inputs: &[Array], num_rows: usize) -> Result<Array> {
        check_rows(inputs, num_rows)?;
        let values = inputs
            .first()
            .ok_or_else(|| DbError::overload_mismatch("row_cumsum expects a value input"))?;
        let storage = S::get_storage(values.data())?;

        let mut out = OutBuffer::<S>::new(num_rows);
        for row in 0..num_rows {
            if restart_at(inputs, 1, row)? {
                self.sum = S::StorageType::default();
            }
            // Null values add nothing.
            if values.is_valid(row) {
                self.sum = self.sum.add(storage[row]);
            }
            out.put_buffer(row).put(self.sum);
        }

        out.into_array(self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::physical_type::PhysicalBool;
    use crate::arrays::scalar::ScalarValue;

    fn longs(values: Vec<i64>) -> Array {
        Array::try_from_values::<PhysicalI64>(DataType::Int64, values).unwrap()
    }

    fn collect(array: &Array) -> Vec<ScalarValue> {
        array.iter_scalars().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn carries_across_chunks() {
        let resolved = FUNCTION_SET_ROW_CUMSUM
            .resolve(&[DataType::Int64, DataType::Boolean])
            .unwrap();
        let mut state = resolved.function.new_state(resolved.return_type);
        let no_restart = |n| Array::repeat_scalar(&ScalarValue::from(false), n).unwrap();

        let first = state.apply(&[longs(vec![1, 2, 3]), no_restart(3)], 3).unwrap();
        let second = state.apply(&[longs(vec![1, 2, 3]), no_restart(3)], 3).unwrap();

        let expected: Vec<ScalarValue> = [1_i64, 3, 6].into_iter().map(ScalarValue::from).collect();
        assert_eq!(expected, collect(&first));
        let expected: Vec<ScalarValue> = [7_i64, 9, 12].into_iter().map(ScalarValue::from).collect();
        assert_eq!(expected, collect(&second));
    }

    #[test]
    fn restart_seeds_from_row() {
        let values = Array::try_from_values::<PhysicalI32>(DataType::Int32, vec![1, 2, 3, 4]).unwrap();
        let restart =
            Array::try_from_values::<PhysicalBool>(DataType::Boolean, vec![false, false, true, false])
                .unwrap();

        let resolved = FUNCTION_SET_ROW_CUMSUM
            .resolve(&[DataType::Int32, DataType::Boolean])
            .unwrap();
        assert_eq!(DataType::Int32, resolved.return_type);

        let mut state = resolved.function.new_state(resolved.return_type);
        let out = state.apply(&[values, restart], 4).unwrap();
        let expected: Vec<ScalarValue> = [1, 3, 3, 7].into_iter().map(ScalarValue::from).collect();
        assert_eq!(expected, collect(&out));
    }
}
