use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::PhysicalI64;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::OutBuffer;
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::WindowFunctionSet;
use crate::functions::window::{
    RawWindowFunction,
    WindowFunction,
    WindowState,
    check_rows,
    restart_at,
};

pub const FUNCTION_SET_ROW_NUMBER: WindowFunctionSet = WindowFunctionSet {
    name: "row_number",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Window,
        description: "Index of the row in the table, counting from `start` (1 by default). A true restart flag starts counting again at that row.",
        arguments: &["start", "restart"],
        example: Some(Example {
            call: "row_number()",
            output: "1, 2, 3",
        }),
    }],
    functions: &[
        RawWindowFunction::new(&Signature::new(&[], DataTypeId::Int64), &RowNumber),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &RowNumber,
        ),
        RawWindowFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Boolean], DataTypeId::Int64),
            &RowNumber,
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct RowNumber;

impl WindowFunction for RowNumber {
    fn new_state(&self, _return_type: DataType) -> Box<dyn WindowState> {
        Box::new(RowNumberState { next: None })
    }
}

#[derive(Debug)]
struct RowNumberState {
    next: Option<i64>,
}

impl WindowState for RowNumberState {
    fn apply(&mut self, inputs: &[Array], num_rows: usize) -> Result<Array> {
        check_rows(inputs, num_rows)?;

        let mut out = OutBuffer::<PhysicalI64>::new(num_rows);
        for row in 0..num_rows {
            let start = match inputs.first() {
                Some(start) => start.get(row)?.try_as_i64()?.unwrap_or(1),
                None => 1,
            };
            let current = match self.next {
                Some(next) if !restart_at(inputs, 1, row)? => next,
                _ => start,
            };
            out.put_buffer(row).put(current);
            self.next = Some(current + 1);
        }

        out.into_array(DataType::Int64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::physical_type::PhysicalBool;
    use crate::arrays::scalar::ScalarValue;

    fn collect(array: &Array) -> Vec<ScalarValue> {
        array.iter_scalars().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn counts_from_one_across_chunks() {
        let mut state = FUNCTION_SET_ROW_NUMBER.functions[0].new_state(DataType::Int64);
        let first = state.apply(&[], 2).unwrap();
        let second = state.apply(&[], 1).unwrap();

        assert_eq!(vec![ScalarValue::from(1_i64), ScalarValue::from(2_i64)], collect(&first));
        assert_eq!(vec![ScalarValue::from(3_i64)], collect(&second));
    }

    #[test]
    fn start_and_restart() {
        let start = Array::repeat_scalar(&ScalarValue::from(10_i64), 4).unwrap();
        let restart =
            Array::try_from_values::<PhysicalBool>(DataType::Boolean, vec![false, false, true, false])
                .unwrap();

        let mut state = FUNCTION_SET_ROW_NUMBER.functions[2].new_state(DataType::Int64);
        let out = state.apply(&[start, restart], 4).unwrap();
        let expected: Vec<ScalarValue> =
            [10_i64, 11, 10, 11].into_iter().map(ScalarValue::from).collect();
        assert_eq!(expected, collect(&out));
    }
}
