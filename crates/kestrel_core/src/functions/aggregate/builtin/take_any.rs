use kestrel_error::{DbError, Result};

use crate::arrays::array::Array;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::scalar::ScalarValue;
use crate::functions::Signature;
use crate::functions::aggregate::{Accumulator, AggregateFunction, RawAggregateFunction};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;

/// `take_any(x)` keeps the name of its argument while `any(x)` produces
/// `any_x`. Naming is handled when the summarize is built.
pub const FUNCTION_SET_TAKE_ANY: AggregateFunctionSet = AggregateFunctionSet {
    name: "take_any",
    aliases: &["any"],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "An arbitrary non-null value from the group.",
        arguments: &["value"],
        example: Some(Example {
            call: "take_any(name)",
            output: "a",
        }),
    }],
    functions: &[RawAggregateFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Any),
        &TakeAny,
    )],
};

#[derive(Debug, Clone, Copy)]
pub struct TakeAny;

impl AggregateFunction for TakeAny {
    fn new_accumulator(&self, return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(TakeAnyState {
            value: None,
            return_type,
        })
    }
}

#[derive(Debug)]
struct TakeAnyState {
    value: Option<ScalarValue>,
    return_type: DataType,
}

impl Accumulator for TakeAnyState {
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()> {
        if self.value.is_some() {
            return Ok(());
        }
        let input = inputs
            .first()
            .ok_or_else(|| DbError::overload_mismatch("take_any expects one input"))?;

        // First valid row wins.
        if let Some(&row) = rows.iter().find(|&&row| input.is_valid(row)) {
            self.value = Some(input.get(row)?);
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        Ok(self
            .value
            .take()
            .unwrap_or_else(|| ScalarValue::null(self.return_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_valid_value() {
        let input = Array::try_from_scalars(
            DataType::Int64,
            &[
                ScalarValue::Int64(None),
                ScalarValue::from(4_i64),
                ScalarValue::from(5_i64),
            ],
        )
        .unwrap();

        let mut acc = FUNCTION_SET_TAKE_ANY.functions[0].new_accumulator(DataType::Int64);
        acc.update(&[&input], &[0]).unwrap();
        acc.update(&[&input], &[2, 1]).unwrap();
        assert_eq!(ScalarValue::from(5_i64), acc.finalize().unwrap());
    }

    #[test]
    fn resolves_to_input_type() {
        let resolved = FUNCTION_SET_TAKE_ANY.resolve(&[DataType::Utf8]).unwrap();
        assert_eq!(DataType::Utf8, resolved.return_type);
    }
}
