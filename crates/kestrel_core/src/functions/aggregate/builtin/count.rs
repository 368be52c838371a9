use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::scalar::ScalarValue;
use crate::functions::Signature;
use crate::functions::aggregate::conditional::IfAggregate;
use crate::functions::aggregate::{Accumulator, AggregateFunction, RawAggregateFunction};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_COUNT: AggregateFunctionSet = AggregateFunctionSet {
    name: "count",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Number of rows in the group.",
        arguments: &[],
        example: Some(Example {
            call: "count()",
            output: "3",
        }),
    }],
    functions: &[RawAggregateFunction::new(
        &Signature::new(&[], DataTypeId::Int64),
        &CountRows,
    )],
};

pub const FUNCTION_SET_COUNTIF: AggregateFunctionSet = AggregateFunctionSet {
    name: "countif",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Number of rows in the group for which the predicate is true.",
        arguments: &["predicate"],
        example: None,
    }],
    functions: &[RawAggregateFunction::new(
        &Signature::new(&[DataTypeId::Boolean], DataTypeId::Int64),
        &IfAggregate::new(0, &CountRows),
    )],
};

#[derive(Debug, Clone, Copy)]
pub struct CountRows;

impl AggregateFunction for CountRows {
    fn new_accumulator(&self, _return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(CountRowsState::default())
    }
}

#[derive(Debug, Default)]
struct CountRowsState {
    count: i64,
}

impl Accumulator for CountRowsState {
    fn update(&mut self, _inputs: &[&Array], rows: &[usize]) -> Result<()> {
        self.count += rows.len() as i64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        Ok(ScalarValue::from(self.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::physical_type::PhysicalBool;
    use crate::functions::aggregate::aggregate_all;

    #[test]
    fn count_rows() {
        let mut acc = FUNCTION_SET_COUNT.functions[0].new_accumulator(DataType::Int64);
        acc.update(&[], &[0, 1, 2]).unwrap();
        acc.update(&[], &[5]).unwrap();
        assert_eq!(ScalarValue::from(4_i64), acc.finalize().unwrap());
    }

    #[test]
    fn countif_skips_false_and_null() {
        let preds = Array::try_from_scalars(
            DataType::Boolean,
            &[
                ScalarValue::from(true),
                ScalarValue::from(false),
                ScalarValue::Boolean(None),
                ScalarValue::from(true),
                ScalarValue::from(true),
            ],
        )
        .unwrap();

        let out = aggregate_all(&FUNCTION_SET_COUNTIF.functions[0], &[preds], DataType::Int64).unwrap();
        assert_eq!(ScalarValue::from(3_i64), out);
    }

    #[test]
    fn countif_empty_is_zero() {
        let preds = Array::try_from_values::<PhysicalBool>(DataType::Boolean, vec![false]).unwrap();
        let out = aggregate_all(&FUNCTION_SET_COUNTIF.functions[0], &[preds], DataType::Int64).unwrap();
        assert_eq!(ScalarValue::from(0_i64), out);
    }
}
