use ahash::RandomState;
use hashbrown::HashSet;
use kestrel_error::{DbError, Result};

use crate::arrays::array::Array;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::scalar::ScalarValue;
use crate::arrays::scalar::key::RowKey;
use crate::functions::Signature;
use crate::functions::aggregate::conditional::IfAggregate;
use crate::functions::aggregate::{Accumulator, AggregateFunction, RawAggregateFunction};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;
use crate::hash::HASH_RANDOM_STATE;

pub const FUNCTION_SET_DCOUNT: AggregateFunctionSet = AggregateFunctionSet {
    name: "dcount",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::STATISTICAL_AGGREGATE,
        description: "Exact number of distinct non-null values in the group. Empty strings are counted.",
        arguments: &["value"],
        example: Some(Example {
            call: "dcount(x)",
            output: "3",
        }),
    }],
    functions: &[RawAggregateFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Int64),
        &DistinctCount,
    )],
};

pub const FUNCTION_SET_DCOUNTIF: AggregateFunctionSet = AggregateFunctionSet {
    name: "dcountif",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::STATISTICAL_AGGREGATE,
        description: "Number of distinct values among rows for which the predicate is true.",
        arguments: &["value", "predicate"],
        example: None,
    }],
    functions: &[RawAggregateFunction::new(
        &Signature::new(&[DataTypeId::Any, DataTypeId::Boolean], DataTypeId::Int64),
        &IfAggregate::new(1, &DistinctCount),
    )],
};

#[derive(Debug, Clone, Copy)]
pub struct DistinctCount;

impl AggregateFunction for DistinctCount {
    fn new_accumulator(&self, _return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(DistinctCountState {
            seen: HashSet::with_hasher(HASH_RANDOM_STATE),
        })
    }
}

#[derive(Debug)]
struct DistinctCountState {
    seen: HashSet<RowKey, RandomState>,
}

impl Accumulator for DistinctCountState {
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()> {
        let input = inputs
            .first()
            .ok_or_else(|| DbError::overload_mismatch("dcount expects a value input"))?;
        for &row in rows {
            if input.is_valid(row) {
                self.seen.insert(RowKey(vec![input.get(row)?]));
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        Ok(ScalarValue::from(self.seen.len() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::aggregate::aggregate_all;

    #[test]
    fn ignores_null_ints() {
        let input = Array::try_from_scalars(
            DataType::Int32,
            &[
                ScalarValue::from(1),
                ScalarValue::from(2),
                ScalarValue::Int32(None),
                ScalarValue::from(2),
                ScalarValue::from(3),
            ],
        )
        .unwrap();
        let out = aggregate_all(&FUNCTION_SET_DCOUNT.functions[0], &[input], DataType::Int64).unwrap();
        assert_eq!(ScalarValue::from(3_i64), out);
    }

    #[test]
    fn counts_empty_strings() {
        let input = Array::try_from_scalars(
            DataType::Utf8,
            &[
                ScalarValue::from("a"),
                ScalarValue::from(""),
                ScalarValue::from("b"),
                ScalarValue::Utf8(None),
                ScalarValue::from("c"),
            ],
        )
        .unwrap();
        let out = aggregate_all(&FUNCTION_SET_DCOUNT.functions[0], &[input], DataType::Int64).unwrap();
        assert_eq!(ScalarValue::from(4_i64), out);
    }

    #[test]
    fn dcountif_filters() {
        let values = Array::try_from_scalars(
            DataType::Int64,
            &[
                ScalarValue::from(1_i64),
                ScalarValue::from(1_i64),
                ScalarValue::from(2_i64),
                ScalarValue::from(3_i64),
            ],
        )
        .unwrap();
        let preds = Array::try_from_scalars(
            DataType::Boolean,
            &[
                ScalarValue::from(true),
                ScalarValue::from(true),
                ScalarValue::from(true),
                ScalarValue::from(false),
            ],
        )
        .unwrap();
        let out = aggregate_all(&FUNCTION_SET_DCOUNTIF.functions[0], &[values, preds], DataType::Int64)
            .unwrap();
        assert_eq!(ScalarValue::from(2_i64), out);
    }
}
