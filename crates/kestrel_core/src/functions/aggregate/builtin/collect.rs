use ahash::RandomState;
use hashbrown::HashSet;
use kestrel_error::{DbError, Result};
use serde_json::Value as JsonValue;

use crate::arrays::array::Array;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::scalar::ScalarValue;
use crate::arrays::scalar::key::RowKey;
use crate::functions::Signature;
use crate::functions::aggregate::conditional::IfAggregate;
use crate::functions::aggregate::{
    Accumulator,
    AggregateFunction,
    RawAggregateFunction,
    constant_arg,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;
use crate::hash::HASH_RANDOM_STATE;

/// Upper bound on collected elements when no size is given.
pub const DEFAULT_MAX_COLLECTED: usize = 1_048_576;

pub const FUNCTION_SET_MAKE_SET: AggregateFunctionSet = AggregateFunctionSet {
    name: "make_set",
    aliases: &[],
    doc: &[
        &Documentation {
            category: Category::COLLECTION_AGGREGATE,
            description: "Array of the distinct non-null values in the group, in first seen order.",
            arguments: &["value"],
            example: Some(Example {
                call: "make_set(x)",
                output: "[1,2,3]",
            }),
        },
        &Documentation {
            category: Category::COLLECTION_AGGREGATE,
            description: "Array of at most `max_size` distinct non-null values in the group.",
            arguments: &["value", "max_size"],
            example: None,
        },
    ],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Any], DataTypeId::Dynamic),
            &Collect::<true>,
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Any, DataTypeId::Int64], DataTypeId::Dynamic),
            &Collect::<true>,
        ),
    ],
};

pub const FUNCTION_SET_MAKE_SET_IF: AggregateFunctionSet = AggregateFunctionSet {
    name: "make_set_if",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::COLLECTION_AGGREGATE,
        description: "Array of the distinct values among rows for which the predicate is true.",
        arguments: &["value", "predicate", "max_size"],
        example: None,
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Any, DataTypeId::Boolean], DataTypeId::Dynamic),
            &IfAggregate::new(1, &Collect::<true>),
        ),
        RawAggregateFunction::new(
            &Signature::new(
                &[DataTypeId::Any, DataTypeId::Boolean, DataTypeId::Int64],
                DataTypeId::Dynamic,
            ),
            &IfAggregate::new(1, &Collect::<true>),
        ),
    ],
};

pub const FUNCTION_SET_MAKE_LIST: AggregateFunctionSet = AggregateFunctionSet {
    name: "make_list",
    aliases: &[],
    doc: &[
        &Documentation {
            category: Category::COLLECTION_AGGREGATE,
            description: "Array of the non-null values in the group, in input order.",
            arguments: &["value"],
            example: Some(Example {
                call: "make_list(x)",
                output: "[1,3,2,1]",
            }),
        },
        &Documentation {
            category: Category::COLLECTION_AGGREGATE,
            description: "Array of the first `max_size` non-null values in the group.",
            arguments: &["value", "max_size"],
            example: None,
        },
    ],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Any], DataTypeId::Dynamic),
            &Collect::<false>,
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Any, DataTypeId::Int64], DataTypeId::Dynamic),
            &Collect::<false>,
        ),
    ],
};

pub const FUNCTION_SET_MAKE_LIST_IF: AggregateFunctionSet = AggregateFunctionSet {
    name: "make_list_if",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::COLLECTION_AGGREGATE,
        description: "Array of the values among rows for which the predicate is true.",
        arguments: &["value", "predicate", "max_size"],
        example: None,
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Any, DataTypeId::Boolean], DataTypeId::Dynamic),
            &IfAggregate::new(1, &Collect::<false>),
        ),
        RawAggregateFunction::new(
            &Signature::new(
                &[DataTypeId::Any, DataTypeId::Boolean, DataTypeId::Int64],
                DataTypeId::Dynamic,
            ),
            &IfAggregate::new(1, &Collect::<false>),
        ),
    ],
};

/// Collects values into a json array. `DISTINCT` drops repeats.
#[derive(Debug, Clone, Copy)]
pub struct Collect<const DISTINCT: bool>;

impl<const DISTINCT: bool> AggregateFunction for Collect<DISTINCT> {
    fn new_accumulator(&self, _return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(CollectState::<DISTINCT> {
            values: Vec::new(),
            seen: HashSet::with_hasher(HASH_RANDOM_STATE),
            max_size: None,
        })
    }
}

#[derive(Debug)]
struct CollectState<const DISTINCT: bool> {
    values: Vec<JsonValue>,
    seen: HashSet<RowKey, RandomState>,
    max_size: Option<usize>,
}

impl<const DISTINCT: bool> Accumulator for CollectState<DISTINCT> {
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let max_size = match self.max_size {
            Some(max) => max,
            None => {
                let max = match constant_arg(inputs, 1, rows) {
                    Ok(Some(v)) if !v.is_null() => v.try_as_usize()?,
                    // No size argument.
                    _ => DEFAULT_MAX_COLLECTED,
                };
                self.max_size = Some(max);
                max
            }
        };

        let input = inputs
            .first()
            .ok_or_else(|| DbError::overload_mismatch("Collect expects a value input"))?;
        for &row in rows {
            if self.values.len() >= max_size {
                break;
            }
            if !input.is_valid(row) {
                continue;
            }
            let value = input.get(row)?;
            if DISTINCT && !self.seen.insert(RowKey(vec![value.clone()])) {
                continue;
            }
            self.values.push(value.to_json());
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        Ok(ScalarValue::Dynamic(JsonValue::Array(std::mem::take(
            &mut self.values,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::functions::aggregate::aggregate_all;

    fn values() -> Array {
        let values: Vec<ScalarValue> = [1_i64, 3, 2, 1].into_iter().map(ScalarValue::from).collect();
        Array::try_from_scalars(DataType::Int64, &values).unwrap()
    }

    fn constant(value: ScalarValue) -> Array {
        Array::repeat_scalar(&value, 4).unwrap()
    }

    #[test]
    fn make_list_in_order() {
        let out = aggregate_all(&FUNCTION_SET_MAKE_LIST.functions[0], &[values()], DataType::Dynamic)
            .unwrap();
        assert_eq!(ScalarValue::from(json!([1, 3, 2, 1])), out);

        let out = aggregate_all(
            &FUNCTION_SET_MAKE_LIST.functions[1],
            &[values(), constant(ScalarValue::from(2_i64))],
            DataType::Dynamic,
        )
        .unwrap();
        assert_eq!(ScalarValue::from(json!([1, 3])), out);
    }

    #[test]
    fn make_set_distinct() {
        let out = aggregate_all(&FUNCTION_SET_MAKE_SET.functions[0], &[values()], DataType::Dynamic)
            .unwrap();
        assert_eq!(ScalarValue::from(json!([1, 3, 2])), out);
    }

    #[test]
    fn make_list_if_with_limit() {
        let preds = Array::try_from_scalars(
            DataType::Boolean,
            &[
                ScalarValue::from(false),
                ScalarValue::from(true),
                ScalarValue::from(true),
                ScalarValue::from(false),
            ],
        )
        .unwrap();
        let out = aggregate_all(
            &FUNCTION_SET_MAKE_LIST_IF.functions[0],
            &[values(), preds],
            DataType::Dynamic,
        )
        .unwrap();
        assert_eq!(ScalarValue::from(json!([3, 2])), out);

        let out = aggregate_all(
            &FUNCTION_SET_MAKE_LIST_IF.functions[1],
            &[
                values(),
                constant(ScalarValue::from(true)),
                constant(ScalarValue::from(3_i64)),
            ],
            DataType::Dynamic,
        )
        .unwrap();
        assert_eq!(ScalarValue::from(json!([1, 3, 2])), out);
    }

    #[test]
    fn empty_group_is_empty_array() {
        let input = Array::new_null(DataType::Int64, 2);
        let out = aggregate_all(&FUNCTION_SET_MAKE_SET.functions[0], &[input], DataType::Dynamic)
            .unwrap();
        assert_eq!(ScalarValue::from(json!([])), out);
    }

    #[test]
    fn strings_stay_strings() {
        let input = Array::try_from_scalars(
            DataType::Utf8,
            &[ScalarValue::from("1"), ScalarValue::from("a")],
        )
        .unwrap();
        let out = aggregate_all(&FUNCTION_SET_MAKE_LIST.functions[0], &[input], DataType::Dynamic)
            .unwrap();
        assert_eq!(ScalarValue::from(json!(["1", "a"])), out);
    }
}
