use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::Result;

use crate::arrays::array::physical_type::{
    PhysicalBool,
    PhysicalF64,
    PhysicalI32,
    PhysicalI64,
    PhysicalUtf8,
    ScalarStorage,
};
use crate::arrays::datatype::DataTypeId;
use crate::functions::Signature;
use crate::functions::aggregate::RawAggregateFunction;
use crate::functions::aggregate::simple::{AggregateState, SimpleUnaryAggregate, UnaryAggregate};
use crate::functions::documentation::{Category, Documentation};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_MIN: AggregateFunctionSet = AggregateFunctionSet {
    name: "min",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Smallest non-null value in the group.",
        arguments: &["value"],
        example: None,
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Boolean], DataTypeId::Boolean),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalBool, false>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Int32),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI32, false>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI64, false>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalF64, false>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Utf8], DataTypeId::Utf8),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalUtf8, false>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::DateTime], DataTypeId::DateTime),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI64, false>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan], DataTypeId::TimeSpan),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI64, false>::new()),
        ),
    ],
};

pub const FUNCTION_SET_MAX: AggregateFunctionSet = AggregateFunctionSet {
    name: "max",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Largest non-null value in the group.",
        arguments: &["value"],
        example: None,
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Boolean], DataTypeId::Boolean),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalBool, true>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Int32),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI32, true>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI64, true>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalF64, true>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Utf8], DataTypeId::Utf8),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalUtf8, true>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::DateTime], DataTypeId::DateTime),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI64, true>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan], DataTypeId::TimeSpan),
            &SimpleUnaryAggregate::new(&MinMax::<PhysicalI64, true>::new()),
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct MinMax<S, const MAX: bool> {
    _s: PhantomData<S>,
}

impl<S, const MAX: bool> MinMax<S, MAX> {
    pub const fn new() -> Self {
        MinMax { _s: PhantomData }
    }
}

impl<S, const MAX: bool> UnaryAggregate for MinMax<S, MAX>
where
    S: ScalarStorage,
    S::StorageType: PartialOrd,
{
    type Input = S;
    type Output = S;
    type GroupState = MinMaxState<S::StorageType, MAX>;
}

#[derive(Debug)]
pub struct MinMaxState<T, const MAX: bool> {
    value: Option<T>,
}

impl<T, const MAX: bool> Default for MinMaxState<T, MAX> {
    fn default() -> Self {
        MinMaxState { value: None }
    }
}

impl<T, const MAX: bool> AggregateState<T, T> for MinMaxState<T, MAX>
where
    T: PartialOrd + Clone + Debug + Send + 'static,
{
    fn update(&mut self, input: &T) -> Result<()> {
        let replace = match &self.value {
            None => true,
            Some(current) if MAX => input > current,
            Some(current) => input < current,
        };
        if replace {
            self.value = Some(input.clone());
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<Option<T>> {
        Ok(self.value.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::Array;
    use crate::arrays::datatype::DataType;
    use crate::arrays::scalar::ScalarValue;
    use crate::functions::aggregate::aggregate_all;

    #[test]
    fn min_and_max_longs() {
        let input = Array::try_from_scalars(
            DataType::Int64,
            &[
                ScalarValue::from(3_i64),
                ScalarValue::Int64(None),
                ScalarValue::from(-1_i64),
                ScalarValue::from(7_i64),
            ],
        )
        .unwrap();

        let min = FUNCTION_SET_MIN.resolve(&[DataType::Int64]).unwrap();
        let max = FUNCTION_SET_MAX.resolve(&[DataType::Int64]).unwrap();
        assert_eq!(
            ScalarValue::from(-1_i64),
            aggregate_all(min.function, &[input.clone()], min.return_type).unwrap()
        );
        assert_eq!(
            ScalarValue::from(7_i64),
            aggregate_all(max.function, &[input], max.return_type).unwrap()
        );
    }

    #[test]
    fn empty_state_is_null() {
        let mut state = MinMaxState::<String, false>::default();
        assert_eq!(None, state.finalize().unwrap());

        let mut state = MinMaxState::<f64, true>::default();
        state.update(&1.5).unwrap();
        state.update(&-2.0).unwrap();
        assert_eq!(Some(1.5), state.finalize().unwrap());
    }

    #[test]
    fn max_keeps_datetime_kind() {
        let input = Array::try_from_scalars(
            DataType::DateTime,
            &[ScalarValue::datetime(10), ScalarValue::datetime(20)],
        )
        .unwrap();
        let max = FUNCTION_SET_MAX.resolve(&[DataType::DateTime]).unwrap();
        assert_eq!(
            ScalarValue::datetime(20),
            aggregate_all(max.function, &[input], max.return_type).unwrap()
        );
    }

    #[test]
    fn min_string() {
        let input = Array::try_from_scalars(
            DataType::Utf8,
            &[ScalarValue::from("b"), ScalarValue::from("a")],
        )
        .unwrap();
        let min = FUNCTION_SET_MIN.resolve(&[DataType::Utf8]).unwrap();
        assert_eq!(
            ScalarValue::from("a"),
            aggregate_all(min.function, &[input], min.return_type).unwrap()
        );
    }
}
