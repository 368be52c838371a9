use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::{DbError, Result};
use num_traits::ToPrimitive;

use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage};
use crate::arrays::datatype::DataTypeId;
use crate::functions::Signature;
use crate::functions::aggregate::RawAggregateFunction;
use crate::functions::aggregate::conditional::IfAggregate;
use crate::functions::aggregate::simple::{AggregateState, SimpleUnaryAggregate, UnaryAggregate};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_AVG: AggregateFunctionSet = AggregateFunctionSet {
    name: "avg",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::STATISTICAL_AGGREGATE,
        description: "Average of the non-null values in the group.",
        arguments: &["value"],
        example: Some(Example {
            call: "avg(x)",
            output: "2.5",
        }),
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Float64),
            &SimpleUnaryAggregate::new(&Avg::<PhysicalI32>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Float64),
            &SimpleUnaryAggregate::new(&Avg::<PhysicalI64>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &SimpleUnaryAggregate::new(&Avg::<PhysicalF64>::new()),
        ),
    ],
};

pub const FUNCTION_SET_AVGIF: AggregateFunctionSet = AggregateFunctionSet {
    name: "avgif",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::STATISTICAL_AGGREGATE,
        description: "Average of the values in the group for which the predicate is true.",
        arguments: &["value", "predicate"],
        example: None,
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Boolean], DataTypeId::Float64),
            &IfAggregate::new(1, &SimpleUnaryAggregate::new(&Avg::<PhysicalI32>::new())),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Boolean], DataTypeId::Float64),
            &IfAggregate::new(1, &SimpleUnaryAggregate::new(&Avg::<PhysicalI64>::new())),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64, DataTypeId::Boolean], DataTypeId::Float64),
            &IfAggregate::new(1, &SimpleUnaryAggregate::new(&Avg::<PhysicalF64>::new())),
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct Avg<S> {
    _s: PhantomData<S>,
}

impl<S> Avg<S> {
    pub const fn new() -> Self {
        Avg { _s: PhantomData }
    }
}

impl<S> UnaryAggregate for Avg<S>
where
    S: ScalarStorage,
    S::StorageType: ToPrimitive,
{
    type Input = S;
    type Output = PhysicalF64;
    type GroupState = AvgState<S::StorageType>;
}

#[derive(Debug, Default)]
pub struct AvgState<T> {
    sum: f64,
    count: u64,
    _t: PhantomData<T>,
}

impl<T> AggregateState<T, f64> for AvgState<T>
where
    T: ToPrimitive + Debug + Default + Send + 'static,
{
    fn update(&mut self, input: &T) -> Result<()> {
        let v = input
            .to_f64()
            .ok_or_else(|| DbError::new("Value not representable as a real"))?;
        self.sum += v;
        self.count += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<Option<f64>> {
        if self.count == 0 {
            return Ok(None);
        }
        Ok(Some(self.sum / self.count as f64))
    }
}
