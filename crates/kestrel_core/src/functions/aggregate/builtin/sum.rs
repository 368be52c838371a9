use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::Result;

use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage};
use crate::arrays::datatype::DataTypeId;
use crate::functions::Signature;
use crate::functions::aggregate::RawAggregateFunction;
use crate::functions::aggregate::conditional::IfAggregate;
use crate::functions::aggregate::simple::{AggregateState, SimpleUnaryAggregate, UnaryAggregate};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_SUM: AggregateFunctionSet = AggregateFunctionSet {
    name: "sum",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Sum of the non-null values in the group. Integers sum into a long.",
        arguments: &["value"],
        example: Some(Example {
            call: "sum(x)",
            output: "7",
        }),
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Int64),
            &SimpleUnaryAggregate::new(&Sum::<PhysicalI32, PhysicalI64>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &SimpleUnaryAggregate::new(&Sum::<PhysicalI64, PhysicalI64>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &SimpleUnaryAggregate::new(&Sum::<PhysicalF64, PhysicalF64>::new()),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan], DataTypeId::TimeSpan),
            &SimpleUnaryAggregate::new(&Sum::<PhysicalI64, PhysicalI64>::new()),
        ),
    ],
};

pub const FUNCTION_SET_SUMIF: AggregateFunctionSet = AggregateFunctionSet {
    name: "sumif",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Sum of the values in the group for which the predicate is true.",
        arguments: &["value", "predicate"],
        example: None,
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Boolean], DataTypeId::Int64),
            &IfAggregate::new(
                1,
                &SimpleUnaryAggregate::new(&Sum::<PhysicalI32, PhysicalI64>::new()),
            ),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Boolean], DataTypeId::Int64),
            &IfAggregate::new(
                1,
                &SimpleUnaryAggregate::new(&Sum::<PhysicalI64, PhysicalI64>::new()),
            ),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64, DataTypeId::Boolean], DataTypeId::Float64),
            &IfAggregate::new(
                1,
                &SimpleUnaryAggregate::new(&Sum::<PhysicalF64, PhysicalF64>::new()),
            ),
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan, DataTypeId::Boolean], DataTypeId::TimeSpan),
            &IfAggregate::new(
                1,
                &SimpleUnaryAggregate::new(&Sum::<PhysicalI64, PhysicalI64>::new()),
            ),
        ),
    ],
};

/// Accumulated type of a sum.
pub trait SumValue: Debug + Default + Copy + Send + 'static {
    fn add(self, other: Self) -> Self;
}

impl SumValue for i32 {
    fn add(self, other: Self) -> Self {
        self.wrapping_add(other)
    }
}

impl SumValue for i64 {
    fn add(self, other: Self) -> Self {
        self.wrapping_add(other)
    }
}

impl SumValue for f64 {
    fn add(self, other: Self) -> Self {
        self + other
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sum<I, O> {
    _s: PhantomData<(I, O)>,
}

impl<I, O> Sum<I, O> {
    pub const fn new() -> Self {
        Sum { _s: PhantomData }
    }
}

impl<I, O> UnaryAggregate for Sum<I, O>
where
    I: ScalarStorage,
    I::StorageType: Copy + Into<O::StorageType>,
    O: ScalarStorage,
    O::StorageType: SumValue,
{
    type Input = I;
    type Output = O;
    type GroupState = SumState<I::StorageType, O::StorageType>;
}

#[derive(Debug, Default)]
pub struct SumState<I, O> {
    sum: O,
    valid: bool,
    _input: PhantomData<I>,
}

impl<I, O> AggregateState<I, O> for SumState<I, O>
where
    I: Debug + Default + Copy + Into<O> + Send + 'static,
    O: SumValue,
{
    fn update(&mut self, input: &I) -> Result<()> {
        self.sum = self.sum.add((*input).into());
        self.valid = true;
        Ok(())
    }

    fn finalize(&mut self) -> Result<Option<O>> {
        Ok(self.valid.then_some(self.sum))
    }
}
