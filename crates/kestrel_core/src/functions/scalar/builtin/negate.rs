use std::marker::PhantomData;

use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::UnaryExecutor;
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_NEGATE: ScalarFunctionSet = ScalarFunctionSet {
    name: "negate",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Returns the negation of the input value.",
        arguments: &["value"],
        example: Some(Example {
            call: "-(5)",
            output: "-5",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Int32),
            &Negate::<PhysicalI32>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &Negate::<PhysicalI64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &Negate::<PhysicalF64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan], DataTypeId::TimeSpan),
            &Negate::<PhysicalI64>::new(),
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct Negate<S> {
    _s: PhantomData<S>,
}

impl<S> Negate<S> {
    pub const fn new() -> Self {
        Negate { _s: PhantomData }
    }
}

impl<S> ScalarFunction for Negate<S>
where
    S: ScalarStorage,
    S::StorageType: std::ops::Neg<Output = S::StorageType> + Copy,
{
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<S, S, _>(&inputs[0], return_type, |&a, buf| buf.put(-a))
    }
}
