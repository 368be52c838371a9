use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{
    PhysicalBool,
    PhysicalF64,
    PhysicalI32,
    PhysicalI64,
    PhysicalUtf8,
    ScalarStorage,
};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::BinaryExecutor;
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

// Expands to the comparison overloads for every comparable type.
macro_rules! comparison_functions {
    ($op:ty) => {
        &[
            RawScalarFunction::new(
                &Signature::new(
                    &[DataTypeId::Boolean, DataTypeId::Boolean],
                    DataTypeId::Boolean,
                ),
                &Compare::<PhysicalBool, $op>::new(),
            ),
            RawScalarFunction::new(
                &Signature::new(&[DataTypeId::Int32, DataTypeId::Int32], DataTypeId::Boolean),
                &Compare::<PhysicalI32, $op>::new(),
            ),
            RawScalarFunction::new(
                &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Boolean),
                &Compare::<PhysicalI64, $op>::new(),
            ),
            RawScalarFunction::new(
                &Signature::new(
                    &[DataTypeId::Float64, DataTypeId::Float64],
                    DataTypeId::Boolean,
                ),
                &Compare::<PhysicalF64, $op>::new(),
            ),
            RawScalarFunction::new(
                &Signature::new(&[DataTypeId::Utf8, DataTypeId::Utf8], DataTypeId::Boolean),
                &Compare::<PhysicalUtf8, $op>::new(),
            ),
            RawScalarFunction::new(
                &Signature::new(
                    &[DataTypeId::DateTime, DataTypeId::DateTime],
                    DataTypeId::Boolean,
                ),
                &Compare::<PhysicalI64, $op>::new(),
            ),
            RawScalarFunction::new(
                &Signature::new(
                    &[DataTypeId::TimeSpan, DataTypeId::TimeSpan],
                    DataTypeId::Boolean,
                ),
                &Compare::<PhysicalI64, $op>::new(),
            ),
        ]
    };
}

const fn comparison_doc(description: &'static str, call: &'static str) -> Documentation {
    Documentation {
        category: Category::COMPARISON_OPERATOR,
        description,
        arguments: &["left", "right"],
        example: Some(Example {
            call,
            output: "True",
        }),
    }
}

pub const FUNCTION_SET_EQ: ScalarFunctionSet = ScalarFunctionSet {
    name: "equals",
    aliases: &["=="],
    doc: &[&comparison_doc("Check if two values are equal.", "1 == 1")],
    functions: comparison_functions!(EqOp),
};

pub const FUNCTION_SET_NEQ: ScalarFunctionSet = ScalarFunctionSet {
    name: "not_equals",
    aliases: &["!="],
    doc: &[&comparison_doc("Check if two values are not equal.", "1 != 2")],
    functions: comparison_functions!(NotEqOp),
};

pub const FUNCTION_SET_LT: ScalarFunctionSet = ScalarFunctionSet {
    name: "less_than",
    aliases: &["<"],
    doc: &[&comparison_doc("Check if the left value is less than the right.", "1 < 2")],
    functions: comparison_functions!(LtOp),
};

pub const FUNCTION_SET_LT_EQ: ScalarFunctionSet = ScalarFunctionSet {
    name: "less_than_or_equal",
    aliases: &["<="],
    doc: &[&comparison_doc(
        "Check if the left value is less than or equal to the right.",
        "1 <= 1",
    )],
    functions: comparison_functions!(LtEqOp),
};

pub const FUNCTION_SET_GT: ScalarFunctionSet = ScalarFunctionSet {
    name: "greater_than",
    aliases: &[">"],
    doc: &[&comparison_doc(
        "Check if the left value is greater than the right.",
        "2 > 1",
    )],
    functions: comparison_functions!(GtOp),
};

pub const FUNCTION_SET_GT_EQ: ScalarFunctionSet = ScalarFunctionSet {
    name: "greater_than_or_equal",
    aliases: &[">="],
    doc: &[&comparison_doc(
        "Check if the left value is greater than or equal to the right.",
        "2 >= 2",
    )],
    functions: comparison_functions!(GtEqOp),
};

pub const FUNCTION_SET_EQ_CI: ScalarFunctionSet = ScalarFunctionSet {
    name: "equals_ci",
    aliases: &["=~"],
    doc: &[&comparison_doc(
        "Case-insensitive string equality.",
        "'abc' =~ 'ABC'",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8, DataTypeId::Utf8], DataTypeId::Boolean),
        &CaseInsensitiveEq { negate: false },
    )],
};

pub const FUNCTION_SET_NEQ_CI: ScalarFunctionSet = ScalarFunctionSet {
    name: "not_equals_ci",
    aliases: &["!~"],
    doc: &[&comparison_doc(
        "Case-insensitive string inequality.",
        "'abc' !~ 'abd'",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8, DataTypeId::Utf8], DataTypeId::Boolean),
        &CaseInsensitiveEq { negate: true },
    )],
};

pub trait ComparisonOperation: Debug + Sync + Send + Copy + 'static {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized;
}

#[derive(Debug, Clone, Copy)]
pub struct EqOp;

impl ComparisonOperation for EqOp {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized,
    {
        left == right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotEqOp;

impl ComparisonOperation for NotEqOp {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized,
    {
        left != right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LtOp;

impl ComparisonOperation for LtOp {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized,
    {
        left < right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LtEqOp;

impl ComparisonOperation for LtEqOp {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized,
    {
        left <= right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GtOp;

impl ComparisonOperation for GtOp {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized,
    {
        left > right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GtEqOp;

impl ComparisonOperation for GtEqOp {
    fn compare<T>(left: &T, right: &T) -> bool
    where
        T: PartialEq + PartialOrd + ?Sized,
    {
        left >= right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Compare<S, O> {
    _s: PhantomData<S>,
    _o: PhantomData<O>,
}

impl<S, O> Compare<S, O> {
    pub const fn new() -> Self {
        Compare {
            _s: PhantomData,
            _o: PhantomData,
        }
    }
}

impl<S, O> ScalarFunction for Compare<S, O>
where
    S: ScalarStorage,
    S::StorageType: PartialEq + PartialOrd,
    O: ComparisonOperation,
{
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        BinaryExecutor::execute::<S, S, PhysicalBool, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |a, b, buf| buf.put(O::compare(a, b)),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CaseInsensitiveEq {
    negate: bool,
}

impl ScalarFunction for CaseInsensitiveEq {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        let negate = self.negate;
        BinaryExecutor::execute::<PhysicalUtf8, PhysicalUtf8, PhysicalBool, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |a, b, buf| buf.put((a.to_lowercase() == b.to_lowercase()) != negate),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;
    use crate::functions::cast::cast_scalar;

    #[test]
    fn mixed_numeric_comparisons() {
        let test_cases = [
            (&FUNCTION_SET_GT, ScalarValue::from(1_i64), ScalarValue::from(1.5), false),
            (&FUNCTION_SET_GT, ScalarValue::from(2_i64), ScalarValue::from(1.5), true),
            (&FUNCTION_SET_EQ, ScalarValue::from("a"), ScalarValue::from("a"), true),
            (&FUNCTION_SET_NEQ, ScalarValue::from("a"), ScalarValue::from("b"), true),
            (&FUNCTION_SET_EQ_CI, ScalarValue::from("aBc"), ScalarValue::from("ABC"), true),
            (&FUNCTION_SET_LT_EQ, ScalarValue::from(2_i32), ScalarValue::from(2_i64), true),
        ];

        for case in test_cases {
            let types = [case.1.datatype(), case.2.datatype()];
            let resolved = case.0.resolve(&types).unwrap();
            let args: Vec<_> = [&case.1, &case.2]
                .into_iter()
                .zip(&resolved.casts)
                .map(|(value, cast)| match cast {
                    Some(to) => cast_scalar(value, *to),
                    None => value.clone(),
                })
                .collect();
            let out = resolved
                .function
                .execute_scalar(&args, resolved.return_type)
                .unwrap();
            assert_eq!(ScalarValue::from(case.3), out, "case: {case:?}");
        }
    }
}
