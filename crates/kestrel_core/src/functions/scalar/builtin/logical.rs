use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalBool, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::{OutBuffer, UnaryExecutor};
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_AND: ScalarFunctionSet = ScalarFunctionSet {
    name: "and",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::LOGICAL_OPERATOR,
        description: "Logical conjunction using three-valued logic. `null and false` is false.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "true and false",
            output: "False",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(
            &[DataTypeId::Boolean, DataTypeId::Boolean],
            DataTypeId::Boolean,
        ),
        &And,
    )],
};

pub const FUNCTION_SET_OR: ScalarFunctionSet = ScalarFunctionSet {
    name: "or",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::LOGICAL_OPERATOR,
        description: "Logical disjunction using three-valued logic. `null or true` is true.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "true or false",
            output: "True",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(
            &[DataTypeId::Boolean, DataTypeId::Boolean],
            DataTypeId::Boolean,
        ),
        &Or,
    )],
};

pub const FUNCTION_SET_NOT: ScalarFunctionSet = ScalarFunctionSet {
    name: "not",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::LOGICAL_OPERATOR,
        description: "Logical negation. The negation of null is null.",
        arguments: &["value"],
        example: Some(Example {
            call: "not(true)",
            output: "False",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Boolean], DataTypeId::Boolean),
        &Not,
    )],
};

/// Nullable view of a boolean row.
fn bool_at(values: &[bool], array: &Array, idx: usize) -> Option<bool> {
    array.is_valid(idx).then(|| values[idx])
}

#[derive(Debug, Clone, Copy)]
pub struct And;

impl ScalarFunction for And {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let left = PhysicalBool::get_storage(inputs[0].data())?;
        let right = PhysicalBool::get_storage(inputs[1].data())?;
        let mut out = OutBuffer::<PhysicalBool>::new(num_rows);

        for idx in 0..num_rows {
            let l = bool_at(left, &inputs[0], idx);
            let r = bool_at(right, &inputs[1], idx);
            match (l, r) {
                (Some(false), _) | (_, Some(false)) => out.put_buffer(idx).put(false),
                (Some(true), Some(true)) => out.put_buffer(idx).put(true),
                _ => out.put_buffer(idx).put_null(),
            }
        }

        out.into_array(return_type)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Or;

impl ScalarFunction for Or {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let left = PhysicalBool::get_storage(inputs[0].data())?;
        let right = PhysicalBool::get_storage(inputs[1].data())?;
        let mut out = OutBuffer::<PhysicalBool>::new(num_rows);

        for idx in 0..num_rows {
            let l = bool_at(left, &inputs[0], idx);
            let r = bool_at(right, &inputs[1], idx);
            match (l, r) {
                (Some(true), _) | (_, Some(true)) => out.put_buffer(idx).put(true),
                (Some(false), Some(false)) => out.put_buffer(idx).put(false),
                _ => out.put_buffer(idx).put_null(),
            }
        }

        out.into_array(return_type)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Not;

impl ScalarFunction for Not {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalBool, PhysicalBool, _>(&inputs[0], return_type, |&b, buf| {
            buf.put(!b)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;

    fn eval(set: &'static ScalarFunctionSet, a: Option<bool>, b: Option<bool>) -> Option<bool> {
        let function = &set.functions[0];
        function
            .execute_scalar(
                &[ScalarValue::Boolean(a), ScalarValue::Boolean(b)],
                DataType::Boolean,
            )
            .unwrap()
            .try_as_bool()
            .unwrap()
    }

    #[test]
    fn three_valued_logic() {
        let test_cases = [
            (&FUNCTION_SET_AND, None, None, None),
            (&FUNCTION_SET_AND, None, Some(true), None),
            (&FUNCTION_SET_AND, None, Some(false), Some(false)),
            (&FUNCTION_SET_AND, Some(true), Some(true), Some(true)),
            (&FUNCTION_SET_OR, None, None, None),
            (&FUNCTION_SET_OR, None, Some(true), Some(true)),
            (&FUNCTION_SET_OR, None, Some(false), None),
            (&FUNCTION_SET_OR, Some(false), Some(false), Some(false)),
        ];

        for case in test_cases {
            assert_eq!(case.3, eval(case.0, case.1, case.2), "case: {case:?}");
        }
    }

    #[test]
    fn not_null() {
        let out = FUNCTION_SET_NOT.functions[0]
            .execute_scalar(&[ScalarValue::Boolean(None)], DataType::Boolean)
            .unwrap();
        assert_eq!(ScalarValue::Boolean(None), out);
    }
}
