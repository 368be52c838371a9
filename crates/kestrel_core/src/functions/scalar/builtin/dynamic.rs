use std::cmp::Ordering;

use kestrel_error::Result;
use serde_json::Value as JsonValue;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalDynamic, PhysicalI64, PhysicalUtf8};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::UnaryExecutor;
use crate::arrays::scalar::dynamic::{compare_json, kind_rank, parse_json_lenient};
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_ARRAY_LENGTH: ScalarFunctionSet = ScalarFunctionSet {
    name: "array_length",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Dynamic,
        description: "Number of elements in a dynamic array. Null if the value isn't an array.",
        arguments: &["array"],
        example: Some(Example {
            call: "array_length(dynamic([1,2]))",
            output: "2",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Dynamic], DataTypeId::Int64),
        &ArrayLength,
    )],
};

pub const FUNCTION_SET_ARRAY_SORT_ASC: ScalarFunctionSet = ScalarFunctionSet {
    name: "array_sort_asc",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Dynamic,
        description: "Sort a dynamic array in ascending order. Numbers are placed before strings.",
        arguments: &["array"],
        example: Some(Example {
            call: "array_sort_asc(dynamic([3, 'a', 1]))",
            output: "[1,3,\"a\"]",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Dynamic], DataTypeId::Dynamic),
        &ArraySort { descending: false },
    )],
};

pub const FUNCTION_SET_ARRAY_SORT_DESC: ScalarFunctionSet = ScalarFunctionSet {
    name: "array_sort_desc",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Dynamic,
        description: "Sort a dynamic array in descending order. Numbers are still placed before strings.",
        arguments: &["array"],
        example: Some(Example {
            call: "array_sort_desc(dynamic([3, 'a', 1]))",
            output: "[3,1,\"a\"]",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Dynamic], DataTypeId::Dynamic),
        &ArraySort { descending: true },
    )],
};

pub const FUNCTION_SET_PARSE_JSON: ScalarFunctionSet = ScalarFunctionSet {
    name: "parse_json",
    aliases: &["todynamic"],
    doc: &[&Documentation {
        category: Category::Dynamic,
        description: "Parse a string as json. Text that isn't valid json becomes a json string.",
        arguments: &["text"],
        example: Some(Example {
            call: "parse_json('[1,2]')",
            output: "[1,2]",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Utf8], DataTypeId::Dynamic),
            &ParseJson,
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Dynamic], DataTypeId::Dynamic),
            &DynamicIdentity,
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct ArrayLength;

impl ScalarFunction for ArrayLength {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalDynamic, PhysicalI64, _>(&inputs[0], return_type, |v, buf| {
            match v {
                JsonValue::Array(values) => buf.put(values.len() as i64),
                _ => buf.put_null(),
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArraySort {
    descending: bool,
}

impl ArraySort {
    fn compare(&self, a: &JsonValue, b: &JsonValue) -> Ordering {
        if !self.descending {
            return compare_json(a, b);
        }
        match kind_rank(a).cmp(&kind_rank(b)) {
            Ordering::Equal => compare_json(b, a),
            other => other,
        }
    }
}

impl ScalarFunction for ArraySort {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalDynamic, PhysicalDynamic, _>(&inputs[0], return_type, |v, buf| {
            match v {
                JsonValue::Array(values) => {
                    let mut sorted = values.clone();
                    sorted.sort_by(|a, b| self.compare(a, b));
                    buf.put(JsonValue::Array(sorted))
                }
                _ => buf.put_null(),
            }
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParseJson;

impl ScalarFunction for ParseJson {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalUtf8, PhysicalDynamic, _>(&inputs[0], return_type, |s, buf| {
            buf.put(parse_json_lenient(s))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DynamicIdentity;

impl ScalarFunction for DynamicIdentity {
    fn execute(&self, inputs: &[Array], _num_rows: usize, _return_type: DataType) -> Result<Array> {
        Ok(inputs[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::arrays::scalar::ScalarValue;

    fn eval(set: &'static ScalarFunctionSet, value: JsonValue) -> ScalarValue {
        let function = &set.functions[0];
        function
            .execute_scalar(
                &[ScalarValue::Dynamic(value)],
                function.signature().return_type.to_datatype().unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn array_length_of_non_array() {
        assert_eq!(ScalarValue::from(0_i64), eval(&FUNCTION_SET_ARRAY_LENGTH, json!([])));
        assert_eq!(ScalarValue::from(2_i64), eval(&FUNCTION_SET_ARRAY_LENGTH, json!([1, 2])));
        assert_eq!(ScalarValue::Int64(None), eval(&FUNCTION_SET_ARRAY_LENGTH, json!({})));
    }

    #[test]
    fn sort_keeps_numbers_first() {
        let input = json!([1, 3, 2, "a", "c", "b"]);
        assert_eq!(
            ScalarValue::Dynamic(json!([1, 2, 3, "a", "b", "c"])),
            eval(&FUNCTION_SET_ARRAY_SORT_ASC, input.clone())
        );
        assert_eq!(
            ScalarValue::Dynamic(json!([3, 2, 1, "c", "b", "a"])),
            eval(&FUNCTION_SET_ARRAY_SORT_DESC, input)
        );
    }

    #[test]
    fn parse_json_objects() {
        let out = FUNCTION_SET_PARSE_JSON.functions[0]
            .execute_scalar(&[ScalarValue::from("{\"a\":1}")], DataType::Dynamic)
            .unwrap();
        assert_eq!(ScalarValue::Dynamic(json!({"a": 1})), out);
    }
}
