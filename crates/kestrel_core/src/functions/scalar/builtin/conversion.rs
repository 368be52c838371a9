use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::functions::Signature;
use crate::functions::cast::cast_array;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

const fn conversion_doc(
    description: &'static str,
    call: &'static str,
    output: &'static str,
) -> Documentation {
    Documentation {
        category: Category::Conversion,
        description,
        arguments: &["value"],
        example: Some(Example { call, output }),
    }
}

pub const FUNCTION_SET_TOSTRING: ScalarFunctionSet = ScalarFunctionSet {
    name: "tostring",
    aliases: &[],
    doc: &[&conversion_doc(
        "Text form of a value. Nulls become the empty string.",
        "tostring(datetime(2023-08-30 23:00))",
        "8/30/2023 11:00:00 PM",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Utf8),
        &CastTo,
    )],
};

pub const FUNCTION_SET_TOINT: ScalarFunctionSet = ScalarFunctionSet {
    name: "toint",
    aliases: &[],
    doc: &[&conversion_doc(
        "Convert to int. Reals are truncated, unparsable text is null.",
        "toint('123')",
        "123",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Int32),
        &CastTo,
    )],
};

pub const FUNCTION_SET_TOLONG: ScalarFunctionSet = ScalarFunctionSet {
    name: "tolong",
    aliases: &[],
    doc: &[&conversion_doc(
        "Convert to long. Reals are truncated, unparsable text is null.",
        "tolong(123.5)",
        "123",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Int64),
        &CastTo,
    )],
};

pub const FUNCTION_SET_TODOUBLE: ScalarFunctionSet = ScalarFunctionSet {
    name: "todouble",
    aliases: &["toreal"],
    doc: &[&conversion_doc(
        "Convert to real. The text `nan` parses to NaN.",
        "todouble('123.5')",
        "123.5",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Float64),
        &CastTo,
    )],
};

pub const FUNCTION_SET_TOBOOL: ScalarFunctionSet = ScalarFunctionSet {
    name: "tobool",
    aliases: &["toboolean"],
    doc: &[&conversion_doc(
        "Convert to bool. Accepts `true`, `false`, `1` and `0`.",
        "tobool('true')",
        "True",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Boolean),
        &CastTo,
    )],
};

pub const FUNCTION_SET_TODATETIME: ScalarFunctionSet = ScalarFunctionSet {
    name: "todatetime",
    aliases: &[],
    doc: &[&conversion_doc(
        "Parse a datetime.",
        "todatetime('2023-01-01')",
        "2023-01-01T00:00:00.0000000",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::DateTime),
        &CastTo,
    )],
};

pub const FUNCTION_SET_TOTIMESPAN: ScalarFunctionSet = ScalarFunctionSet {
    name: "totimespan",
    aliases: &[],
    doc: &[&conversion_doc(
        "Parse a timespan.",
        "totimespan('00:00:10')",
        "00:00:10",
    )],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Any], DataTypeId::TimeSpan),
        &CastTo,
    )],
};

/// Lenient cast to the resolved return type.
#[derive(Debug, Clone, Copy)]
pub struct CastTo;

impl ScalarFunction for CastTo {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        cast_array(&inputs[0], return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;

    #[test]
    fn tostring_of_null_is_empty() {
        let out = FUNCTION_SET_TOSTRING.functions[0]
            .execute_scalar(&[ScalarValue::Int32(None)], DataType::Utf8)
            .unwrap();
        assert_eq!("", out.to_text());
        assert_eq!("", out.to_string());
    }

    #[test]
    fn columnar_toint() {
        let input = Array::try_from_scalars(
            DataType::Utf8,
            &[ScalarValue::from(""), ScalarValue::from("123"), ScalarValue::from("nan")],
        )
        .unwrap();
        let out = FUNCTION_SET_TOINT.functions[0]
            .execute(&[input], 3, DataType::Int32)
            .unwrap();
        assert_eq!(ScalarValue::Int32(None), out.get(0).unwrap());
        assert_eq!(ScalarValue::from(123_i32), out.get(1).unwrap());
        assert_eq!(ScalarValue::Int32(None), out.get(2).unwrap());
    }
}
