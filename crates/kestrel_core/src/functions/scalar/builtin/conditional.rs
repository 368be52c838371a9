use std::cmp::Ordering;

use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalBool, PhysicalUtf8, ScalarStorage};
use crate::arrays::builder::ArrayBuilder;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_ISNULL: ScalarFunctionSet = ScalarFunctionSet {
    name: "isnull",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Check if a value is null. Strings are never null.",
        arguments: &["value"],
        example: Some(Example {
            call: "isnull(long(null))",
            output: "True",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Boolean),
        &NullCheck { negate: false, empty: false },
    )],
};

pub const FUNCTION_SET_ISNOTNULL: ScalarFunctionSet = ScalarFunctionSet {
    name: "isnotnull",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Check if a value is not null.",
        arguments: &["value"],
        example: Some(Example {
            call: "isnotnull(1)",
            output: "True",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Boolean),
        &NullCheck { negate: true, empty: false },
    )],
};

pub const FUNCTION_SET_ISEMPTY: ScalarFunctionSet = ScalarFunctionSet {
    name: "isempty",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Check if a value is null or an empty string.",
        arguments: &["value"],
        example: Some(Example {
            call: "isempty('')",
            output: "True",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Boolean),
        &NullCheck { negate: false, empty: true },
    )],
};

pub const FUNCTION_SET_ISNOTEMPTY: ScalarFunctionSet = ScalarFunctionSet {
    name: "isnotempty",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Check if a value is neither null nor an empty string.",
        arguments: &["value"],
        example: Some(Example {
            call: "isnotempty('a')",
            output: "True",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(&[DataTypeId::Any], DataTypeId::Boolean),
        &NullCheck { negate: true, empty: true },
    )],
};

pub const FUNCTION_SET_COALESCE: ScalarFunctionSet = ScalarFunctionSet {
    name: "coalesce",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Return the first argument that is not null. Empty strings are skipped.",
        arguments: &["values..."],
        example: Some(Example {
            call: "coalesce(long(null), 2, 3)",
            output: "2",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new_variadic(&[DataTypeId::Any], DataTypeId::Any, DataTypeId::Any),
        &Coalesce,
    )],
};

pub const FUNCTION_SET_IFF: ScalarFunctionSet = ScalarFunctionSet {
    name: "iff",
    aliases: &["iif"],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Return the second argument if the condition is true, otherwise the third. A null condition picks the third argument.",
        arguments: &["condition", "then", "else"],
        example: Some(Example {
            call: "iff(1 > 2, 'yes', 'no')",
            output: "no",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new(
            &[DataTypeId::Boolean, DataTypeId::Any, DataTypeId::Any],
            DataTypeId::Any,
        ),
        &Iff,
    )],
};

pub const FUNCTION_SET_MIN_OF: ScalarFunctionSet = ScalarFunctionSet {
    name: "min_of",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Return the smallest argument, ignoring nulls.",
        arguments: &["values..."],
        example: Some(Example {
            call: "min_of(1.5, 2)",
            output: "1.5",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new_variadic(&[DataTypeId::Any], DataTypeId::Any, DataTypeId::Any),
        &ExtremeOf { want: Ordering::Less },
    )],
};

pub const FUNCTION_SET_MAX_OF: ScalarFunctionSet = ScalarFunctionSet {
    name: "max_of",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Conditional,
        description: "Return the largest argument, ignoring nulls.",
        arguments: &["values..."],
        example: Some(Example {
            call: "max_of(1, 5, 3)",
            output: "5",
        }),
    }],
    functions: &[RawScalarFunction::new_null_aware(
        &Signature::new_variadic(&[DataTypeId::Any], DataTypeId::Any, DataTypeId::Any),
        &ExtremeOf { want: Ordering::Greater },
    )],
};

/// Build an output array by picking, per row, the input to take the value
/// from. `None` produces a null.
fn gather(inputs: &[Array], choices: &[Option<usize>], return_type: DataType) -> Result<Array> {
    let mut builder = ArrayBuilder::with_capacity(return_type, choices.len());
    for (row, choice) in choices.iter().enumerate() {
        match choice {
            Some(input) => builder.add(&inputs[*input].get(row)?)?,
            None => builder.add_null()?,
        }
    }
    Ok(builder.finish())
}

/// Row holds a usable value. Empty strings count as missing.
fn has_value(array: &Array, row: usize) -> Result<bool> {
    if !array.is_valid(row) {
        return Ok(false);
    }
    if array.datatype() == DataType::Utf8 {
        let values = PhysicalUtf8::get_storage(array.data())?;
        return Ok(!values[row].is_empty());
    }
    Ok(true)
}

#[derive(Debug, Clone, Copy)]
pub struct NullCheck {
    negate: bool,
    empty: bool,
}

impl ScalarFunction for NullCheck {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let input = &inputs[0];
        let values = (0..num_rows)
            .map(|row| {
                let missing = if self.empty {
                    !has_value(input, row)?
                } else {
                    !input.is_valid(row)
                };
                Ok(missing != self.negate)
            })
            .collect::<Result<Vec<_>>>()?;

        Array::try_from_values::<PhysicalBool>(return_type, values)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Coalesce;

impl ScalarFunction for Coalesce {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let mut choices = Vec::with_capacity(num_rows);
        for row in 0..num_rows {
            let mut choice = None;
            for (idx, input) in inputs.iter().enumerate() {
                if has_value(input, row)? {
                    choice = Some(idx);
                    break;
                }
            }
            choices.push(choice);
        }

        gather(inputs, &choices, return_type)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Iff;

impl ScalarFunction for Iff {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let conditions = PhysicalBool::get_storage(inputs[0].data())?;
        let choices: Vec<_> = (0..num_rows)
            .map(|row| {
                let take_then = inputs[0].is_valid(row) && conditions[row];
                Some(if take_then { 1 } else { 2 })
            })
            .collect();

        gather(inputs, &choices, return_type)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExtremeOf {
    want: Ordering,
}

impl ScalarFunction for ExtremeOf {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let mut builder = ArrayBuilder::with_capacity(return_type, num_rows);
        for row in 0..num_rows {
            let mut best = None;
            for input in inputs {
                if !input.is_valid(row) {
                    continue;
                }
                let value = input.get(row)?;
                best = match best {
                    Some(prev) if value.total_cmp(&prev) != self.want => Some(prev),
                    _ => Some(value),
                };
            }
            match best {
                Some(value) => builder.add(&value)?,
                None => builder.add_null()?,
            }
        }

        Ok(builder.finish())
    }
}
