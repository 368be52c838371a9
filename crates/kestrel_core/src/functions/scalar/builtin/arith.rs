use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::BinaryExecutor;
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_ADD: ScalarFunctionSet = ScalarFunctionSet {
    name: "add",
    aliases: &["+"],
    doc: &[&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Adds two values. Datetimes can be shifted by timespans.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "1 + 2",
            output: "3",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Int32], DataTypeId::Int32),
            &Arith::<PhysicalI32, AddOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
            &Arith::<PhysicalI64, AddOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Float64, DataTypeId::Float64],
                DataTypeId::Float64,
            ),
            &Arith::<PhysicalF64, AddOp>::new(),
        ),
        // Datetime + timespan => datetime
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::DateTime, DataTypeId::TimeSpan],
                DataTypeId::DateTime,
            ),
            &Arith::<PhysicalI64, AddOp>::new(),
        ),
        // Timespan + datetime => datetime
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::DateTime],
                DataTypeId::DateTime,
            ),
            &Arith::<PhysicalI64, AddOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::TimeSpan],
                DataTypeId::TimeSpan,
            ),
            &Arith::<PhysicalI64, AddOp>::new(),
        ),
    ],
};

pub const FUNCTION_SET_SUBTRACT: ScalarFunctionSet = ScalarFunctionSet {
    name: "subtract",
    aliases: &["-"],
    doc: &[&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Subtracts the right value from the left value. The difference of two datetimes is a timespan.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "10s - 1s",
            output: "00:00:09",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Int32], DataTypeId::Int32),
            &Arith::<PhysicalI32, SubOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
            &Arith::<PhysicalI64, SubOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Float64, DataTypeId::Float64],
                DataTypeId::Float64,
            ),
            &Arith::<PhysicalF64, SubOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::DateTime, DataTypeId::DateTime],
                DataTypeId::TimeSpan,
            ),
            &Arith::<PhysicalI64, SubOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::DateTime, DataTypeId::TimeSpan],
                DataTypeId::DateTime,
            ),
            &Arith::<PhysicalI64, SubOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::TimeSpan],
                DataTypeId::TimeSpan,
            ),
            &Arith::<PhysicalI64, SubOp>::new(),
        ),
    ],
};

pub const FUNCTION_SET_MULTIPLY: ScalarFunctionSet = ScalarFunctionSet {
    name: "multiply",
    aliases: &["*"],
    doc: &[&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Multiplies two values. Timespans can be scaled by numbers.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "4 * 3.5",
            output: "14",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Int32], DataTypeId::Int32),
            &Arith::<PhysicalI32, MulOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
            &Arith::<PhysicalI64, MulOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Float64, DataTypeId::Float64],
                DataTypeId::Float64,
            ),
            &Arith::<PhysicalF64, MulOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::Int64],
                DataTypeId::TimeSpan,
            ),
            &Arith::<PhysicalI64, MulOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Int64, DataTypeId::TimeSpan],
                DataTypeId::TimeSpan,
            ),
            &Arith::<PhysicalI64, MulOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::Float64],
                DataTypeId::TimeSpan,
            ),
            &ScaleTimeSpan { divide: false },
        ),
    ],
};

pub const FUNCTION_SET_DIVIDE: ScalarFunctionSet = ScalarFunctionSet {
    name: "divide",
    aliases: &["/"],
    doc: &[&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Divides the left value by the right value. Integer division truncates, and integer division by zero is null.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "15ms / 10ms",
            output: "1.5",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Int32], DataTypeId::Int32),
            &Arith::<PhysicalI32, DivOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
            &Arith::<PhysicalI64, DivOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Float64, DataTypeId::Float64],
                DataTypeId::Float64,
            ),
            &Arith::<PhysicalF64, DivOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::TimeSpan],
                DataTypeId::Float64,
            ),
            &TimeSpanRatio,
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::Int64],
                DataTypeId::TimeSpan,
            ),
            &Arith::<PhysicalI64, DivOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::Float64],
                DataTypeId::TimeSpan,
            ),
            &ScaleTimeSpan { divide: true },
        ),
    ],
};

pub const FUNCTION_SET_MODULO: ScalarFunctionSet = ScalarFunctionSet {
    name: "modulo",
    aliases: &["%"],
    doc: &[&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Remainder of dividing the left value by the right value. The result takes the sign of the dividend.",
        arguments: &["left", "right"],
        example: Some(Example {
            call: "-1 % 4",
            output: "-1",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32, DataTypeId::Int32], DataTypeId::Int32),
            &Arith::<PhysicalI32, RemOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
            &Arith::<PhysicalI64, RemOp>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Float64, DataTypeId::Float64],
                DataTypeId::Float64,
            ),
            &Arith::<PhysicalF64, RemOp>::new(),
        ),
    ],
};

/// A binary operation over a single storage type. Returning None produces a
/// null.
pub trait ArithOp<T>: Debug + Sync + Send + Copy + 'static {
    fn apply(a: T, b: T) -> Option<T>;
}

#[derive(Debug, Clone, Copy)]
pub struct AddOp;

#[derive(Debug, Clone, Copy)]
pub struct SubOp;

#[derive(Debug, Clone, Copy)]
pub struct MulOp;

#[derive(Debug, Clone, Copy)]
pub struct DivOp;

#[derive(Debug, Clone, Copy)]
pub struct RemOp;

macro_rules! impl_int_arith {
    ($($t:ty),*) => {
        $(
            impl ArithOp<$t> for AddOp {
                fn apply(a: $t, b: $t) -> Option<$t> {
                    Some(a.wrapping_add(b))
                }
            }

            impl ArithOp<$t> for SubOp {
                fn apply(a: $t, b: $t) -> Option<$t> {
                    Some(a.wrapping_sub(b))
                }
            }

            impl ArithOp<$t> for MulOp {
                fn apply(a: $t, b: $t) -> Option<$t> {
                    Some(a.wrapping_mul(b))
                }
            }

            impl ArithOp<$t> for DivOp {
                fn apply(a: $t, b: $t) -> Option<$t> {
                    a.checked_div(b)
                }
            }

            impl ArithOp<$t> for RemOp {
                fn apply(a: $t, b: $t) -> Option<$t> {
                    a.checked_rem(b)
                }
            }
        )*
    };
}

impl_int_arith!(i32, i64);

impl ArithOp<f64> for AddOp {
    fn apply(a: f64, b: f64) -> Option<f64> {
        Some(a + b)
    }
}

impl ArithOp<f64> for SubOp {
    fn apply(a: f64, b: f64) -> Option<f64> {
        Some(a - b)
    }
}

impl ArithOp<f64> for MulOp {
    fn apply(a: f64, b: f64) -> Option<f64> {
        Some(a * b)
    }
}

impl ArithOp<f64> for DivOp {
    fn apply(a: f64, b: f64) -> Option<f64> {
        Some(a / b)
    }
}

impl ArithOp<f64> for RemOp {
    fn apply(a: f64, b: f64) -> Option<f64> {
        Some(a % b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Arith<S, O> {
    _s: PhantomData<S>,
    _o: PhantomData<O>,
}

impl<S, O> Arith<S, O> {
    pub const fn new() -> Self {
        Arith {
            _s: PhantomData,
            _o: PhantomData,
        }
    }
}

impl<S, O> ScalarFunction for Arith<S, O>
where
    S: ScalarStorage,
    S::StorageType: Copy,
    O: ArithOp<S::StorageType>,
{
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        BinaryExecutor::execute::<S, S, S, _>(&inputs[0], &inputs[1], return_type, |&a, &b, buf| {
            match O::apply(a, b) {
                Some(v) => buf.put(v),
                None => buf.put_null(),
            }
        })
    }
}

/// Timespan divided by timespan.
#[derive(Debug, Clone, Copy)]
pub struct TimeSpanRatio;

impl ScalarFunction for TimeSpanRatio {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        BinaryExecutor::execute::<PhysicalI64, PhysicalI64, PhysicalF64, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |&a, &b, buf| buf.put(a as f64 / b as f64),
        )
    }
}

/// Timespan multiplied or divided by a real.
#[derive(Debug, Clone, Copy)]
pub struct ScaleTimeSpan {
    divide: bool,
}

impl ScalarFunction for ScaleTimeSpan {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        let divide = self.divide;
        BinaryExecutor::execute::<PhysicalI64, PhysicalF64, PhysicalI64, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |&ticks, &factor, buf| {
                let scaled = if divide {
                    ticks as f64 / factor
                } else {
                    ticks as f64 * factor
                };
                if scaled.is_finite() {
                    buf.put(scaled.round() as i64)
                } else {
                    buf.put_null()
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;
    use crate::arrays::scalar::temporal::TICKS_PER_MILLISECOND;
    use crate::functions::cast::cast_scalar;

    fn run(
        set: &'static ScalarFunctionSet,
        a: ScalarValue,
        b: ScalarValue,
    ) -> ScalarValue {
        let types = [a.datatype(), b.datatype()];
        let resolved = set.resolve(&types).unwrap();
        let args: Vec<_> = [a, b]
            .iter()
            .zip(&resolved.casts)
            .map(|(value, cast)| match cast {
                Some(to) => cast_scalar(value, *to),
                None => value.clone(),
            })
            .collect();
        resolved
            .function
            .execute_scalar(&args, resolved.return_type)
            .unwrap()
    }

    #[test]
    fn integer_semantics() {
        let test_cases = [
            (&FUNCTION_SET_DIVIDE, 6_i64, 2_i64, Some(3_i64)),
            (&FUNCTION_SET_DIVIDE, 1, 0, None),
            (&FUNCTION_SET_MODULO, -1, 4, Some(-1)),
            (&FUNCTION_SET_MODULO, 6, 5, Some(1)),
            (&FUNCTION_SET_MODULO, 6, 0, None),
        ];

        for case in test_cases {
            let out = run(case.0, case.1.into(), case.2.into());
            assert_eq!(ScalarValue::Int64(case.3), out, "case: {case:?}");
        }
    }

    #[test]
    fn mixed_numeric_promotes() {
        let out = run(&FUNCTION_SET_ADD, 3_i64.into(), 4.5.into());
        assert_eq!(ScalarValue::from(7.5), out);

        let out = run(&FUNCTION_SET_MULTIPLY, 2.5.into(), 4_i64.into());
        assert_eq!(ScalarValue::from(10.0), out);
    }

    #[test]
    fn null_operand() {
        let out = run(&FUNCTION_SET_ADD, ScalarValue::Int64(None), 1_i64.into());
        assert_eq!(ScalarValue::Int64(None), out);
    }

    #[test]
    fn timespan_ratio() {
        let out = run(
            &FUNCTION_SET_DIVIDE,
            ScalarValue::timespan(15 * TICKS_PER_MILLISECOND),
            ScalarValue::timespan(10 * TICKS_PER_MILLISECOND),
        );
        assert_eq!(ScalarValue::from(1.5), out);
    }

    #[test]
    fn datetime_minus_datetime() {
        let out = run(
            &FUNCTION_SET_SUBTRACT,
            ScalarValue::datetime(100),
            ScalarValue::datetime(40),
        );
        assert_eq!(ScalarValue::timespan(60), out);
    }
}
