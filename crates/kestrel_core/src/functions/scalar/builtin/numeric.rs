use std::marker::PhantomData;

use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::{BinaryExecutor, UnaryExecutor};
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_BIN: ScalarFunctionSet = ScalarFunctionSet {
    name: "bin",
    aliases: &["floor"],
    doc: &[&Documentation {
        category: Category::Numeric,
        description: "Round a value down to a multiple of the bin size. A bin size that isn't positive produces null.",
        arguments: &["value", "bin_size"],
        example: Some(Example {
            call: "bin(-1, 3)",
            output: "-3",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
            &Bin::<PhysicalI64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Float64, DataTypeId::Float64],
                DataTypeId::Float64,
            ),
            &Bin::<PhysicalF64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::DateTime, DataTypeId::TimeSpan],
                DataTypeId::DateTime,
            ),
            &Bin::<PhysicalI64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::TimeSpan, DataTypeId::TimeSpan],
                DataTypeId::TimeSpan,
            ),
            &Bin::<PhysicalI64>::new(),
        ),
    ],
};

pub const FUNCTION_SET_ABS: ScalarFunctionSet = ScalarFunctionSet {
    name: "abs",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Numeric,
        description: "Absolute value.",
        arguments: &["value"],
        example: Some(Example {
            call: "abs(-2)",
            output: "2",
        }),
    }],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int32], DataTypeId::Int32),
            &Abs::<PhysicalI32>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Int64], DataTypeId::Int64),
            &Abs::<PhysicalI64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Float64], DataTypeId::Float64),
            &Abs::<PhysicalF64>::new(),
        ),
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan], DataTypeId::TimeSpan),
            &Abs::<PhysicalI64>::new(),
        ),
    ],
};

const REAL_TO_REAL: Signature = Signature::new(&[DataTypeId::Float64], DataTypeId::Float64);

const fn real_doc(
    description: &'static str,
    call: &'static str,
    output: &'static str,
) -> Documentation {
    Documentation {
        category: Category::Numeric,
        description,
        arguments: &["value"],
        example: Some(Example { call, output }),
    }
}

pub const FUNCTION_SET_LOG: ScalarFunctionSet = ScalarFunctionSet {
    name: "log",
    aliases: &[],
    doc: &[&real_doc("Natural logarithm.", "log(1)", "0")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: f64::ln })],
};

pub const FUNCTION_SET_LOG10: ScalarFunctionSet = ScalarFunctionSet {
    name: "log10",
    aliases: &[],
    doc: &[&real_doc("Base 10 logarithm. Negative input produces NaN.", "log10(100)", "2")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: f64::log10 })],
};

pub const FUNCTION_SET_LOG2: ScalarFunctionSet = ScalarFunctionSet {
    name: "log2",
    aliases: &[],
    doc: &[&real_doc("Base 2 logarithm.", "log2(8)", "3")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: f64::log2 })],
};

pub const FUNCTION_SET_EXP: ScalarFunctionSet = ScalarFunctionSet {
    name: "exp",
    aliases: &[],
    doc: &[&real_doc("Euler's number raised to the power of the value.", "exp(0)", "1")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: f64::exp })],
};

pub const FUNCTION_SET_EXP2: ScalarFunctionSet = ScalarFunctionSet {
    name: "exp2",
    aliases: &[],
    doc: &[&real_doc("2 raised to the power of the value.", "exp2(3)", "8")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: f64::exp2 })],
};

pub const FUNCTION_SET_EXP10: ScalarFunctionSet = ScalarFunctionSet {
    name: "exp10",
    aliases: &[],
    doc: &[&real_doc("10 raised to the power of the value.", "exp10(2)", "100")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: exp10 })],
};

pub const FUNCTION_SET_SQRT: ScalarFunctionSet = ScalarFunctionSet {
    name: "sqrt",
    aliases: &[],
    doc: &[&real_doc("Square root. Negative input produces NaN.", "sqrt(9)", "3")],
    functions: &[RawScalarFunction::new(&REAL_TO_REAL, &RealFunction { f: f64::sqrt })],
};

pub const FUNCTION_SET_POW: ScalarFunctionSet = ScalarFunctionSet {
    name: "pow",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Numeric,
        description: "Raise the base to the power of the exponent.",
        arguments: &["base", "exponent"],
        example: Some(Example {
            call: "pow(10, 2)",
            output: "100",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(
            &[DataTypeId::Float64, DataTypeId::Float64],
            DataTypeId::Float64,
        ),
        &Pow,
    )],
};

fn exp10(v: f64) -> f64 {
    10_f64.powf(v)
}

pub trait BinValue: Copy {
    /// Largest multiple of `size` not greater than `self`, None for non
    /// positive sizes.
    fn bin(self, size: Self) -> Option<Self>;
}

impl BinValue for i64 {
    fn bin(self, size: Self) -> Option<Self> {
        if size <= 0 {
            return None;
        }
        self.div_euclid(size).checked_mul(size)
    }
}

impl BinValue for f64 {
    fn bin(self, size: Self) -> Option<Self> {
        if size.is_nan() || size <= 0.0 {
            return None;
        }
        Some((self / size).floor() * size)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bin<S> {
    _s: PhantomData<S>,
}

impl<S> Bin<S> {
    pub const fn new() -> Self {
        Bin { _s: PhantomData }
    }
}

impl<S> ScalarFunction for Bin<S>
where
    S: ScalarStorage,
    S::StorageType: BinValue,
{
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        BinaryExecutor::execute::<S, S, S, _>(&inputs[0], &inputs[1], return_type, |&v, &size, buf| {
            match v.bin(size) {
                Some(binned) => buf.put(binned),
                None => buf.put_null(),
            }
        })
    }
}

pub trait AbsValue: Copy {
    fn abs_value(self) -> Self;
}

impl AbsValue for i32 {
    fn abs_value(self) -> Self {
        self.wrapping_abs()
    }
}

impl AbsValue for i64 {
    fn abs_value(self) -> Self {
        self.wrapping_abs()
    }
}

impl AbsValue for f64 {
    fn abs_value(self) -> Self {
        self.abs()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Abs<S> {
    _s: PhantomData<S>,
}

impl<S> Abs<S> {
    pub const fn new() -> Self {
        Abs { _s: PhantomData }
    }
}

impl<S> ScalarFunction for Abs<S>
where
    S: ScalarStorage,
    S::StorageType: AbsValue,
{
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<S, S, _>(&inputs[0], return_type, |&v, buf| buf.put(v.abs_value()))
    }
}

/// Real valued function of one real argument.
#[derive(Debug, Clone, Copy)]
pub struct RealFunction {
    f: fn(f64) -> f64,
}

impl ScalarFunction for RealFunction {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalF64, PhysicalF64, _>(&inputs[0], return_type, |&v, buf| {
            buf.put((self.f)(v))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pow;

impl ScalarFunction for Pow {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        BinaryExecutor::execute::<PhysicalF64, PhysicalF64, PhysicalF64, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |&base, &exp, buf| buf.put(base.powf(exp)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;
    use crate::arrays::scalar::temporal::{TICKS_PER_HOUR, TICKS_PER_MINUTE};

    fn eval(set: &'static ScalarFunctionSet, args: &[ScalarValue]) -> ScalarValue {
        let types: Vec<_> = args.iter().map(|a| a.datatype()).collect();
        let resolved = set.resolve(&types).unwrap();
        resolved
            .function
            .execute_scalar(args, resolved.return_type)
            .unwrap()
    }

    #[test]
    fn bin_integers_floor() {
        let test_cases = [(-1, -3), (0, 0), (2, 0), (3, 3), (4, 3)];
        for case in test_cases {
            let out = eval(&FUNCTION_SET_BIN, &[ScalarValue::from(case.0 as i64), ScalarValue::from(3_i64)]);
            assert_eq!(ScalarValue::from(case.1 as i64), out, "case: {case:?}");
        }
    }

    #[test]
    fn bin_int_returns_long() {
        let resolved = FUNCTION_SET_BIN
            .resolve(&[DataType::Int32, DataType::Int32])
            .unwrap();
        assert_eq!(DataType::Int64, resolved.return_type);
    }

    #[test]
    fn bin_reals() {
        let test_cases = [(0.3, 0.0), (0.9, 0.5), (1.1, 1.0), (-0.1, -0.5), (-0.6, -1.0)];
        for case in test_cases {
            let out = eval(&FUNCTION_SET_BIN, &[ScalarValue::from(case.0), ScalarValue::from(0.5)]);
            assert_eq!(ScalarValue::from(case.1), out, "case: {case:?}");
        }
    }

    #[test]
    fn bin_datetime() {
        let out = eval(
            &FUNCTION_SET_BIN,
            &[
                ScalarValue::datetime(TICKS_PER_HOUR + 10 * TICKS_PER_MINUTE),
                ScalarValue::timespan(TICKS_PER_HOUR),
            ],
        );
        assert_eq!(ScalarValue::datetime(TICKS_PER_HOUR), out);
    }

    #[test]
    fn bin_zero_size_is_null() {
        let out = eval(&FUNCTION_SET_BIN, &[ScalarValue::from(5_i64), ScalarValue::from(0_i64)]);
        assert_eq!(ScalarValue::Int64(None), out);
    }

    #[test]
    fn real_functions() {
        assert_eq!(ScalarValue::from(2.0), eval(&FUNCTION_SET_LOG10, &[ScalarValue::from(100.0)]));
        assert_eq!(ScalarValue::from(3.0), eval(&FUNCTION_SET_SQRT, &[ScalarValue::from(9.0)]));
        assert!(matches!(
            eval(&FUNCTION_SET_LOG2, &[ScalarValue::from(-1.0)]),
            ScalarValue::Float64(Some(v)) if v.is_nan()
        ));
        assert_eq!(
            ScalarValue::from(1000.0),
            eval(&FUNCTION_SET_POW, &[ScalarValue::from(10.0), ScalarValue::from(3.0)])
        );
        assert_eq!(
            ScalarValue::Float64(None),
            eval(&FUNCTION_SET_POW, &[ScalarValue::Float64(None), ScalarValue::from(3.0)])
        );
    }

    #[test]
    fn abs_values() {
        assert_eq!(ScalarValue::from(2_i32), eval(&FUNCTION_SET_ABS, &[ScalarValue::from(-2_i32)]));
        assert_eq!(ScalarValue::timespan(5), eval(&FUNCTION_SET_ABS, &[ScalarValue::timespan(-5)]));
    }
}
