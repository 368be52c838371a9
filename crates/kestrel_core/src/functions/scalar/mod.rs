pub mod builtin;

use std::fmt::Debug;

use kestrel_error::{DbError, Result};

use super::Signature;
use crate::arrays::array::Array;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

/// A vectorized scalar function implementation.
pub trait ScalarFunction: Debug + Sync + Send + 'static {
    /// Execute the function over whole columns.
    ///
    /// Every input has exactly `num_rows` rows. Scalar arguments have already
    /// been broadcast.
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array>;
}

/// A function implementation paired with the signature it implements.
#[derive(Debug, Clone, Copy)]
pub struct RawScalarFunction {
    signature: &'static Signature,
    function: &'static dyn ScalarFunction,
    null_aware: bool,
}

impl RawScalarFunction {
    /// A function returning null whenever any argument is null.
    pub const fn new(sig: &'static Signature, function: &'static dyn ScalarFunction) -> Self {
        RawScalarFunction {
            signature: sig,
            function,
            null_aware: false,
        }
    }

    /// A function that handles null arguments itself.
    pub const fn new_null_aware(
        sig: &'static Signature,
        function: &'static dyn ScalarFunction,
    ) -> Self {
        RawScalarFunction {
            signature: sig,
            function,
            null_aware: true,
        }
    }

    pub fn signature(&self) -> &Signature {
        self.signature
    }

    /// Columnar execution.
    pub fn execute(
        &self,
        inputs: &[Array],
        num_rows: usize,
        return_type: DataType,
    ) -> Result<Array> {
        if !self.signature.accepts_arity(inputs.len()) {
            return Err(DbError::overload_mismatch("Wrong number of arguments for function")
                .with_field("signature", self.signature)
                .with_field("got", inputs.len()));
        }
        if let Some(input) = inputs.iter().find(|input| input.len() != num_rows) {
            return Err(DbError::overload_mismatch("Function input has wrong number of rows")
                .with_field("expected", num_rows)
                .with_field("got", input.len()));
        }

        let out = self.function.execute(inputs, num_rows, return_type)?;
        if out.datatype() != return_type || out.len() != num_rows {
            return Err(DbError::new("Function produced unexpected output")
                .with_field("signature", self.signature)
                .with_field("datatype", out.datatype())
                .with_field("rows", out.len()));
        }

        Ok(out)
    }

    /// Row-at-a-time execution over scalar arguments.
    ///
    /// Non null-aware functions short circuit to a typed null. Strings are
    /// never null at rest, so a missing string is passed through as empty.
    pub fn execute_scalar(
        &self,
        inputs: &[ScalarValue],
        return_type: DataType,
    ) -> Result<ScalarValue> {
        let has_null = inputs
            .iter()
            .any(|v| v.is_null() && v.datatype() != DataType::Utf8);
        if !self.null_aware && has_null {
            return Ok(ScalarValue::null(return_type));
        }

        let arrays = inputs
            .iter()
            .map(|v| Array::repeat_scalar(v, 1))
            .collect::<Result<Vec<_>>>()?;

        self.execute(&arrays, 1, return_type)?.get(0)
    }
}
