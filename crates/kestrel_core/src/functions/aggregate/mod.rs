pub mod builtin;
pub mod conditional;
pub mod simple;

use std::fmt::Debug;

use kestrel_error::{DbError, Result};

use super::Signature;
use crate::arrays::array::Array;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

/// An aggregate function implementation.
///
/// Each group gets its own accumulator.
pub trait AggregateFunction: Debug + Sync + Send + 'static {
    fn new_accumulator(&self, return_type: DataType) -> Box<dyn Accumulator>;
}

/// Running state for a single group.
pub trait Accumulator: Debug + Send {
    /// Fold the rows at `rows` into the state.
    ///
    /// Inputs are full columns. Only the selected rows belong to this group.
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()>;

    /// Produce the group's value.
    fn finalize(&mut self) -> Result<ScalarValue>;
}

#[derive(Debug, Clone, Copy)]
pub struct RawAggregateFunction {
    signature: &'static Signature,
    function: &'static dyn AggregateFunction,
}

impl RawAggregateFunction {
    pub const fn new(sig: &'static Signature, function: &'static dyn AggregateFunction) -> Self {
        RawAggregateFunction {
            signature: sig,
            function,
        }
    }

    pub fn signature(&self) -> &Signature {
        self.signature
    }

    pub fn new_accumulator(&self, return_type: DataType) -> Box<dyn Accumulator> {
        self.function.new_accumulator(return_type)
    }
}

/// Read a constant argument such as a percentile or size limit.
///
/// Constant arguments are broadcast, so the first selected row is as good as
/// any.
pub(crate) fn constant_arg(
    inputs: &[&Array],
    idx: usize,
    rows: &[usize],
) -> Result<Option<ScalarValue>> {
    let Some(&row) = rows.first() else {
        return Ok(None);
    };
    let array = inputs.get(idx).ok_or_else(|| {
        DbError::overload_mismatch("Missing aggregate argument").with_field("idx", idx)
    })?;
    Ok(Some(array.get(row)?))
}

/// Feed a whole set of arrays to a fresh accumulator. Test helper.
#[cfg(test)]
pub(crate) fn aggregate_all(
    function: &RawAggregateFunction,
    inputs: &[Array],
    return_type: DataType,
) -> Result<ScalarValue> {
    let num_rows = inputs.first().map(|a| a.len()).unwrap_or(0);
    let rows: Vec<usize> = (0..num_rows).collect();
    let inputs: Vec<&Array> = inputs.iter().collect();

    let mut acc = function.new_accumulator(return_type);
    acc.update(&inputs, &rows)?;
    acc.finalize()
}
