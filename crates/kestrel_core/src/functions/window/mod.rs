pub mod builtin;

use std::fmt::Debug;

use kestrel_error::{DbError, Result};

use super::Signature;
use crate::arrays::array::Array;
use crate::arrays::datatype::DataType;

/// A window function evaluated over the rows of a table in order.
pub trait WindowFunction: Debug + Sync + Send + 'static {
    fn new_state(&self, return_type: DataType) -> Box<dyn WindowState>;
}

/// Running state for one pass over a table.
///
/// State carries over between chunks of the same pass. A fresh state is
/// created every time the table is evaluated.
pub trait WindowState: Debug + Send {
    /// Compute the output for the next chunk.
    fn apply(&mut self, inputs: &[Array], num_rows: usize) -> Result<Array>;
}

#[derive(Debug, Clone, Copy)]
pub struct RawWindowFunction {
    signature: &'static Signature,
    function: &'static dyn WindowFunction,
}

impl RawWindowFunction {
    pub const fn new(sig: &'static Signature, function: &'static dyn WindowFunction) -> Self {
        RawWindowFunction {
            signature: sig,
            function,
        }
    }

    pub fn signature(&self) -> &Signature {
        self.signature
    }

    pub fn new_state(&self, return_type: DataType) -> Box<dyn WindowState> {
        self.function.new_state(return_type)
    }
}

/// Read the optional restart flag at `idx`. Null and missing flags never
/// restart.
pub(crate) fn restart_at(inputs: &[Array], idx: usize, row: usize) -> Result<bool> {
    match inputs.get(idx) {
        Some(flags) => Ok(flags.get(row)?.try_as_bool()?.unwrap_or(false)),
        None => Ok(false),
    }
}

pub(crate) fn check_rows(inputs: &[Array], num_rows: usize) -> Result<()> {
    match inputs.iter().find(|input| input.len() != num_rows) {
        Some(input) => Err(DbError::overload_mismatch("Window input has wrong number of rows")
            .with_field("expected", num_rows)
            .with_field("got", input.len())),
        None => Ok(()),
    }
}
