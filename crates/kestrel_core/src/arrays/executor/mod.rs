pub mod binary;
pub mod ternary;
pub mod unary;

pub use binary::BinaryExecutor;
pub use ternary::TernaryExecutor;
pub use unary::UnaryExecutor;

use kestrel_error::Result;

use super::array::Array;
use super::array::physical_type::ScalarStorage;
use super::array::validity::Validity;
use super::datatype::DataType;

/// Output slots for an executor, all rows start out null.
#[derive(Debug)]
pub struct OutBuffer<S: ScalarStorage> {
    values: Vec<S::StorageType>,
    valid: Vec<bool>,
}

impl<S: ScalarStorage> OutBuffer<S> {
    pub fn new(len: usize) -> Self {
        OutBuffer {
            values: vec![S::StorageType::default(); len],
            valid: vec![false; len],
        }
    }

    pub fn put_buffer(&mut self, idx: usize) -> PutBuffer<'_, S::StorageType> {
        PutBuffer {
            value: &mut self.values[idx],
            valid: &mut self.valid[idx],
        }
    }

    pub fn into_array(self, datatype: DataType) -> Result<Array> {
        Array::try_new(
            datatype,
            S::into_data(self.values),
            Validity::from_iter_valid(self.valid),
        )
    }
}

/// Write handle for a single output row.
///
/// Dropping the buffer without calling `put` leaves the row null.
#[derive(Debug)]
pub struct PutBuffer<'a, T> {
    value: &'a mut T,
    valid: &'a mut bool,
}

impl<T> PutBuffer<'_, T> {
    pub fn put(self, value: T) {
        *self.value = value;
        *self.valid = true;
    }

    pub fn put_null(self) {
        *self.valid = false;
    }
}
