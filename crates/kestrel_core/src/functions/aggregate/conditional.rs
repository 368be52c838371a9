use kestrel_error::{DbError, Result};

use super::{Accumulator, AggregateFunction};
use crate::arrays::array::Array;
use crate::arrays::array::physical_type::PhysicalBool;
use crate::arrays::datatype::DataType;
use crate::arrays::executor::UnaryExecutor;
use crate::arrays::scalar::ScalarValue;

/// Wraps an aggregate so it only sees rows where a predicate argument is
/// true. Backs the `*if` family.
///
/// The predicate is removed from the inputs before they reach the wrapped
/// aggregate.
#[derive(Debug, Clone, Copy)]
pub struct IfAggregate {
    predicate: usize,
    inner: &'static dyn AggregateFunction,
}

impl IfAggregate {
    pub const fn new(predicate: usize, inner: &'static dyn AggregateFunction) -> Self {
        IfAggregate { predicate, inner }
    }
}

impl AggregateFunction for IfAggregate {
    fn new_accumulator(&self, return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(IfAccumulator {
            predicate: self.predicate,
            inner: self.inner.new_accumulator(return_type),
            selected: Vec::new(),
        })
    }
}

#[derive(Debug)]
struct IfAccumulator {
    predicate: usize,
    inner: Box<dyn Accumulator>,
    selected: Vec<usize>,
}

impl Accumulator for IfAccumulator {
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()> {
        let predicate = inputs.get(self.predicate).ok_or_else(|| {
            DbError::overload_mismatch("Missing predicate argument")
                .with_field("idx", self.predicate)
        })?;

        self.selected.clear();
        let mut rows_iter = rows.iter();
        UnaryExecutor::for_each_selected::<PhysicalBool, _>(predicate, rows, |v| {
            // Rows are visited in order, so this stays aligned.
            let row = rows_iter.next().copied();
            if let (Some(true), Some(row)) = (v.copied(), row) {
                self.selected.push(row);
            }
            Ok(())
        })?;

        if self.selected.is_empty() {
            return Ok(());
        }

        let rest: Vec<&Array> = inputs
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.predicate)
            .map(|(_, array)| *array)
            .collect();

        self.inner.update(&rest, &self.selected)
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        self.inner.finalize()
    }
}
