use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::{DbError, Result};

use super::{Accumulator, AggregateFunction};
use crate::arrays::array::Array;
use crate::arrays::array::physical_type::ScalarStorage;
use crate::arrays::datatype::DataType;
use crate::arrays::executor::UnaryExecutor;
use crate::arrays::scalar::ScalarValue;

/// Per group state folding inputs of type `I` into an output of type `O`.
pub trait AggregateState<I: ?Sized, O>: Debug + Default + Send + 'static {
    /// Update with a single non-null input.
    fn update(&mut self, input: &I) -> Result<()>;

    /// The final value, None for null.
    fn finalize(&mut self) -> Result<Option<O>>;
}

/// An aggregate over a single column that ignores nulls.
pub trait UnaryAggregate: Debug + Sync + Send + Copy + 'static {
    type Input: ScalarStorage;
    type Output: ScalarStorage;

    type GroupState: AggregateState<
            <Self::Input as ScalarStorage>::StorageType,
            <Self::Output as ScalarStorage>::StorageType,
        >;
}

/// Adapts a [`UnaryAggregate`] to the [`AggregateFunction`] interface.
#[derive(Debug, Clone, Copy)]
pub struct SimpleUnaryAggregate<U: 'static> {
    _aggregate: &'static U,
}

impl<U> SimpleUnaryAggregate<U>
where
    U: UnaryAggregate,
{
    pub const fn new(aggregate: &'static U) -> Self {
        SimpleUnaryAggregate {
            _aggregate: aggregate,
        }
    }
}

impl<U> AggregateFunction for SimpleUnaryAggregate<U>
where
    U: UnaryAggregate,
{
    fn new_accumulator(&self, return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(UnaryAccumulator::<U> {
            state: U::GroupState::default(),
            return_type,
            _u: PhantomData,
        })
    }
}

#[derive(Debug)]
struct UnaryAccumulator<U: UnaryAggregate> {
    state: U::GroupState,
    return_type: DataType,
    _u: PhantomData<U>,
}

impl<U> Accumulator for UnaryAccumulator<U>
where
    U: UnaryAggregate,
{
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()> {
        let input = inputs
            .first()
            .ok_or_else(|| DbError::overload_mismatch("Aggregate expects one input"))?;
        UnaryExecutor::for_each_selected::<U::Input, _>(input, rows, |v| match v {
            Some(v) => self.state.update(v),
            None => Ok(()),
        })
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        let value = self.state.finalize()?;
        Ok(U::Output::into_scalar(self.return_type, value))
    }
}
