//! Pull based operators.
//!
//! Every query node is planned into an operator that produces its output one
//! chunk at a time. Operators check for cancellation every time they're
//! pulled.

pub mod count;
pub mod distinct;
pub mod filter;
pub mod hash_aggregate;
pub mod hash_join;
pub mod limit;
pub mod materialize;
pub mod project;
pub mod scan;
pub mod single_row;
pub mod sort;
pub mod union;
pub mod values;
pub mod verify;

use std::fmt::Debug;

use kestrel_error::Result;

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;

/// Result of pulling from an operator.
#[derive(Debug)]
pub enum PollPull {
    /// The next chunk. May have zero rows.
    Batch(Batch),
    /// No more chunks will be produced.
    Exhausted,
}

pub trait PullOperator: Debug + Send {
    fn operator_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn poll_pull(&mut self) -> Result<PollPull>;
}

/// Pull every remaining chunk from an operator.
pub fn drain(operator: &mut dyn PullOperator) -> Result<Vec<Batch>> {
    let mut batches = Vec::new();
    loop {
        match operator.poll_pull()? {
            PollPull::Batch(batch) => batches.push(batch),
            PollPull::Exhausted => return Ok(batches),
        }
    }
}
