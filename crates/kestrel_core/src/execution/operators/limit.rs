use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;

/// Passes through at most `limit` rows, then stops pulling its input.
#[derive(Debug)]
pub struct PhysicalLimit {
    ctx: Arc<EvalContext>,
    input: Box<dyn PullOperator>,
    remaining: u64,
}

impl PhysicalLimit {
    pub const OPERATOR_NAME: &str = "Limit";

    pub fn new(ctx: Arc<EvalContext>, input: Box<dyn PullOperator>, limit: u64) -> Self {
        PhysicalLimit {
            ctx,
            input,
            remaining: limit,
        }
    }
}

impl PullOperator for PhysicalLimit {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        if self.remaining == 0 {
            return Ok(PollPull::Exhausted);
        }
        let batch = match self.input.poll_pull()? {
            PollPull::Batch(batch) => batch,
            PollPull::Exhausted => return Ok(PollPull::Exhausted),
        };

        let num_rows = batch.num_rows() as u64;
        if num_rows <= self.remaining {
            self.remaining -= num_rows;
            return Ok(PollPull::Batch(batch));
        }
        let take = self.remaining as usize;
        self.remaining = 0;
        Ok(PollPull::Batch(batch.slice(0, take)))
    }
}
