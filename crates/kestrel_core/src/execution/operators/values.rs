use std::collections::VecDeque;
use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;

/// Emits chunks that are already in memory.
#[derive(Debug)]
pub struct PhysicalValues {
    ctx: Arc<EvalContext>,
    schema: Schema,
    batches: VecDeque<Batch>,
}

impl PhysicalValues {
    pub const OPERATOR_NAME: &str = "Values";

    pub fn new(ctx: Arc<EvalContext>, schema: Schema, batches: Vec<Batch>) -> Self {
        PhysicalValues {
            ctx,
            schema,
            batches: batches.into(),
        }
    }
}

impl PullOperator for PhysicalValues {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        match self.batches.pop_front() {
            Some(batch) => Ok(PollPull::Batch(batch)),
            None => Ok(PollPull::Exhausted),
        }
    }
}
