use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;

/// Emits a single row with no columns.
#[derive(Debug)]
pub struct PhysicalSingleRow {
    ctx: Arc<EvalContext>,
    schema: Schema,
    emitted: bool,
}

impl PhysicalSingleRow {
    pub const OPERATOR_NAME: &str = "SingleRow";

    pub fn new(ctx: Arc<EvalContext>) -> Self {
        PhysicalSingleRow {
            ctx,
            schema: Schema::empty(),
            emitted: false,
        }
    }
}

impl PullOperator for PhysicalSingleRow {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        if self.emitted {
            return Ok(PollPull::Exhausted);
        }
        self.emitted = true;
        Ok(PollPull::Batch(Batch::try_new_with_rows(Vec::new(), 1)?))
    }
}
