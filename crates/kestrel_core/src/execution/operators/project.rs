use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;
use crate::execution::expr::PhysicalExpr;

/// Evaluates a list of expressions against every input chunk.
#[derive(Debug)]
pub struct PhysicalProject {
    ctx: Arc<EvalContext>,
    schema: Schema,
    input: Box<dyn PullOperator>,
    exprs: Vec<PhysicalExpr>,
}

impl PhysicalProject {
    pub const OPERATOR_NAME: &str = "Project";

    pub fn new(
        ctx: Arc<EvalContext>,
        schema: Schema,
        input: Box<dyn PullOperator>,
        exprs: Vec<PhysicalExpr>,
    ) -> Self {
        PhysicalProject {
            ctx,
            schema,
            input,
            exprs,
        }
    }
}

impl PullOperator for PhysicalProject {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        let batch = match self.input.poll_pull()? {
            PollPull::Batch(batch) => batch,
            PollPull::Exhausted => return Ok(PollPull::Exhausted),
        };

        let arrays = self
            .exprs
            .iter_mut()
            .map(|expr| expr.eval(&self.ctx, &batch))
            .collect::<Result<Vec<_>>>()?;

        Ok(PollPull::Batch(Batch::try_new_with_rows(
            arrays,
            batch.num_rows(),
        )?))
    }
}
