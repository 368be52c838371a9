use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::array::Array;
use crate::arrays::array::physical_type::PhysicalI64;
use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;

/// Counts input rows, emitting a single row with a single long column.
#[derive(Debug)]
pub struct PhysicalCount {
    ctx: Arc<EvalContext>,
    schema: Schema,
    input: Box<dyn PullOperator>,
    finished: bool,
}

impl PhysicalCount {
    pub const OPERATOR_NAME: &str = "Count";

    pub fn new(ctx: Arc<EvalContext>, schema: Schema, input: Box<dyn PullOperator>) -> Self {
        PhysicalCount {
            ctx,
            schema,
            input,
            finished: false,
        }
    }
}

impl PullOperator for PhysicalCount {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        if self.finished {
            return Ok(PollPull::Exhausted);
        }

        let mut count: i64 = 0;
        loop {
            self.ctx.check_cancelled()?;
            match self.input.poll_pull()? {
                PollPull::Batch(batch) => count += batch.num_rows() as i64,
                PollPull::Exhausted => break,
            }
        }
        self.finished = true;

        let array = Array::try_from_values::<PhysicalI64>(DataType::Int64, vec![count])?;
        Ok(PollPull::Batch(Batch::try_new(vec![array])?))
    }
}
