use std::sync::Arc;

use kestrel_error::Result;
use tracing::trace;

use super::{PollPull, PullOperator, drain};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;

/// Evaluates its input once per evaluation and replays the chunks to every
/// consumer sharing the same id.
#[derive(Debug)]
pub struct PhysicalMaterialize {
    ctx: Arc<EvalContext>,
    id: usize,
    input: Box<dyn PullOperator>,
    batches: Option<Arc<Vec<Batch>>>,
    next: usize,
}

impl PhysicalMaterialize {
    pub const OPERATOR_NAME: &str = "Materialize";

    pub fn new(ctx: Arc<EvalContext>, id: usize, input: Box<dyn PullOperator>) -> Self {
        PhysicalMaterialize {
            ctx,
            id,
            input,
            batches: None,
            next: 0,
        }
    }

    fn load(&mut self) -> Result<Arc<Vec<Batch>>> {
        if let Some(batches) = self.ctx.get_materialized(self.id) {
            return Ok(batches);
        }
        let batches = drain(self.input.as_mut())?;
        trace!(id = self.id, chunks = batches.len(), "materialized input");
        Ok(self.ctx.put_materialized(self.id, batches))
    }
}

impl PullOperator for PhysicalMaterialize {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        let batches = match &self.batches {
            Some(batches) => batches.clone(),
            None => {
                let batches = self.load()?;
                self.batches = Some(batches.clone());
                batches
            }
        };

        match batches.get(self.next) {
            Some(batch) => {
                self.next += 1;
                Ok(PollPull::Batch(batch.clone()))
            }
            None => Ok(PollPull::Exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;
    use crate::execution::operators::scan::PhysicalScan;
    use crate::execution::operators::testutil::{ctx, i64_values, rows};
    use crate::storage::MemoryTableSource;

    #[test]
    fn shared_id_scans_once() {
        let ctx = ctx();
        let schema = Schema::try_new([Field::new("a", DataType::Int64)]).unwrap();
        let batch = Batch::try_new(vec![i64_values(vec![1, 2])]).unwrap();
        let table = Arc::new(
            MemoryTableSource::try_new("t", schema, vec![batch])
                .unwrap()
                .with_single_scan(),
        );

        let mut first = PhysicalMaterialize::new(
            ctx.clone(),
            0,
            Box::new(PhysicalScan::new(ctx.clone(), table.clone())),
        );
        let mut second =
            PhysicalMaterialize::new(ctx.clone(), 0, Box::new(PhysicalScan::new(ctx, table)));

        assert_eq!(vec![vec!["1"], vec!["2"]], rows(&mut first));
        assert_eq!(vec![vec!["1"], vec!["2"]], rows(&mut second));
    }
}
