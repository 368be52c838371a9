use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use futures::executor::block_on;
use futures::stream::BoxStream;
use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;
use crate::storage::{ChunkIter, TableSource};

enum ScanState {
    NotStarted,
    Sync(ChunkIter),
    Async(BoxStream<'static, Result<Batch>>),
    Done,
}

impl fmt::Debug for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Sync(_) => write!(f, "Sync"),
            Self::Async(_) => write!(f, "Async"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Reads chunks from a table source.
///
/// The scan starts on the first pull. Sources preferring async scans are
/// driven to completion one chunk at a time.
#[derive(Debug)]
pub struct PhysicalScan {
    ctx: Arc<EvalContext>,
    table: Arc<dyn TableSource>,
    state: ScanState,
}

impl PhysicalScan {
    pub const OPERATOR_NAME: &str = "Scan";

    pub fn new(ctx: Arc<EvalContext>, table: Arc<dyn TableSource>) -> Self {
        PhysicalScan {
            ctx,
            table,
            state: ScanState::NotStarted,
        }
    }

    fn next_chunk(&mut self) -> Option<Result<Batch>> {
        match &mut self.state {
            ScanState::Sync(iter) => iter.next(),
            ScanState::Async(stream) => block_on(stream.next()),
            ScanState::NotStarted | ScanState::Done => None,
        }
    }
}

impl PullOperator for PhysicalScan {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        self.table.schema()
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;

        if let ScanState::NotStarted = self.state {
            self.state = if self.table.prefers_async() {
                ScanState::Async(self.table.scan_async())
            } else {
                ScanState::Sync(self.table.scan()?)
            };
        }

        match self.next_chunk() {
            Some(batch) => Ok(PollPull::Batch(batch?)),
            None => {
                self.state = ScanState::Done;
                Ok(PollPull::Exhausted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;
    use crate::execution::operators::testutil::{ctx, i64_values, rows};
    use crate::storage::MemoryTableSource;

    fn table() -> MemoryTableSource {
        let schema = Schema::try_new([Field::new("a", DataType::Int64)]).unwrap();
        let batches = vec![
            Batch::try_new(vec![i64_values(vec![1, 2])]).unwrap(),
            Batch::try_new(vec![i64_values(vec![3])]).unwrap(),
        ];
        MemoryTableSource::try_new("t", schema, batches).unwrap()
    }

    #[test]
    fn scan_sync_and_async() {
        let ctx = ctx();
        let mut scan = PhysicalScan::new(ctx.clone(), Arc::new(table()));
        let sync_rows = rows(&mut scan);

        let mut scan = PhysicalScan::new(ctx, Arc::new(table().with_async_scan()));
        let async_rows = rows(&mut scan);

        assert_eq!(vec![vec!["1"], vec!["2"], vec!["3"]], sync_rows);
        assert_eq!(sync_rows, async_rows);
    }

    #[test]
    fn scan_cancelled() {
        let token = crate::execution::context::CancellationToken::new();
        let ctx = EvalContext::new(uuid::Uuid::new_v4(), Default::default(), token.clone());
        let mut scan = PhysicalScan::new(ctx, Arc::new(table()));
        token.cancel();
        assert!(scan.poll_pull().unwrap_err().is_cancelled());
    }
}
