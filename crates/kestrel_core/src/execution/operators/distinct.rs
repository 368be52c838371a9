use std::sync::Arc;

use hashbrown::HashSet;
use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::field::Schema;
use crate::arrays::scalar::key::RowKey;
use crate::execution::context::EvalContext;

/// Drops rows equal to an earlier row. Keeps the first occurrence.
#[derive(Debug)]
pub struct PhysicalDistinct {
    ctx: Arc<EvalContext>,
    input: Box<dyn PullOperator>,
    seen: HashSet<RowKey>,
}

impl PhysicalDistinct {
    pub const OPERATOR_NAME: &str = "Distinct";

    pub fn new(ctx: Arc<EvalContext>, input: Box<dyn PullOperator>) -> Self {
        PhysicalDistinct {
            ctx,
            input,
            seen: HashSet::new(),
        }
    }
}

impl PullOperator for PhysicalDistinct {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        loop {
            self.ctx.check_cancelled()?;
            let batch = match self.input.poll_pull()? {
                PollPull::Batch(batch) => batch,
                PollPull::Exhausted => return Ok(PollPull::Exhausted),
            };

            let mut rows = Vec::new();
            for idx in 0..batch.num_rows() {
                if self.seen.insert(RowKey(batch.row(idx)?)) {
                    rows.push(idx);
                }
            }
            if !rows.is_empty() {
                return Ok(PollPull::Batch(batch.select(&rows)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::batch::Batch;
    use crate::execution::operators::testutil::{ctx, i64_values, rows, utf8_values, values};

    #[test]
    fn distinct_across_chunks() {
        let ctx = ctx();
        let input = values(
            &ctx,
            vec![
                Batch::try_new(vec![i64_values(vec![1, 1, 2]), utf8_values(&["a", "a", "a"])]).unwrap(),
                Batch::try_new(vec![i64_values(vec![2, 1]), utf8_values(&["a", "b"])]).unwrap(),
            ],
        );
        let mut distinct = PhysicalDistinct::new(ctx, input);
        let expected = vec![vec!["1", "a"], vec!["2", "a"], vec!["1", "b"]];
        assert_eq!(expected, rows(&mut distinct));
    }
}
