use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::array::physical_type::{PhysicalBool, ScalarStorage};
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;
use crate::execution::expr::PhysicalExpr;

/// Keeps rows where the predicate is true. Null counts as false.
#[derive(Debug)]
pub struct PhysicalFilter {
    ctx: Arc<EvalContext>,
    input: Box<dyn PullOperator>,
    predicate: PhysicalExpr,
}

impl PhysicalFilter {
    pub const OPERATOR_NAME: &str = "Filter";

    pub fn new(
        ctx: Arc<EvalContext>,
        input: Box<dyn PullOperator>,
        predicate: PhysicalExpr,
    ) -> Self {
        PhysicalFilter {
            ctx,
            input,
            predicate,
        }
    }
}

impl PullOperator for PhysicalFilter {
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

            let selection = self.predicate.eval(&self.ctx, &batch)?;
            let values = PhysicalBool::get_storage(selection.data())?;
            let rows: Vec<usize> = values
                .iter()
                .enumerate()
                .filter(|&(idx, &keep)| keep && selection.is_valid(idx))
                .map(|(idx, _)| idx)
                .collect();

            if rows.is_empty() {
                continue;
            }
            if rows.len() == batch.num_rows() {
                return Ok(PollPull::Batch(batch));
            }
            return Ok(PollPull::Batch(batch.select(&rows)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::batch::Batch;
    use crate::arrays::datatype::DataType;
    use crate::execution::operators::testutil::{ctx, i64_array, rows, values};
    use crate::arrays::scalar::ScalarValue;
    use crate::functions::registry::FunctionRegistry;
    use crate::ir::ResultKind;

    #[test]
    fn filter_skips_empty_and_null() {
        let ctx = ctx();
        let input = values(
            &ctx,
            vec![
                Batch::try_new(vec![i64_array(&[Some(1), None])]).unwrap(),
                Batch::try_new(vec![i64_array(&[Some(5), Some(2), Some(7)])]).unwrap(),
            ],
        );
        let resolved = FunctionRegistry::new_with_builtins()
            .scalar("greater_than")
            .unwrap()
            .resolve(&[DataType::Int64, DataType::Int64])
            .unwrap();
        let predicate = PhysicalExpr::ScalarCall {
            function: resolved.function,
            args: vec![
                PhysicalExpr::Column(0),
                PhysicalExpr::Literal(ScalarValue::from(3_i64)),
            ],
            return_type: DataType::Boolean,
            result_kind: ResultKind::Columnar,
        };

        let mut filter = PhysicalFilter::new(ctx, input, predicate);
        assert_eq!(vec![vec!["5"], vec!["7"]], rows(&mut filter));
    }
}
