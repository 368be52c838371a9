use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use kestrel_error::Result;
use tracing::trace;

use super::{PollPull, PullOperator};
use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::builder::ArrayBuilder;
use crate::arrays::datatype::DataType;
use crate::arrays::field::Schema;
use crate::arrays::scalar::key::RowKey;
use crate::execution::context::EvalContext;
use crate::execution::expr::PhysicalExpr;
use crate::functions::aggregate::{Accumulator, RawAggregateFunction};

/// An aggregate with its planned arguments.
#[derive(Debug)]
pub struct PhysicalAggregate {
    pub function: &'static RawAggregateFunction,
    pub args: Vec<PhysicalExpr>,
    pub datatype: DataType,
}

#[derive(Debug)]
struct GroupState {
    accumulators: Vec<Box<dyn Accumulator>>,
}

/// Groups rows by key and folds each group's rows into accumulators.
///
/// Groups are emitted in the order their first row was seen. Without group
/// keys a single group is produced even for empty input.
///
/// Once all input is consumed, the output expressions are evaluated over an
/// intermediate chunk holding the group keys followed by the aggregate
/// results.
#[derive(Debug)]
pub struct PhysicalHashAggregate {
    ctx: Arc<EvalContext>,
    schema: Schema,
    input: Box<dyn PullOperator>,
    groups: Vec<PhysicalExpr>,
    group_types: Vec<DataType>,
    aggregates: Vec<PhysicalAggregate>,
    outputs: Vec<PhysicalExpr>,
    output: Option<VecDeque<Batch>>,
}

impl PhysicalHashAggregate {
    pub const OPERATOR_NAME: &str = "HashAggregate";

    pub fn new(
        ctx: Arc<EvalContext>,
        schema: Schema,
        input: Box<dyn PullOperator>,
        groups: Vec<PhysicalExpr>,
        group_types: Vec<DataType>,
        aggregates: Vec<PhysicalAggregate>,
        outputs: Vec<PhysicalExpr>,
    ) -> Self {
        PhysicalHashAggregate {
            ctx,
            schema,
            input,
            groups,
            group_types,
            aggregates,
            outputs,
            output: None,
        }
    }

    fn new_group(&self) -> GroupState {
        GroupState {
            accumulators: self
                .aggregates
                .iter()
                .map(|agg| agg.function.new_accumulator(agg.datatype))
                .collect(),
        }
    }

    fn aggregate_input(&mut self) -> Result<IndexMap<RowKey, GroupState>> {
        let mut table: IndexMap<RowKey, GroupState> = IndexMap::new();

        loop {
            self.ctx.check_cancelled()?;
            let batch = match self.input.poll_pull()? {
                PollPull::Batch(batch) => batch,
                PollPull::Exhausted => break,
            };
            if batch.num_rows() == 0 {
                continue;
            }

            let keys = self
                .groups
                .iter_mut()
                .map(|expr| expr.eval(&self.ctx, &batch))
                .collect::<Result<Vec<_>>>()?;
            let args = self
                .aggregates
                .iter_mut()
                .map(|agg| {
                    agg.args
                        .iter_mut()
                        .map(|arg| arg.eval(&self.ctx, &batch))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;

            // Rows of this chunk belonging to each group, by group index.
            let mut chunk_rows: IndexMap<usize, Vec<usize>> = IndexMap::new();
            for row in 0..batch.num_rows() {
                let key = RowKey(
                    keys.iter()
                        .map(|array| array.get(row))
                        .collect::<Result<Vec<_>>>()?,
                );
                let group_idx = match table.get_index_of(&key) {
                    Some(idx) => idx,
                    None => {
                        let state = self.new_group();
                        table.insert_full(key, state).0
                    }
                };
                chunk_rows.entry(group_idx).or_default().push(row);
            }

            for (group_idx, rows) in chunk_rows {
                let Some((_, state)) = table.get_index_mut(group_idx) else {
                    continue;
                };
                for (acc, agg_args) in state.accumulators.iter_mut().zip(&args) {
                    let inputs: Vec<&Array> = agg_args.iter().collect();
                    acc.update(&inputs, &rows)?;
                }
            }
        }

        if table.is_empty() && self.groups.is_empty() {
            let state = self.new_group();
            table.insert(RowKey(Vec::new()), state);
        }

        Ok(table)
    }

    fn finish(&mut self, table: IndexMap<RowKey, GroupState>) -> Result<Vec<Batch>> {
        let num_groups = table.len();
        let mut key_builders: Vec<_> = self
            .group_types
            .iter()
            .map(|dt| ArrayBuilder::with_capacity(*dt, num_groups))
            .collect();
        let mut agg_builders: Vec<_> = self
            .aggregates
            .iter()
            .map(|agg| ArrayBuilder::with_capacity(agg.datatype, num_groups))
            .collect();

        for (key, mut state) in table {
            for (builder, value) in key_builders.iter_mut().zip(&key.0) {
                builder.add(value)?;
            }
            for (builder, acc) in agg_builders.iter_mut().zip(state.accumulators.iter_mut()) {
                builder.add(&acc.finalize()?)?;
            }
        }

        let arrays = key_builders
            .into_iter()
            .chain(agg_builders)
            .map(|builder| builder.finish())
            .collect();
        let intermediate = Batch::try_new_with_rows(arrays, num_groups)?;

        let outputs = self
            .outputs
            .iter_mut()
            .map(|expr| expr.eval(&self.ctx, &intermediate))
            .collect::<Result<Vec<_>>>()?;
        let batch = Batch::try_new_with_rows(outputs, num_groups)?;

        trace!(groups = num_groups, "finished aggregate");

        Ok(batch.split(self.ctx.config().batch_size))
    }
}

impl PullOperator for PhysicalHashAggregate {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        if self.output.is_none() {
            let table = self.aggregate_input()?;
            let batches = self.finish(table)?;
            self.output = Some(batches.into());
        }

        match self.output.as_mut().and_then(|out| out.pop_front()) {
            Some(batch) => Ok(PollPull::Batch(batch)),
            None => Ok(PollPull::Exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::field::Field;
    use crate::execution::operators::testutil::{ctx, i64_values, rows, utf8_values, values};
    use crate::functions::registry::FunctionRegistry;

    fn sum_aggregate(column: usize) -> PhysicalAggregate {
        let resolved = FunctionRegistry::new_with_builtins()
            .aggregate("sum")
            .unwrap()
            .resolve(&[DataType::Int64])
            .unwrap();
        PhysicalAggregate {
            function: resolved.function,
            args: vec![PhysicalExpr::Column(column)],
            datatype: resolved.return_type,
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let ctx = ctx();
        let input = values(
            &ctx,
            vec![
                Batch::try_new(vec![utf8_values(&["b", "a", "b"]), i64_values(vec![1, 2, 3])]).unwrap(),
                Batch::try_new(vec![utf8_values(&["c", "a"]), i64_values(vec![4, 5])]).unwrap(),
            ],
        );
        let schema = Schema::try_new([
            Field::new("k", DataType::Utf8),
            Field::new("sum_v", DataType::Int64),
        ])
        .unwrap();

        let mut agg = PhysicalHashAggregate::new(
            ctx,
            schema,
            input,
            vec![PhysicalExpr::Column(0)],
            vec![DataType::Utf8],
            vec![sum_aggregate(1)],
            vec![PhysicalExpr::Column(0), PhysicalExpr::Column(1)],
        );

        let expected = vec![vec!["b", "4"], vec!["a", "7"], vec!["c", "4"]];
        assert_eq!(expected, rows(&mut agg));
    }

    #[test]
    fn no_groups_empty_input() {
        let ctx = ctx();
        let input = values(&ctx, vec![Batch::try_new(vec![i64_values(vec![])]).unwrap()]);
        let schema = Schema::try_new([Field::new("sum_c0", DataType::Int64)]).unwrap();

        let mut agg = PhysicalHashAggregate::new(
            ctx,
            schema,
            input,
            Vec::new(),
            Vec::new(),
            vec![sum_aggregate(0)],
            vec![PhysicalExpr::Column(0)],
        );

        assert_eq!(vec![vec!["(null)"]], rows(&mut agg));
    }
}
