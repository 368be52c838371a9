use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator};
use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::execution::context::EvalContext;

/// Concatenates its inputs in order.
///
/// Every input chunk is mapped onto the output schema, filling columns the
/// input doesn't have with nulls.
#[derive(Debug)]
pub struct PhysicalUnion {
    ctx: Arc<EvalContext>,
    schema: Schema,
    inputs: Vec<Box<dyn PullOperator>>,
    mappings: Vec<Vec<Option<usize>>>,
    current: usize,
}

impl PhysicalUnion {
    pub const OPERATOR_NAME: &str = "Union";

    pub fn new(
        ctx: Arc<EvalContext>,
        schema: Schema,
        inputs: Vec<Box<dyn PullOperator>>,
        mappings: Vec<Vec<Option<usize>>>,
    ) -> Self {
        PhysicalUnion {
            ctx,
            schema,
            inputs,
            mappings,
            current: 0,
        }
    }

    fn map_batch(&self, batch: Batch) -> Result<Batch> {
        let num_rows = batch.num_rows();
        let arrays = self.mappings[self.current]
            .iter()
            .zip(self.schema.fields())
            .map(|(source, field)| match source {
                Some(idx) => Ok(batch.array(*idx)?.clone()),
                None => Ok(Array::new_null(field.datatype, num_rows)),
            })
            .collect::<Result<Vec<_>>>()?;
        Batch::try_new_with_rows(arrays, num_rows)
    }
}

impl PullOperator for PhysicalUnion {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        loop {
            self.ctx.check_cancelled()?;
            let Some(input) = self.inputs.get_mut(self.current) else {
                return Ok(PollPull::Exhausted);
            };
            match input.poll_pull()? {
                PollPull::Batch(batch) => return Ok(PollPull::Batch(self.map_batch(batch)?)),
                PollPull::Exhausted => self.current += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::schema::union_schema;
    use crate::execution::operators::testutil::{ctx, i64_values, rows, utf8_values, values};

    #[test]
    fn fills_missing_columns() {
        let ctx = ctx();
        let first = values(&ctx, vec![Batch::try_new(vec![i64_values(vec![1])]).unwrap()]);
        let second = values(
            &ctx,
            vec![Batch::try_new(vec![utf8_values(&["x"]), i64_values(vec![2])]).unwrap()],
        );
        let schemas = union_schema(&[first.schema(), second.schema()]).unwrap();
        let mut union = PhysicalUnion::new(ctx, schemas.schema, vec![first, second], schemas.mappings);

        assert_eq!(
            "c0_long:long; c0_string:string; c1:long",
            union.schema().to_string()
        );
        let expected = vec![vec!["1", "", "(null)"], vec!["(null)", "x", "2"]];
        assert_eq!(expected, rows(&mut union));
    }
}
