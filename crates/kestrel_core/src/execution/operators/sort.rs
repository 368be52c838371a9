use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::Arc;

use kestrel_error::Result;

use super::{PollPull, PullOperator, drain};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::arrays::scalar::ScalarValue;
use crate::execution::context::EvalContext;
use crate::execution::expr::PhysicalExpr;

#[derive(Debug)]
pub struct PhysicalSortKey {
    pub expr: PhysicalExpr,
    pub descending: bool,
    pub nulls_first: bool,
}

/// Sorts the full input. The sort is stable.
///
/// Empty strings are placed like nulls.
#[derive(Debug)]
pub struct PhysicalSort {
    ctx: Arc<EvalContext>,
    input: Box<dyn PullOperator>,
    keys: Vec<PhysicalSortKey>,
    output: Option<VecDeque<Batch>>,
}

impl PhysicalSort {
    pub const OPERATOR_NAME: &str = "Sort";

    pub fn new(
        ctx: Arc<EvalContext>,
        input: Box<dyn PullOperator>,
        keys: Vec<PhysicalSortKey>,
    ) -> Self {
        PhysicalSort {
            ctx,
            input,
            keys,
            output: None,
        }
    }

    fn sort_input(&mut self) -> Result<Vec<Batch>> {
        let batches = drain(self.input.as_mut())?;
        let batch = Batch::concat(self.input.schema(), &batches)?;
        let num_rows = batch.num_rows();

        let key_values = self
            .keys
            .iter_mut()
            .map(|key| {
                key.expr
                    .eval(&self.ctx, &batch)?
                    .iter_scalars()
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let mut indices: Vec<usize> = (0..num_rows).collect();
        indices.sort_by(|&a, &b| {
            for (key, values) in self.keys.iter().zip(&key_values) {
                let ord =
                    compare_sort_values(&values[a], &values[b], key.descending, key.nulls_first);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        Ok(batch.select(&indices).split(self.ctx.config().batch_size))
    }
}

fn is_null_like(value: &ScalarValue) -> bool {
    match value {
        ScalarValue::Utf8(Some(s)) => s.is_empty(),
        other => other.is_null(),
    }
}

fn compare_sort_values(
    a: &ScalarValue,
    b: &ScalarValue,
    descending: bool,
    nulls_first: bool,
) -> Ordering {
    match (is_null_like(a), is_null_like(b)) {
        (true, true) => Ordering::Equal,
        (true, false) if nulls_first => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if nulls_first => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if descending => b.total_cmp(a),
        (false, false) => a.total_cmp(b),
    }
}

impl PullOperator for PhysicalSort {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        if self.output.is_none() {
            let batches = self.sort_input()?;
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
    use crate::execution::operators::testutil::{ctx, i64_array, rows, utf8_values, values};

    fn sorted(descending: bool, nulls_first: bool) -> Vec<Vec<String>> {
        let ctx = ctx();
        let input = values(
            &ctx,
            vec![
                Batch::try_new(vec![i64_array(&[Some(2), None]), utf8_values(&["x", "y"])]).unwrap(),
                Batch::try_new(vec![i64_array(&[Some(3), Some(1)]), utf8_values(&["z", "w"])]).unwrap(),
            ],
        );
        let keys = vec![PhysicalSortKey {
            expr: PhysicalExpr::Column(0),
            descending,
            nulls_first,
        }];
        let mut sort = PhysicalSort::new(ctx, input, keys);
        rows(&mut sort).into_iter().map(|row| row[0..1].to_vec()).collect()
    }

    #[test]
    fn descending_nulls_last() {
        let expected = vec![vec!["3"], vec!["2"], vec!["1"], vec!["(null)"]];
        assert_eq!(expected, sorted(true, false));
    }

    #[test]
    fn ascending_nulls_first() {
        let expected = vec![vec!["(null)"], vec!["1"], vec!["2"], vec!["3"]];
        assert_eq!(expected, sorted(false, true));
    }

    #[test]
    fn empty_string_placed_like_null() {
        let a = ScalarValue::from("");
        let b = ScalarValue::from("a");
        assert_eq!(Ordering::Greater, compare_sort_values(&a, &b, true, false));
        assert_eq!(Ordering::Less, compare_sort_values(&a, &b, false, true));
    }
}
