use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use kestrel_error::Result;
use tracing::trace;

use super::{PollPull, PullOperator, drain};
use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::field::Schema;
use crate::arrays::scalar::key::RowKey;
use crate::bound::JoinKind;
use crate::execution::context::EvalContext;
use crate::functions::cast::cast_array;

/// Equality join on key columns.
///
/// Both sides are fully consumed. Keys are compared after casting each side
/// to the key's common type. Rows with a null key never match.
#[derive(Debug)]
pub struct PhysicalHashJoin {
    ctx: Arc<EvalContext>,
    schema: Schema,
    left: Box<dyn PullOperator>,
    right: Box<dyn PullOperator>,
    kind: JoinKind,
    left_keys: Vec<usize>,
    right_keys: Vec<usize>,
    key_types: Vec<DataType>,
    output: Option<VecDeque<Batch>>,
}

/// Rows taken from each side for every output row.
#[derive(Debug, Default, PartialEq, Eq)]
struct JoinRows {
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
}

impl JoinRows {
    fn push(&mut self, left: Option<usize>, right: Option<usize>) {
        self.left.push(left);
        self.right.push(right);
    }
}

impl PhysicalHashJoin {
    pub const OPERATOR_NAME: &str = "HashJoin";

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: Arc<EvalContext>,
        schema: Schema,
        left: Box<dyn PullOperator>,
        right: Box<dyn PullOperator>,
        kind: JoinKind,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
        key_types: Vec<DataType>,
    ) -> Self {
        PhysicalHashJoin {
            ctx,
            schema,
            left,
            right,
            kind,
            left_keys,
            right_keys,
            key_types,
            output: None,
        }
    }

    fn join(&mut self) -> Result<Vec<Batch>> {
        let left_batches = drain(self.left.as_mut())?;
        let left = Batch::concat(self.left.schema(), &left_batches)?;
        let right_batches = drain(self.right.as_mut())?;
        let right = Batch::concat(self.right.schema(), &right_batches)?;
        self.ctx.check_cancelled()?;

        let left_keys = row_keys(&left, &self.left_keys, &self.key_types)?;
        let right_keys = row_keys(&right, &self.right_keys, &self.key_types)?;

        let output = match self.kind {
            JoinKind::LeftSemi | JoinKind::LeftAnti => {
                let right_set: HashSet<&RowKey> = right_keys.iter().flatten().collect();
                let keep = self.kind == JoinKind::LeftSemi;
                let rows = matching_rows(&left_keys, &right_set, keep);
                left.select(&rows)
            }
            JoinKind::RightSemi | JoinKind::RightAnti => {
                let left_set: HashSet<&RowKey> = left_keys.iter().flatten().collect();
                let keep = self.kind == JoinKind::RightSemi;
                let rows = matching_rows(&right_keys, &left_set, keep);
                right.select(&rows)
            }
            _ => {
                let rows = self.pair_rows(&left_keys, &right_keys);
                let arrays: Vec<Array> = left
                    .arrays()
                    .iter()
                    .map(|a| a.select_or_null(&rows.left))
                    .chain(right.arrays().iter().map(|a| a.select_or_null(&rows.right)))
                    .collect();
                Batch::try_new_with_rows(arrays, rows.left.len())?
            }
        };

        trace!(
            kind = ?self.kind,
            left_rows = left.num_rows(),
            right_rows = right.num_rows(),
            output_rows = output.num_rows(),
            "finished join"
        );

        Ok(output.split(self.ctx.config().batch_size))
    }

    fn pair_rows(&self, left_keys: &[Option<RowKey>], right_keys: &[Option<RowKey>]) -> JoinRows {
        let mut table: HashMap<&RowKey, Vec<usize>> = HashMap::new();
        for (idx, key) in right_keys.iter().enumerate() {
            if let Some(key) = key {
                table.entry(key).or_default().push(idx);
            }
        }

        let mut seen_left: HashSet<&RowKey> = HashSet::new();
        let mut right_matched = vec![false; right_keys.len()];
        let mut rows = JoinRows::default();

        for (left_idx, key) in left_keys.iter().enumerate() {
            let matches = key.as_ref().and_then(|key| table.get(key));
            if self.kind == JoinKind::InnerUnique {
                if let Some(key) = key {
                    if !seen_left.insert(key) {
                        continue;
                    }
                }
            }
            match matches {
                Some(matches) => {
                    for &right_idx in matches {
                        right_matched[right_idx] = true;
                        rows.push(Some(left_idx), Some(right_idx));
                    }
                }
                None if matches!(self.kind, JoinKind::LeftOuter | JoinKind::FullOuter) => {
                    rows.push(Some(left_idx), None);
                }
                None => (),
            }
        }

        if matches!(self.kind, JoinKind::RightOuter | JoinKind::FullOuter) {
            for (right_idx, matched) in right_matched.into_iter().enumerate() {
                if !matched {
                    rows.push(None, Some(right_idx));
                }
            }
        }

        rows
    }
}

/// Key for every row, `None` for rows with a null key.
fn row_keys(
    batch: &Batch,
    columns: &[usize],
    key_types: &[DataType],
) -> Result<Vec<Option<RowKey>>> {
    let arrays = columns
        .iter()
        .zip(key_types)
        .map(|(&idx, &datatype)| cast_array(batch.array(idx)?, datatype))
        .collect::<Result<Vec<_>>>()?;

    (0..batch.num_rows())
        .map(|row| {
            let key = RowKey(
                arrays
                    .iter()
                    .map(|array| array.get(row))
                    .collect::<Result<Vec<_>>>()?,
            );
            Ok(if key.has_null() { None } else { Some(key) })
        })
        .collect()
}

/// Rows whose key is (or, when `keep` is false, isn't) in `other`.
fn matching_rows(keys: &[Option<RowKey>], other: &HashSet<&RowKey>, keep: bool) -> Vec<usize> {
    keys.iter()
        .enumerate()
        .filter(|(_, key)| matches!(key, Some(key) if other.contains(key)) == keep)
        .map(|(idx, _)| idx)
        .collect()
}

impl PullOperator for PhysicalHashJoin {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        self.ctx.check_cancelled()?;
        if self.output.is_none() {
            let batches = self.join()?;
            self.output = Some(batches.into());
        }
        match self.output.as_mut().and_then(|out| out.pop_front()) {
            Some(batch) => Ok(PollPull::Batch(batch)),
            None => Ok(PollPull::Exhausted),
        }
    }
}
