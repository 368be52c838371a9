use std::fmt;

use futures::stream::{self, Stream};
use kestrel_error::Result;
use uuid::Uuid;

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;
use crate::arrays::format::dump_batches;
use crate::arrays::scalar::ScalarValue;
use crate::execution::operators::{PollPull, PullOperator};

/// A single output row.
pub type Row = Vec<ScalarValue>;

#[derive(Debug)]
pub struct QueryResult {
    pub query_id: Uuid,
    pub output: Output,
}

#[derive(Debug)]
pub enum Output {
    Scalar(ScalarValue),
    Table(TableResult),
}

impl QueryResult {
    /// Render the result in the dump format. A scalar renders as a single
    /// unnamed column.
    pub fn dump_to_string(self) -> Result<String> {
        match self.output {
            Output::Scalar(value) => Ok(value.to_string()),
            Output::Table(table) => table.dump_to_string(),
        }
    }

    pub fn into_table(self) -> Option<TableResult> {
        match self.output {
            Output::Table(table) => Some(table),
            Output::Scalar(_) => None,
        }
    }

    pub fn into_scalar(self) -> Option<ScalarValue> {
        match self.output {
            Output::Scalar(value) => Some(value),
            Output::Table(_) => None,
        }
    }
}

/// Lazily evaluated table output.
///
/// Chunks are pulled from the operator tree on demand. Once exhausted, every
/// further call returns `None`.
pub struct TableResult {
    schema: Schema,
    root: Option<Box<dyn PullOperator>>,
    /// Current chunk and the next row to return from it.
    current: Option<(Batch, usize)>,
}

impl fmt::Debug for TableResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableResult")
            .field("schema", &self.schema)
            .field("exhausted", &self.root.is_none())
            .finish_non_exhaustive()
    }
}

impl TableResult {
    pub(crate) fn new(schema: Schema, root: Box<dyn PullOperator>) -> Self {
        TableResult {
            schema,
            root: Some(root),
            current: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Pull the next chunk, skipping empty ones.
    pub fn next_chunk(&mut self) -> Result<Option<Batch>> {
        if let Some((batch, offset)) = self.current.take() {
            if offset < batch.num_rows() {
                return Ok(Some(batch.slice(offset, batch.num_rows() - offset)));
            }
        }

        loop {
            let Some(root) = self.root.as_mut() else {
                return Ok(None);
            };
            match root.poll_pull()? {
                PollPull::Batch(batch) if batch.num_rows() == 0 => continue,
                PollPull::Batch(batch) => return Ok(Some(batch)),
                PollPull::Exhausted => {
                    self.root = None;
                    return Ok(None);
                }
            }
        }
    }

    /// Next row, or `None` once the table is exhausted.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some((batch, offset)) = &mut self.current {
                if *offset < batch.num_rows() {
                    let row = batch.row(*offset)?;
                    *offset += 1;
                    return Ok(Some(row));
                }
            }
            self.current = None;
            match self.next_chunk()? {
                Some(batch) => self.current = Some((batch, 0)),
                None => return Ok(None),
            }
        }
    }

    /// Pull all remaining chunks.
    pub fn collect_chunks(&mut self) -> Result<Vec<Batch>> {
        let mut batches = Vec::new();
        while let Some(batch) = self.next_chunk()? {
            batches.push(batch);
        }
        Ok(batches)
    }

    /// Render the remaining rows with a `name:kind` header.
    pub fn dump_to_string(mut self) -> Result<String> {
        let batches = self.collect_chunks()?;
        dump_batches(&self.schema, &batches)
    }

    /// Expose the remaining chunks as a stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Batch>> + Send {
        stream::unfold(Some(self), |table| async move {
            let mut table = table?;
            match table.next_chunk() {
                Ok(Some(batch)) => Some((Ok(batch), Some(table))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
