use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, BoxStream, StreamExt};
use kestrel_error::{DbError, Result};

use super::{ChunkIter, TableSource};
use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;

/// Table holding its chunks in memory.
#[derive(Debug)]
pub struct MemoryTableSource {
    name: String,
    schema: Schema,
    batches: Arc<Vec<Batch>>,
    single_scan: bool,
    scanned: AtomicBool,
    prefers_async: bool,
}

impl MemoryTableSource {
    pub fn new(name: impl Into<String>, schema: Schema, batches: Vec<Batch>) -> Self {
        MemoryTableSource {
            name: name.into(),
            schema,
            batches: Arc::new(batches),
            single_scan: false,
            scanned: AtomicBool::new(false),
            prefers_async: false,
        }
    }

    /// Create a table, checking every batch against the schema.
    pub fn try_new(name: impl Into<String>, schema: Schema, batches: Vec<Batch>) -> Result<Self> {
        for batch in &batches {
            batch.verify_schema(&schema)?;
        }
        Ok(Self::new(name, schema, batches))
    }

    /// Only allow a single scan, like a source reading from a live stream.
    pub fn with_single_scan(mut self) -> Self {
        self.single_scan = true;
        self
    }

    /// Have the evaluator use the async scan path.
    pub fn with_async_scan(mut self) -> Self {
        self.prefers_async = true;
        self
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    fn start_scan(&self) -> Result<Arc<Vec<Batch>>> {
        if self.single_scan && self.scanned.swap(true, Ordering::SeqCst) {
            return Err(
                DbError::new("Table can only be scanned once").with_field("table", &self.name)
            );
        }
        Ok(self.batches.clone())
    }
}

impl TableSource for MemoryTableSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn supports_reiteration(&self) -> bool {
        !self.single_scan
    }

    fn scan(&self) -> Result<ChunkIter> {
        let batches = self.start_scan()?;
        Ok(Box::new(
            (0..batches.len()).map(move |idx| Ok(batches[idx].clone())),
        ))
    }

    fn scan_async(&self) -> BoxStream<'static, Result<Batch>> {
        match self.start_scan() {
            Ok(batches) => stream::iter(0..batches.len())
                .then(move |idx| {
                    let batch = batches[idx].clone();
                    async move { Ok(batch) }
                })
                .boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    fn prefers_async(&self) -> bool {
        self.prefers_async
    }
}
