//! Table sources consumed by the engine.

pub mod memory;

use std::fmt::Debug;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use indexmap::IndexMap;
use kestrel_error::{DbError, Result};

use crate::arrays::batch::Batch;
use crate::arrays::field::Schema;

pub use memory::MemoryTableSource;

/// Synchronous chunk iterator returned by a table scan.
pub type ChunkIter = Box<dyn Iterator<Item = Result<Batch>> + Send>;

/// A named table exposing a schema and a sequence of chunks.
pub trait TableSource: Debug + Sync + Send {
    fn name(&self) -> &str;

    fn schema(&self) -> &Schema;

    /// If the table can be scanned more than once, producing the same rows
    /// each time.
    fn supports_reiteration(&self) -> bool {
        true
    }

    /// Start a new scan over the table.
    fn scan(&self) -> Result<ChunkIter>;

    /// Start a new scan producing chunks asynchronously.
    ///
    /// Must yield exactly the rows `scan` yields.
    fn scan_async(&self) -> BoxStream<'static, Result<Batch>> {
        match self.scan() {
            Ok(iter) => stream::iter(iter).boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    /// If the evaluator should pull from `scan_async`.
    fn prefers_async(&self) -> bool {
        false
    }
}

/// Name indexed tables visible to queries, in registration order.
#[derive(Debug, Clone, Default)]
pub struct GlobalTables {
    tables: IndexMap<String, Arc<dyn TableSource>>,
}

impl GlobalTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its own name, erroring if the name is taken.
    pub fn register(&mut self, table: Arc<dyn TableSource>) -> Result<()> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(DbError::new("Table already registered").with_field("name", name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Register or replace a table.
    pub fn upsert(&mut self, table: Arc<dyn TableSource>) {
        self.tables.insert(table.name().to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn TableSource>> {
        self.tables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TableSource>> {
        self.tables.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;

    fn table(name: &str) -> Arc<dyn TableSource> {
        let schema = Schema::try_new([Field::new("a", DataType::Int64)]).unwrap();
        Arc::new(MemoryTableSource::new(name, schema, Vec::new()))
    }

    #[test]
    fn register_duplicate() {
        let mut tables = GlobalTables::new();
        tables.register(table("t")).unwrap();
        assert!(tables.register(table("t")).is_err());

        tables.upsert(table("t"));
        tables.register(table("u")).unwrap();
        assert_eq!(vec!["t", "u"], tables.names().collect::<Vec<_>>());
    }
}
