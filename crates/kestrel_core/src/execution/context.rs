use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hashbrown::HashMap;
use kestrel_error::{DbError, Result};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::arrays::batch::Batch;
use crate::config::EngineConfig;

/// Shared flag used to abort a running evaluation.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// State shared by all operators of one evaluation.
#[derive(Debug)]
pub struct EvalContext {
    query_id: Uuid,
    config: EngineConfig,
    cancel: CancellationToken,
    /// Fully evaluated `materialize` inputs keyed by materialize id.
    materialized: Mutex<HashMap<usize, Arc<Vec<Batch>>>>,
}

impl EvalContext {
    pub fn new(query_id: Uuid, config: EngineConfig, cancel: CancellationToken) -> Arc<Self> {
        Arc::new(EvalContext {
            query_id,
            config,
            cancel,
            materialized: Mutex::new(HashMap::new()),
        })
    }

    pub fn query_id(&self) -> Uuid {
        self.query_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Error if the evaluation was cancelled.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(DbError::cancelled().with_field("query_id", self.query_id));
        }
        Ok(())
    }

    pub fn get_materialized(&self, id: usize) -> Option<Arc<Vec<Batch>>> {
        self.materialized.lock().get(&id).cloned()
    }

    /// Store the output of a materialize. The first stored output for an id
    /// wins.
    pub fn put_materialized(&self, id: usize, batches: Vec<Batch>) -> Arc<Vec<Batch>> {
        self.materialized
            .lock()
            .entry(id)
            .or_insert_with(|| Arc::new(batches))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use kestrel_error::ErrorKind;

    use super::*;

    #[test]
    fn cancel_is_shared() {
        let token = CancellationToken::new();
        let ctx = EvalContext::new(Uuid::new_v4(), EngineConfig::default(), token.clone());
        ctx.check_cancelled().unwrap();

        token.cancel();
        let err = ctx.check_cancelled().unwrap_err();
        assert_eq!(ErrorKind::Cancelled, err.kind());
        assert!(err.is_cancelled());
    }

    #[test]
    fn first_materialized_wins() {
        let ctx = EvalContext::new(Uuid::new_v4(), EngineConfig::default(), CancellationToken::new());
        assert!(ctx.get_materialized(0).is_none());

        let first = ctx.put_materialized(0, Vec::new());
        let batch = Batch::try_new_with_rows(Vec::new(), 1).unwrap();
        let second = ctx.put_materialized(0, vec![batch]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(0, ctx.get_materialized(0).unwrap().len());
    }
}
