//! Entry point binding bound scripts to evaluation.

pub mod query_result;

use std::sync::Arc;

use kestrel_error::Result;
use tracing::{Span, debug};
use uuid::Uuid;

use crate::bound::{BoundScript, FrontEnd};
use crate::config::EngineConfig;
use crate::execution::context::{CancellationToken, EvalContext};
use crate::execution::expr::PhysicalExpr;
use crate::execution::planner::plan_query;
use crate::functions::registry::FunctionRegistry;
use crate::ir::IrScript;
use crate::ir::builder::IrBuilder;
use crate::storage::{GlobalTables, TableSource};
pub use query_result::{Output, QueryResult, Row, TableResult};

/// Evaluates bound scripts against a set of registered tables.
///
/// The engine holds no per-query state. Every evaluation builds its own IR
/// and operator tree.
#[derive(Debug)]
pub struct Engine {
    registry: FunctionRegistry,
    globals: GlobalTables,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            registry: FunctionRegistry::new_with_builtins(),
            globals: GlobalTables::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn globals(&self) -> &GlobalTables {
        &self.globals
    }

    /// Make a table visible to queries under its own name.
    pub fn register_table(&mut self, table: Arc<dyn TableSource>) -> Result<()> {
        self.globals.register(table)
    }

    pub fn evaluate(&self, script: &BoundScript) -> Result<QueryResult> {
        self.evaluate_with_cancellation(script, CancellationToken::new())
    }

    /// Evaluate a script, failing with a cancellation error at the next chunk
    /// pull once `cancel` is triggered.
    #[tracing::instrument(level = "debug", skip_all, fields(query_id))]
    pub fn evaluate_with_cancellation(
        &self,
        script: &BoundScript,
        cancel: CancellationToken,
    ) -> Result<QueryResult> {
        let query_id = Uuid::new_v4();
        Span::current().record("query_id", tracing::field::display(query_id));

        let ir = IrBuilder::new(&self.registry, &self.globals, &self.config).build_script(script)?;
        let ctx = EvalContext::new(query_id, self.config.clone(), cancel);

        let output = match ir {
            IrScript::Scalar(expr) => {
                debug!(datatype = %expr.datatype, "evaluating scalar");
                let mut expr = PhysicalExpr::plan(&expr);
                Output::Scalar(expr.eval_scalar(&ctx)?)
            }
            IrScript::Query(query) => {
                debug!(schema = %query.schema, root = query.node.name(), "evaluating query");
                let root = plan_query(&query, &ctx)?;
                Output::Table(TableResult::new(query.schema, root))
            }
        };

        Ok(QueryResult { query_id, output })
    }

    /// Bind `text` with a front end and evaluate the result.
    pub fn evaluate_text(&self, front_end: &dyn FrontEnd, text: &str) -> Result<QueryResult> {
        let script = front_end.bind(text, &self.globals)?;
        self.evaluate(&script)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use kestrel_error::{DbError, ErrorKind};

    use super::*;
    use crate::arrays::scalar::ScalarValue;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::{Field, Schema};
    use crate::bound::{BinaryOp, BoundOperator, binary, lit, named, print, table};
    use crate::storage::{GlobalTables, MemoryTableSource};

    /// Binds text of the form `<table> | count`.
    struct CountFrontEnd;

    impl FrontEnd for CountFrontEnd {
        fn bind(&self, text: &str, globals: &GlobalTables) -> Result<BoundScript> {
            let name = text
                .strip_suffix("| count")
                .map(str::trim)
                .ok_or_else(|| DbError::unsupported("Expected '<table> | count'"))?;
            if globals.get(name).is_none() {
                return Err(DbError::index_out_of_range(format!("Unknown table '{name}'")));
            }
            Ok(BoundScript::query(
                table(name).pipe(BoundOperator::Count { name: None }),
            ))
        }
    }

    #[test]
    fn scalar_script() {
        let engine = Engine::new();
        let script = BoundScript::expr(binary(BinaryOp::Add, lit(1_i64), lit(2_i64)));
        let value = engine.evaluate(&script).unwrap().into_scalar().unwrap();
        assert_eq!(ScalarValue::from(3_i64), value);
    }

    #[test]
    fn table_rows() {
        let engine = Engine::new();
        let script = BoundScript::query(print(vec![named("a", lit(1_i64)), named("b", lit("x"))]));
        let mut table = engine.evaluate(&script).unwrap().into_table().unwrap();

        assert_eq!("a:long; b:string", table.schema().to_string());
        let row = table.next_row().unwrap().unwrap();
        assert_eq!(vec![ScalarValue::from(1_i64), ScalarValue::from("x")], row);
        assert!(table.next_row().unwrap().is_none());
        assert!(table.next_row().unwrap().is_none());
    }

    #[test]
    fn table_as_stream() {
        let engine = Engine::new();
        let script = BoundScript::query(print(vec![named("a", lit(1_i64))]));
        let table = engine.evaluate(&script).unwrap().into_table().unwrap();
        let batches: Vec<_> = futures::executor::block_on(table.into_stream().collect());
        assert_eq!(1, batches.len());
        assert_eq!(1, batches[0].as_ref().unwrap().num_rows());
    }

    #[test]
    fn evaluate_text_with_front_end() {
        let mut engine = Engine::new();
        let schema = Schema::try_new([Field::new("v", DataType::Int64)]).unwrap();
        engine
            .register_table(Arc::new(MemoryTableSource::try_new("T", schema, Vec::new()).unwrap()))
            .unwrap();

        let mut table = engine
            .evaluate_text(&CountFrontEnd, "T | count")
            .unwrap()
            .into_table()
            .unwrap();
        assert_eq!(vec![ScalarValue::from(0_i64)], table.next_row().unwrap().unwrap());

        let err = engine.evaluate_text(&CountFrontEnd, "U | count").unwrap_err();
        assert_eq!(ErrorKind::IndexOutOfRange, err.kind());
    }
}
