//! Evaluation of IR expressions.
//!
//! Expressions are evaluated either against a chunk, producing one value per
//! row, or on their own when they don't reference any columns. Scalar
//! subexpressions of a columnar expression are evaluated once and broadcast.

use std::sync::Arc;

use kestrel_error::{DbError, Result};
use serde_json::Value as JsonValue;

use super::context::EvalContext;
use super::operators::PollPull;
use super::planner::plan_query;
use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::builder::ArrayBuilder;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::bound::MemberKey;
use crate::functions::cast::{cast_array, cast_scalar};
use crate::functions::scalar::RawScalarFunction;
use crate::functions::window::WindowState;
use crate::ir::{IrExpr, IrExprKind, IrQuery, ResultKind};

/// An expression ready for evaluation.
///
/// Window calls hold their running state, so every evaluation of a query
/// plans its expressions anew.
#[derive(Debug)]
pub enum PhysicalExpr {
    Literal(ScalarValue),
    Column(usize),
    Cast {
        input: Box<PhysicalExpr>,
        to: DataType,
    },
    ScalarCall {
        function: &'static RawScalarFunction,
        args: Vec<PhysicalExpr>,
        return_type: DataType,
        result_kind: ResultKind,
    },
    WindowCall {
        state: Box<dyn WindowState>,
        args: Vec<PhysicalExpr>,
    },
    Member {
        input: Box<PhysicalExpr>,
        key: MemberKey,
    },
    ToScalar {
        query: Box<IrQuery>,
        datatype: DataType,
        /// Computed on first use.
        value: Option<ScalarValue>,
    },
}

impl PhysicalExpr {
    pub fn plan(expr: &IrExpr) -> PhysicalExpr {
        match &expr.kind {
            IrExprKind::Literal(value) => PhysicalExpr::Literal(value.clone()),
            IrExprKind::Column(idx) => PhysicalExpr::Column(*idx),
            IrExprKind::Cast(input) => PhysicalExpr::Cast {
                input: Box::new(Self::plan(input)),
                to: expr.datatype,
            },
            IrExprKind::ScalarCall { function, args, .. } => PhysicalExpr::ScalarCall {
                function: *function,
                args: args.iter().map(Self::plan).collect(),
                return_type: expr.datatype,
                result_kind: expr.result_kind,
            },
            IrExprKind::WindowCall { function, args, .. } => PhysicalExpr::WindowCall {
                state: function.new_state(expr.datatype),
                args: args.iter().map(Self::plan).collect(),
            },
            IrExprKind::Member { input, key } => PhysicalExpr::Member {
                input: Box::new(Self::plan(input)),
                key: key.clone(),
            },
            IrExprKind::ToScalar(query) => PhysicalExpr::ToScalar {
                query: query.clone(),
                datatype: expr.datatype,
                value: None,
            },
        }
    }

    pub fn plan_all(exprs: &[IrExpr]) -> Vec<PhysicalExpr> {
        exprs.iter().map(Self::plan).collect()
    }

    /// Evaluate against every row of `batch`.
    pub fn eval(&mut self, ctx: &Arc<EvalContext>, batch: &Batch) -> Result<Array> {
        let num_rows = batch.num_rows();
        if self.is_row_independent() {
            let value = self.eval_scalar(ctx)?;
            return Array::repeat_scalar(&value, num_rows);
        }
        match self {
            Self::Literal(value) => Array::repeat_scalar(value, num_rows),
            Self::Column(idx) => Ok(batch.array(*idx)?.clone()),
            Self::Cast { input, to } => {
                let to = *to;
                cast_array(&input.eval(ctx, batch)?, to)
            }
            Self::ScalarCall {
                function,
                args,
                return_type,
                ..
            } => {
                let inputs = args
                    .iter_mut()
                    .map(|arg| arg.eval(ctx, batch))
                    .collect::<Result<Vec<_>>>()?;
                function.execute(&inputs, num_rows, *return_type)
            }
            Self::WindowCall { state, args } => {
                let inputs = args
                    .iter_mut()
                    .map(|arg| arg.eval(ctx, batch))
                    .collect::<Result<Vec<_>>>()?;
                state.apply(&inputs, num_rows)
            }
            Self::ToScalar { .. } => Err(DbError::new("Unexpected row independent expression")),
            Self::Member { input, key } => {
                let values = input.eval(ctx, batch)?.dynamic_values()?;
                let mut builder = ArrayBuilder::with_capacity(DataType::Dynamic, values.len());
                for value in &values {
                    builder.add_json(member_of(value, key))?;
                }
                Ok(builder.finish())
            }
        }
    }

    fn is_row_independent(&self) -> bool {
        matches!(
            self,
            Self::ScalarCall {
                result_kind: ResultKind::Scalar,
                ..
            } | Self::ToScalar { .. }
        )
    }

    /// Evaluate an expression that doesn't depend on any rows.
    pub fn eval_scalar(&mut self, ctx: &Arc<EvalContext>) -> Result<ScalarValue> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Cast { input, to } => {
                let to = *to;
                Ok(cast_scalar(&input.eval_scalar(ctx)?, to))
            }
            Self::ScalarCall {
                function,
                args,
                return_type,
                ..
            } => {
                let inputs = args
                    .iter_mut()
                    .map(|arg| arg.eval_scalar(ctx))
                    .collect::<Result<Vec<_>>>()?;
                function.execute_scalar(&inputs, *return_type)
            }
            Self::Member { input, key } => {
                let value = input.eval_scalar(ctx)?;
                Ok(ScalarValue::Dynamic(member_of(value.try_as_dynamic()?, key)))
            }
            Self::ToScalar {
                query,
                datatype,
                value,
            } => {
                if let Some(value) = value {
                    return Ok(value.clone());
                }
                let first = first_value(ctx, query, *datatype)?;
                *value = Some(first.clone());
                Ok(first)
            }
            Self::Column(_) | Self::WindowCall { .. } => Err(DbError::new(
                "Columnar expression cannot be evaluated without rows",
            )),
        }
    }
}

/// First value of the first column of a query, a typed null if the query has
/// no rows.
fn first_value(ctx: &Arc<EvalContext>, query: &IrQuery, datatype: DataType) -> Result<ScalarValue> {
    let mut operator = plan_query(query, ctx)?;
    loop {
        match operator.poll_pull()? {
            PollPull::Batch(batch) if batch.num_rows() > 0 => {
                let value = batch.array(0)?.get(0)?;
                if value.datatype() != datatype {
                    return Err(DbError::type_mismatch("toscalar produced an unexpected kind")
                        .with_field("expected", datatype)
                        .with_field("got", value.datatype()));
                }
                return Ok(value);
            }
            PollPull::Batch(_) => continue,
            PollPull::Exhausted => return Ok(ScalarValue::null(datatype)),
        }
    }
}

/// Property or element of a dynamic value, json `null` when missing.
fn member_of(value: &JsonValue, key: &MemberKey) -> JsonValue {
    let member = match (value, key) {
        (JsonValue::Object(map), MemberKey::Name(name)) => map.get(name),
        (JsonValue::Array(values), MemberKey::Index(idx)) => {
            let idx = if *idx < 0 {
                values.len() as i64 + *idx
            } else {
                *idx
            };
            usize::try_from(idx).ok().and_then(|idx| values.get(idx))
        }
        _ => None,
    };
    member.cloned().unwrap_or(JsonValue::Null)
}
