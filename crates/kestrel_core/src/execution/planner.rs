//! Plans IR queries into operator trees.

use std::sync::Arc;

use kestrel_error::Result;
use tracing::trace;

use super::context::EvalContext;
use super::expr::PhysicalExpr;
use super::operators::PullOperator;
use super::operators::count::PhysicalCount;
use super::operators::distinct::PhysicalDistinct;
use super::operators::filter::PhysicalFilter;
use super::operators::hash_aggregate::{PhysicalAggregate, PhysicalHashAggregate};
use super::operators::hash_join::PhysicalHashJoin;
use super::operators::limit::PhysicalLimit;
use super::operators::materialize::PhysicalMaterialize;
use super::operators::project::PhysicalProject;
use super::operators::scan::PhysicalScan;
use super::operators::single_row::PhysicalSingleRow;
use super::operators::sort::{PhysicalSort, PhysicalSortKey};
use super::operators::union::PhysicalUnion;
use super::operators::values::PhysicalValues;
use super::operators::verify::PhysicalVerify;
use crate::ir::{IrQuery, IrQueryNode};

/// Plan a query for a single evaluation.
///
/// Operators hold per-evaluation state, so a plan is never reused.
pub fn plan_query(query: &IrQuery, ctx: &Arc<EvalContext>) -> Result<Box<dyn PullOperator>> {
    let operator = plan_node(query, ctx)?;
    trace!(operator = operator.operator_name(), "planned operator");
    if ctx.config().verify_chunks {
        return Ok(Box::new(PhysicalVerify::new(operator)));
    }
    Ok(operator)
}

fn plan_node(query: &IrQuery, ctx: &Arc<EvalContext>) -> Result<Box<dyn PullOperator>> {
    let schema = query.schema.clone();

    let operator: Box<dyn PullOperator> = match &query.node {
        IrQueryNode::Scan(table) => Box::new(PhysicalScan::new(ctx.clone(), table.clone())),
        IrQueryNode::Values(batches) => {
            Box::new(PhysicalValues::new(ctx.clone(), schema, batches.clone()))
        }
        IrQueryNode::SingleRow => Box::new(PhysicalSingleRow::new(ctx.clone())),
        IrQueryNode::Project { input, exprs } => Box::new(PhysicalProject::new(
            ctx.clone(),
            schema,
            plan_query(input, ctx)?,
            PhysicalExpr::plan_all(exprs),
        )),
        IrQueryNode::Filter { input, predicate } => Box::new(PhysicalFilter::new(
            ctx.clone(),
            plan_query(input, ctx)?,
            PhysicalExpr::plan(predicate),
        )),
        IrQueryNode::Summarize {
            input,
            groups,
            aggregates,
            outputs,
        } => {
            let aggregates = aggregates
                .iter()
                .map(|agg| PhysicalAggregate {
                    function: agg.function,
                    args: PhysicalExpr::plan_all(&agg.args),
                    datatype: agg.datatype,
                })
                .collect();
            Box::new(PhysicalHashAggregate::new(
                ctx.clone(),
                schema,
                plan_query(input, ctx)?,
                PhysicalExpr::plan_all(groups),
                groups.iter().map(|g| g.datatype).collect(),
                aggregates,
                PhysicalExpr::plan_all(outputs),
            ))
        }
        IrQueryNode::Sort { input, keys } => {
            let keys = keys
                .iter()
                .map(|key| PhysicalSortKey {
                    expr: PhysicalExpr::plan(&key.expr),
                    descending: key.descending,
                    nulls_first: key.nulls_first,
                })
                .collect();
            Box::new(PhysicalSort::new(ctx.clone(), plan_query(input, ctx)?, keys))
        }
        IrQueryNode::Distinct { input } => {
            Box::new(PhysicalDistinct::new(ctx.clone(), plan_query(input, ctx)?))
        }
        IrQueryNode::Union { inputs, mappings } => {
            let inputs = inputs
                .iter()
                .map(|input| plan_query(input, ctx))
                .collect::<Result<Vec<_>>>()?;
            Box::new(PhysicalUnion::new(ctx.clone(), schema, inputs, mappings.clone()))
        }
        IrQueryNode::Join {
            left,
            right,
            kind,
            left_keys,
            right_keys,
            key_types,
        } => Box::new(PhysicalHashJoin::new(
            ctx.clone(),
            schema,
            plan_query(left, ctx)?,
            plan_query(right, ctx)?,
            *kind,
            left_keys.clone(),
            right_keys.clone(),
            key_types.clone(),
        )),
        IrQueryNode::Take { input, limit } => {
            Box::new(PhysicalLimit::new(ctx.clone(), plan_query(input, ctx)?, *limit))
        }
        IrQueryNode::Count { input } => {
            Box::new(PhysicalCount::new(ctx.clone(), schema, plan_query(input, ctx)?))
        }
        IrQueryNode::Materialize { input, id } => Box::new(PhysicalMaterialize::new(
            ctx.clone(),
            *id,
            plan_query(input, ctx)?,
        )),
    };

    Ok(operator)
}
