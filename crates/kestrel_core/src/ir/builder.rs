use std::sync::Arc;

use ahash::RandomState;
use hashbrown::HashMap;
use kestrel_error::{DbError, Result};
use tracing::trace;

use super::naming::{ColumnNamer, aggregate_name, derived_name, print_name};
use super::{IrAggregate, IrExpr, IrExprKind, IrQuery, IrQueryNode, IrScript, IrSortKey, ResultKind};
use crate::arrays::batch::Batch;
use crate::arrays::builder::ArrayBuilder;
use crate::arrays::datatype::DataType;
use crate::arrays::field::{Field, Schema};
use crate::arrays::scalar::ScalarValue;
use crate::bound::{
    BoundArg,
    BoundExpr,
    BoundOperator,
    BoundQuery,
    BoundScript,
    BoundStatement,
    DistinctColumns,
    JoinCondition,
    JoinKind,
    LetValue,
    NamedBoundExpr,
    ParamKind,
    UserFunction,
};
use crate::coercion::common_supertype;
use crate::coercion::schema::{join_schema, union_schema};
use crate::config::EngineConfig;
use crate::functions::cast::coerce_literal;
use crate::functions::registry::{FunctionKind, FunctionRegistry};
use crate::hash::HASH_RANDOM_STATE;
use crate::storage::GlobalTables;

/// Functions whose arguments are all converted to strings before overload
/// resolution.
const STRING_COERCING_FUNCTIONS: &[&str] = &["strcat"];

#[derive(Debug, Clone)]
enum Binding {
    Scalar(IrExpr),
    Tabular(IrQuery),
    Function(Arc<UserFunction>),
}

type Scope = HashMap<String, Binding, RandomState>;

/// Collects aggregate calls found in summarize expressions.
#[derive(Debug)]
struct AggregateSink<'a> {
    /// Schema aggregate arguments are evaluated against.
    input: &'a Schema,
    /// Number of group columns preceding the aggregate results.
    group_count: usize,
    aggregates: Vec<IrAggregate>,
}

/// Builds IR from bound trees.
///
/// User functions are inlined at their call sites. A builder is used for a
/// single script.
#[derive(Debug)]
pub struct IrBuilder<'a> {
    registry: &'a FunctionRegistry,
    globals: &'a GlobalTables,
    config: &'a EngineConfig,
    scopes: Vec<Scope>,
    depth: usize,
    next_materialize_id: usize,
}

impl<'a> IrBuilder<'a> {
    pub fn new(
        registry: &'a FunctionRegistry,
        globals: &'a GlobalTables,
        config: &'a EngineConfig,
    ) -> Self {
        IrBuilder {
            registry,
            globals,
            config,
            scopes: vec![Scope::with_hasher(HASH_RANDOM_STATE)],
            depth: 0,
            next_materialize_id: 0,
        }
    }

    /// Build a script. Every statement but the last must be a `let`.
    pub fn build_script(&mut self, script: &BoundScript) -> Result<IrScript> {
        let (last, lets) = script
            .statements
            .split_last()
            .ok_or_else(|| DbError::unsupported("Script has no statements"))?;

        for statement in lets {
            self.bind_statement(statement)?;
        }

        match last {
            BoundStatement::Query(query) => Ok(IrScript::Query(self.build_query(query)?)),
            BoundStatement::Expr(expr) => {
                Ok(IrScript::Scalar(self.build_expr(expr, &Schema::empty())?))
            }
            BoundStatement::Let { name, .. } => Err(DbError::unsupported(
                "Script must end with a query or expression",
            )
            .with_field("let", name)),
        }
    }

    fn bind_statement(&mut self, statement: &BoundStatement) -> Result<()> {
        match statement {
            BoundStatement::Let { name, value } => {
                let binding = match value {
                    LetValue::Expr(expr) => {
                        Binding::Scalar(self.build_expr(expr, &Schema::empty())?)
                    }
                    LetValue::Query(query) => Binding::Tabular(self.build_query(query)?),
                    LetValue::Function(function) => Binding::Function(function.clone()),
                };
                trace!(%name, "bound let");
                self.bind(name.clone(), binding);
                Ok(())
            }
            BoundStatement::Query(_) | BoundStatement::Expr(_) => Err(DbError::unsupported(
                "Only the last statement of a script or function body may be a query or expression",
            )),
        }
    }

    fn bind(&mut self, name: String, binding: Binding) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, binding);
        }
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn lookup_function(&self, name: &str) -> Result<Arc<UserFunction>> {
        match self.lookup(name) {
            Some(Binding::Function(function)) => Ok(function.clone()),
            Some(_) => Err(DbError::type_mismatch(format!("'{name}' is not a function"))),
            None => Err(DbError::unsupported(format!("Unknown function '{name}'"))),
        }
    }

    /// Build a scalar expression evaluated against rows of `schema`.
    pub fn build_expr(&mut self, expr: &BoundExpr, schema: &Schema) -> Result<IrExpr> {
        self.build_expr_inner(expr, schema, None)
    }

    fn build_expr_inner(
        &mut self,
        expr: &BoundExpr,
        schema: &Schema,
        mut sink: Option<&mut AggregateSink<'_>>,
    ) -> Result<IrExpr> {
        match expr {
            BoundExpr::Literal(value) => Ok(IrExpr::literal(value.clone())),
            BoundExpr::Column { name } => match schema.index_of(name) {
                Some(idx) => Ok(IrExpr::column(idx, schema.fields()[idx].datatype)),
                None => match self.lookup(name) {
                    Some(Binding::Scalar(expr)) => Ok(expr.clone()),
                    _ => schema.resolve(name).map(|(idx, f)| IrExpr::column(idx, f.datatype)),
                },
            },
            BoundExpr::Variable { name } => match self.lookup(name) {
                Some(Binding::Scalar(expr)) => Ok(expr.clone()),
                Some(Binding::Tabular(_)) => Err(DbError::type_mismatch(format!(
                    "Tabular value '{name}' used as a scalar"
                ))),
                Some(Binding::Function(_)) => Err(DbError::type_mismatch(format!(
                    "Function '{name}' used as a value"
                ))),
                None => schema
                    .resolve(name)
                    .map(|(idx, f)| IrExpr::column(idx, f.datatype))
                    .map_err(|_| DbError::index_out_of_range(format!("Unknown variable '{name}'"))),
            },
            BoundExpr::Unary { op, input } => {
                self.build_call(op.function_name(), &[input.as_ref()], None, schema, sink)
            }
            BoundExpr::Binary { op, left, right } => {
                let args = [left.as_ref(), right.as_ref()];
                self.build_call(op.function_name(), &args, None, schema, sink)
            }
            BoundExpr::Cast { to, input } => {
                Ok(self.build_expr_inner(input, schema, sink)?.cast_to(*to))
            }
            BoundExpr::Call {
                name,
                args,
                signature,
            } => {
                let args: Vec<&BoundExpr> = args.iter().collect();
                self.build_call(name, &args, signature.as_deref(), schema, sink)
            }
            BoundExpr::UserCall { name, args } => {
                let function = self.lookup_function(name)?;
                let scope =
                    self.bind_arguments(name, &function, args, schema, sink.as_deref_mut())?;
                self.with_function_scope(name, scope, |this| {
                    let (last, lets) = function.body.split_last().ok_or_else(|| {
                        DbError::unsupported(format!("Function '{name}' has an empty body"))
                    })?;
                    for statement in lets {
                        this.bind_statement(statement)?;
                    }
                    match last {
                        BoundStatement::Expr(body) => this.build_expr_inner(body, schema, sink),
                        _ => Err(DbError::type_mismatch(format!(
                            "Function '{name}' does not return a scalar"
                        ))),
                    }
                })
            }
            BoundExpr::Member { input, key } => {
                let input = self.build_expr_inner(input, schema, sink)?;
                if input.datatype != DataType::Dynamic {
                    return Err(DbError::type_mismatch("Member access requires a dynamic value")
                        .with_field("got", input.datatype)
                        .with_field("member", key));
                }
                Ok(IrExpr {
                    result_kind: input.result_kind,
                    kind: IrExprKind::Member {
                        input: Box::new(input),
                        key: key.clone(),
                    },
                    datatype: DataType::Dynamic,
                })
            }
            BoundExpr::ToScalar(query) => {
                let query = self.build_query(query)?;
                let datatype = query
                    .schema
                    .fields()
                    .first()
                    .map(|f| f.datatype)
                    .ok_or_else(|| {
                        DbError::type_mismatch("toscalar requires a query with at least one column")
                    })?;
                Ok(IrExpr {
                    kind: IrExprKind::ToScalar(Box::new(query)),
                    datatype,
                    result_kind: ResultKind::Scalar,
                })
            }
        }
    }

    fn build_call(
        &mut self,
        name: &str,
        args: &[&BoundExpr],
        signature: Option<&[DataType]>,
        schema: &Schema,
        mut sink: Option<&mut AggregateSink<'_>>,
    ) -> Result<IrExpr> {
        match self.registry.kind_of(name) {
            Some(FunctionKind::Scalar) => {
                let set = self.registry.scalar(name)?;
                let mut inputs = args
                    .iter()
                    .map(|arg| self.build_expr_inner(arg, schema, sink.as_deref_mut()))
                    .collect::<Result<Vec<_>>>()?;
                if STRING_COERCING_FUNCTIONS.contains(&set.name) {
                    inputs = inputs.into_iter().map(|e| e.cast_to(DataType::Utf8)).collect();
                }

                let types: Vec<_> = inputs.iter().map(|e| e.datatype).collect();
                let resolved = set.resolve_with(&types, signature)?;
                let args = apply_casts(inputs, &resolved.casts);

                Ok(IrExpr {
                    result_kind: ResultKind::of_all(&args),
                    kind: IrExprKind::ScalarCall {
                        name: resolved.name,
                        function: resolved.function,
                        args,
                    },
                    datatype: resolved.return_type,
                })
            }
            Some(FunctionKind::Aggregate) => {
                let set = self.registry.aggregate(name)?;
                let sink = sink.ok_or_else(|| {
                    DbError::unsupported(format!(
                        "Aggregate function '{name}' can only be used in summarize"
                    ))
                })?;
                let input = sink.input;
                let inputs = args
                    .iter()
                    .map(|arg| self.build_expr_inner(arg, input, None))
                    .collect::<Result<Vec<_>>>()?;

                let types: Vec<_> = inputs.iter().map(|e| e.datatype).collect();
                let resolved = set.resolve_with(&types, signature)?;
                let args = apply_casts(inputs, &resolved.casts);

                let idx = sink.group_count + sink.aggregates.len();
                sink.aggregates.push(IrAggregate {
                    name: resolved.name,
                    function: resolved.function,
                    args,
                    datatype: resolved.return_type,
                });
                Ok(IrExpr::column(idx, resolved.return_type))
            }
            Some(FunctionKind::Window) => {
                let set = self.registry.window(name)?;
                let inputs = args
                    .iter()
                    .map(|arg| self.build_expr_inner(arg, schema, None))
                    .collect::<Result<Vec<_>>>()?;

                let types: Vec<_> = inputs.iter().map(|e| e.datatype).collect();
                let resolved = set.resolve_with(&types, signature)?;
                let args = apply_casts(inputs, &resolved.casts);

                Ok(IrExpr {
                    kind: IrExprKind::WindowCall {
                        name: resolved.name,
                        function: resolved.function,
                        args,
                    },
                    datatype: resolved.return_type,
                    result_kind: ResultKind::Columnar,
                })
            }
            None if matches!(self.lookup(name), Some(Binding::Function(_))) => {
                let args = args.iter().map(|arg| BoundArg::Expr((*arg).clone())).collect();
                let call = BoundExpr::UserCall {
                    name: name.to_string(),
                    args,
                };
                self.build_expr_inner(&call, schema, sink)
            }
            None => Err(DbError::unsupported(format!("Unknown function '{name}'"))),
        }
    }

    /// Build the arguments of a user function call into a scope binding the
    /// function's parameters.
    fn bind_arguments(
        &mut self,
        name: &str,
        function: &UserFunction,
        args: &[BoundArg],
        schema: &Schema,
        mut sink: Option<&mut AggregateSink<'_>>,
    ) -> Result<Scope> {
        if function.params.len() != args.len() {
            return Err(DbError::overload_mismatch(format!(
                "Function '{name}' called with the wrong number of arguments"
            ))
            .with_field("expected", function.params.len())
            .with_field("got", args.len()));
        }

        let mut scope = Scope::with_hasher(HASH_RANDOM_STATE);
        for (param, arg) in function.params.iter().zip(args) {
            let binding = match (&param.kind, arg) {
                (ParamKind::Scalar(datatype), BoundArg::Expr(expr)) => {
                    let expr = self.build_expr_inner(expr, schema, sink.as_deref_mut())?;
                    Binding::Scalar(expr.cast_to(*datatype))
                }
                (ParamKind::Tabular, BoundArg::Query(query)) => {
                    Binding::Tabular(self.build_query(query)?)
                }
                (ParamKind::Tabular, BoundArg::Expr(BoundExpr::Variable { name: var })) => {
                    Binding::Tabular(self.build_query(&BoundQuery::Variable { name: var.clone() })?)
                }
                (_, _) => {
                    return Err(DbError::type_mismatch(format!(
                        "Argument for parameter '{}' of '{name}' has the wrong shape",
                        param.name
                    )));
                }
            };
            scope.insert(param.name.clone(), binding);
        }
        Ok(scope)
    }

    fn with_function_scope<T>(
        &mut self,
        name: &str,
        scope: Scope,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.config.max_function_depth {
            return Err(DbError::unsupported("Maximum function call depth exceeded")
                .with_field("function", name)
                .with_field("max_depth", self.config.max_function_depth));
        }

        trace!(%name, depth = self.depth, "inlining user function");
        self.scopes.push(scope);
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.scopes.pop();
        result
    }

    pub fn build_query(&mut self, query: &BoundQuery) -> Result<IrQuery> {
        let ir = match query {
            BoundQuery::Table(table) => IrQuery {
                schema: table.schema().clone(),
                node: IrQueryNode::Scan(table.clone()),
            },
            BoundQuery::Variable { name } => match self.lookup(name) {
                Some(Binding::Tabular(query)) => query.clone(),
                Some(_) => {
                    return Err(DbError::type_mismatch(format!(
                        "'{name}' is not a tabular value"
                    )));
                }
                None => {
                    let table = self.globals.get(name).ok_or_else(|| {
                        DbError::index_out_of_range(format!("Unknown table '{name}'"))
                    })?;
                    IrQuery {
                        schema: table.schema().clone(),
                        node: IrQueryNode::Scan(table.clone()),
                    }
                }
            },
            BoundQuery::DataTable { schema, values } => self.build_datatable(schema, values)?,
            BoundQuery::Print(exprs) => {
                let empty = Schema::empty();
                let mut fields = Vec::with_capacity(exprs.len());
                let mut ir_exprs = Vec::with_capacity(exprs.len());
                for (idx, expr) in exprs.iter().enumerate() {
                    let ir = self.build_expr(&expr.expr, &empty)?;
                    let name = expr.name.clone().unwrap_or_else(|| print_name(idx));
                    fields.push(Field::new(name, ir.datatype));
                    ir_exprs.push(ir);
                }
                IrQuery {
                    schema: Schema::try_new(fields)?,
                    node: IrQueryNode::Project {
                        input: Box::new(IrQuery {
                            node: IrQueryNode::SingleRow,
                            schema: empty,
                        }),
                        exprs: ir_exprs,
                    },
                }
            }
            BoundQuery::Pipe { input, operator } => {
                let input = self.build_query(input)?;
                self.build_operator(input, operator)?
            }
            BoundQuery::Union(queries) => {
                let inputs = queries
                    .iter()
                    .map(|q| self.build_query(q))
                    .collect::<Result<Vec<_>>>()?;
                build_union(inputs)?
            }
            BoundQuery::Materialize(query) => {
                let input = self.build_query(query)?;
                self.materialize(input)
            }
            BoundQuery::UserCall { name, args } => {
                let function = self.lookup_function(name)?;
                let scope = self.bind_arguments(name, &function, args, &Schema::empty(), None)?;
                self.with_function_scope(name, scope, |this| {
                    let (last, lets) = function.body.split_last().ok_or_else(|| {
                        DbError::unsupported(format!("Function '{name}' has an empty body"))
                    })?;
                    for statement in lets {
                        this.bind_statement(statement)?;
                    }
                    match last {
                        BoundStatement::Query(body) => this.build_query(body),
                        _ => Err(DbError::type_mismatch(format!(
                            "Function '{name}' does not return a table"
                        ))),
                    }
                })?
            }
        };

        trace!(node = ir.node.name(), schema = %ir.schema, "built query node");
        Ok(ir)
    }

    fn build_datatable(&self, schema: &Schema, values: &[ScalarValue]) -> Result<IrQuery> {
        let num_columns = schema.len();
        if num_columns == 0 {
            if !values.is_empty() {
                return Err(DbError::type_mismatch("Datatable without columns has values"));
            }
            return Ok(IrQuery {
                node: IrQueryNode::Values(Vec::new()),
                schema: schema.clone(),
            });
        }
        if values.len() % num_columns != 0 {
            return Err(DbError::type_mismatch("Datatable values do not fill whole rows")
                .with_field("columns", num_columns)
                .with_field("values", values.len()));
        }

        let num_rows = values.len() / num_columns;
        let mut builders: Vec<_> = schema
            .datatypes()
            .map(|dt| ArrayBuilder::with_capacity(dt, num_rows))
            .collect();
        for (idx, value) in values.iter().enumerate() {
            let col = idx % num_columns;
            let datatype = builders[col].datatype();
            let value = coerce_literal(value, datatype)
                .map_err(|e| e.with_field("row", idx / num_columns).with_field("column", col))?;
            builders[col].add(&value)?;
        }

        let arrays = builders.into_iter().map(|b| b.finish()).collect();
        let batch = Batch::try_new_with_rows(arrays, num_rows)?;
        let batches = if num_rows == 0 {
            Vec::new()
        } else {
            batch.split(self.config.batch_size)
        };

        Ok(IrQuery {
            node: IrQueryNode::Values(batches),
            schema: schema.clone(),
        })
    }

    fn materialize(&mut self, input: IrQuery) -> IrQuery {
        let id = self.next_materialize_id;
        self.next_materialize_id += 1;
        IrQuery {
            schema: input.schema.clone(),
            node: IrQueryNode::Materialize {
                input: Box::new(input),
                id,
            },
        }
    }

    fn build_operator(&mut self, input: IrQuery, operator: &BoundOperator) -> Result<IrQuery> {
        match operator {
            BoundOperator::Project(exprs) => {
                let (exprs, fields) = self.build_projection(&input.schema, exprs)?;
                Ok(project(input, exprs, fields)?)
            }
            BoundOperator::Extend(exprs) => self.build_extend(input, exprs),
            BoundOperator::ProjectAway(names) => {
                for name in names {
                    input.schema.resolve(name)?;
                }
                let (exprs, fields): (Vec<_>, Vec<_>) = input
                    .schema
                    .fields()
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| !names.contains(&f.name))
                    .map(|(idx, f)| (IrExpr::column(idx, f.datatype), f.clone()))
                    .unzip();
                project(input, exprs, fields)
            }
            BoundOperator::ProjectRename(renames) => {
                let mut fields = input.schema.fields().to_vec();
                for (new, old) in renames {
                    let (idx, _) = input.schema.resolve(old)?;
                    fields[idx].name = new.clone();
                }
                let exprs = input
                    .schema
                    .fields()
                    .iter()
                    .enumerate()
                    .map(|(idx, f)| IrExpr::column(idx, f.datatype))
                    .collect();
                project(input, exprs, fields)
            }
            BoundOperator::Where(predicate) => {
                let predicate = self.build_expr(predicate, &input.schema)?;
                if predicate.datatype != DataType::Boolean {
                    return Err(DbError::type_mismatch("Filter predicate must be a bool")
                        .with_field("got", predicate.datatype));
                }
                Ok(IrQuery {
                    schema: input.schema.clone(),
                    node: IrQueryNode::Filter {
                        input: Box::new(input),
                        predicate,
                    },
                })
            }
            BoundOperator::Summarize { aggregates, by } => {
                self.build_summarize(input, aggregates, by)
            }
            BoundOperator::Sort(keys) => {
                let keys = keys
                    .iter()
                    .map(|key| {
                        Ok(IrSortKey {
                            expr: self.build_expr(&key.expr, &input.schema)?,
                            descending: key.descending(),
                            nulls_first: key.nulls_first(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(IrQuery {
                    schema: input.schema.clone(),
                    node: IrQueryNode::Sort {
                        input: Box::new(input),
                        keys,
                    },
                })
            }
            BoundOperator::Distinct(columns) => {
                let input = match columns {
                    DistinctColumns::All => input,
                    DistinctColumns::Columns(names) => {
                        let mut exprs = Vec::with_capacity(names.len());
                        let mut fields = Vec::with_capacity(names.len());
                        for name in names {
                            let (idx, field) = input.schema.resolve(name)?;
                            exprs.push(IrExpr::column(idx, field.datatype));
                            fields.push(field.clone());
                        }
                        project(input, exprs, fields)?
                    }
                };
                Ok(IrQuery {
                    schema: input.schema.clone(),
                    node: IrQueryNode::Distinct {
                        input: Box::new(input),
                    },
                })
            }
            BoundOperator::Union(others) => {
                let mut inputs = Vec::with_capacity(others.len() + 1);
                inputs.push(input);
                for other in others {
                    inputs.push(self.build_query(other)?);
                }
                build_union(inputs)
            }
            BoundOperator::Join { right, kind, on } => {
                let right = self.build_query(right)?;
                build_join(input, right, *kind, on)
            }
            BoundOperator::Take(limit) => Ok(IrQuery {
                schema: input.schema.clone(),
                node: IrQueryNode::Take {
                    input: Box::new(input),
                    limit: *limit,
                },
            }),
            BoundOperator::Count { name } => Ok(IrQuery {
                schema: Schema::try_new([Field::new(
                    name.clone().unwrap_or_else(|| "Count".to_string()),
                    DataType::Int64,
                )])?,
                node: IrQueryNode::Count {
                    input: Box::new(input),
                },
            }),
            BoundOperator::Materialize => Ok(self.materialize(input)),
        }
    }

    /// Build project expressions, naming unnamed ones.
    fn build_projection(
        &mut self,
        schema: &Schema,
        exprs: &[NamedBoundExpr],
    ) -> Result<(Vec<IrExpr>, Vec<Field>)> {
        let mut namer = ColumnNamer::new();
        let names: Vec<Option<String>> = exprs
            .iter()
            .map(|e| {
                e.name
                    .clone()
                    .or_else(|| derived_name(&e.expr))
                    .map(|name| namer.claim(&name))
            })
            .collect();

        let mut ir_exprs = Vec::with_capacity(exprs.len());
        let mut fields = Vec::with_capacity(exprs.len());
        for (expr, name) in exprs.iter().zip(names) {
            let ir = self.build_expr(&expr.expr, schema)?;
            let name = name.unwrap_or_else(|| namer.next_column_name());
            fields.push(Field::new(name, ir.datatype));
            ir_exprs.push(ir);
        }
        Ok((ir_exprs, fields))
    }

    fn build_extend(&mut self, input: IrQuery, exprs: &[NamedBoundExpr]) -> Result<IrQuery> {
        let mut fields = input.schema.fields().to_vec();
        let mut ir_exprs: Vec<_> = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| IrExpr::column(idx, f.datatype))
            .collect();

        let mut namer = ColumnNamer::new();
        for field in &fields {
            namer.reserve(&field.name);
        }

        for expr in exprs {
            let ir = self.build_expr(&expr.expr, &input.schema)?;
            let name = expr.name.clone().or_else(|| derived_name(&expr.expr));
            match name {
                Some(name) => match fields.iter().position(|f| f.name == name) {
                    // Extending an existing name replaces the column.
                    Some(idx) => {
                        fields[idx] = Field::new(name, ir.datatype);
                        ir_exprs[idx] = ir;
                    }
                    None => {
                        namer.reserve(&name);
                        fields.push(Field::new(name, ir.datatype));
                        ir_exprs.push(ir);
                    }
                },
                None => {
                    fields.push(Field::new(namer.next_column_name(), ir.datatype));
                    ir_exprs.push(ir);
                }
            }
        }

        project(input, ir_exprs, fields)
    }

    fn build_summarize(
        &mut self,
        input: IrQuery,
        aggregates: &[NamedBoundExpr],
        by: &[NamedBoundExpr],
    ) -> Result<IrQuery> {
        let mut namer = ColumnNamer::new();
        let group_names: Vec<Option<String>> = by
            .iter()
            .map(|e| {
                e.name
                    .clone()
                    .or_else(|| derived_name(&e.expr))
                    .map(|name| namer.claim(&name))
            })
            .collect();

        let mut groups = Vec::with_capacity(by.len());
        let mut group_fields = Vec::with_capacity(by.len());
        for (expr, name) in by.iter().zip(group_names) {
            let ir = self.build_expr(&expr.expr, &input.schema)?;
            let name = name.unwrap_or_else(|| namer.next_column_name());
            group_fields.push(Field::new(name, ir.datatype));
            groups.push(ir);
        }
        let group_schema = Schema::try_new(group_fields.clone())?;

        let mut sink = AggregateSink {
            input: &input.schema,
            group_count: groups.len(),
            aggregates: Vec::new(),
        };

        let mut outputs: Vec<IrExpr> = group_fields
            .iter()
            .enumerate()
            .map(|(idx, f)| IrExpr::column(idx, f.datatype))
            .collect();
        let mut fields = group_fields;

        for expr in aggregates {
            let name = match (&expr.name, &expr.expr) {
                (Some(name), _) => Some(name.clone()),
                (None, BoundExpr::Call { name, args, .. })
                    if self.registry.kind_of(name) == Some(FunctionKind::Aggregate) =>
                {
                    Some(aggregate_name(name, args))
                }
                (None, other) => derived_name(other),
            };
            let name = match name {
                Some(name) => namer.claim(&name),
                None => namer.next_column_name(),
            };

            let ir = self.build_expr_inner(&expr.expr, &group_schema, Some(&mut sink))?;
            fields.push(Field::new(name, ir.datatype));
            outputs.push(ir);
        }

        let aggregates = sink.aggregates;
        Ok(IrQuery {
            schema: Schema::try_new(fields)?,
            node: IrQueryNode::Summarize {
                input: Box::new(input),
                groups,
                aggregates,
                outputs,
            },
        })
    }
}

fn apply_casts(inputs: Vec<IrExpr>, casts: &[Option<DataType>]) -> Vec<IrExpr> {
    inputs
        .into_iter()
        .zip(casts)
        .map(|(expr, cast)| match cast {
            Some(to) => expr.cast_to(*to),
            None => expr,
        })
        .collect()
}

fn project(input: IrQuery, exprs: Vec<IrExpr>, fields: Vec<Field>) -> Result<IrQuery> {
    Ok(IrQuery {
        schema: Schema::try_new(fields)?,
        node: IrQueryNode::Project {
            input: Box::new(input),
            exprs,
        },
    })
}

fn build_union(inputs: Vec<IrQuery>) -> Result<IrQuery> {
    let schemas: Vec<_> = inputs.iter().map(|q| &q.schema).collect();
    let union = union_schema(&schemas)?;
    Ok(IrQuery {
        schema: union.schema,
        node: IrQueryNode::Union {
            inputs,
            mappings: union.mappings,
        },
    })
}

fn build_join(
    left: IrQuery,
    right: IrQuery,
    kind: JoinKind,
    on: &[JoinCondition],
) -> Result<IrQuery> {
    if on.is_empty() {
        return Err(DbError::unsupported("Join requires at least one key"));
    }

    let mut left_keys = Vec::with_capacity(on.len());
    let mut right_keys = Vec::with_capacity(on.len());
    let mut key_types = Vec::with_capacity(on.len());
    for condition in on {
        let (left_name, right_name) = match condition {
            JoinCondition::Shared(name) => (name, name),
            JoinCondition::LeftRight { left, right } => (left, right),
        };
        let (left_idx, left_field) = left.schema.resolve(left_name)?;
        let (right_idx, right_field) = right.schema.resolve(right_name)?;
        let key_type = common_supertype(left_field.datatype, right_field.datatype).ok_or_else(|| {
            DbError::type_mismatch("Join keys have incompatible types")
                .with_field("left", left_field)
                .with_field("right", right_field)
        })?;
        left_keys.push(left_idx);
        right_keys.push(right_idx);
        key_types.push(key_type);
    }

    let schema = match kind {
        JoinKind::LeftSemi | JoinKind::LeftAnti => left.schema.clone(),
        JoinKind::RightSemi | JoinKind::RightAnti => right.schema.clone(),
        _ => join_schema(&left.schema, &right.schema)?,
    };

    Ok(IrQuery {
        schema,
        node: IrQueryNode::Join {
            left: Box::new(left),
            right: Box::new(right),
            kind,
            left_keys,
            right_keys,
            key_types,
        },
    })
}
