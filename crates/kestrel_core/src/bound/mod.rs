//! Bound syntax trees handed to the engine by a front end.
//!
//! A bound tree has every name already resolved to a column, variable, table
//! or function. The engine never parses text itself; front ends implement
//! [`FrontEnd`] and produce a [`BoundScript`].

use std::fmt;
use std::sync::Arc;

use kestrel_error::{DbError, Result};

use crate::arrays::datatype::DataType;
use crate::arrays::field::{Field, Schema};
use crate::arrays::scalar::ScalarValue;
use crate::storage::{GlobalTables, TableSource};

/// Turns query text into a bound script.
pub trait FrontEnd {
    fn bind(&self, text: &str, globals: &GlobalTables) -> Result<BoundScript>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    /// Name of the scalar function implementing the operator.
    pub const fn function_name(&self) -> &'static str {
        match self {
            Self::Negate => "negate",
            Self::Not => "not",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    EqualCi,
    NotEqualCi,
    And,
    Or,
    Contains,
    NotContains,
    ContainsCs,
    NotContainsCs,
    StartsWith,
    StartsWithCs,
    EndsWith,
    EndsWithCs,
    MatchesRegex,
}

impl BinaryOp {
    /// Name of the scalar function implementing the operator.
    pub const fn function_name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "modulo",
            Self::Equal => "equals",
            Self::NotEqual => "not_equals",
            Self::Less => "less_than",
            Self::LessOrEqual => "less_than_or_equal",
            Self::Greater => "greater_than",
            Self::GreaterOrEqual => "greater_than_or_equal",
            Self::EqualCi => "equals_ci",
            Self::NotEqualCi => "not_equals_ci",
            Self::And => "and",
            Self::Or => "or",
            Self::Contains => "contains",
            Self::NotContains => "!contains",
            Self::ContainsCs => "contains_cs",
            Self::NotContainsCs => "!contains_cs",
            Self::StartsWith => "startswith",
            Self::StartsWithCs => "startswith_cs",
            Self::EndsWith => "endswith",
            Self::EndsWithCs => "endswith_cs",
            Self::MatchesRegex => "matches_regex",
        }
    }
}

/// Key used to access a member of a dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberKey {
    Name(String),
    Index(i64),
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BoundExpr {
    Literal(ScalarValue),
    /// Column of the table the expression is evaluated against.
    Column { name: String },
    /// A scalar `let` or a user function parameter.
    Variable { name: String },
    Unary {
        op: UnaryOp,
        input: Box<BoundExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    Cast {
        to: DataType,
        input: Box<BoundExpr>,
    },
    /// Call to a built-in scalar, aggregate or window function.
    ///
    /// `signature` holds the parameter types of the overload when the front
    /// end has already picked one. Otherwise the overload is chosen from the
    /// argument types.
    Call {
        name: String,
        args: Vec<BoundExpr>,
        signature: Option<Vec<DataType>>,
    },
    /// Call to a user function declared with `let`.
    UserCall { name: String, args: Vec<BoundArg> },
    Member {
        input: Box<BoundExpr>,
        key: MemberKey,
    },
    ToScalar(Box<BoundQuery>),
}

/// Argument to a user function call.
#[derive(Debug, Clone)]
pub enum BoundArg {
    Expr(BoundExpr),
    Query(BoundQuery),
}

/// An expression with an optional output name.
#[derive(Debug, Clone)]
pub struct NamedBoundExpr {
    pub name: Option<String>,
    pub expr: BoundExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// One `order by` key. Unspecified order is descending, unspecified null
/// placement is last for descending and first for ascending keys.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub expr: BoundExpr,
    pub order: Option<SortOrder>,
    pub nulls: Option<NullsOrder>,
}

impl SortKey {
    pub fn descending(&self) -> bool {
        self.order.unwrap_or(SortOrder::Descending) == SortOrder::Descending
    }

    pub fn nulls_first(&self) -> bool {
        match self.nulls {
            Some(nulls) => nulls == NullsOrder::First,
            None => !self.descending(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// No kind given. Behaves as `Inner`.
    #[default]
    Unspecified,
    Inner,
    InnerUnique,
    LeftOuter,
    RightOuter,
    FullOuter,
    LeftSemi,
    RightSemi,
    LeftAnti,
    RightAnti,
}

impl JoinKind {
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "inner" => Self::Inner,
            "innerunique" => Self::InnerUnique,
            "leftouter" => Self::LeftOuter,
            "rightouter" => Self::RightOuter,
            "fullouter" => Self::FullOuter,
            "leftsemi" => Self::LeftSemi,
            "rightsemi" => Self::RightSemi,
            "leftanti" | "anti" | "leftantisemi" => Self::LeftAnti,
            "rightanti" | "rightantisemi" => Self::RightAnti,
            other => return Err(DbError::unsupported(format!("Unknown join kind '{other}'"))),
        })
    }
}

/// Equality condition between a left and a right column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinCondition {
    /// `on Key`: the same column name on both sides.
    Shared(String),
    /// `on $left.a == $right.b`
    LeftRight { left: String, right: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistinctColumns {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone)]
pub enum BoundOperator {
    Project(Vec<NamedBoundExpr>),
    Extend(Vec<NamedBoundExpr>),
    ProjectAway(Vec<String>),
    /// Pairs of `(new, old)` names.
    ProjectRename(Vec<(String, String)>),
    Where(BoundExpr),
    Summarize {
        aggregates: Vec<NamedBoundExpr>,
        by: Vec<NamedBoundExpr>,
    },
    Sort(Vec<SortKey>),
    Distinct(DistinctColumns),
    Union(Vec<BoundQuery>),
    Join {
        right: Box<BoundQuery>,
        kind: JoinKind,
        on: Vec<JoinCondition>,
    },
    Take(u64),
    Count { name: Option<String> },
    Materialize,
}

#[derive(Debug, Clone)]
pub enum BoundQuery {
    Table(Arc<dyn TableSource>),
    /// A tabular `let`, tabular function parameter or global table.
    Variable { name: String },
    /// Literal table. Values are row major.
    DataTable {
        schema: Schema,
        values: Vec<ScalarValue>,
    },
    Print(Vec<NamedBoundExpr>),
    Pipe {
        input: Box<BoundQuery>,
        operator: BoundOperator,
    },
    Union(Vec<BoundQuery>),
    Materialize(Box<BoundQuery>),
    UserCall { name: String, args: Vec<BoundArg> },
}

impl BoundQuery {
    pub fn pipe(self, operator: BoundOperator) -> BoundQuery {
        BoundQuery::Pipe {
            input: Box::new(self),
            operator,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ParamKind {
    Scalar(DataType),
    Tabular,
}

#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: String,
    pub kind: ParamKind,
}

/// A user function declared with `let f = (params) { body }`.
///
/// The body's last statement is the function's result.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub params: Vec<FunctionParam>,
    pub body: Vec<BoundStatement>,
}

#[derive(Debug, Clone)]
pub enum LetValue {
    Expr(BoundExpr),
    Query(BoundQuery),
    Function(Arc<UserFunction>),
}

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Let { name: String, value: LetValue },
    Query(BoundQuery),
    Expr(BoundExpr),
}

/// A list of statements ending in the query or expression to evaluate.
#[derive(Debug, Clone)]
pub struct BoundScript {
    pub statements: Vec<BoundStatement>,
}

impl BoundScript {
    pub fn new(statements: Vec<BoundStatement>) -> Self {
        BoundScript { statements }
    }

    pub fn query(query: BoundQuery) -> Self {
        BoundScript {
            statements: vec![BoundStatement::Query(query)],
        }
    }

    pub fn expr(expr: BoundExpr) -> Self {
        BoundScript {
            statements: vec![BoundStatement::Expr(expr)],
        }
    }
}

pub fn lit(value: impl Into<ScalarValue>) -> BoundExpr {
    BoundExpr::Literal(value.into())
}

pub fn null(datatype: DataType) -> BoundExpr {
    BoundExpr::Literal(ScalarValue::null(datatype))
}

pub fn col(name: impl Into<String>) -> BoundExpr {
    BoundExpr::Column { name: name.into() }
}

pub fn var(name: impl Into<String>) -> BoundExpr {
    BoundExpr::Variable { name: name.into() }
}

pub fn call(name: impl Into<String>, args: Vec<BoundExpr>) -> BoundExpr {
    BoundExpr::Call {
        name: name.into(),
        args,
        signature: None,
    }
}

pub fn call_with_signature(
    name: impl Into<String>,
    args: Vec<BoundExpr>,
    signature: Vec<DataType>,
) -> BoundExpr {
    BoundExpr::Call {
        name: name.into(),
        args,
        signature: Some(signature),
    }
}

pub fn user_call(name: impl Into<String>, args: Vec<BoundArg>) -> BoundExpr {
    BoundExpr::UserCall {
        name: name.into(),
        args,
    }
}

pub fn unary(op: UnaryOp, input: BoundExpr) -> BoundExpr {
    BoundExpr::Unary {
        op,
        input: Box::new(input),
    }
}

pub fn binary(op: BinaryOp, left: BoundExpr, right: BoundExpr) -> BoundExpr {
    BoundExpr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn cast(to: DataType, input: BoundExpr) -> BoundExpr {
    BoundExpr::Cast {
        to,
        input: Box::new(input),
    }
}

pub fn member(input: BoundExpr, key: MemberKey) -> BoundExpr {
    BoundExpr::Member {
        input: Box::new(input),
        key,
    }
}

pub fn to_scalar(query: BoundQuery) -> BoundExpr {
    BoundExpr::ToScalar(Box::new(query))
}

pub fn named(name: impl Into<String>, expr: BoundExpr) -> NamedBoundExpr {
    NamedBoundExpr {
        name: Some(name.into()),
        expr,
    }
}

pub fn unnamed(expr: BoundExpr) -> NamedBoundExpr {
    NamedBoundExpr { name: None, expr }
}

pub fn table(name: impl Into<String>) -> BoundQuery {
    BoundQuery::Variable { name: name.into() }
}

/// A literal table with the given columns and row major values.
pub fn datatable(columns: &[(&str, DataType)], values: Vec<ScalarValue>) -> Result<BoundQuery> {
    let schema = Schema::try_new(columns.iter().map(|(name, dt)| Field::new(*name, *dt)))?;
    Ok(BoundQuery::DataTable { schema, values })
}

pub fn print(exprs: Vec<NamedBoundExpr>) -> BoundQuery {
    BoundQuery::Print(exprs)
}

pub fn sort_key(expr: BoundExpr, order: Option<SortOrder>, nulls: Option<NullsOrder>) -> SortKey {
    SortKey { expr, order, nulls }
}

pub fn let_expr(name: impl Into<String>, expr: BoundExpr) -> BoundStatement {
    BoundStatement::Let {
        name: name.into(),
        value: LetValue::Expr(expr),
    }
}

pub fn let_query(name: impl Into<String>, query: BoundQuery) -> BoundStatement {
    BoundStatement::Let {
        name: name.into(),
        value: LetValue::Query(query),
    }
}

pub fn let_function(
    name: impl Into<String>,
    params: Vec<FunctionParam>,
    body: Vec<BoundStatement>,
) -> BoundStatement {
    BoundStatement::Let {
        name: name.into(),
        value: LetValue::Function(Arc::new(UserFunction { params, body })),
    }
}

pub fn scalar_param(name: impl Into<String>, datatype: DataType) -> FunctionParam {
    FunctionParam {
        name: name.into(),
        kind: ParamKind::Scalar(datatype),
    }
}

pub fn tabular_param(name: impl Into<String>) -> FunctionParam {
    FunctionParam {
        name: name.into(),
        kind: ParamKind::Tabular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_kind_names() {
        let test_cases = [
            ("inner", JoinKind::Inner),
            ("innerunique", JoinKind::InnerUnique),
            ("anti", JoinKind::LeftAnti),
            ("leftantisemi", JoinKind::LeftAnti),
            ("rightantisemi", JoinKind::RightAnti),
            ("FullOuter", JoinKind::FullOuter),
        ];
        for case in test_cases {
            assert_eq!(case.1, JoinKind::from_name(case.0).unwrap(), "case: {case:?}");
        }
        assert!(JoinKind::from_name("sideways").is_err());
    }

    #[test]
    fn sort_key_defaults() {
        let key = sort_key(col("a"), None, None);
        assert!(key.descending());
        assert!(!key.nulls_first());

        let key = sort_key(col("a"), Some(SortOrder::Ascending), None);
        assert!(key.nulls_first());

        let key = sort_key(col("a"), Some(SortOrder::Ascending), Some(NullsOrder::Last));
        assert!(!key.nulls_first());
    }
}
