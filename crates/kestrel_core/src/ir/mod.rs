//! Typed internal representation built from bound trees.
//!
//! Every expression carries its resolved type and whether it depends on the
//! rows it's evaluated against. Every query node carries its output schema.

pub mod builder;
pub mod naming;

use std::sync::Arc;

use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::field::Schema;
use crate::arrays::scalar::ScalarValue;
use crate::bound::{JoinKind, MemberKey};
use crate::functions::aggregate::RawAggregateFunction;
use crate::functions::scalar::RawScalarFunction;
use crate::functions::window::RawWindowFunction;
use crate::storage::TableSource;

/// Whether an expression produces one value or one value per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Scalar,
    Columnar,
}

impl ResultKind {
    /// Columnar if either side is columnar.
    pub fn combine(self, other: ResultKind) -> ResultKind {
        if self == ResultKind::Columnar || other == ResultKind::Columnar {
            ResultKind::Columnar
        } else {
            ResultKind::Scalar
        }
    }

    pub fn of_all<'a>(exprs: impl IntoIterator<Item = &'a IrExpr>) -> ResultKind {
        exprs
            .into_iter()
            .fold(ResultKind::Scalar, |kind, expr| kind.combine(expr.result_kind))
    }
}

#[derive(Debug, Clone)]
pub struct IrExpr {
    pub kind: IrExprKind,
    pub datatype: DataType,
    pub result_kind: ResultKind,
}

#[derive(Debug, Clone)]
pub enum IrExprKind {
    Literal(ScalarValue),
    /// Column index into the input schema.
    Column(usize),
    /// Lenient cast to the expression's datatype.
    Cast(Box<IrExpr>),
    ScalarCall {
        name: &'static str,
        function: &'static RawScalarFunction,
        args: Vec<IrExpr>,
    },
    WindowCall {
        name: &'static str,
        function: &'static RawWindowFunction,
        args: Vec<IrExpr>,
    },
    Member {
        input: Box<IrExpr>,
        key: MemberKey,
    },
    /// First value of the first column of a query.
    ToScalar(Box<IrQuery>),
}

impl IrExpr {
    pub fn literal(value: ScalarValue) -> Self {
        IrExpr {
            datatype: value.datatype(),
            kind: IrExprKind::Literal(value),
            result_kind: ResultKind::Scalar,
        }
    }

    pub fn column(idx: usize, datatype: DataType) -> Self {
        IrExpr {
            kind: IrExprKind::Column(idx),
            datatype,
            result_kind: ResultKind::Columnar,
        }
    }

    /// Wrap in a cast, or return as is if already of the type.
    pub fn cast_to(self, datatype: DataType) -> Self {
        if self.datatype == datatype {
            return self;
        }
        IrExpr {
            result_kind: self.result_kind,
            kind: IrExprKind::Cast(Box::new(self)),
            datatype,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.result_kind == ResultKind::Scalar
    }
}

/// An aggregate call inside a summarize.
#[derive(Debug, Clone)]
pub struct IrAggregate {
    pub name: &'static str,
    pub function: &'static RawAggregateFunction,
    /// Arguments evaluated against the summarize input.
    pub args: Vec<IrExpr>,
    pub datatype: DataType,
}

#[derive(Debug, Clone)]
pub struct IrSortKey {
    pub expr: IrExpr,
    pub descending: bool,
    pub nulls_first: bool,
}

#[derive(Debug, Clone)]
pub struct IrQuery {
    pub node: IrQueryNode,
    pub schema: Schema,
}

#[derive(Debug, Clone)]
pub enum IrQueryNode {
    Scan(Arc<dyn TableSource>),
    /// Literal table, already split into chunks.
    Values(Vec<Batch>),
    /// One row with no columns, the input of `print`.
    SingleRow,
    Project {
        input: Box<IrQuery>,
        exprs: Vec<IrExpr>,
    },
    Filter {
        input: Box<IrQuery>,
        predicate: IrExpr,
    },
    Summarize {
        input: Box<IrQuery>,
        groups: Vec<IrExpr>,
        aggregates: Vec<IrAggregate>,
        /// Output expressions over the group columns followed by the
        /// aggregate results.
        outputs: Vec<IrExpr>,
    },
    Sort {
        input: Box<IrQuery>,
        keys: Vec<IrSortKey>,
    },
    /// Distinct over all columns of the input.
    Distinct {
        input: Box<IrQuery>,
    },
    Union {
        inputs: Vec<IrQuery>,
        /// Per input, the source column of every output column.
        mappings: Vec<Vec<Option<usize>>>,
    },
    Join {
        left: Box<IrQuery>,
        right: Box<IrQuery>,
        kind: JoinKind,
        left_keys: Vec<usize>,
        right_keys: Vec<usize>,
        /// Type both sides of each key are compared as.
        key_types: Vec<DataType>,
    },
    Take {
        input: Box<IrQuery>,
        limit: u64,
    },
    Count {
        input: Box<IrQuery>,
    },
    Materialize {
        input: Box<IrQuery>,
        id: usize,
    },
}

impl IrQueryNode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "scan",
            Self::Values(_) => "values",
            Self::SingleRow => "single_row",
            Self::Project { .. } => "project",
            Self::Filter { .. } => "filter",
            Self::Summarize { .. } => "summarize",
            Self::Sort { .. } => "sort",
            Self::Distinct { .. } => "distinct",
            Self::Union { .. } => "union",
            Self::Join { .. } => "join",
            Self::Take { .. } => "take",
            Self::Count { .. } => "count",
            Self::Materialize { .. } => "materialize",
        }
    }
}

/// What a script evaluates to.
#[derive(Debug, Clone)]
pub enum IrScript {
    Query(IrQuery),
    Scalar(IrExpr),
}
