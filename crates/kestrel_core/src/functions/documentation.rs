use std::fmt;

/// Grouping used when listing functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Functions backing query language operators.
    Operator(OperatorCategory),
    Aggregate(AggregateCategory),
    Window,
    Numeric,
    DateTime,
    Dynamic,
    String,
    Regexp,
    Conversion,
    Conditional,
    Geo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCategory {
    Numeric,
    Comparison,
    Logical,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateCategory {
    General,
    Statistical,
    Collection,
}

impl Category {
    pub const GENERAL_PURPOSE_AGGREGATE: Self = Category::Aggregate(AggregateCategory::General);
    pub const STATISTICAL_AGGREGATE: Self = Category::Aggregate(AggregateCategory::Statistical);
    pub const COLLECTION_AGGREGATE: Self = Category::Aggregate(AggregateCategory::Collection);

    pub const NUMERIC_OPERATOR: Self = Category::Operator(OperatorCategory::Numeric);
    pub const COMPARISON_OPERATOR: Self = Category::Operator(OperatorCategory::Comparison);
    pub const LOGICAL_OPERATOR: Self = Category::Operator(OperatorCategory::Logical);
    pub const STRING_OPERATOR: Self = Category::Operator(OperatorCategory::String);

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Operator(OperatorCategory::Numeric) => "numeric_operator",
            Self::Operator(OperatorCategory::Comparison) => "comparison_operator",
            Self::Operator(OperatorCategory::Logical) => "logical_operator",
            Self::Operator(OperatorCategory::String) => "string_operator",
            Self::Aggregate(AggregateCategory::General) => "general_purpose_aggregate",
            Self::Aggregate(AggregateCategory::Statistical) => "statistical_aggregate",
            Self::Aggregate(AggregateCategory::Collection) => "collection_aggregate",
            Self::Window => "window",
            Self::Numeric => "numeric",
            Self::DateTime => "datetime",
            Self::Dynamic => "dynamic",
            Self::String => "string",
            Self::Regexp => "regexp",
            Self::Conversion => "conversion",
            Self::Conditional => "conditional",
            Self::Geo => "geo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Help text for one variant of a function set, shown by `--list-functions`.
#[derive(Debug, Clone, Copy)]
pub struct Documentation {
    pub category: Category,
    /// One sentence summary. Surrounding whitespace is dropped when listed.
    pub description: &'static str,
    /// Parameter names for the usage line.
    pub arguments: &'static [&'static str],
    pub example: Option<Example>,
}

impl Documentation {
    /// Usage line for this variant, e.g. `strcat(left, right)`.
    pub fn usage(&self, name: &str) -> String {
        format!("{name}({})", self.arguments.join(", "))
    }
}

/// A call expression and the dump rendering of its result.
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub call: &'static str,
    pub output: &'static str,
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.call, self.output)
    }
}
