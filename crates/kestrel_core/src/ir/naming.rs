//! Names for output columns that weren't given one.

use hashbrown::HashSet;

use crate::bound::BoundExpr;
use crate::coercion::schema::unique_name;

/// Name derived from the shape of an expression.
///
/// A column reference keeps its name. `bin` and `floor` over a column take the
/// column's name.
pub fn derived_name(expr: &BoundExpr) -> Option<String> {
    match expr {
        BoundExpr::Column { name } => Some(name.clone()),
        BoundExpr::Call { name, args, .. } if name == "bin" || name == "floor" => match args.first() {
            Some(BoundExpr::Column { name }) => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Name of an unnamed aggregate called as `called` with `args`.
///
/// `take_any(x)` is named `x`. Everything else is `<called>_<column>`, with
/// an empty column part when the first argument isn't a column.
pub fn aggregate_name(called: &str, args: &[BoundExpr]) -> String {
    let column = match args.first() {
        Some(BoundExpr::Column { name }) => Some(name.as_str()),
        _ => None,
    };
    match (called, column) {
        ("take_any", Some(column)) => column.to_string(),
        (called, column) => format!("{called}_{}", column.unwrap_or("")),
    }
}

/// Assigns output names, generating `Column<N>` and `print_<N>` names for
/// expressions without one.
#[derive(Debug, Default)]
pub struct ColumnNamer {
    used: HashSet<String>,
    next_column: usize,
}

impl ColumnNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as used.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// Use `name`, suffixing it if it's already taken.
    pub fn claim(&mut self, name: &str) -> String {
        let name = unique_name(name, &self.used);
        self.used.insert(name.clone());
        name
    }

    /// Next free `Column<N>`, counting from 1.
    pub fn next_column_name(&mut self) -> String {
        loop {
            self.next_column += 1;
            let name = format!("Column{}", self.next_column);
            if !self.used.contains(&name) {
                self.used.insert(name.clone());
                return name;
            }
        }
    }
}

/// Name of the unnamed print expression at `idx`.
pub fn print_name(idx: usize) -> String {
    format!("print_{idx}")
}
