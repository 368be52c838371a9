use ahash::RandomState;
use hashbrown::HashMap;
use kestrel_error::{DbError, Result};
use tracing::trace;

use super::aggregate::builtin::BUILTIN_AGGREGATE_FUNCTION_SETS;
use super::documentation::Documentation;
use super::function_set::{AggregateFunctionSet, FunctionSet, ScalarFunctionSet, WindowFunctionSet};
use super::scalar::builtin::BUILTIN_SCALAR_FUNCTION_SETS;
use super::window::builtin::BUILTIN_WINDOW_FUNCTION_SETS;
use crate::hash::HASH_RANDOM_STATE;

/// What kind of function a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Scalar,
    Aggregate,
    Window,
}

impl FunctionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Aggregate => "aggregate",
            Self::Window => "window",
        }
    }
}

/// One documented variant of a builtin function.
#[derive(Debug, Clone, Copy)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FunctionKind,
    pub doc: &'static Documentation,
}

/// Immutable name to function set lookup.
///
/// Built once per engine and shared by reference with the IR builder.
#[derive(Debug)]
pub struct FunctionRegistry {
    scalars: HashMap<&'static str, &'static ScalarFunctionSet, RandomState>,
    aggregates: HashMap<&'static str, &'static AggregateFunctionSet, RandomState>,
    windows: HashMap<&'static str, &'static WindowFunctionSet, RandomState>,
}

impl FunctionRegistry {
    pub fn new_with_builtins() -> Self {
        let registry = FunctionRegistry {
            scalars: index(BUILTIN_SCALAR_FUNCTION_SETS),
            aggregates: index(BUILTIN_AGGREGATE_FUNCTION_SETS),
            windows: index(BUILTIN_WINDOW_FUNCTION_SETS),
        };
        trace!(
            scalars = registry.scalars.len(),
            aggregates = registry.aggregates.len(),
            windows = registry.windows.len(),
            "built function registry"
        );
        registry
    }

    pub fn kind_of(&self, name: &str) -> Option<FunctionKind> {
        if self.scalars.contains_key(name) {
            Some(FunctionKind::Scalar)
        } else if self.aggregates.contains_key(name) {
            Some(FunctionKind::Aggregate)
        } else if self.windows.contains_key(name) {
            Some(FunctionKind::Window)
        } else {
            None
        }
    }

    pub fn scalar(&self, name: &str) -> Result<&'static ScalarFunctionSet> {
        self.scalars
            .get(name)
            .copied()
            .ok_or_else(|| unknown_function("scalar", name))
    }

    pub fn aggregate(&self, name: &str) -> Result<&'static AggregateFunctionSet> {
        self.aggregates
            .get(name)
            .copied()
            .ok_or_else(|| unknown_function("aggregate", name))
    }

    pub fn window(&self, name: &str) -> Result<&'static WindowFunctionSet> {
        self.windows
            .get(name)
            .copied()
            .ok_or_else(|| unknown_function("window", name))
    }

    /// Iterate every scalar function set once, ignoring aliases.
    pub fn scalar_sets(&self) -> impl Iterator<Item = &'static ScalarFunctionSet> {
        BUILTIN_SCALAR_FUNCTION_SETS.iter()
    }

    pub fn aggregate_sets(&self) -> impl Iterator<Item = &'static AggregateFunctionSet> {
        BUILTIN_AGGREGATE_FUNCTION_SETS.iter()
    }

    pub fn window_sets(&self) -> impl Iterator<Item = &'static WindowFunctionSet> {
        BUILTIN_WINDOW_FUNCTION_SETS.iter()
    }

    /// Every documented function variant, ordered by name.
    pub fn list_functions(&self) -> Vec<FunctionEntry> {
        let mut entries: Vec<_> = self
            .scalar_sets()
            .flat_map(|set| entries_for(set, FunctionKind::Scalar))
            .chain(
                self.aggregate_sets()
                    .flat_map(|set| entries_for(set, FunctionKind::Aggregate)),
            )
            .chain(
                self.window_sets()
                    .flat_map(|set| entries_for(set, FunctionKind::Window)),
            )
            .collect();
        entries.sort_by_key(|entry| entry.name);
        entries
    }
}

fn entries_for<T: 'static>(
    set: &'static FunctionSet<T>,
    kind: FunctionKind,
) -> impl Iterator<Item = FunctionEntry> {
    set.doc.iter().map(move |doc| FunctionEntry {
        name: set.name,
        aliases: set.aliases,
        kind,
        doc: *doc,
    })
}

fn index<T>(
    sets: &'static [FunctionSet<T>],
) -> HashMap<&'static str, &'static FunctionSet<T>, RandomState> {
    let mut map = HashMap::with_hasher(HASH_RANDOM_STATE);
    for set in sets {
        map.insert(set.name, set);
        for alias in set.aliases {
            map.insert(*alias, set);
        }
    }
    map
}

fn unknown_function(kind: &str, name: &str) -> DbError {
    DbError::unsupported(format!("Unknown {kind} function '{name}'"))
}
