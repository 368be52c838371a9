use hashbrown::HashSet;
use indexmap::IndexMap;
use kestrel_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::field::{Field, Schema};

/// Output schema of a union plus, for every input, the source column for
/// each output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSchema {
    pub schema: Schema,
    pub mappings: Vec<Vec<Option<usize>>>,
}

/// Reconcile the schemas of union inputs.
///
/// Columns are keyed by name and kind in first-seen order. A name seen with
/// more than one kind becomes `<name>_<kind>`, and names already taken get a
/// numeric suffix.
pub fn union_schema(inputs: &[&Schema]) -> Result<UnionSchema> {
    let mut keys: IndexMap<(&str, DataType), ()> = IndexMap::new();
    let mut kinds_per_name: IndexMap<&str, Vec<DataType>> = IndexMap::new();

    for schema in inputs {
        for field in schema.fields() {
            keys.insert((field.name.as_str(), field.datatype), ());
            let kinds = kinds_per_name.entry(field.name.as_str()).or_default();
            if !kinds.contains(&field.datatype) {
                kinds.push(field.datatype);
            }
        }
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut fields = Vec::with_capacity(keys.len());

    for (name, datatype) in keys.keys() {
        let ambiguous = kinds_per_name.get(name).is_some_and(|kinds| kinds.len() > 1);
        let base = if ambiguous {
            format!("{name}_{datatype}")
        } else {
            name.to_string()
        };
        let name = unique_name(&base, &used);
        used.insert(name.clone());
        fields.push(Field::new(name, *datatype));
    }

    let mappings = inputs
        .iter()
        .map(|schema| {
            keys.keys()
                .map(|(name, datatype)| {
                    schema
                        .index_of(name)
                        .filter(|&idx| schema.fields()[idx].datatype == *datatype)
                })
                .collect()
        })
        .collect();

    Ok(UnionSchema {
        schema: Schema::try_new(fields)?,
        mappings,
    })
}

/// Output schema of a join: all left columns followed by all right columns,
/// right columns renamed when their name is already used.
pub fn join_schema(left: &Schema, right: &Schema) -> Result<Schema> {
    let mut used: HashSet<String> = left.names().map(|n| n.to_string()).collect();
    let mut fields = left.fields().to_vec();

    for field in right.fields() {
        let name = unique_name(&field.name, &used);
        used.insert(name.clone());
        fields.push(Field::new(name, field.datatype));
    }

    Schema::try_new(fields)
}

/// `base` if unused, otherwise `base` with the smallest free numeric suffix
/// starting at 1.
pub fn unique_name(base: &str, used: &HashSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
