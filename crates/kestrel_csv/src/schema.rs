use kestrel_core::arrays::datatype::DataType;
use kestrel_core::arrays::field::{Field, Schema};
use kestrel_error::{DbError, ErrorKind, Result};

/// Parse the `name:type` header record into a schema.
pub fn parse_header<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<Schema> {
    let fields = columns
        .into_iter()
        .map(parse_column)
        .collect::<Result<Vec<_>>>()?;
    if fields.is_empty() {
        return Err(DbError::with_kind(ErrorKind::Parse, "CSV header has no columns"));
    }
    Schema::try_new(fields)
}

fn parse_column(column: &str) -> Result<Field> {
    let invalid = || {
        DbError::with_kind(ErrorKind::Parse, "Invalid column definition in CSV header")
            .with_field("column", column.to_string())
    };

    let (name, kind) = column.split_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() || kind.contains(':') {
        return Err(invalid());
    }
    let datatype = DataType::from_kind_name(kind).map_err(|e| {
        DbError::with_source("Unsupported column type in CSV header", Box::new(e))
            .into_kind(ErrorKind::Parse)
            .with_field("column", name.to_string())
    })?;

    Ok(Field::new(name, datatype))
}
