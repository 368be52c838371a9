use std::fmt::Write as _;

use kestrel_error::Result;

use super::batch::Batch;
use super::field::Schema;

pub const HEADER_SEPARATOR: &str = "------------------";

/// Writes the header for a table dump.
pub fn write_header(out: &mut String, schema: &Schema) -> Result<()> {
    writeln!(out, "{schema}")?;
    writeln!(out, "{HEADER_SEPARATOR}")?;
    Ok(())
}

/// Writes every row of `batch`, values separated by `; `.
pub fn write_rows(out: &mut String, batch: &Batch) -> Result<()> {
    for row in 0..batch.num_rows() {
        for (col, array) in batch.arrays().iter().enumerate() {
            if col > 0 {
                out.push_str("; ");
            }
            write!(out, "{}", array.get(row)?)?;
        }
        out.push('\n');
    }
    Ok(())
}

/// Render a whole table.
pub fn dump_batches<'a>(
    schema: &Schema,
    batches: impl IntoIterator<Item = &'a Batch>,
) -> Result<String> {
    let mut out = String::new();
    write_header(&mut out, schema)?;
    for batch in batches {
        write_rows(&mut out, batch)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::Array;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;
    use crate::arrays::scalar::ScalarValue;

    #[test]
    fn dump_format() {
        let schema = Schema::try_new([
            Field::new("a", DataType::Int64),
            Field::new("b", DataType::Utf8),
        ])
        .unwrap();
        let batch = Batch::try_new(vec![
            Array::try_from_scalars(
                DataType::Int64,
                &[ScalarValue::from(1_i64), ScalarValue::Int64(None)],
            )
            .unwrap(),
            Array::try_from_scalars(
                DataType::Utf8,
                &[ScalarValue::from("x"), ScalarValue::Utf8(None)],
            )
            .unwrap(),
        ])
        .unwrap();

        let out = dump_batches(&schema, [&batch]).unwrap();
        assert_eq!(
            "a:long; b:string\n------------------\n1; x\n(null); \n",
            out
        );
    }
}
