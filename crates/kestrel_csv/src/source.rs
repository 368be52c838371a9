use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use kestrel_core::arrays::batch::Batch;
use kestrel_core::arrays::builder::ArrayBuilder;
use kestrel_core::arrays::field::Schema;
use kestrel_core::arrays::scalar::ScalarValue;
use kestrel_core::config::DEFAULT_BATCH_SIZE;
use kestrel_core::functions::cast::coerce_literal;
use kestrel_core::storage::{ChunkIter, TableSource};
use kestrel_error::{DbError, ErrorKind, Result, ResultExt};
use tracing::debug;

use crate::schema::parse_header;

/// A CSV file loaded into memory.
///
/// The table is named after the file stem.
#[derive(Debug)]
pub struct CsvTableSource {
    name: String,
    path: PathBuf,
    schema: Schema,
    batches: Arc<Vec<Batch>>,
}

impl CsvTableSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_batch_size(path, DEFAULT_BATCH_SIZE)
    }

    /// Load a file, producing chunks of at most `batch_size` rows.
    pub fn load_with_batch_size(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DbError::with_kind(ErrorKind::Io, "CSV path has no file name")
                    .with_field("path", path.display())
            })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .context_fn(|| format!("Failed to open CSV file '{}'", path.display()))
            .map_err(|e| e.into_kind(ErrorKind::Io))?;

        let mut records = reader.records();
        let header = match records.next() {
            Some(header) => header.map_err(|e| parse_error(e, path))?,
            None => {
                return Err(DbError::with_kind(ErrorKind::Parse, "CSV file is empty or has no header")
                    .with_field("path", path.display()));
            }
        };
        let schema = parse_header(header.iter()).map_err(|e| e.with_field("path", path.display()))?;

        let batch_size = batch_size.max(1);
        let mut chunk = ChunkBuilder::new(&schema, batch_size);
        let mut batches = Vec::new();

        for record in records {
            let record = record.map_err(|e| parse_error(e, path))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            chunk
                .append(&schema, &record)
                .map_err(|e| e.with_field("path", path.display()).with_field("line", line))?;
            if chunk.rows == batch_size {
                batches.push(chunk.finish(&schema, batch_size)?);
            }
        }
        if chunk.rows > 0 {
            batches.push(chunk.finish(&schema, batch_size)?);
        }

        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        debug!(%name, %schema, rows, path = %path.display(), "loaded csv table");

        Ok(CsvTableSource {
            name,
            path: path.to_path_buf(),
            schema,
            batches: Arc::new(batches),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }
}

impl TableSource for CsvTableSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn scan(&self) -> Result<ChunkIter> {
        let batches = self.batches.clone();
        Ok(Box::new(
            (0..batches.len()).map(move |idx| Ok(batches[idx].clone())),
        ))
    }
}

fn parse_error(err: csv::Error, path: &Path) -> DbError {
    let line = err.position().map(|p| p.line());
    let mut err = DbError::with_source("Failed to read CSV record", Box::new(err))
        .into_kind(ErrorKind::Parse)
        .with_field("path", path.display());
    if let Some(line) = line {
        err = err.with_field("line", line);
    }
    err
}

/// Column builders for the chunk being filled.
#[derive(Debug)]
struct ChunkBuilder {
    builders: Vec<ArrayBuilder>,
    rows: usize,
}

impl ChunkBuilder {
    fn new(schema: &Schema, capacity: usize) -> Self {
        ChunkBuilder {
            builders: schema
                .datatypes()
                .map(|dt| ArrayBuilder::with_capacity(dt, capacity))
                .collect(),
            rows: 0,
        }
    }

    fn append(&mut self, schema: &Schema, record: &StringRecord) -> Result<()> {
        if record.len() != schema.len() {
            return Err(DbError::with_kind(ErrorKind::Parse, "CSV row has the wrong number of columns")
                .with_field("expected", schema.len())
                .with_field("got", record.len()));
        }

        for ((builder, field), cell) in self.builders.iter_mut().zip(schema.fields()).zip(record) {
            let value = if cell.is_empty() {
                ScalarValue::null(field.datatype)
            } else {
                coerce_literal(&ScalarValue::from(cell), field.datatype).map_err(|e| {
                    DbError::with_source("Failed to parse CSV value", Box::new(e))
                        .into_kind(ErrorKind::Parse)
                        .with_field("column", field.name.clone())
                })?
            };
            builder.add(&value)?;
        }
        self.rows += 1;

        Ok(())
    }

    fn finish(&mut self, schema: &Schema, capacity: usize) -> Result<Batch> {
        let full = std::mem::replace(self, ChunkBuilder::new(schema, capacity));
        Batch::try_new_with_rows(
            full.builders.into_iter().map(|b| b.finish()).collect(),
            full.rows,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use kestrel_core::arrays::datatype::DataType;

    use super::*;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn schema_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "test_schema.csv",
            "name:string,age:long,active:bool,timestamp:datetime\nJohn,30,true,2024-01-01T10:00:00Z\n",
        );

        let table = CsvTableSource::load(&path).unwrap();
        assert_eq!("test_schema", table.name());
        assert_eq!(
            "name:string; age:long; active:bool; timestamp:datetime",
            table.schema().to_string()
        );
        assert_eq!(1, table.batches()[0].num_rows());
    }

    #[test]
    fn rows_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "people.csv",
            "name:string,age:long\nAlice,123\n\"Bob\",\nCarol , 7\n,30\n",
        );

        let table = CsvTableSource::load(&path).unwrap();
        let batch = &table.batches()[0];
        assert_eq!(4, batch.num_rows());
        assert_eq!(
            vec![ScalarValue::from("Alice"), ScalarValue::from(123_i64)],
            batch.row(0).unwrap()
        );
        assert_eq!(
            vec![ScalarValue::from("Bob"), ScalarValue::Int64(None)],
            batch.row(1).unwrap()
        );
        assert_eq!(
            vec![ScalarValue::from("Carol"), ScalarValue::from(7_i64)],
            batch.row(2).unwrap()
        );
        assert_eq!(
            vec![ScalarValue::from(""), ScalarValue::from(30_i64)],
            batch.row(3).unwrap()
        );
    }

    #[test]
    fn splits_into_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "nums.csv", "v:long\n1\n2\n3\n4\n5\n");

        let table = CsvTableSource::load_with_batch_size(&path, 2).unwrap();
        let sizes: Vec<_> = table.batches().iter().map(|b| b.num_rows()).collect();
        assert_eq!(vec![2, 2, 1], sizes);

        let values: Vec<ScalarValue> = table
            .scan()
            .unwrap()
            .flat_map(|batch| {
                let batch = batch.unwrap();
                (0..batch.num_rows())
                    .map(|row| batch.array(0).unwrap().get(row).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect();
        let expected: Vec<ScalarValue> = (1..=5_i64).map(ScalarValue::from).collect();
        assert_eq!(expected, values);
    }

    #[test]
    fn wrong_column_count_names_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "name:string,age:long\nJohn,30\nJane,31,extra\n");

        let err = CsvTableSource::load(&path).unwrap_err();
        assert_eq!(ErrorKind::Parse, err.kind());
        assert_eq!(Some("3"), err.field("line"));
    }

    #[test]
    fn unparsable_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "age:long\nthirty\n");

        let err = CsvTableSource::load(&path).unwrap_err();
        assert_eq!(ErrorKind::Parse, err.kind());
        assert_eq!(Some("age"), err.field("column"));
        assert_eq!(Some("2"), err.field("line"));
    }

    #[test]
    fn empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "empty.csv", "");

        let err = CsvTableSource::load(&path).unwrap_err();
        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvTableSource::load(dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(ErrorKind::Io, err.kind());
    }

    #[test]
    fn header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "t.csv", "v:real\n");

        let table = CsvTableSource::load(&path).unwrap();
        assert!(table.batches().is_empty());
        assert_eq!(DataType::Float64, table.schema().fields()[0].datatype);
    }
}
