use std::path::{Path, PathBuf};
use std::sync::Arc;

use kestrel_core::config::DEFAULT_BATCH_SIZE;
use kestrel_core::storage::{GlobalTables, TableSource};
use kestrel_error::{DbError, ErrorKind, Result};
use tracing::{info, warn};

use crate::source::CsvTableSource;

/// Loads a set of CSV files as global tables.
///
/// Files that fail to load are logged and skipped. A later file replaces an
/// earlier one with the same name.
#[derive(Debug, Default)]
pub struct CsvTablesProvider {
    tables: GlobalTables,
}

impl CsvTablesProvider {
    pub fn load_files(paths: &[PathBuf]) -> Result<Self> {
        Self::load_files_with_batch_size(paths, DEFAULT_BATCH_SIZE)
    }

    pub fn load_files_with_batch_size(paths: &[PathBuf], batch_size: usize) -> Result<Self> {
        let mut tables = GlobalTables::new();
        for path in paths {
            match CsvTableSource::load_with_batch_size(path, batch_size) {
                Ok(table) => {
                    info!(
                        table = table.name(),
                        columns = table.schema().len(),
                        path = %path.display(),
                        "loaded csv table"
                    );
                    tables.upsert(Arc::new(table));
                }
                Err(e) => warn!(path = %path.display(), %e, "failed to load csv file"),
            }
        }

        if tables.is_empty() {
            return Err(DbError::with_kind(ErrorKind::Io, "No CSV tables were loaded")
                .with_field("files", paths.len()));
        }

        Ok(CsvTablesProvider { tables })
    }

    /// Load every `*.csv` file in `dir`, in file name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        Self::load_files(&paths).map_err(|e| e.with_field("dir", dir.display()))
    }

    pub fn tables(&self) -> &GlobalTables {
        &self.tables
    }

    pub fn into_tables(self) -> GlobalTables {
        self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_dir_skips_bad_files() {
        logutil::init_test();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "v:long\n1\n").unwrap();
        std::fs::write(dir.path().join("a.CSV"), "name:string\nx\n").unwrap();
        std::fs::write(dir.path().join("broken.csv"), "no header here\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "v:long\n1\n").unwrap();

        let provider = CsvTablesProvider::load_dir(dir.path()).unwrap();
        let names: Vec<_> = provider.tables().names().collect();
        assert_eq!(vec!["a", "b"], names);
    }

    #[test]
    fn later_file_replaces_earlier() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let a = first.path().join("t.csv");
        let b = second.path().join("t.csv");
        std::fs::write(&a, "v:long\n1\n").unwrap();
        std::fs::write(&b, "w:string\nx\n").unwrap();

        let tables = CsvTablesProvider::load_files(&[a, b]).unwrap().into_tables();
        assert_eq!(1, tables.len());
        let table = tables.get("t").unwrap();
        assert_eq!("w:string", table.schema().to_string());
    }

    #[test]
    fn nothing_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvTablesProvider::load_dir(dir.path()).unwrap_err();
        assert_eq!(ErrorKind::Io, err.kind());
    }
}
