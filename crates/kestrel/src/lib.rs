//! Command line tool for dumping CSV tables through the kestrel engine.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use kestrel_core::bound::{BoundOperator, BoundQuery, BoundScript, table};
use kestrel_core::config::DEFAULT_BATCH_SIZE;
use kestrel_core::engine::Engine;
use kestrel_core::storage::TableSource;
use kestrel_csv::CsvTableSource;
use kestrel_error::Result;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl From<LogFormat> for logutil::LogFormat {
    fn from(value: LogFormat) -> Self {
        match value {
            LogFormat::Text => logutil::LogFormat::HumanReadable,
            LogFormat::Json => logutil::LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "kestrel")]
pub struct Arguments {
    /// CSV files to load. Each becomes a table named after the file stem.
    #[clap(required_unless_present = "list_functions")]
    pub files: Vec<PathBuf>,

    /// Print every builtin function with its usage line and exit.
    #[clap(long)]
    pub list_functions: bool,

    /// Only print the first N rows of each table.
    #[clap(long, value_name = "N")]
    pub take: Option<u64>,

    /// Print the number of rows instead of the rows.
    #[clap(long)]
    pub count: bool,

    /// Maximum number of rows per chunk.
    #[clap(long, value_name = "N", env = "KESTREL_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Format of log output written to stderr.
    #[clap(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Load every file and write one dump per table to `out`.
pub fn run<W: Write>(args: &Arguments, out: &mut W) -> Result<()> {
    let mut engine = Engine::new();
    engine.config_mut().batch_size = args.batch_size;

    if args.list_functions {
        write_function_list(&engine, out)?;
        out.flush()?;
        return Ok(());
    }

    let mut names = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let source = CsvTableSource::load_with_batch_size(path, args.batch_size)?;
        names.push(source.name().to_string());
        engine.register_table(Arc::new(source))?;
    }

    for (idx, name) in names.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        let query = dump_query(name, args.take, args.count);
        debug!(%name, ?query, "dumping table");

        let dump = engine.evaluate(&BoundScript::query(query))?.dump_to_string()?;
        write!(out, "{dump}")?;
    }
    out.flush()?;

    Ok(())
}

/// One line per documented function variant, plus an indented example line
/// when the variant has one.
fn write_function_list<W: Write>(engine: &Engine, out: &mut W) -> Result<()> {
    for entry in engine.registry().list_functions() {
        let doc = entry.doc;
        write!(
            out,
            "{}\t{}\t{}\t{}",
            doc.usage(entry.name),
            entry.kind.as_str(),
            doc.category,
            doc.description.trim(),
        )?;
        if !entry.aliases.is_empty() {
            write!(out, " (aliases: {})", entry.aliases.join(", "))?;
        }
        writeln!(out)?;
        if let Some(example) = doc.example {
            writeln!(out, "\t{example}")?;
        }
    }
    Ok(())
}

fn dump_query(name: &str, take: Option<u64>, count: bool) -> BoundQuery {
    let mut query = table(name);
    if let Some(n) = take {
        query = query.pipe(BoundOperator::Take(n));
    }
    if count {
        query = query.pipe(BoundOperator::Count { name: None });
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_arguments() {
        let args = Arguments::try_parse_from([
            "kestrel",
            "a.csv",
            "b.csv",
            "--take",
            "5",
            "--count",
            "--batch-size",
            "16",
        ])
        .unwrap();
        assert_eq!(vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")], args.files);
        assert_eq!(Some(5), args.take);
        assert!(args.count);
        assert_eq!(16, args.batch_size);
        assert_eq!(LogFormat::Text, args.log_format);
    }

    #[test]
    fn files_required() {
        assert!(Arguments::try_parse_from(["kestrel"]).is_err());
    }

    #[test]
    fn list_functions_needs_no_files() {
        let args = Arguments::try_parse_from(["kestrel", "--list-functions"]).unwrap();
        assert!(args.list_functions);
        assert!(args.files.is_empty());
    }
}
