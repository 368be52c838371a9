//! CSV files as kestrel tables.
//!
//! The first line of a file declares the schema as `name:type` pairs, e.g.
//! `id:long,name:string,timestamp:datetime`. Every following line is a row.

pub mod provider;
pub mod schema;
pub mod source;

pub use provider::CsvTablesProvider;
pub use source::CsvTableSource;
