//! Columnar evaluation engine for a Kusto-like query language.
//!
//! Front ends hand the engine a [`bound::BoundScript`]. The engine builds a
//! typed IR, plans it into pull based operators and evaluates it against
//! registered [`storage::TableSource`]s.

pub mod arrays;
pub mod bound;
pub mod coercion;
pub mod config;
pub mod engine;
pub mod execution;
pub mod functions;
pub mod hash;
pub mod ir;
pub mod storage;
