//! Evaluation of IR queries.

pub mod context;
pub mod expr;
pub mod operators;
pub mod planner;
