pub mod array;
pub mod batch;
pub mod builder;
pub mod datatype;
pub mod executor;
pub mod field;
pub mod format;
pub mod scalar;
