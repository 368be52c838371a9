use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Broad category of an error.
///
/// Callers match on the kind to decide how to surface an error. Everything
/// except `Cancelled` is a failure of the query itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Internal consistency failure.
    Internal,
    /// The bound tree uses a shape the engine does not support.
    UnsupportedConstruct,
    /// A value does not match its expected kind.
    TypeMismatch,
    /// A row or column reference resolved to nothing.
    IndexOutOfRange,
    /// A resolved overload cannot execute with the given arguments.
    ArityOrOverloadMismatch,
    /// Evaluation was aborted through a cancellation token.
    Cancelled,
    /// Reading from an external source failed.
    Io,
    /// External text could not be parsed.
    Parse,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "Internal",
            Self::UnsupportedConstruct => "UnsupportedConstruct",
            Self::TypeMismatch => "TypeMismatch",
            Self::IndexOutOfRange => "IndexOutOfRange",
            Self::ArityOrOverloadMismatch => "ArityOrOverloadMismatch",
            Self::Cancelled => "Cancelled",
            Self::Io => "Io",
            Self::Parse => "Parse",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

#[derive(Debug)]
struct DbErrorInner {
    kind: ErrorKind,
    msg: String,
    source: Option<Box<dyn Error + Send + Sync>>,
    fields: Vec<(Cow<'static, str>, String)>,
    backtrace: Backtrace,
}

impl DbError {
    /// Create a new internal error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Internal, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                kind,
                msg: msg.into(),
                source: None,
                fields: Vec::new(),
                backtrace: Backtrace::capture(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::UnsupportedConstruct, msg)
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::TypeMismatch, msg)
    }

    pub fn index_out_of_range(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::IndexOutOfRange, msg)
    }

    pub fn overload_mismatch(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::ArityOrOverloadMismatch, msg)
    }

    pub fn cancelled() -> Self {
        Self::with_kind(ErrorKind::Cancelled, "Query was cancelled")
    }

    /// Attach a key/value pair to the error, rendered after the message.
    pub fn with_field<V>(mut self, key: impl Into<Cow<'static, str>>, value: V) -> Self
    where
        V: fmt::Display,
    {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    /// Overrides the kind of the error, keeping message, fields and source.
    pub fn into_kind(mut self, kind: ErrorKind) -> Self {
        self.inner.kind = kind;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.kind == ErrorKind::Cancelled
    }

    pub fn message(&self) -> &str {
        &self.inner.msg
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.inner
            .fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.inner.backtrace
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        for (key, value) in &self.inner.fields {
            write!(f, "\n  {key}: {value}")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }

        if self.inner.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\nBacktrace: {}", self.inner.backtrace)?;
        }

        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for DbError {
    fn from(value: fmt::Error) -> Self {
        DbError::with_source("Format error", Box::new(value))
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        DbError::with_source("IO error", Box::new(value)).into_kind(ErrorKind::Io)
    }
}

/// Wrap foreign errors with a message.
pub trait ResultExt<T, E> {
    fn context(self, msg: &'static str) -> Result<T>;
    fn context_fn<F: Fn() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Error + Send + Sync + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(msg, Box::new(e))),
        }
    }

    fn context_fn<F: Fn() -> String>(self, f: F) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(f(), Box::new(e))),
        }
    }
}

pub trait OptionExt<T> {
    /// Return an error if the option is None.
    fn required(self, what: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, what: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::new(format!("Missing required value: {what}"))),
        }
    }
}

/// Return early with an `UnsupportedConstruct` error.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)+) => {
        return Err($crate::DbError::unsupported(format!("Not yet implemented: {}", format!($($arg)+))))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_fields_and_source() {
        let io = std::io::Error::other("disk gone");
        let err = DbError::with_source("Failed to read", Box::new(io)).with_field("path", "a.csv");

        let s = err.to_string();
        assert!(s.starts_with("Failed to read\n  path: a.csv"), "{s}");
        assert!(s.contains("Error source: disk gone"), "{s}");
        assert_eq!(Some("a.csv"), err.field("path"));
    }

    #[test]
    fn kinds_are_preserved() {
        assert_eq!(ErrorKind::Internal, DbError::new("x").kind());
        assert_eq!(ErrorKind::TypeMismatch, DbError::type_mismatch("x").kind());
        assert!(DbError::cancelled().is_cancelled());
        assert!(!DbError::unsupported("x").is_cancelled());
    }

    #[test]
    fn not_implemented_returns_unsupported() {
        fn f() -> Result<()> {
            not_implemented!("thing {}", 1);
        }

        let err = f().unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConstruct, err.kind());
        assert_eq!("Not yet implemented: thing 1", err.message());
    }

    #[test]
    fn required_on_none() {
        let err = None::<i32>.required("value").unwrap_err();
        assert_eq!("Missing required value: value", err.message());
    }
}
