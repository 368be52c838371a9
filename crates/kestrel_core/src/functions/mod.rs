// Functions are only ever created in const contexts.
#![allow(clippy::new_without_default)]

pub mod aggregate;
pub mod cast;
pub mod documentation;
pub mod function_set;
pub mod implicit;
pub mod registry;
pub mod scalar;
pub mod window;

use std::fmt;

use kestrel_error::{DbError, Result};

use crate::arrays::datatype::{DataType, DataTypeId};
use crate::coercion::common_supertype;

/// Function signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Expected positional input argument types for this signature.
    pub positional_args: &'static [DataTypeId],

    /// Type of the variadic args if this function is variadic.
    pub variadic_arg: Option<DataTypeId>,

    /// The return type.
    ///
    /// `Any` means the return type is the type the `Any` arguments were
    /// unified to.
    pub return_type: DataTypeId,
}

impl Signature {
    pub const fn new(inputs: &'static [DataTypeId], return_type: DataTypeId) -> Self {
        Signature {
            positional_args: inputs,
            variadic_arg: None,
            return_type,
        }
    }

    pub const fn new_variadic(
        inputs: &'static [DataTypeId],
        variadic: DataTypeId,
        return_type: DataTypeId,
    ) -> Self {
        Signature {
            positional_args: inputs,
            variadic_arg: Some(variadic),
            return_type,
        }
    }

    pub const fn is_variadic(&self) -> bool {
        self.variadic_arg.is_some()
    }

    /// Expected type id for the argument at `idx`, None if the signature
    /// doesn't accept that many arguments.
    pub fn arg_at(&self, idx: usize) -> Option<DataTypeId> {
        self.positional_args.get(idx).copied().or(self.variadic_arg)
    }

    /// If the number of inputs is accepted by this signature.
    pub fn accepts_arity(&self, num_inputs: usize) -> bool {
        if self.is_variadic() {
            num_inputs >= self.positional_args.len()
        } else {
            num_inputs == self.positional_args.len()
        }
    }

    /// Return if the inputs exactly satisfy the signature.
    ///
    /// All `Any` positions must hold the same type to be an exact match.
    pub fn exact_match(&self, inputs: &[DataType]) -> bool {
        if !self.accepts_arity(inputs.len()) {
            return false;
        }

        let mut any_type = None;
        for (idx, have) in inputs.iter().enumerate() {
            match self.arg_at(idx) {
                Some(DataTypeId::Any) => match any_type {
                    None => any_type = Some(*have),
                    Some(prev) if prev != *have => return false,
                    Some(_) => (),
                },
                Some(expected) if expected == have.id() => (),
                _ => return false,
            }
        }

        true
    }

    /// Unify the types of all inputs passed in `Any` positions.
    pub fn unify_any_args(&self, inputs: &[DataType]) -> Option<DataType> {
        let mut unified: Option<DataType> = None;
        for (idx, have) in inputs.iter().enumerate() {
            if self.arg_at(idx) == Some(DataTypeId::Any) {
                unified = match unified {
                    None => Some(*have),
                    Some(prev) => Some(common_supertype(prev, *have)?),
                };
            }
        }
        unified
    }

    /// Compute the return type given inputs already matching this signature.
    pub fn resolve_return_type(&self, inputs: &[DataType]) -> Result<DataType> {
        match self.return_type.to_datatype() {
            Some(datatype) => Ok(datatype),
            None => self.unify_any_args(inputs).ok_or_else(|| {
                DbError::overload_mismatch("Cannot determine return type")
                    .with_field("signature", self)
            }),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, arg) in self.positional_args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        if let Some(variadic) = self.variadic_arg {
            if !self.positional_args.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "{variadic}...")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_any_requires_same_type() {
        let sig = Signature::new(
            &[DataTypeId::Boolean, DataTypeId::Any, DataTypeId::Any],
            DataTypeId::Any,
        );
        assert!(sig.exact_match(&[DataType::Boolean, DataType::Int64, DataType::Int64]));
        assert!(!sig.exact_match(&[DataType::Boolean, DataType::Int64, DataType::Float64]));
        assert!(!sig.exact_match(&[DataType::Boolean, DataType::Int64]));
    }

    #[test]
    fn variadic_arity() {
        let sig = Signature::new_variadic(&[], DataTypeId::Utf8, DataTypeId::Utf8);
        assert!(sig.exact_match(&[DataType::Utf8, DataType::Utf8, DataType::Utf8]));
        assert!(sig.exact_match(&[]));
        assert!(!sig.exact_match(&[DataType::Int32]));
    }

    #[test]
    fn return_type_from_any() {
        let sig = Signature::new(&[DataTypeId::Any, DataTypeId::Any], DataTypeId::Any);
        assert_eq!(
            DataType::Float64,
            sig.resolve_return_type(&[DataType::Int64, DataType::Float64]).unwrap()
        );
        assert_eq!("(any, any) -> any", sig.to_string());
    }
}
