use kestrel_error::{DbError, Result};

use super::Signature;
use super::aggregate::RawAggregateFunction;
use super::documentation::Documentation;
use super::implicit::{CandidateSignature, CastType, implicit_cast_score};
use super::scalar::RawScalarFunction;
use super::window::RawWindowFunction;
use crate::arrays::datatype::DataType;

pub type ScalarFunctionSet = FunctionSet<RawScalarFunction>;
pub type AggregateFunctionSet = FunctionSet<RawAggregateFunction>;
pub type WindowFunctionSet = FunctionSet<RawWindowFunction>;

#[derive(Debug, Clone, Copy)]
pub struct FunctionSet<T: 'static> {
    /// Name of the function.
    pub name: &'static str,
    /// Set of aliases for this function.
    pub aliases: &'static [&'static str],
    /// Documentation for the function, one entry per documented variant.
    pub doc: &'static [&'static Documentation],
    /// The function implementations.
    pub functions: &'static [T],
}

/// A function implementation chosen for a set of argument types.
#[derive(Debug, Clone)]
pub struct ResolvedFunction<T: 'static> {
    pub name: &'static str,
    pub function: &'static T,
    /// Per argument cast needed to satisfy the signature.
    pub casts: Vec<Option<DataType>>,
    pub return_type: DataType,
}

impl<T> FunctionSet<T>
where
    T: FunctionInfo,
{
    /// Get a reference to a function that has an exact signature match for the
    /// given positional inputs.
    pub fn find_exact(&self, inputs: &[DataType]) -> Option<&T> {
        self.functions
            .iter()
            .find(|func| func.signature().exact_match(inputs))
    }

    /// Get candidate signatures for this function given the input datatypes,
    /// best candidate first.
    pub fn candidates(&self, inputs: &[DataType]) -> Vec<CandidateSignature> {
        CandidateSignature::find_candidates(
            inputs,
            self.functions.iter().map(|func| func.signature()),
        )
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.functions.get(idx)
    }

    /// Pick the implementation for the given argument types, inserting
    /// implicit casts where needed.
    pub fn resolve(&'static self, inputs: &[DataType]) -> Result<ResolvedFunction<T>> {
        if let Some(function) = self.find_exact(inputs) {
            let return_type = function.signature().resolve_return_type(inputs)?;
            return Ok(ResolvedFunction {
                name: self.name,
                function,
                casts: vec![None; inputs.len()],
                return_type,
            });
        }

        let candidate = self.candidates(inputs).into_iter().next().ok_or_else(|| {
            DbError::overload_mismatch(format!(
                "No overload of '{}' accepts the given argument types",
                self.name
            ))
            .with_field("arguments", format_types(inputs))
        })?;

        let function = &self.functions[candidate.signature_idx];
        let casted: Vec<DataType> = inputs
            .iter()
            .zip(&candidate.casts)
            .map(|(have, cast)| match cast {
                CastType::Cast { to, .. } => *to,
                CastType::NoCastNeeded => *have,
            })
            .collect();
        let return_type = function.signature().resolve_return_type(&casted)?;

        Ok(ResolvedFunction {
            name: self.name,
            function,
            casts: candidate
                .casts
                .iter()
                .map(|cast| match cast {
                    CastType::Cast { to, .. } => Some(*to),
                    CastType::NoCastNeeded => None,
                })
                .collect(),
            return_type,
        })
    }

    /// Resolve using a signature picked by the front end when there is one,
    /// falling back to overload resolution on the argument types.
    pub fn resolve_with(
        &'static self,
        inputs: &[DataType],
        signature: Option<&[DataType]>,
    ) -> Result<ResolvedFunction<T>> {
        match signature {
            Some(signature) => self.resolve_signature(inputs, signature),
            None => self.resolve(inputs),
        }
    }

    /// Use the overload whose parameters are exactly `signature`. Arguments
    /// are cast to the parameter types, which must be implicit casts.
    pub fn resolve_signature(
        &'static self,
        inputs: &[DataType],
        signature: &[DataType],
    ) -> Result<ResolvedFunction<T>> {
        let mismatch = || {
            DbError::overload_mismatch(format!(
                "No overload of '{}' matches the supplied signature",
                self.name
            ))
            .with_field("signature", format_types(signature))
            .with_field("arguments", format_types(inputs))
        };
        if inputs.len() != signature.len() {
            return Err(mismatch());
        }
        let function = self.find_exact(signature).ok_or_else(mismatch)?;

        let mut casts = Vec::with_capacity(inputs.len());
        for (have, want) in inputs.iter().zip(signature) {
            if have == want {
                casts.push(None);
            } else if implicit_cast_score(*have, want.id()).is_some() {
                casts.push(Some(*want));
            } else {
                return Err(mismatch());
            }
        }
        let return_type = function.signature().resolve_return_type(signature)?;

        Ok(ResolvedFunction {
            name: self.name,
            function,
            casts,
            return_type,
        })
    }
}

fn format_types(types: &[DataType]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub trait FunctionInfo: Sized + 'static {
    fn signature(&self) -> &Signature;
}

impl FunctionInfo for RawScalarFunction {
    fn signature(&self) -> &Signature {
        RawScalarFunction::signature(self)
    }
}

impl FunctionInfo for RawAggregateFunction {
    fn signature(&self) -> &Signature {
        RawAggregateFunction::signature(self)
    }
}

impl FunctionInfo for RawWindowFunction {
    fn signature(&self) -> &Signature {
        RawWindowFunction::signature(self)
    }
}
