use std::fmt::Debug;
use std::marker::PhantomData;

use kestrel_error::{DbError, Result};
use regex::Regex;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalBool, PhysicalUtf8};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::BinaryExecutor;
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

const STRING_PREDICATE_SIG: Signature =
    Signature::new(&[DataTypeId::Utf8, DataTypeId::Utf8], DataTypeId::Boolean);

const fn predicate_doc(
    description: &'static str,
    call: &'static str,
    output: &'static str,
) -> Documentation {
    Documentation {
        category: Category::STRING_OPERATOR,
        description,
        arguments: &["haystack", "needle"],
        example: Some(Example { call, output }),
    }
}

pub const FUNCTION_SET_CONTAINS: ScalarFunctionSet = ScalarFunctionSet {
    name: "contains",
    aliases: &[],
    doc: &[&predicate_doc(
        "Case-insensitive check that the left string contains the right string.",
        "'Kestrel' contains 'EST'",
        "True",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<Contains, CaseInsensitive>::new(false),
    )],
};

pub const FUNCTION_SET_NOT_CONTAINS: ScalarFunctionSet = ScalarFunctionSet {
    name: "!contains",
    aliases: &["not_contains"],
    doc: &[&predicate_doc(
        "Case-insensitive check that the left string does not contain the right string.",
        "'Kestrel' !contains 'EST'",
        "False",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<Contains, CaseInsensitive>::new(true),
    )],
};

pub const FUNCTION_SET_CONTAINS_CS: ScalarFunctionSet = ScalarFunctionSet {
    name: "contains_cs",
    aliases: &[],
    doc: &[&predicate_doc(
        "Case-sensitive check that the left string contains the right string.",
        "'Kestrel' contains_cs 'EST'",
        "False",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<Contains, CaseSensitive>::new(false),
    )],
};

pub const FUNCTION_SET_NOT_CONTAINS_CS: ScalarFunctionSet = ScalarFunctionSet {
    name: "!contains_cs",
    aliases: &["not_contains_cs"],
    doc: &[&predicate_doc(
        "Case-sensitive check that the left string does not contain the right string.",
        "'Kestrel' !contains_cs 'EST'",
        "True",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<Contains, CaseSensitive>::new(true),
    )],
};

pub const FUNCTION_SET_STARTSWITH: ScalarFunctionSet = ScalarFunctionSet {
    name: "startswith",
    aliases: &[],
    doc: &[&predicate_doc(
        "Case-insensitive check that the left string starts with the right string.",
        "'Kestrel' startswith 'kes'",
        "True",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<StartsWith, CaseInsensitive>::new(false),
    )],
};

pub const FUNCTION_SET_STARTSWITH_CS: ScalarFunctionSet = ScalarFunctionSet {
    name: "startswith_cs",
    aliases: &[],
    doc: &[&predicate_doc(
        "Case-sensitive check that the left string starts with the right string.",
        "'Kestrel' startswith_cs 'kes'",
        "False",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<StartsWith, CaseSensitive>::new(false),
    )],
};

pub const FUNCTION_SET_ENDSWITH: ScalarFunctionSet = ScalarFunctionSet {
    name: "endswith",
    aliases: &[],
    doc: &[&predicate_doc(
        "Case-insensitive check that the left string ends with the right string.",
        "'Kestrel' endswith 'REL'",
        "True",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<EndsWith, CaseInsensitive>::new(false),
    )],
};

pub const FUNCTION_SET_ENDSWITH_CS: ScalarFunctionSet = ScalarFunctionSet {
    name: "endswith_cs",
    aliases: &[],
    doc: &[&predicate_doc(
        "Case-sensitive check that the left string ends with the right string.",
        "'Kestrel' endswith_cs 'REL'",
        "False",
    )],
    functions: &[RawScalarFunction::new(
        &STRING_PREDICATE_SIG,
        &StringPredicate::<EndsWith, CaseSensitive>::new(false),
    )],
};

pub const FUNCTION_SET_MATCHES_REGEX: ScalarFunctionSet = ScalarFunctionSet {
    name: "matches_regex",
    aliases: &["matches regex"],
    doc: &[&Documentation {
        category: Category::Regexp,
        description: "Check if the left string matches the regular expression on the right. An empty pattern matches everything.",
        arguments: &["string", "pattern"],
        example: Some(Example {
            call: "'abc123' matches regex '[0-9]+'",
            output: "True",
        }),
    }],
    functions: &[RawScalarFunction::new(&STRING_PREDICATE_SIG, &MatchesRegex)],
};

pub trait StringMatch: Debug + Sync + Send + Copy + 'static {
    fn matches(haystack: &str, needle: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Contains;

impl StringMatch for Contains {
    fn matches(haystack: &str, needle: &str) -> bool {
        haystack.contains(needle)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StartsWith;

impl StringMatch for StartsWith {
    fn matches(haystack: &str, needle: &str) -> bool {
        haystack.starts_with(needle)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EndsWith;

impl StringMatch for EndsWith {
    fn matches(haystack: &str, needle: &str) -> bool {
        haystack.ends_with(needle)
    }
}

pub trait Casing: Debug + Sync + Send + Copy + 'static {
    fn matches<M: StringMatch>(haystack: &str, needle: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct CaseSensitive;

impl Casing for CaseSensitive {
    fn matches<M: StringMatch>(haystack: &str, needle: &str) -> bool {
        M::matches(haystack, needle)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CaseInsensitive;

impl Casing for CaseInsensitive {
    fn matches<M: StringMatch>(haystack: &str, needle: &str) -> bool {
        M::matches(&haystack.to_lowercase(), &needle.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringPredicate<M, C> {
    negate: bool,
    _m: PhantomData<M>,
    _c: PhantomData<C>,
}

impl<M, C> StringPredicate<M, C> {
    pub const fn new(negate: bool) -> Self {
        StringPredicate {
            negate,
            _m: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<M, C> ScalarFunction for StringPredicate<M, C>
where
    M: StringMatch,
    C: Casing,
{
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        BinaryExecutor::execute::<PhysicalUtf8, PhysicalUtf8, PhysicalBool, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |haystack, needle, buf| buf.put(C::matches::<M>(haystack, needle) != self.negate),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchesRegex;

impl ScalarFunction for MatchesRegex {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        // Patterns are almost always constant, only recompile when it changes.
        let mut compiled: Option<(String, Regex)> = None;
        let mut error = None;

        let out = BinaryExecutor::execute::<PhysicalUtf8, PhysicalUtf8, PhysicalBool, _>(
            &inputs[0],
            &inputs[1],
            return_type,
            |text, pattern, buf| {
                if error.is_some() {
                    return;
                }
                if compiled.as_ref().is_none_or(|(prev, _)| prev != pattern) {
                    match Regex::new(pattern) {
                        Ok(regex) => compiled = Some((pattern.clone(), regex)),
                        Err(e) => {
                            error = Some(
                                DbError::with_source("Invalid regular expression", Box::new(e))
                                    .with_field("pattern", pattern.clone()),
                            );
                            return;
                        }
                    }
                }
                if let Some((_, regex)) = &compiled {
                    buf.put(regex.is_match(text));
                }
            },
        )?;

        match error {
            Some(error) => Err(error),
            None => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;

    fn eval(set: &'static ScalarFunctionSet, left: &str, right: &str) -> Option<bool> {
        set.functions[0]
            .execute_scalar(&[ScalarValue::from(left), ScalarValue::from(right)], DataType::Boolean)
            .unwrap()
            .try_as_bool()
            .unwrap()
    }

    #[test]
    fn string_operators() {
        let test_cases = [
            (&FUNCTION_SET_CONTAINS, "Kestrel", "EST", true),
            (&FUNCTION_SET_CONTAINS_CS, "Kestrel", "EST", false),
            (&FUNCTION_SET_NOT_CONTAINS, "Kestrel", "EST", false),
            (&FUNCTION_SET_NOT_CONTAINS_CS, "Kestrel", "EST", true),
            (&FUNCTION_SET_STARTSWITH, "Kestrel", "kes", true),
            (&FUNCTION_SET_STARTSWITH_CS, "Kestrel", "kes", false),
            (&FUNCTION_SET_ENDSWITH, "Kestrel", "REL", true),
            (&FUNCTION_SET_ENDSWITH_CS, "Kestrel", "rel", true),
            (&FUNCTION_SET_CONTAINS, "abc", "", true),
        ];

        for case in test_cases {
            assert_eq!(Some(case.3), eval(case.0, case.1, case.2), "case: {case:?}");
        }
    }

    #[test]
    fn regex_matching() {
        assert_eq!(Some(true), eval(&FUNCTION_SET_MATCHES_REGEX, "abc123", "[0-9]+"));
        assert_eq!(Some(false), eval(&FUNCTION_SET_MATCHES_REGEX, "abc", "^[0-9]+$"));
        assert_eq!(Some(true), eval(&FUNCTION_SET_MATCHES_REGEX, "anything", ""));
    }

    #[test]
    fn invalid_regex_errors() {
        let err = FUNCTION_SET_MATCHES_REGEX.functions[0]
            .execute_scalar(&[ScalarValue::from("a"), ScalarValue::from("(")], DataType::Boolean)
            .unwrap_err();
        assert_eq!(Some("("), err.field("pattern"));
    }
}
