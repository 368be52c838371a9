use kestrel_error::{DbError, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalI64, PhysicalUtf8, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::{BinaryExecutor, OutBuffer, TernaryExecutor, UnaryExecutor};
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

/// Everything except the unreserved characters of RFC 3986.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub const FUNCTION_SET_STRCAT: ScalarFunctionSet = ScalarFunctionSet {
    name: "strcat",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Concatenate the text form of all arguments.",
        arguments: &["values..."],
        example: Some(Example {
            call: "strcat('a', 1, true)",
            output: "a1True",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new_variadic(&[DataTypeId::Utf8], DataTypeId::Utf8, DataTypeId::Utf8),
        &StrCat,
    )],
};

pub const FUNCTION_SET_STRLEN: ScalarFunctionSet = ScalarFunctionSet {
    name: "strlen",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Number of characters in a string.",
        arguments: &["string"],
        example: Some(Example {
            call: "strlen('abc')",
            output: "3",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8], DataTypeId::Int64),
        &StrLen,
    )],
};

pub const FUNCTION_SET_SUBSTRING: ScalarFunctionSet = ScalarFunctionSet {
    name: "substring",
    aliases: &[],
    doc: &[
        &Documentation {
            category: Category::String,
            description: "Characters of the string from a zero based start position to the end.",
            arguments: &["string", "start"],
            example: Some(Example {
                call: "substring('abc', 1)",
                output: "bc",
            }),
        },
        &Documentation {
            category: Category::String,
            description: "Up to `length` characters of the string from a zero based start position. Out of range positions are clamped.",
            arguments: &["string", "start", "length"],
            example: Some(Example {
                call: "substring('abc', -1, 20)",
                output: "abc",
            }),
        },
    ],
    functions: &[
        RawScalarFunction::new(
            &Signature::new(&[DataTypeId::Utf8, DataTypeId::Int64], DataTypeId::Utf8),
            &Substring,
        ),
        RawScalarFunction::new(
            &Signature::new(
                &[DataTypeId::Utf8, DataTypeId::Int64, DataTypeId::Int64],
                DataTypeId::Utf8,
            ),
            &Substring,
        ),
    ],
};

pub const FUNCTION_SET_REPLACE_STRING: ScalarFunctionSet = ScalarFunctionSet {
    name: "replace_string",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Replace every occurrence of `lookup` in the text with `rewrite`.",
        arguments: &["text", "lookup", "rewrite"],
        example: Some(Example {
            call: "replace_string('abcb', 'b', '1')",
            output: "a1c1",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(
            &[DataTypeId::Utf8, DataTypeId::Utf8, DataTypeId::Utf8],
            DataTypeId::Utf8,
        ),
        &ReplaceString,
    )],
};

pub const FUNCTION_SET_TOLOWER: ScalarFunctionSet = ScalarFunctionSet {
    name: "tolower",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Convert a string to lowercase.",
        arguments: &["string"],
        example: Some(Example {
            call: "tolower('ABC')",
            output: "abc",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8], DataTypeId::Utf8),
        &MapString { f: str::to_lowercase },
    )],
};

pub const FUNCTION_SET_TOUPPER: ScalarFunctionSet = ScalarFunctionSet {
    name: "toupper",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Convert a string to uppercase.",
        arguments: &["string"],
        example: Some(Example {
            call: "toupper('abc')",
            output: "ABC",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8], DataTypeId::Utf8),
        &MapString { f: str::to_uppercase },
    )],
};

pub const FUNCTION_SET_URL_ENCODE_COMPONENT: ScalarFunctionSet = ScalarFunctionSet {
    name: "url_encode_component",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Percent-encode a string for use as a url component.",
        arguments: &["string"],
        example: Some(Example {
            call: "url_encode_component('hello world')",
            output: "hello%20world",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8], DataTypeId::Utf8),
        &MapString { f: url_encode },
    )],
};

pub const FUNCTION_SET_URL_DECODE: ScalarFunctionSet = ScalarFunctionSet {
    name: "url_decode",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::String,
        description: "Decode a percent-encoded string.",
        arguments: &["string"],
        example: Some(Example {
            call: "url_decode('hello%20world')",
            output: "hello world",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::Utf8], DataTypeId::Utf8),
        &MapString { f: url_decode },
    )],
};

pub const FUNCTION_SET_EXTRACT: ScalarFunctionSet = ScalarFunctionSet {
    name: "extract",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Regexp,
        description: "Get a capture group of the first regular expression match in the text. Returns an empty string when there is no match or the group doesn't exist.",
        arguments: &["pattern", "group", "text"],
        example: Some(Example {
            call: "extract('([0-9.]+) (s|ms)$', 1, 'took 127.5 ms')",
            output: "127.5",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(
            &[DataTypeId::Utf8, DataTypeId::Int64, DataTypeId::Utf8],
            DataTypeId::Utf8,
        ),
        &Extract,
    )],
};

fn url_encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn url_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Clamp a possibly negative char position into `0..=len`.
fn clamp_position(pos: i64, len: usize) -> usize {
    usize::try_from(pos.max(0)).unwrap_or(usize::MAX).min(len)
}

#[derive(Debug, Clone, Copy)]
pub struct StrCat;

impl ScalarFunction for StrCat {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let columns = inputs
            .iter()
            .map(|input| PhysicalUtf8::get_storage(input.data()))
            .collect::<Result<Vec<_>>>()?;

        let values = (0..num_rows)
            .map(|row| columns.iter().map(|col| col[row].as_str()).collect::<String>())
            .collect();

        Array::try_from_values::<PhysicalUtf8>(return_type, values)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StrLen;

impl ScalarFunction for StrLen {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalUtf8, PhysicalI64, _>(&inputs[0], return_type, |s, buf| {
            buf.put(s.chars().count() as i64)
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Substring;

impl Substring {
    fn substring(s: &str, start: i64, length: Option<i64>) -> String {
        let len = s.chars().count();
        let start = clamp_position(start, len);
        let take = match length {
            Some(length) => clamp_position(length, len - start),
            None => len - start,
        };
        s.chars().skip(start).take(take).collect()
    }
}

impl ScalarFunction for Substring {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        match inputs.len() {
            2 => BinaryExecutor::execute::<PhysicalUtf8, PhysicalI64, PhysicalUtf8, _>(
                &inputs[0],
                &inputs[1],
                return_type,
                |s, &start, buf| buf.put(Self::substring(s, start, None)),
            ),
            _ => TernaryExecutor::execute::<PhysicalUtf8, PhysicalI64, PhysicalI64, PhysicalUtf8, _>(
                &inputs[0],
                &inputs[1],
                &inputs[2],
                return_type,
                |s, &start, &length, buf| buf.put(Self::substring(s, start, Some(length))),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplaceString;

impl ScalarFunction for ReplaceString {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        TernaryExecutor::execute::<PhysicalUtf8, PhysicalUtf8, PhysicalUtf8, PhysicalUtf8, _>(
            &inputs[0],
            &inputs[1],
            &inputs[2],
            return_type,
            |text, lookup, rewrite, buf| {
                if lookup.is_empty() {
                    buf.put(text.clone())
                } else {
                    buf.put(text.replace(lookup.as_str(), rewrite))
                }
            },
        )
    }
}

/// Apply a string to string function.
#[derive(Debug, Clone, Copy)]
pub struct MapString {
    f: fn(&str) -> String,
}

impl ScalarFunction for MapString {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalUtf8, PhysicalUtf8, _>(&inputs[0], return_type, |s, buf| {
            buf.put((self.f)(s))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Extract;

impl ScalarFunction for Extract {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let patterns = PhysicalUtf8::get_storage(inputs[0].data())?;
        let groups = PhysicalI64::get_storage(inputs[1].data())?;
        let texts = PhysicalUtf8::get_storage(inputs[2].data())?;

        let mut compiled: Option<(&str, Regex)> = None;
        let mut out = OutBuffer::<PhysicalUtf8>::new(num_rows);

        for row in 0..num_rows {
            if !inputs[1].is_valid(row) {
                out.put_buffer(row).put_null();
                continue;
            }

            let pattern = patterns[row].as_str();
            let regex = match &compiled {
                Some((prev, regex)) if *prev == pattern => regex,
                _ => {
                    let regex = Regex::new(pattern).map_err(|e| {
                        DbError::with_source("Invalid regular expression", Box::new(e))
                            .with_field("pattern", pattern.to_string())
                    })?;
                    &compiled.insert((pattern, regex)).1
                }
            };

            let extracted = usize::try_from(groups[row])
                .ok()
                .and_then(|group| regex.captures(&texts[row])?.get(group))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            out.put_buffer(row).put(extracted);
        }

        out.into_array(return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;

    fn eval(set: &'static ScalarFunctionSet, args: &[ScalarValue]) -> ScalarValue {
        let types: Vec<_> = args.iter().map(|a| a.datatype()).collect();
        let resolved = set.resolve(&types).unwrap();
        resolved
            .function
            .execute_scalar(args, resolved.return_type)
            .unwrap()
    }

    #[test]
    fn substring_clamps() {
        let test_cases = [
            (0, 3, "abc"),
            (-1, 20, "abc"),
            (1, 2, "bc"),
            (1, 20, "bc"),
            (1, 1, "b"),
            (2, 0, ""),
            (10, 1, ""),
        ];

        for case in test_cases {
            let out = eval(
                &FUNCTION_SET_SUBSTRING,
                &[ScalarValue::from("abc"), ScalarValue::from(case.0 as i64), ScalarValue::from(case.1 as i64)],
            );
            assert_eq!(ScalarValue::from(case.2), out, "case: {case:?}");
        }
    }

    #[test]
    fn url_encoding() {
        let out = eval(
            &FUNCTION_SET_URL_ENCODE_COMPONENT,
            &[ScalarValue::from("https://example.com?a=b")],
        );
        assert_eq!(ScalarValue::from("https%3A%2F%2Fexample.com%3Fa%3Db"), out);

        let out = eval(&FUNCTION_SET_URL_DECODE, &[ScalarValue::from("hello%20world")]);
        assert_eq!(ScalarValue::from("hello world"), out);
    }

    #[test]
    fn extract_groups() {
        let pattern = ScalarValue::from("([0-9.]+) (s|ms)$");
        let input = ScalarValue::from("Operation took 127.5 ms");
        let test_cases = [(0, "127.5 ms"), (1, "127.5"), (2, "ms"), (3, "")];

        for case in test_cases {
            let out = eval(
                &FUNCTION_SET_EXTRACT,
                &[pattern.clone(), ScalarValue::from(case.0 as i64), input.clone()],
            );
            assert_eq!(ScalarValue::from(case.1), out, "case: {case:?}");
        }
    }

    #[test]
    fn replace_and_len() {
        let out = eval(
            &FUNCTION_SET_REPLACE_STRING,
            &[ScalarValue::from("abcb"), ScalarValue::from("b"), ScalarValue::from("1")],
        );
        assert_eq!(ScalarValue::from("a1c1"), out);

        let out = eval(&FUNCTION_SET_STRLEN, &[ScalarValue::from("abc")]);
        assert_eq!(ScalarValue::from(3_i64), out);
    }

    #[test]
    fn strcat_strings() {
        let out = eval(
            &FUNCTION_SET_STRCAT,
            &[ScalarValue::from("a"), ScalarValue::from("b"), ScalarValue::from("c")],
        );
        assert_eq!(ScalarValue::from("abc"), out);
    }
}
