pub mod arith;
pub mod comparison;
pub mod conditional;
pub mod conversion;
pub mod datetime;
pub mod dynamic;
pub mod geo;
pub mod logical;
pub mod negate;
pub mod numeric;
pub mod string_ops;
pub mod strings;

use arith::{
    FUNCTION_SET_ADD,
    FUNCTION_SET_DIVIDE,
    FUNCTION_SET_MODULO,
    FUNCTION_SET_MULTIPLY,
    FUNCTION_SET_SUBTRACT,
};
use comparison::{
    FUNCTION_SET_EQ,
    FUNCTION_SET_EQ_CI,
    FUNCTION_SET_GT,
    FUNCTION_SET_GT_EQ,
    FUNCTION_SET_LT,
    FUNCTION_SET_LT_EQ,
    FUNCTION_SET_NEQ,
    FUNCTION_SET_NEQ_CI,
};
use conditional::{
    FUNCTION_SET_COALESCE,
    FUNCTION_SET_IFF,
    FUNCTION_SET_ISEMPTY,
    FUNCTION_SET_ISNOTEMPTY,
    FUNCTION_SET_ISNOTNULL,
    FUNCTION_SET_ISNULL,
    FUNCTION_SET_MAX_OF,
    FUNCTION_SET_MIN_OF,
};
use conversion::{
    FUNCTION_SET_TOBOOL,
    FUNCTION_SET_TODATETIME,
    FUNCTION_SET_TODOUBLE,
    FUNCTION_SET_TOINT,
    FUNCTION_SET_TOLONG,
    FUNCTION_SET_TOSTRING,
    FUNCTION_SET_TOTIMESPAN,
};
use datetime::{
    FUNCTION_SET_DAYOFMONTH,
    FUNCTION_SET_DAYOFWEEK,
    FUNCTION_SET_DAYOFYEAR,
    FUNCTION_SET_ENDOFDAY,
    FUNCTION_SET_ENDOFMONTH,
    FUNCTION_SET_ENDOFWEEK,
    FUNCTION_SET_ENDOFYEAR,
    FUNCTION_SET_STARTOFDAY,
    FUNCTION_SET_STARTOFMONTH,
    FUNCTION_SET_STARTOFWEEK,
    FUNCTION_SET_STARTOFYEAR,
};
use dynamic::{
    FUNCTION_SET_ARRAY_LENGTH,
    FUNCTION_SET_ARRAY_SORT_ASC,
    FUNCTION_SET_ARRAY_SORT_DESC,
    FUNCTION_SET_PARSE_JSON,
};
use geo::FUNCTION_SET_GEO_DISTANCE_2POINTS;
use logical::{FUNCTION_SET_AND, FUNCTION_SET_OR, FUNCTION_SET_NOT};
use negate::FUNCTION_SET_NEGATE;
use numeric::{
    FUNCTION_SET_ABS,
    FUNCTION_SET_BIN,
    FUNCTION_SET_EXP,
    FUNCTION_SET_EXP10,
    FUNCTION_SET_EXP2,
    FUNCTION_SET_LOG,
    FUNCTION_SET_LOG10,
    FUNCTION_SET_LOG2,
    FUNCTION_SET_POW,
    FUNCTION_SET_SQRT,
};
use string_ops::{
    FUNCTION_SET_CONTAINS,
    FUNCTION_SET_CONTAINS_CS,
    FUNCTION_SET_ENDSWITH,
    FUNCTION_SET_ENDSWITH_CS,
    FUNCTION_SET_MATCHES_REGEX,
    FUNCTION_SET_NOT_CONTAINS,
    FUNCTION_SET_NOT_CONTAINS_CS,
    FUNCTION_SET_STARTSWITH,
    FUNCTION_SET_STARTSWITH_CS,
};
use strings::{
    FUNCTION_SET_EXTRACT,
    FUNCTION_SET_REPLACE_STRING,
    FUNCTION_SET_STRCAT,
    FUNCTION_SET_STRLEN,
    FUNCTION_SET_SUBSTRING,
    FUNCTION_SET_TOLOWER,
    FUNCTION_SET_TOUPPER,
    FUNCTION_SET_URL_DECODE,
    FUNCTION_SET_URL_ENCODE_COMPONENT,
};

use crate::functions::function_set::ScalarFunctionSet;

pub const BUILTIN_SCALAR_FUNCTION_SETS: &[ScalarFunctionSet] = &[
    // Arith
    FUNCTION_SET_ADD,
    FUNCTION_SET_SUBTRACT,
    FUNCTION_SET_MULTIPLY,
    FUNCTION_SET_DIVIDE,
    FUNCTION_SET_MODULO,
    // Comparison
    FUNCTION_SET_EQ,
    FUNCTION_SET_NEQ,
    FUNCTION_SET_LT,
    FUNCTION_SET_LT_EQ,
    FUNCTION_SET_GT,
    FUNCTION_SET_GT_EQ,
    FUNCTION_SET_EQ_CI,
    FUNCTION_SET_NEQ_CI,
    // Conditional
    FUNCTION_SET_ISNULL,
    FUNCTION_SET_ISNOTNULL,
    FUNCTION_SET_ISEMPTY,
    FUNCTION_SET_ISNOTEMPTY,
    FUNCTION_SET_COALESCE,
    FUNCTION_SET_IFF,
    FUNCTION_SET_MIN_OF,
    FUNCTION_SET_MAX_OF,
    // Conversion
    FUNCTION_SET_TOSTRING,
    FUNCTION_SET_TOINT,
    FUNCTION_SET_TOLONG,
    FUNCTION_SET_TODOUBLE,
    FUNCTION_SET_TOBOOL,
    FUNCTION_SET_TODATETIME,
    FUNCTION_SET_TOTIMESPAN,
    // Datetime
    FUNCTION_SET_DAYOFWEEK,
    FUNCTION_SET_DAYOFMONTH,
    FUNCTION_SET_DAYOFYEAR,
    FUNCTION_SET_STARTOFDAY,
    FUNCTION_SET_ENDOFDAY,
    FUNCTION_SET_STARTOFWEEK,
    FUNCTION_SET_ENDOFWEEK,
    FUNCTION_SET_STARTOFMONTH,
    FUNCTION_SET_ENDOFMONTH,
    FUNCTION_SET_STARTOFYEAR,
    FUNCTION_SET_ENDOFYEAR,
    // Dynamic
    FUNCTION_SET_ARRAY_LENGTH,
    FUNCTION_SET_ARRAY_SORT_ASC,
    FUNCTION_SET_ARRAY_SORT_DESC,
    FUNCTION_SET_PARSE_JSON,
    // Geo
    FUNCTION_SET_GEO_DISTANCE_2POINTS,
    // Logical
    FUNCTION_SET_AND,
    FUNCTION_SET_OR,
    FUNCTION_SET_NOT,
    // Unary
    FUNCTION_SET_NEGATE,
    // Numeric
    FUNCTION_SET_BIN,
    FUNCTION_SET_ABS,
    FUNCTION_SET_LOG,
    FUNCTION_SET_LOG10,
    FUNCTION_SET_LOG2,
    FUNCTION_SET_EXP,
    FUNCTION_SET_EXP2,
    FUNCTION_SET_EXP10,
    FUNCTION_SET_SQRT,
    FUNCTION_SET_POW,
    // String operators
    FUNCTION_SET_CONTAINS,
    FUNCTION_SET_NOT_CONTAINS,
    FUNCTION_SET_CONTAINS_CS,
    FUNCTION_SET_NOT_CONTAINS_CS,
    FUNCTION_SET_STARTSWITH,
    FUNCTION_SET_STARTSWITH_CS,
    FUNCTION_SET_ENDSWITH,
    FUNCTION_SET_ENDSWITH_CS,
    FUNCTION_SET_MATCHES_REGEX,
    // String
    FUNCTION_SET_STRCAT,
    FUNCTION_SET_STRLEN,
    FUNCTION_SET_SUBSTRING,
    FUNCTION_SET_REPLACE_STRING,
    FUNCTION_SET_TOLOWER,
    FUNCTION_SET_TOUPPER,
    FUNCTION_SET_URL_ENCODE_COMPONENT,
    FUNCTION_SET_URL_DECODE,
    FUNCTION_SET_EXTRACT,
];
