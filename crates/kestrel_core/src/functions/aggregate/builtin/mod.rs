pub mod avg;
pub mod collect;
pub mod count;
pub mod dcount;
pub mod minmax;
pub mod percentile;
pub mod sum;
pub mod take_any;

use avg::{FUNCTION_SET_AVG, FUNCTION_SET_AVGIF};
use collect::{
    FUNCTION_SET_MAKE_LIST,
    FUNCTION_SET_MAKE_LIST_IF,
    FUNCTION_SET_MAKE_SET,
    FUNCTION_SET_MAKE_SET_IF,
};
use count::{FUNCTION_SET_COUNT, FUNCTION_SET_COUNTIF};
use dcount::{FUNCTION_SET_DCOUNT, FUNCTION_SET_DCOUNTIF};
use minmax::{FUNCTION_SET_MAX, FUNCTION_SET_MIN};
use percentile::FUNCTION_SET_PERCENTILE;
use sum::{FUNCTION_SET_SUM, FUNCTION_SET_SUMIF};
use take_any::FUNCTION_SET_TAKE_ANY;

use crate::functions::function_set::AggregateFunctionSet;

pub const BUILTIN_AGGREGATE_FUNCTION_SETS: &[AggregateFunctionSet] = &[
    // General purpose
    FUNCTION_SET_COUNT,
    FUNCTION_SET_COUNTIF,
    FUNCTION_SET_SUM,
    FUNCTION_SET_SUMIF,
    FUNCTION_SET_MIN,
    FUNCTION_SET_MAX,
    FUNCTION_SET_TAKE_ANY,
    // Statistical
    FUNCTION_SET_AVG,
    FUNCTION_SET_AVGIF,
    FUNCTION_SET_PERCENTILE,
    FUNCTION_SET_DCOUNT,
    FUNCTION_SET_DCOUNTIF,
    // Collection
    FUNCTION_SET_MAKE_SET,
    FUNCTION_SET_MAKE_SET_IF,
    FUNCTION_SET_MAKE_LIST,
    FUNCTION_SET_MAKE_LIST_IF,
];
