pub mod row_cumsum;
pub mod row_number;

use row_cumsum::FUNCTION_SET_ROW_CUMSUM;
use row_number::FUNCTION_SET_ROW_NUMBER;

use crate::functions::function_set::WindowFunctionSet;

pub const BUILTIN_WINDOW_FUNCTION_SETS: &[WindowFunctionSet] =
    &[FUNCTION_SET_ROW_CUMSUM, FUNCTION_SET_ROW_NUMBER];
