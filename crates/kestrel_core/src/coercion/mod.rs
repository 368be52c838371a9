//! Type promotion and schema reconciliation.

pub mod schema;

use crate::arrays::datatype::DataType;

/// Position of a numeric type in the promotion order, None for non-numeric
/// types.
pub const fn numeric_rank(datatype: DataType) -> Option<u8> {
    match datatype {
        DataType::Int32 => Some(0),
        DataType::Int64 => Some(1),
        DataType::Float64 => Some(2),
        _ => None,
    }
}

/// The widest of two numeric types.
pub fn promote_numeric(a: DataType, b: DataType) -> Option<DataType> {
    let (rank_a, rank_b) = (numeric_rank(a)?, numeric_rank(b)?);
    Some(if rank_a >= rank_b { a } else { b })
}

/// A type both inputs can be implicitly cast to.
pub fn common_supertype(a: DataType, b: DataType) -> Option<DataType> {
    if a == b {
        return Some(a);
    }
    promote_numeric(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion() {
        let test_cases = [
            (DataType::Int32, DataType::Int64, Some(DataType::Int64)),
            (DataType::Int64, DataType::Float64, Some(DataType::Float64)),
            (DataType::Int32, DataType::Int32, Some(DataType::Int32)),
            (DataType::Utf8, DataType::Utf8, Some(DataType::Utf8)),
            (DataType::Utf8, DataType::Int64, None),
            (DataType::DateTime, DataType::TimeSpan, None),
        ];

        for case in test_cases {
            assert_eq!(case.2, common_supertype(case.0, case.1), "case: {case:?}");
        }
    }
}
