use super::Signature;
use crate::arrays::datatype::{DataType, DataTypeId};

/// Score that should be used if no cast is needed.
pub const NO_CAST_SCORE: u32 = 800;

/// Return the score for implicitly casting from `have` to `want`.
///
/// Returns None if there's not a valid implicit cast. A higher score
/// indicates a more preferred cast. Only widening numeric casts are
/// implicit.
pub const fn implicit_cast_score(have: DataType, want: DataTypeId) -> Option<u32> {
    match (have, want) {
        (DataType::Int32, DataTypeId::Int64) => Some(target_score(want)),
        (DataType::Int32, DataTypeId::Float64) => Some(target_score(want)),
        (DataType::Int64, DataTypeId::Float64) => Some(target_score(want)),
        _ => None,
    }
}

/// More specific types get a higher target score.
const fn target_score(target: DataTypeId) -> u32 {
    match target {
        DataTypeId::Int32 => 171,
        DataTypeId::Int64 => 161,
        DataTypeId::Float64 => 141,
        _ => 100,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    /// Need to cast the type to this one.
    Cast { to: DataType, score: u32 },
    /// Casting isn't needed, the original data type works.
    NoCastNeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSignature {
    /// Index of the signature.
    pub signature_idx: usize,
    /// Casts that would need to be applied in order to satisfy the signature.
    pub casts: Vec<CastType>,
    /// Sum of the cast scores.
    pub score: u32,
}

impl CandidateSignature {
    /// Find candidate signatures for the given datatypes, sorted with the
    /// highest scoring candidate first.
    pub fn find_candidates<'a>(
        inputs: &[DataType],
        sigs: impl Iterator<Item = &'a Signature>,
    ) -> Vec<Self> {
        let mut candidates = Vec::new();
        let mut buf = Vec::new();

        for (idx, sig) in sigs.enumerate() {
            if !Self::compare_and_fill_types(inputs, sig, &mut buf) {
                continue;
            }

            let score = buf
                .iter()
                .map(|cast| match cast {
                    CastType::Cast { score, .. } => *score,
                    CastType::NoCastNeeded => NO_CAST_SCORE,
                })
                .sum();

            candidates.push(CandidateSignature {
                signature_idx: idx,
                casts: std::mem::take(&mut buf),
                score,
            })
        }

        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates
    }

    /// Compare the types we have with the types the signature wants, filling
    /// the provided buffer with the cast type.
    ///
    /// Returns true if everything is able to be implicitly cast.
    fn compare_and_fill_types(have: &[DataType], sig: &Signature, buf: &mut Vec<CastType>) -> bool {
        if !sig.accepts_arity(have.len()) {
            return false;
        }
        buf.clear();

        let any_type = sig.unify_any_args(have);

        for (idx, have) in have.iter().enumerate() {
            let want = match sig.arg_at(idx) {
                Some(DataTypeId::Any) => match any_type {
                    Some(datatype) => datatype.id(),
                    None => return false,
                },
                Some(want) => want,
                None => return false,
            };

            if have.id() == want {
                buf.push(CastType::NoCastNeeded);
                continue;
            }

            match (implicit_cast_score(*have, want), want.to_datatype()) {
                (Some(score), Some(to)) => buf.push(CastType::Cast { to, score }),
                _ => return false,
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_only() {
        assert!(implicit_cast_score(DataType::Int32, DataTypeId::Int64).is_some());
        assert!(implicit_cast_score(DataType::Int64, DataTypeId::Float64).is_some());
        assert!(implicit_cast_score(DataType::Float64, DataTypeId::Int64).is_none());
        assert!(implicit_cast_score(DataType::Utf8, DataTypeId::Int64).is_none());
    }

    #[test]
    fn prefers_closest_overload() {
        let sigs = [
            Signature::new(&[DataTypeId::Float64, DataTypeId::Float64], DataTypeId::Float64),
            Signature::new(&[DataTypeId::Int64, DataTypeId::Int64], DataTypeId::Int64),
        ];
        let candidates =
            CandidateSignature::find_candidates(&[DataType::Int32, DataType::Int64], sigs.iter());
        assert_eq!(2, candidates.len());
        assert_eq!(1, candidates[0].signature_idx);
        assert_eq!(
            CastType::Cast {
                to: DataType::Int64,
                score: 161
            },
            candidates[0].casts[0]
        );
    }

    #[test]
    fn any_args_unify() {
        let sigs = [Signature::new(
            &[DataTypeId::Any, DataTypeId::Any],
            DataTypeId::Any,
        )];
        let candidates =
            CandidateSignature::find_candidates(&[DataType::Float64, DataType::Int64], sigs.iter());
        assert_eq!(CastType::NoCastNeeded, candidates[0].casts[0]);
        assert_eq!(
            CastType::Cast {
                to: DataType::Float64,
                score: 141
            },
            candidates[0].casts[1]
        );
    }
}
