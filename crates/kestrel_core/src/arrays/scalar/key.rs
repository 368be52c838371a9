use std::hash::{Hash, Hasher};

use super::ScalarValue;

/// A row of values usable as a hash map key.
///
/// Nulls are equal to other nulls of the same kind. Floats compare by bit
/// pattern with all NaNs and both zeros folded together.
#[derive(Debug, Clone)]
pub struct RowKey(pub Vec<ScalarValue>);

impl RowKey {
    pub fn has_null(&self) -> bool {
        self.0.iter().any(|v| v.is_null())
    }
}

fn canonical_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

fn value_eq(a: &ScalarValue, b: &ScalarValue) -> bool {
    match (a, b) {
        (ScalarValue::Float64(a), ScalarValue::Float64(b)) => {
            a.map(canonical_f64_bits) == b.map(canonical_f64_bits)
        }
        (a, b) => a == b,
    }
}

fn hash_value<H: Hasher>(value: &ScalarValue, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        ScalarValue::Boolean(v) => v.hash(state),
        ScalarValue::Int32(v) => v.hash(state),
        ScalarValue::Int64(v) | ScalarValue::DateTime(v) | ScalarValue::TimeSpan(v) => {
            v.hash(state)
        }
        ScalarValue::Float64(v) => v.map(canonical_f64_bits).hash(state),
        ScalarValue::Utf8(v) => v.hash(state),
        ScalarValue::Dynamic(v) => v.to_string().hash(state),
    }
}

impl PartialEq for RowKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| value_eq(a, b))
    }
}

impl Eq for RowKey {}

impl Hash for RowKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.0 {
            hash_value(value, state);
        }
    }
}
