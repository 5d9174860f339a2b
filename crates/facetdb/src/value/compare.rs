use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by index maintenance, uniques lists,
/// and fingerprint rendering.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// The numeric family (Int / Uint / Float64) shares one rank and compares
/// by magnitude, so mixed-variant numeric data still sorts deterministically.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = canonical_rank(left).cmp(&canonical_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

/// Stable rank used for cross-variant ordering.
///
/// Rank order is part of deterministic index behavior and must remain fixed.
#[must_use]
pub const fn canonical_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Uint(_) | Value::Float64(_) => 2,
        Value::Text(_) => 3,
        Value::Timestamp(_) => 4,
    }
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => numeric_cmp(left, right),
    }
}

// Cross-variant numeric comparison over the shared numeric rank.
//
// Integer pairs compare exactly through i128; any float operand routes the
// comparison through f64 (Float64 payloads are finite by construction).
fn numeric_cmp(left: &Value, right: &Value) -> Ordering {
    match (as_i128(left), as_i128(right)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => {
            let a = as_f64(left);
            let b = as_f64(right);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

fn as_i128(value: &Value) -> Option<i128> {
    match value {
        Value::Int(i) => Some(i128::from(*i)),
        Value::Uint(u) => Some(i128::from(*u)),
        _ => None,
    }
}

#[expect(clippy::cast_precision_loss)]
fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Uint(u) => *u as f64,
        Value::Float64(f) => f.get(),
        _ => 0.0,
    }
}
