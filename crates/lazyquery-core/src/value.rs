use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMode {
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// Float64
///
/// Total-order wrapper for `f64` so `Value` stays `Eq`/`Ord`.
/// Ordering follows IEEE 754 `total_cmp`; NaN sorts above all numbers.
///

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Float64(pub f64);

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Float64 {}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Float64 {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

///
/// Value
///
/// Untyped field value carried by filter clauses and records.
///
/// Null → the field's value is absent-but-present (SQL NULL).
/// Unit → internal placeholder for value-less clauses; not a real value.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Float(Float64),
    Int(i64),
    /// Ordered list of values. List order is preserved.
    List(Vec<Self>),
    Null,
    Text(String),
    Uint(u64),
    Unit,
}

///
/// NumericRepr
///

enum NumericRepr {
    Int(i128),
    Float(f64),
}

impl Value {
    /// Canonical variant rank used for mixed-variant ordering.
    /// Mixed-variant comparisons are rank-only and must remain deterministic.
    #[must_use]
    pub const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Uint(_) => 3,
            Self::Float(_) => 4,
            Self::Text(_) => 5,
            Self::List(_) => 6,
            Self::Unit => 7,
        }
    }

    const fn numeric(&self) -> Option<NumericRepr> {
        match self {
            Self::Int(v) => Some(NumericRepr::Int(*v as i128)),
            Self::Uint(v) => Some(NumericRepr::Int(*v as i128)),
            Self::Float(v) => Some(NumericRepr::Float(v.0)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Substring check between two text values.
    /// Returns `None` when either side is not text.
    #[must_use]
    pub fn text_contains(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        text_op(self, needle, mode, |hay, needle| hay.contains(needle))
    }

    /// Prefix check between two text values.
    #[must_use]
    pub fn text_starts_with(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        text_op(self, needle, mode, |hay, needle| hay.starts_with(needle))
    }

    /// Suffix check between two text values.
    #[must_use]
    pub fn text_ends_with(&self, needle: &Self, mode: TextMode) -> Option<bool> {
        text_op(self, needle, mode, |hay, needle| hay.ends_with(needle))
    }
}

fn text_op(
    hay: &Value,
    needle: &Value,
    mode: TextMode,
    op: impl FnOnce(&str, &str) -> bool,
) -> Option<bool> {
    let hay = hay.as_text()?;
    let needle = needle.as_text()?;

    match mode {
        TextMode::Cs => Some(op(hay, needle)),
        TextMode::Ci => Some(op(&hay.to_lowercase(), &needle.to_lowercase())),
    }
}

/// Equality under predicate semantics.
///
/// Same-variant values compare directly; numeric variants compare by value
/// across `Int`/`Uint`/`Float`. Returns `None` when the comparison is not
/// defined (mismatched non-numeric variants).
#[must_use]
pub fn compare_eq(left: &Value, right: &Value) -> Option<bool> {
    compare_order(left, right).map(Ordering::is_eq).or_else(|| {
        // non-orderable same-variant values still support equality
        match (left, right) {
            (Value::List(a), Value::List(b)) => Some(a == b),
            (Value::Null, Value::Null) | (Value::Unit, Value::Unit) => Some(true),
            _ => None,
        }
    })
}

/// Ordering under predicate semantics.
///
/// Returns `None` for mismatched or non-orderable variants. Numeric variants
/// order by value across `Int`/`Uint`/`Float`; NaN comparisons are undefined.
#[must_use]
pub fn compare_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => match (left.numeric()?, right.numeric()?) {
            (NumericRepr::Int(a), NumericRepr::Int(b)) => Some(a.cmp(&b)),
            #[allow(clippy::cast_precision_loss)]
            (NumericRepr::Int(a), NumericRepr::Float(b)) => (a as f64).partial_cmp(&b),
            #[allow(clippy::cast_precision_loss)]
            (NumericRepr::Float(a), NumericRepr::Int(b)) => a.partial_cmp(&(b as f64)),
            (NumericRepr::Float(a), NumericRepr::Float(b)) => a.partial_cmp(&b),
        },
    }
}

/// Total canonical comparator used by sort application.
///
/// Ordering rules:
/// 1. Canonical variant rank (numeric variants share a comparison via value)
/// 2. Variant-specific comparison for same-ranked values
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    // numeric variants interleave by value, with rank as tie-break
    if let (Some(a), Some(b)) = (left.numeric(), right.numeric()) {
        let cmp = match (a, b) {
            (NumericRepr::Int(a), NumericRepr::Int(b)) => a.cmp(&b),
            #[allow(clippy::cast_precision_loss)]
            (NumericRepr::Int(a), NumericRepr::Float(b)) => (a as f64).total_cmp(&b),
            #[allow(clippy::cast_precision_loss)]
            (NumericRepr::Float(a), NumericRepr::Int(b)) => a.total_cmp(&(b as f64)),
            (NumericRepr::Float(a), NumericRepr::Float(b)) => a.total_cmp(&b),
        };

        return cmp.then_with(|| left.canonical_rank().cmp(&right.canonical_rank()));
    }

    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_list(a, b),
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_equality_crosses_variants() {
        assert_eq!(compare_eq(&Value::Int(3), &Value::Uint(3)), Some(true));
        assert_eq!(
            compare_eq(&Value::Uint(3), &Value::Float(3.0.into())),
            Some(true)
        );
        assert_eq!(compare_eq(&Value::Int(3), &Value::Int(4)), Some(false));
    }

    #[test]
    fn mismatched_variants_are_undefined() {
        assert_eq!(compare_eq(&Value::Int(1), &Value::Text("1".into())), None);
        assert_eq!(
            compare_order(&Value::Bool(true), &Value::Text("x".into())),
            None
        );
    }

    #[test]
    fn text_ops_honor_mode() {
        let hay = Value::Text("Brittany".into());
        let needle = Value::Text("brit".into());

        assert_eq!(hay.text_starts_with(&needle, TextMode::Cs), Some(false));
        assert_eq!(hay.text_starts_with(&needle, TextMode::Ci), Some(true));
        assert_eq!(hay.text_contains(&Value::Int(1), TextMode::Cs), None);
    }

    #[test]
    fn canonical_cmp_is_total_over_mixed_variants() {
        let null = Value::Null;
        let int = Value::Int(5);
        let text = Value::Text("a".into());

        assert_eq!(canonical_cmp(&null, &int), Ordering::Less);
        assert_eq!(canonical_cmp(&int, &text), Ordering::Less);
        assert_eq!(canonical_cmp(&Value::Uint(4), &Value::Int(5)), Ordering::Less);
    }
}
