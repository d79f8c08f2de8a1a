//! Core value types for datasets.
//!
//! Cells are dynamically typed [`Value`]s. A [`Row`] is a fixed-length sequence of values
//! aligned with the column indices of a [`crate::header::ColumnCatalog`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One row of a dataset, positionally aligned with the header.
pub type Row = Vec<Value>;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value. Empty cells are normalized to this before coercion.
    Undefined,
    /// 64-bit float. Label-encoded cells hold their code here.
    Number(f64),
    /// Signed integer produced by the `bigint` coercer.
    BigInt(i128),
    /// Boolean.
    Bool(bool),
    /// Parsed JSON produced by the `object` coercer.
    Object(serde_json::Value),
    /// UTF-8 string. Raw cells start out as this variant.
    Utf8(String),
}

impl Value {
    /// Returns `true` for [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Numeric view of numbers, bigints and booleans.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::BigInt(i) => Some(*i as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Returns the string slice of a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// JavaScript-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(i) => *i != 0,
            Value::Bool(b) => *b,
            Value::Object(_) => true,
            Value::Utf8(s) => !s.is_empty(),
        }
    }

    /// `Object.is` equality: `NaN` matches `NaN`, `0.0` does not match `-0.0`.
    ///
    /// JSON objects compare structurally.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            _ => self == other,
        }
    }

    /// SameValueZero equality: like [`Value::same_value`], but `0.0` matches `-0.0`.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) | Value::Number(_) | Value::BigInt(_) => 0,
            Value::Utf8(_) => 1,
            Value::Object(_) => 2,
            Value::Undefined => 3,
        }
    }
}

/// Ascending order used by default sorts.
///
/// Numbers, bigints and booleans compare numerically with `NaN` after every other number.
/// A bigint and a number compare exactly, without rounding the bigint to `f64`.
/// Strings compare lexicographically. Different kinds order as numeric < string < object,
/// and [`Value::Undefined`] always sorts last. Objects are mutually equal.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Utf8(x), Value::Utf8(y)) => x.cmp(y),
        _ => match (Numeric::of(a), Numeric::of(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => a.kind_rank().cmp(&b.kind_rank()),
        },
    }
}

#[derive(Clone, Copy)]
enum Numeric {
    Int(i128),
    Float(f64),
}

impl Numeric {
    fn of(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => Some(Numeric::Float(*n)),
            Value::BigInt(i) => Some(Numeric::Int(*i)),
            Value::Bool(b) => Some(Numeric::Int(i128::from(*b))),
            _ => None,
        }
    }

    fn cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Numeric::Int(x), Numeric::Int(y)) => x.cmp(&y),
            (Numeric::Float(x), Numeric::Float(y)) => match (x.is_nan(), y.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            },
            (Numeric::Int(x), Numeric::Float(y)) => cmp_int_float(x, y),
            (Numeric::Float(x), Numeric::Int(y)) => cmp_int_float(y, x).reverse(),
        }
    }
}

/// Exact `i128` vs `f64` comparison. `NaN` sorts after every integer.
fn cmp_int_float(i: i128, f: f64) -> Ordering {
    // 2^127, exactly representable
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if f.is_nan() {
        return Ordering::Less;
    }
    let whole = f.trunc();
    if whole >= LIMIT {
        return Ordering::Less;
    }
    if whole < -LIMIT {
        return Ordering::Greater;
    }
    // `whole` is integral and in range, so the cast is exact
    match i.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&f.fract()).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Number(n) => fmt_number(*n, f),
            Value::BigInt(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Object(serde_json::Value::String(s)) => f.write_str(s),
            Value::Object(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // -0 prints as 0
        f.write_str("0")
    } else {
        write!(f, "{n}")
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Hashable wrapper around a [`Value`] using SameValueZero equality.
///
/// Used as the bucket key of group-by trees and as the lookup key of label encoders.
#[derive(Debug, Clone)]
pub struct ValueKey(Value);

impl ValueKey {
    /// Wrap a value as a hash key.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The wrapped value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ValueKey {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_value_zero(&other.0)
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Undefined => {}
            Value::Number(n) => {
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0u64
                } else {
                    n.to_bits()
                };
                bits.hash(state);
            }
            Value::BigInt(i) => i.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Object(v) => v.to_string().hash(state),
            Value::Utf8(s) => s.hash(state),
        }
    }
}
