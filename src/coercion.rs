//! Type coercion for raw cells.
//!
//! A [`TypeSpec`] names how a column's raw text becomes a typed [`Value`]; [`parse_type`]
//! turns it into a [`Coercer`]. Built-in coercers first normalize an empty string to
//! [`Value::Undefined`].
//!
//! `number` and `boolean` never fail. `bigint`, `object` and custom coercers can.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::types::Value;

/// A conversion from a cell value to a typed value.
///
/// Errors are plain messages; callers attach row/column context.
pub type Coercer = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Column type tag.
///
/// Deserializes from the lowercase tag names (`"number"`, `"bigint"`, ...).
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSpec {
    /// Numeric parse; unparseable text becomes `NaN`.
    Number,
    /// Integer parse into an `i128`.
    BigInt,
    /// `"true"`/`"false"` literals, then numeric truthiness, then string truthiness.
    Boolean,
    /// JSON parse.
    Object,
    /// String conversion; absent values become `"undefined"`.
    String,
    /// Keep the value as is (after empty-string normalization).
    #[default]
    Identity,
    /// User-supplied conversion, applied without normalization.
    #[serde(skip)]
    Custom(Coercer),
}

impl TypeSpec {
    /// Wrap a fallible conversion.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Wrap an infallible conversion.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(move |v| Ok(f(v))))
    }

    /// Tag name, as accepted by deserialization.
    pub fn name(&self) -> &'static str {
        match self {
            TypeSpec::Number => "number",
            TypeSpec::BigInt => "bigint",
            TypeSpec::Boolean => "boolean",
            TypeSpec::Object => "object",
            TypeSpec::String => "string",
            TypeSpec::Identity => "identity",
            TypeSpec::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSpec({})", self.name())
    }
}

/// Build the coercer for a type tag.
pub fn parse_type(spec: &TypeSpec) -> Coercer {
    match spec {
        TypeSpec::Custom(f) => Arc::clone(f),
        TypeSpec::Number => Arc::new(|v| Ok(Value::Number(present(v).map_or(f64::NAN, to_number)))),
        TypeSpec::BigInt => Arc::new(|v| to_bigint(present(v)).map(Value::BigInt)),
        TypeSpec::Boolean => Arc::new(|v| Ok(Value::Bool(present(v).is_some_and(to_boolean)))),
        TypeSpec::Object => Arc::new(|v| match present(v) {
            None => Err("cannot parse undefined as JSON".to_string()),
            Some(Value::Object(o)) => Ok(Value::Object(o.clone())),
            Some(other) => serde_json::from_str::<serde_json::Value>(&other.to_string())
                .map(Value::Object)
                .map_err(|e| e.to_string()),
        }),
        TypeSpec::String => Arc::new(|v| {
            Ok(Value::Utf8(
                present(v).map_or_else(|| "undefined".to_string(), |v| v.to_string()),
            ))
        }),
        TypeSpec::Identity => Arc::new(|v| Ok(present(v).cloned().unwrap_or(Value::Undefined))),
    }
}

/// Empty strings and `Undefined` are absent.
fn present(v: &Value) -> Option<&Value> {
    match v {
        Value::Undefined => None,
        Value::Utf8(s) if s.is_empty() => None,
        other => Some(other),
    }
}

fn to_number(v: &Value) -> f64 {
    match v {
        Value::Undefined => f64::NAN,
        Value::Utf8(s) => parse_js_number(s),
        Value::Object(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Value::Object(serde_json::Value::String(s)) => parse_js_number(s),
        Value::Object(serde_json::Value::Bool(b)) => f64::from(u8::from(*b)),
        Value::Object(serde_json::Value::Null) => 0.0,
        Value::Object(_) => f64::NAN,
        other => other.as_f64().unwrap_or(f64::NAN),
    }
}

/// Numeric parse with JavaScript `Number()` rules.
///
/// Surrounding whitespace is ignored, blank text is `0`, `Infinity` and the `0x`/`0o`/`0b`
/// prefixes are recognized, and anything else that is not a decimal literal is `NaN`.
pub fn parse_js_number(raw: &str) -> f64 {
    let s = raw.trim();
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some((radix, digits)) = split_radix_prefix(s) {
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return u128::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
    }

    let decimal_chars = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal_chars {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn split_radix_prefix(s: &str) -> Option<(u32, &str)> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &s[2..]))
}

fn to_bigint(v: Option<&Value>) -> Result<i128, String> {
    match v {
        None | Some(Value::Undefined) => Err("cannot convert undefined to a bigint".to_string()),
        Some(Value::BigInt(i)) => Ok(*i),
        Some(Value::Bool(b)) => Ok(i128::from(*b)),
        Some(Value::Number(n)) => {
            if n.is_finite() && n.fract() == 0.0 && n.abs() < i128::MAX as f64 {
                Ok(*n as i128)
            } else {
                Err(format!(
                    "the number {} cannot be converted to a bigint because it is not an integer",
                    Value::Number(*n)
                ))
            }
        }
        Some(Value::Utf8(s)) => parse_bigint_text(s),
        Some(Value::Object(serde_json::Value::String(s))) => parse_bigint_text(s),
        Some(Value::Object(o)) => Err(format!("cannot convert {o} to a bigint")),
    }
}

fn parse_bigint_text(raw: &str) -> Result<i128, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0);
    }
    let parsed = match split_radix_prefix(s) {
        Some((radix, digits)) if !digits.starts_with(['+', '-']) => {
            i128::from_str_radix(digits, radix).ok()
        }
        Some(_) => None,
        None => s.parse::<i128>().ok(),
    };
    parsed.ok_or_else(|| format!("cannot convert {s} to a bigint"))
}

fn to_boolean(v: &Value) -> bool {
    if let Value::Utf8(s) = v {
        let t = s.trim();
        if t.eq_ignore_ascii_case("true") {
            return true;
        }
        if t.eq_ignore_ascii_case("false") {
            return false;
        }
    }
    let n = to_number(v);
    if n.is_nan() { v.is_truthy() } else { n != 0.0 }
}

#[cfg(test)]
mod tests {
    use super::{parse_js_number, parse_type, TypeSpec};
    use crate::types::Value;
    use proptest::prelude::*;

    fn coerce(spec: TypeSpec, raw: &str) -> Result<Value, String> {
        parse_type(&spec)(&Value::from(raw))
    }

    #[test]
    fn number_parses_or_degrades_to_nan() {
        assert_eq!(coerce(TypeSpec::Number, "42").unwrap(), Value::Number(42.0));
        assert_eq!(coerce(TypeSpec::Number, " -1.5e2 ").unwrap(), Value::Number(-150.0));
        assert_eq!(coerce(TypeSpec::Number, "0x1F").unwrap(), Value::Number(31.0));
        assert!(matches!(coerce(TypeSpec::Number, "abc").unwrap(), Value::Number(n) if n.is_nan()));
        assert!(matches!(coerce(TypeSpec::Number, "").unwrap(), Value::Number(n) if n.is_nan()));
        assert!(matches!(coerce(TypeSpec::Number, "inf").unwrap(), Value::Number(n) if n.is_nan()));
        assert_eq!(parse_js_number("Infinity"), f64::INFINITY);
    }

    #[test]
    fn bigint_accepts_integers_and_rejects_the_rest() {
        assert_eq!(coerce(TypeSpec::BigInt, "123456789012345678901234").unwrap(), Value::BigInt(123456789012345678901234));
        assert_eq!(coerce(TypeSpec::BigInt, "-7").unwrap(), Value::BigInt(-7));
        assert!(coerce(TypeSpec::BigInt, "1.5").is_err());
        assert!(coerce(TypeSpec::BigInt, "").is_err());
        let c = parse_type(&TypeSpec::BigInt);
        assert_eq!(c(&Value::Number(3.0)).unwrap(), Value::BigInt(3));
        assert!(c(&Value::Number(f64::NAN)).is_err());
    }

    #[test]
    fn boolean_reads_literals_numbers_then_truthiness() {
        assert_eq!(coerce(TypeSpec::Boolean, "true").unwrap(), Value::Bool(true));
        assert_eq!(coerce(TypeSpec::Boolean, "FALSE").unwrap(), Value::Bool(false));
        assert_eq!(coerce(TypeSpec::Boolean, "0").unwrap(), Value::Bool(false));
        assert_eq!(coerce(TypeSpec::Boolean, "2").unwrap(), Value::Bool(true));
        assert_eq!(coerce(TypeSpec::Boolean, "no").unwrap(), Value::Bool(true));
        assert_eq!(coerce(TypeSpec::Boolean, "").unwrap(), Value::Bool(false));
    }

    #[test]
    fn object_parses_json() {
        assert_eq!(
            coerce(TypeSpec::Object, r#"{"k":[1,2]}"#).unwrap(),
            Value::Object(serde_json::json!({"k": [1, 2]}))
        );
        assert!(coerce(TypeSpec::Object, "{not json").is_err());
        assert!(coerce(TypeSpec::Object, "").is_err());
    }

    #[test]
    fn string_and_identity_normalize_empty_cells() {
        assert_eq!(coerce(TypeSpec::String, "").unwrap(), Value::from("undefined"));
        assert_eq!(
            parse_type(&TypeSpec::String)(&Value::Number(2.0)).unwrap(),
            Value::from("2")
        );
        assert_eq!(coerce(TypeSpec::Identity, "").unwrap(), Value::Undefined);
        assert_eq!(coerce(TypeSpec::Identity, "x").unwrap(), Value::from("x"));
    }

    #[test]
    fn custom_coercer_is_used_verbatim() {
        let spec = TypeSpec::from_fn(|v| Value::Utf8(format!("<{v}>")));
        assert_eq!(coerce(spec, "").unwrap(), Value::from("<>"));
    }

    #[test]
    fn type_spec_deserializes_from_tag_names() {
        let specs: Vec<TypeSpec> =
            serde_json::from_str(r#"["number","bigint","boolean","object","string","identity"]"#).unwrap();
        let names: Vec<&str> = specs.iter().map(TypeSpec::name).collect();
        assert_eq!(names, vec!["number", "bigint", "boolean", "object", "string", "identity"]);
        assert!(serde_json::from_str::<TypeSpec>(r#""custom""#).is_err());
    }

    proptest! {
        #[test]
        fn number_coercion_is_total(s in ".*") {
            prop_assert!(matches!(coerce(TypeSpec::Number, &s), Ok(Value::Number(_))));
        }

        #[test]
        fn boolean_coercion_is_total(s in ".*") {
            prop_assert!(matches!(coerce(TypeSpec::Boolean, &s), Ok(Value::Bool(_))));
        }
    }
}
