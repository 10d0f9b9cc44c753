//! Bound argument set handed to handlers.

use std::collections::HashMap;

use serde_json::{json, Map, Number, Value};
use thiserror::Error;

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Optional parameter that was not supplied and has no default.
    Absent,
    Int(i64),
    /// Integer outside the `i64` range, digits kept exactly.
    BigInt(Number),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<String>),
    Object(Map<String, Value>),
}

impl Bound {
    pub fn to_json(&self) -> Value {
        match self {
            Bound::Absent => Value::Null,
            Bound::Int(n) => json!(n),
            Bound::BigInt(n) => Value::Number(n.clone()),
            Bound::Float(n) => json!(n),
            Bound::Str(s) => json!(s),
            Bound::Bool(b) => json!(b),
            Bound::List(items) => json!(items),
            Bound::Object(map) => Value::Object(map.clone()),
        }
    }

    /// Numeric value for bound checks. Integers too long for `f64` saturate
    /// to the matching infinity.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bound::Int(n) => Some(*n as f64),
            Bound::Float(n) => Some(*n),
            Bound::BigInt(n) => Some(n.as_f64().unwrap_or_else(|| {
                if is_negative(n) {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            })),
            _ => None,
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            Bound::Absent => "absent",
            Bound::Int(_) | Bound::BigInt(_) => "integer",
            Bound::Float(_) => "number",
            Bound::Str(_) => "string",
            Bound::Bool(_) => "boolean",
            Bound::List(_) => "array",
            Bound::Object(_) => "object",
        }
    }
}

fn is_negative(n: &Number) -> bool {
    n.to_string().starts_with('-')
}

/// A handler asked for an argument its route does not bind that way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("argument `{0}` is not declared on this route")]
    Undeclared(String),

    #[error("argument `{name}` is bound as {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("argument `{0}` does not fit in a 64-bit integer")]
    OutOfRange(String),
}

/// Values produced by a successful bind, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: HashMap<&'static str, Bound>,
}

impl BoundArgs {
    pub fn insert(&mut self, name: &'static str, value: Bound) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Bound> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&Bound, ArgumentError> {
        self.values
            .get(name)
            .ok_or_else(|| ArgumentError::Undeclared(name.to_string()))
    }

    fn mismatch(name: &str, expected: &'static str, actual: &Bound) -> ArgumentError {
        ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected,
            actual: actual.variant(),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, ArgumentError> {
        match self.lookup(name)? {
            Bound::Int(n) => Ok(*n),
            Bound::BigInt(_) => Err(ArgumentError::OutOfRange(name.to_string())),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    /// Integer clamped to `i64::MIN..=i64::MAX`.
    pub fn int_saturating(&self, name: &str) -> Result<i64, ArgumentError> {
        match self.lookup(name)? {
            Bound::Int(n) => Ok(*n),
            Bound::BigInt(n) if is_negative(n) => Ok(i64::MIN),
            Bound::BigInt(_) => Ok(i64::MAX),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    /// Integer of any magnitude, for echoing back unchanged.
    pub fn integer(&self, name: &str) -> Result<Number, ArgumentError> {
        match self.lookup(name)? {
            Bound::Int(n) => Ok(Number::from(*n)),
            Bound::BigInt(n) => Ok(n.clone()),
            other => Err(Self::mismatch(name, "integer", other)),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64, ArgumentError> {
        let value = self.lookup(name)?;
        value
            .as_f64()
            .ok_or_else(|| Self::mismatch(name, "number", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool, ArgumentError> {
        match self.lookup(name)? {
            Bound::Bool(b) => Ok(*b),
            other => Err(Self::mismatch(name, "boolean", other)),
        }
    }

    pub fn str(&self, name: &str) -> Result<&str, ArgumentError> {
        match self.lookup(name)? {
            Bound::Str(s) => Ok(s),
            other => Err(Self::mismatch(name, "string", other)),
        }
    }

    /// `None` when the parameter was optional and not supplied.
    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, ArgumentError> {
        match self.lookup(name)? {
            Bound::Absent => Ok(None),
            Bound::Str(s) => Ok(Some(s)),
            other => Err(Self::mismatch(name, "string", other)),
        }
    }

    pub fn opt_list(&self, name: &str) -> Result<Option<&[String]>, ArgumentError> {
        match self.lookup(name)? {
            Bound::Absent => Ok(None),
            Bound::List(items) => Ok(Some(items)),
            other => Err(Self::mismatch(name, "array", other)),
        }
    }

    pub fn object(&self, name: &str) -> Result<&Map<String, Value>, ArgumentError> {
        match self.lookup(name)? {
            Bound::Object(map) => Ok(map),
            other => Err(Self::mismatch(name, "object", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut args = BoundArgs::default();
        args.insert("id", Bound::Int(7));
        args.insert("q", Bound::Absent);
        args.insert("short", Bound::Bool(true));

        assert_eq!(args.int("id"), Ok(7));
        assert_eq!(args.float("id"), Ok(7.0));
        assert_eq!(args.opt_str("q"), Ok(None));
        assert_eq!(args.bool("short"), Ok(true));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_accessor_errors() {
        let mut args = BoundArgs::default();
        args.insert("id", Bound::Str("7".into()));

        assert_eq!(
            args.int("id"),
            Err(ArgumentError::TypeMismatch {
                name: "id".into(),
                expected: "integer",
                actual: "string",
            })
        );
        assert_eq!(args.str("missing"), Err(ArgumentError::Undeclared("missing".into())));
    }

    #[test]
    fn test_big_integers_keep_their_digits() {
        let huge: Number = serde_json::from_str("123456789012345678901234567890").unwrap();
        let negative: Number = serde_json::from_str("-99999999999999999999").unwrap();
        let mut args = BoundArgs::default();
        args.insert("id", Bound::BigInt(huge.clone()));
        args.insert("skip", Bound::BigInt(negative));
        args.insert("small", Bound::Int(3));

        assert_eq!(args.integer("id"), Ok(huge.clone()));
        assert_eq!(args.integer("small"), Ok(Number::from(3)));
        assert_eq!(Bound::BigInt(huge).to_json().to_string(), "123456789012345678901234567890");
        assert_eq!(args.int("id"), Err(ArgumentError::OutOfRange("id".into())));
        assert_eq!(args.int_saturating("id"), Ok(i64::MAX));
        assert_eq!(args.int_saturating("skip"), Ok(i64::MIN));
        assert!(args.float("id").unwrap() > 1e29);
    }
}
