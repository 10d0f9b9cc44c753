//! Type coercion from raw request text and JSON values.

use serde_json::{Number, Value};

use crate::binding::args::Bound;
use crate::binding::error::ErrorKind;
use crate::binding::spec::ParamKind;

const TRUE_LITERALS: [&str; 4] = ["true", "1", "on", "yes"];
const FALSE_LITERALS: [&str; 4] = ["false", "0", "off", "no"];

/// Coerce a single path segment or query value.
pub fn coerce_text(kind: ParamKind, raw: &str) -> Result<Bound, ErrorKind> {
    match kind {
        ParamKind::Integer => parse_integer(raw),
        ParamKind::Float => parse_float(raw).map(Bound::Float),
        ParamKind::Str => Ok(Bound::Str(raw.to_string())),
        ParamKind::Bool => parse_bool(raw).map(Bound::Bool),
        ParamKind::Enum(literals) => parse_enum(literals, raw).map(|v| Bound::Str(v.to_string())),
        ParamKind::StrList => Ok(Bound::List(vec![raw.to_string()])),
        ParamKind::Object(_) => Err(ErrorKind::ObjectType),
    }
}

pub fn parse_int(raw: &str) -> Result<i64, ErrorKind> {
    raw.parse::<i64>().map_err(|_| ErrorKind::IntParsing)
}

/// Any optionally signed run of ASCII digits. Values past the `i64` range
/// become `Bound::BigInt` with leading zeros and `+` dropped.
pub fn parse_integer(raw: &str) -> Result<Bound, ErrorKind> {
    if let Ok(n) = parse_int(raw) {
        return Ok(Bound::Int(n));
    }
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => ("-", &raw[1..]),
        Some(b'+') => ("", &raw[1..]),
        _ => ("", raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorKind::IntParsing);
    }
    let literal = format!("{sign}{}", digits.trim_start_matches('0'));
    serde_json::from_str::<Number>(&literal)
        .map(Bound::BigInt)
        .map_err(|_| ErrorKind::IntParsing)
}

pub fn parse_float(raw: &str) -> Result<f64, ErrorKind> {
    raw.parse::<f64>().map_err(|_| ErrorKind::FloatParsing)
}

/// Case-insensitive `true/1/on/yes` and `false/0/off/no`; nothing else.
pub fn parse_bool(raw: &str) -> Result<bool, ErrorKind> {
    let lowered = raw.to_ascii_lowercase();
    if TRUE_LITERALS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_LITERALS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(ErrorKind::BoolParsing)
    }
}

pub fn parse_enum(literals: &'static [&'static str], raw: &str) -> Result<&'static str, ErrorKind> {
    literals
        .iter()
        .copied()
        .find(|literal| *literal == raw)
        .ok_or(ErrorKind::Enum(literals))
}

/// Coerce one field of a JSON body. Types are strict: a number is never
/// accepted as a string and vice versa. Integers are accepted where a
/// float is expected.
pub fn coerce_json(kind: ParamKind, value: &Value) -> Result<Value, ErrorKind> {
    match (kind, value) {
        (ParamKind::Str, Value::String(_)) => Ok(value.clone()),
        (ParamKind::Str, _) => Err(ErrorKind::StringType),
        (ParamKind::Float, Value::Number(n)) => n
            .as_f64()
            .map(Value::from)
            .ok_or(ErrorKind::FloatType),
        (ParamKind::Float, _) => Err(ErrorKind::FloatType),
        (ParamKind::Integer, Value::Number(n)) if n.is_i64() => Ok(value.clone()),
        (ParamKind::Integer, _) => Err(ErrorKind::IntType),
        (ParamKind::Bool, Value::Bool(_)) => Ok(value.clone()),
        (ParamKind::Bool, _) => Err(ErrorKind::BoolType),
        (ParamKind::Enum(literals), Value::String(s)) => {
            parse_enum(literals, s).map(|_| value.clone())
        }
        (ParamKind::Enum(literals), _) => Err(ErrorKind::Enum(literals)),
        (ParamKind::StrList, Value::Array(items)) if items.iter().all(Value::is_string) => {
            Ok(value.clone())
        }
        (ParamKind::StrList, _) => Err(ErrorKind::StringType),
        (ParamKind::Object(_), Value::Object(_)) => Ok(value.clone()),
        (ParamKind::Object(_), _) => Err(ErrorKind::ObjectType),
    }
}
