//! Validation errors produced while binding request parameters.
//!
//! Every failure carries the location of the offending value
//! (`["query", "q"]`, `["body", "price"]`, ...), the rule it broke and,
//! when one was supplied, the raw input.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// The coercion or constraint rule a value failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("Field required")]
    Missing,

    #[error("Input should be a valid integer, unable to parse string as an integer")]
    IntParsing,

    #[error("Input should be a valid number, unable to parse string as a number")]
    FloatParsing,

    #[error("Input should be a valid boolean, unable to interpret input")]
    BoolParsing,

    /// Value outside a closed set of literals.
    #[error("Input should be {}", expected_literals(.0))]
    Enum(&'static [&'static str]),

    #[error("Input should be a valid string")]
    StringType,

    #[error("Input should be a valid number")]
    FloatType,

    #[error("Input should be a valid integer")]
    IntType,

    #[error("Input should be a valid boolean")]
    BoolType,

    #[error("String should have at least {0} characters")]
    StringTooShort(usize),

    #[error("String should have at most {0} characters")]
    StringTooLong(usize),

    #[error("String should match pattern '{0}'")]
    PatternMismatch(String),

    #[error("Input should be greater than {}", format_bound(.0))]
    GreaterThan(f64),

    #[error("Input should be greater than or equal to {}", format_bound(.0))]
    GreaterThanEqual(f64),

    #[error("Input should be less than {}", format_bound(.0))]
    LessThan(f64),

    #[error("Input should be less than or equal to {}", format_bound(.0))]
    LessThanEqual(f64),

    /// Raised by a custom validator; the message is reported verbatim.
    #[error("{0}")]
    Value(String),

    #[error("JSON decode error")]
    JsonInvalid,

    #[error("Input should be a valid dictionary or object to extract fields from")]
    ObjectType,
}

impl ErrorKind {
    /// Stable machine-readable code reported as `type`.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Missing => "missing",
            ErrorKind::IntParsing => "int_parsing",
            ErrorKind::FloatParsing => "float_parsing",
            ErrorKind::BoolParsing => "bool_parsing",
            ErrorKind::Enum(_) => "enum",
            ErrorKind::StringType => "string_type",
            ErrorKind::FloatType => "float_type",
            ErrorKind::IntType => "int_type",
            ErrorKind::BoolType => "bool_type",
            ErrorKind::StringTooShort(_) => "string_too_short",
            ErrorKind::StringTooLong(_) => "string_too_long",
            ErrorKind::PatternMismatch(_) => "string_pattern_mismatch",
            ErrorKind::GreaterThan(_) => "greater_than",
            ErrorKind::GreaterThanEqual(_) => "greater_than_equal",
            ErrorKind::LessThan(_) => "less_than",
            ErrorKind::LessThanEqual(_) => "less_than_equal",
            ErrorKind::Value(_) => "value_error",
            ErrorKind::JsonInvalid => "json_invalid",
            ErrorKind::ObjectType => "model_attributes_type",
        }
    }
}

/// `'a'`, `'a' or 'b'`, `'a', 'b' or 'c'`.
fn expected_literals(literals: &[&str]) -> String {
    let quoted: Vec<String> = literals.iter().map(|l| format!("'{l}'")).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Whole bounds print without a fractional part (`1`, not `1.0`).
fn format_bound(bound: &f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{}", *bound as i64)
    } else {
        bound.to_string()
    }
}

/// A single rejected value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}: {kind}", .loc.join("."))]
pub struct ValidationError {
    /// Source followed by the field path, e.g. `["path", "bumbum_id"]`.
    pub loc: Vec<String>,
    pub kind: ErrorKind,
    pub input: Option<Value>,
}

impl ValidationError {
    pub fn new(loc: Vec<String>, kind: ErrorKind, input: Option<Value>) -> Self {
        Self { loc, kind, input }
    }

    /// Render as one entry of the `detail` array.
    pub fn to_detail(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("type".into(), json!(self.kind.code()));
        entry.insert("loc".into(), json!(self.loc));
        entry.insert("msg".into(), json!(self.kind.to_string()));
        if let Some(input) = &self.input {
            entry.insert("input".into(), input.clone());
        }
        Value::Object(entry)
    }
}

/// All violations found for one request. Never empty.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Returns `None` when there is nothing to report.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `{"detail": [...]}` body returned to the client.
    pub fn to_body(&self) -> Value {
        json!({ "detail": self.0.iter().map(ValidationError::to_detail).collect::<Vec<_>>() })
    }
}
