//! Declarative parameter specifications.
//!
//! A route declares its inputs as an ordered list of [`ParamSpec`]s. The
//! binder walks that list for every request; nothing about a parameter is
//! inferred from the handler itself.

use std::fmt;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::binding::args::Bound;

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    Path,
    Query,
    Body,
}

impl ParamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamSource::Path => "path",
            ParamSource::Query => "query",
            ParamSource::Body => "body",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type a raw value is coerced into.
#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    Integer,
    Float,
    Str,
    Bool,
    /// Closed set of string literals, in declared order.
    Enum(&'static [&'static str]),
    /// Every occurrence of a repeated query key.
    StrList,
    /// JSON object validated field by field.
    Object(&'static ObjectSchema),
}

impl ParamKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Float => "number",
            ParamKind::Str => "string",
            ParamKind::Bool => "boolean",
            ParamKind::Enum(_) => "enum",
            ParamKind::StrList => "array",
            ParamKind::Object(_) => "object",
        }
    }
}

/// Shape of a structured JSON body.
#[derive(Debug)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ObjectSchema {
    pub fn describe(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| json!({ "name": f.name, "type": f.kind.type_name(), "required": f.required }))
            .collect();
        json!({ "name": self.name, "fields": fields })
    }
}

/// One field of an [`ObjectSchema`].
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: true }
    }

    /// Optional fields also accept an explicit JSON `null`.
    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// Application-level check run after coercion. `Err` carries the message
/// reported to the client.
pub type Validator = fn(&str) -> Result<(), String>;

/// A compiled full-match pattern that remembers its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Secondary rules checked once a value has been coerced.
#[derive(Clone, Default)]
pub struct Constraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub gt: Option<f64>,
    pub ge: Option<f64>,
    pub lt: Option<f64>,
    pub le: Option<f64>,
    pub validators: Vec<Validator>,
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraints")
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Pattern::as_str))
            .field("gt", &self.gt)
            .field("ge", &self.ge)
            .field("lt", &self.lt)
            .field("le", &self.le)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.gt.is_none()
            && self.ge.is_none()
            && self.lt.is_none()
            && self.le.is_none()
            && self.validators.is_empty()
    }

    fn describe(&self) -> Value {
        let mut out = Map::new();
        if let Some(n) = self.min_length {
            out.insert("min_length".into(), json!(n));
        }
        if let Some(n) = self.max_length {
            out.insert("max_length".into(), json!(n));
        }
        if let Some(p) = &self.pattern {
            out.insert("pattern".into(), json!(p.as_str()));
        }
        for (key, bound) in [("gt", self.gt), ("ge", self.ge), ("lt", self.lt), ("le", self.le)] {
            if let Some(b) = bound {
                out.insert(key.into(), json!(b));
            }
        }
        if !self.validators.is_empty() {
            out.insert("custom_validators".into(), json!(self.validators.len()));
        }
        Value::Object(out)
    }
}

/// Declaration of one route input.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub source: ParamSource,
    pub kind: ParamKind,
    pub required: bool,
    /// Used when an optional parameter is absent. `None` binds [`Bound::Absent`].
    pub default: Option<Bound>,
    /// Human-readable title shown in the route catalogue.
    pub title: Option<&'static str>,
    pub constraints: Constraints,
}

impl ParamSpec {
    fn new(name: &'static str, source: ParamSource, kind: ParamKind, required: bool) -> Self {
        Self {
            name,
            source,
            kind,
            required,
            default: None,
            title: None,
            constraints: Constraints::default(),
        }
    }

    /// Path parameters are always required.
    pub fn path(name: &'static str, kind: ParamKind) -> Self {
        Self::new(name, ParamSource::Path, kind, true)
    }

    /// Query parameters are optional unless marked [`required`](Self::required).
    pub fn query(name: &'static str, kind: ParamKind) -> Self {
        Self::new(name, ParamSource::Query, kind, false)
    }

    pub fn body(name: &'static str, schema: &'static ObjectSchema) -> Self {
        Self::new(name, ParamSource::Body, ParamKind::Object(schema), true)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.default = None;
        self
    }

    pub fn default_value(mut self, value: Bound) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.constraints.pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    pub fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.constraints.validators.push(validator);
        self
    }

    /// Catalogue entry for this parameter.
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        out.insert("name".into(), json!(self.name));
        out.insert("in".into(), json!(self.source.as_str()));
        out.insert("type".into(), json!(self.kind.type_name()));
        out.insert("required".into(), json!(self.required));
        if let Some(default) = &self.default {
            out.insert("default".into(), default.to_json());
        }
        if let Some(title) = self.title {
            out.insert("title".into(), json!(title));
        }
        match self.kind {
            ParamKind::Enum(literals) => {
                out.insert("enum".into(), json!(literals));
            }
            ParamKind::Object(schema) => {
                out.insert("schema".into(), schema.describe());
            }
            _ => {}
        }
        if !self.constraints.is_empty() {
            out.insert("constraints".into(), self.constraints.describe());
        }
        Value::Object(out)
    }
}
