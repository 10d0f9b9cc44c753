//! Parameter binding subsystem.
//!
//! # Data Flow
//! ```text
//! matched route + raw request
//!     → spec.rs (declared ParamSpecs, walked in order)
//!     → query.rs / path captures / body bytes (raw lookup)
//!     → coerce.rs (text or JSON → typed Bound)
//!     → constraints.rs (length, pattern, bounds, custom validators)
//!     → BoundArgs on success, ValidationErrors otherwise
//! ```
//!
//! # Design Decisions
//! - Every declared parameter is checked; all violations are reported together
//! - The handler runs only when binding produced no violation
//! - Constraints never run on absent or defaulted values
//! - Pure function of its inputs: no I/O, no shared state

pub mod args;
pub mod coerce;
pub mod constraints;
pub mod error;
pub mod query;
pub mod spec;

use serde_json::{Map, Value};

use crate::routing::PathCaptures;

pub use args::{ArgumentError, Bound, BoundArgs};
pub use error::{ErrorKind, ValidationError, ValidationErrors};
pub use query::QueryParams;
pub use spec::{FieldSpec, ObjectSchema, ParamKind, ParamSource, ParamSpec, Validator};

/// Bind every declared parameter of a route.
pub fn bind(
    params: &[ParamSpec],
    captures: &PathCaptures,
    query: &QueryParams,
    body: Option<&[u8]>,
) -> Result<BoundArgs, ValidationErrors> {
    let mut args = BoundArgs::default();
    let mut errors = Vec::new();

    for spec in params {
        match bind_one(spec, captures, query, body) {
            Ok(value) => args.insert(spec.name, value),
            Err(mut violations) => errors.append(&mut violations),
        }
    }

    match ValidationErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(args),
    }
}

fn bind_one(
    spec: &ParamSpec,
    captures: &PathCaptures,
    query: &QueryParams,
    body: Option<&[u8]>,
) -> Result<Bound, Vec<ValidationError>> {
    let loc = vec![spec.source.as_str().to_string(), spec.name.to_string()];

    let supplied = match spec.source {
        ParamSource::Path => captures
            .get(spec.name)
            .map(|raw| coerce_raw(spec, raw, &loc))
            .transpose()?,
        ParamSource::Query => match spec.kind {
            ParamKind::StrList => {
                let values = query.all(spec.name);
                if values.is_empty() {
                    None
                } else {
                    Some(Bound::List(values.into_iter().map(str::to_string).collect()))
                }
            }
            _ => query
                .last(spec.name)
                .map(|raw| coerce_raw(spec, raw, &loc))
                .transpose()?,
        },
        ParamSource::Body => match body.filter(|b| !b.is_empty()) {
            Some(bytes) => Some(bind_body(spec, bytes)?),
            None => None,
        },
    };

    let Some(value) = supplied else {
        return absent(spec, loc);
    };

    let violations = constraints::check(&spec.constraints, &value);
    if violations.is_empty() {
        Ok(value)
    } else {
        let input = value.to_json();
        Err(violations
            .into_iter()
            .map(|kind| ValidationError::new(loc.clone(), kind, Some(input.clone())))
            .collect())
    }
}

fn coerce_raw(spec: &ParamSpec, raw: &str, loc: &[String]) -> Result<Bound, Vec<ValidationError>> {
    coerce::coerce_text(spec.kind, raw)
        .map_err(|kind| vec![ValidationError::new(loc.to_vec(), kind, Some(Value::String(raw.to_string())))])
}

fn absent(spec: &ParamSpec, loc: Vec<String>) -> Result<Bound, Vec<ValidationError>> {
    if spec.required {
        let loc = match spec.source {
            // A missing body is reported against the body itself.
            ParamSource::Body => vec![ParamSource::Body.as_str().to_string()],
            _ => loc,
        };
        Err(vec![ValidationError::new(loc, ErrorKind::Missing, None)])
    } else {
        Ok(spec.default.clone().unwrap_or(Bound::Absent))
    }
}

fn bind_body(spec: &ParamSpec, bytes: &[u8]) -> Result<Bound, Vec<ValidationError>> {
    let body_loc = || vec![ParamSource::Body.as_str().to_string()];

    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        vec![ValidationError::new(
            body_loc(),
            ErrorKind::JsonInvalid,
            Some(Value::String(e.to_string())),
        )]
    })?;

    match spec.kind {
        ParamKind::Object(schema) => bind_object(schema, &value).map(Bound::Object),
        kind => coerce::coerce_json(kind, &value)
            .map(|v| Bound::Object(Map::from_iter([(spec.name.to_string(), v)])))
            .map_err(|kind| vec![ValidationError::new(body_loc(), kind, Some(value.clone()))]),
    }
}

/// Validate a JSON object against its schema and normalize it: declared
/// fields only, in declared order, absent optionals as `null`.
pub fn bind_object(schema: &ObjectSchema, value: &Value) -> Result<Map<String, Value>, Vec<ValidationError>> {
    let body = ParamSource::Body.as_str().to_string();

    let Value::Object(fields) = value else {
        return Err(vec![ValidationError::new(vec![body], ErrorKind::ObjectType, Some(value.clone()))]);
    };

    let mut normalized = Map::new();
    let mut errors = Vec::new();

    for field in schema.fields {
        let loc = vec![body.clone(), field.name.to_string()];
        match fields.get(field.name) {
            None | Some(Value::Null) if !field.required => {
                normalized.insert(field.name.to_string(), Value::Null);
            }
            None => errors.push(ValidationError::new(loc, ErrorKind::Missing, None)),
            Some(raw) => match coerce::coerce_json(field.kind, raw) {
                Ok(v) => {
                    normalized.insert(field.name.to_string(), v);
                }
                Err(kind) => errors.push(ValidationError::new(loc, kind, Some(raw.clone()))),
            },
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static POINT: ObjectSchema = ObjectSchema {
        name: "Point",
        fields: &[
            FieldSpec::required("label", ParamKind::Str),
            FieldSpec::required("x", ParamKind::Float),
            FieldSpec::optional("note", ParamKind::Str),
        ],
    };

    fn captures(pairs: &[(&str, &str)]) -> PathCaptures {
        let mut captures = PathCaptures::default();
        for (k, v) in pairs {
            captures.push(k, v.to_string());
        }
        captures
    }

    #[test]
    fn test_path_integer_echo() {
        let params = [ParamSpec::path("id", ParamKind::Integer)];
        let args = bind(&params, &captures(&[("id", "123")]), &QueryParams::default(), None).unwrap();
        assert_eq!(args.int("id"), Ok(123));

        let err = bind(&params, &captures(&[("id", "abc")]), &QueryParams::default(), None).unwrap_err();
        let first = err.iter().next().unwrap();
        assert_eq!(first.kind, ErrorKind::IntParsing);
        assert_eq!(first.loc, vec!["path", "id"]);
        assert_eq!(first.input, Some(json!("abc")));
    }

    #[test]
    fn test_query_defaults_and_required() {
        let params = [
            ParamSpec::query("skip", ParamKind::Integer).default_value(Bound::Int(0)),
            ParamSpec::query("q", ParamKind::Str),
            ParamSpec::query("needy", ParamKind::Str).required(),
        ];

        let query = QueryParams::parse(Some("needy=yes"));
        let args = bind(&params, &PathCaptures::default(), &query, None).unwrap();
        assert_eq!(args.int("skip"), Ok(0));
        assert_eq!(args.opt_str("q"), Ok(None));
        assert_eq!(args.str("needy"), Ok("yes"));

        let err = bind(&params, &PathCaptures::default(), &QueryParams::default(), None).unwrap_err();
        assert_eq!(err.len(), 1);
        let first = err.iter().next().unwrap();
        assert_eq!(first.kind, ErrorKind::Missing);
        assert_eq!(first.loc, vec!["query", "needy"]);
    }

    #[test]
    fn test_all_violations_reported() {
        let params = [
            ParamSpec::query("a", ParamKind::Integer),
            ParamSpec::query("b", ParamKind::Bool),
        ];
        let query = QueryParams::parse(Some("a=x&b=maybe"));
        let err = bind(&params, &PathCaptures::default(), &query, None).unwrap_err();
        let kinds: Vec<_> = err.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds, vec![ErrorKind::IntParsing, ErrorKind::BoolParsing]);
    }

    #[test]
    fn test_list_collects_in_order() {
        let params = [ParamSpec::query("q", ParamKind::StrList)];
        let query = QueryParams::parse(Some("q=foo&q=bar"));
        let args = bind(&params, &PathCaptures::default(), &query, None).unwrap();
        assert_eq!(args.opt_list("q").unwrap(), Some(&["foo".to_string(), "bar".to_string()][..]));

        let args = bind(&params, &PathCaptures::default(), &QueryParams::default(), None).unwrap();
        assert_eq!(args.opt_list("q").unwrap(), None);
    }

    #[test]
    fn test_constraints_skip_absent_values() {
        let params = [ParamSpec::query("q", ParamKind::Str).min_length(3)];
        let args = bind(&params, &PathCaptures::default(), &QueryParams::default(), None).unwrap();
        assert_eq!(args.opt_str("q"), Ok(None));

        let query = QueryParams::parse(Some("q=xx"));
        let err = bind(&params, &PathCaptures::default(), &query, None).unwrap_err();
        assert_eq!(err.iter().next().unwrap().kind, ErrorKind::StringTooShort(3));
    }

    #[test]
    fn test_body_object() {
        let params = [ParamSpec::body("point", &POINT)];
        let body = br#"{"label":"a","x":3,"extra":true}"#;
        let args = bind(&params, &PathCaptures::default(), &QueryParams::default(), Some(body)).unwrap();
        let point = args.object("point").unwrap();
        assert_eq!(Value::Object(point.clone()), json!({"label": "a", "x": 3.0, "note": null}));
        let keys: Vec<_> = point.keys().cloned().collect();
        assert_eq!(keys, vec!["label", "x", "note"]);
    }

    #[test]
    fn test_body_field_errors() {
        let params = [ParamSpec::body("point", &POINT)];
        let body = br#"{"x":"three","note":1}"#;
        let err = bind(&params, &PathCaptures::default(), &QueryParams::default(), Some(body)).unwrap_err();
        let found: Vec<_> = err.iter().map(|e| (e.loc.join("."), e.kind.code())).collect();
        assert_eq!(
            found,
            vec![
                ("body.label".to_string(), "missing"),
                ("body.x".to_string(), "float_type"),
                ("body.note".to_string(), "string_type"),
            ]
        );
    }

    #[test]
    fn test_body_missing_or_malformed() {
        let params = [ParamSpec::body("point", &POINT)];

        let err = bind(&params, &PathCaptures::default(), &QueryParams::default(), None).unwrap_err();
        let first = err.iter().next().unwrap();
        assert_eq!((first.loc.clone(), first.kind.clone()), (vec!["body".to_string()], ErrorKind::Missing));

        let err = bind(&params, &PathCaptures::default(), &QueryParams::default(), Some(b"{not json")).unwrap_err();
        assert_eq!(err.iter().next().unwrap().kind, ErrorKind::JsonInvalid);

        let err = bind(&params, &PathCaptures::default(), &QueryParams::default(), Some(b"[1,2]")).unwrap_err();
        assert_eq!(err.iter().next().unwrap().kind, ErrorKind::ObjectType);
    }
}
