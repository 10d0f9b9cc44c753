//! Route table and lookup.
//!
//! # Responsibilities
//! - Store route descriptors in registration order
//! - Resolve a method + path to one route and its path captures
//! - Distinguish "no such path" from "path exists, wrong method"
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locks)
//! - Specificity beats registration order: a route without a catch-all
//!   wins over one with, then more literal segments win, then the route
//!   registered first
//! - O(n) scan; the table is small and fixed

use axum::http::Method;
use serde_json::{json, Map, Value};

use crate::binding::{ParamSource, ParamSpec};
use crate::handlers::Handler;
use crate::routing::template::{PathCaptures, PathTemplate};
use crate::routing::RouteTableError;

/// Descriptor for one endpoint.
#[derive(Clone)]
pub struct RouteSpec {
    pub method: Method,
    pub template: PathTemplate,
    pub params: Vec<ParamSpec>,
    pub handler: Handler,
    pub summary: Option<&'static str>,
}

impl std::fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSpec")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("params", &self.params)
            .field("summary", &self.summary)
            .finish()
    }
}

impl RouteSpec {
    pub fn new(method: Method, template: &str, handler: Handler) -> Result<Self, RouteTableError> {
        Ok(Self {
            method,
            template: PathTemplate::parse(template)?,
            params: Vec::new(),
            handler,
            summary: None,
        })
    }

    pub fn get(template: &str, handler: Handler) -> Result<Self, RouteTableError> {
        Self::new(Method::GET, template, handler)
    }

    pub fn post(template: &str, handler: Handler) -> Result<Self, RouteTableError> {
        Self::new(Method::POST, template, handler)
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn summary(mut self, summary: &'static str) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn expects_body(&self) -> bool {
        self.params.iter().any(|p| p.source == ParamSource::Body)
    }

    /// Sort key: lower is more specific.
    fn specificity(&self) -> (bool, std::cmp::Reverse<usize>) {
        (
            self.template.has_catch_all(),
            std::cmp::Reverse(self.template.literal_count()),
        )
    }

    /// Path parameters declared on the route must be exactly the template's.
    fn check_path_params(&self) -> Result<(), RouteTableError> {
        let mut declared: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.source == ParamSource::Path)
            .map(|p| p.name)
            .collect();
        let mut in_template: Vec<&str> = self.template.param_names().collect();
        declared.sort_unstable();
        in_template.sort_unstable();

        if declared == in_template {
            Ok(())
        } else {
            Err(RouteTableError::PathParamMismatch {
                route: self.template.as_str().to_string(),
                declared: declared.iter().map(|s| s.to_string()).collect(),
                template: in_template.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    /// Catalogue entry for this route.
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        out.insert("method".into(), json!(self.method.as_str()));
        out.insert("path".into(), json!(self.template.as_str()));
        if let Some(summary) = self.summary {
            out.insert("summary".into(), json!(summary));
        }
        out.insert(
            "parameters".into(),
            Value::Array(self.params.iter().map(ParamSpec::describe).collect()),
        );
        Value::Object(out)
    }
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum Lookup<'a> {
    Matched {
        route: &'a RouteSpec,
        captures: PathCaptures,
    },
    /// The path exists but not for this method.
    MethodNotAllowed(Vec<Method>),
    /// Only the path with its trailing slash toggled matches.
    Redirect(String),
    NotFound,
}

/// Immutable, ordered set of routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteSpec>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteSpec>) -> Result<Self, RouteTableError> {
        for (i, route) in routes.iter().enumerate() {
            route.check_path_params()?;
            let duplicate = routes[..i]
                .iter()
                .any(|r| r.method == route.method && r.template.as_str() == route.template.as_str());
            if duplicate {
                return Err(RouteTableError::Duplicate {
                    method: route.method.to_string(),
                    route: route.template.as_str().to_string(),
                });
            }
        }
        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteSpec> {
        self.routes.iter()
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let candidates = self.candidates(path);

        if candidates.is_empty() {
            return match toggle_trailing_slash(path) {
                Some(alternate) if !self.candidates(&alternate).is_empty() => Lookup::Redirect(alternate),
                _ => Lookup::NotFound,
            };
        }

        let best = candidates
            .iter()
            .filter(|(_, route, _)| route.method == *method)
            .min_by_key(|(index, route, _)| (route.specificity(), *index));

        match best {
            Some((_, route, captures)) => Lookup::Matched {
                route: *route,
                captures: captures.clone(),
            },
            None => {
                let mut allowed: Vec<Method> = Vec::new();
                for (_, route, _) in &candidates {
                    if !allowed.contains(&route.method) {
                        allowed.push(route.method.clone());
                    }
                }
                Lookup::MethodNotAllowed(allowed)
            }
        }
    }

    fn candidates(&self, path: &str) -> Vec<(usize, &RouteSpec, PathCaptures)> {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(i, route)| route.template.matches(path).map(|c| (i, route, c)))
            .collect()
    }
}

fn toggle_trailing_slash(path: &str) -> Option<String> {
    if path == "/" {
        None
    } else if let Some(trimmed) = path.strip_suffix('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("{path}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BoundArgs, ParamKind};
    use crate::handlers::{HandlerContext, HandlerError};

    fn echo(_args: &BoundArgs, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
        Ok(Value::Null)
    }

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteSpec::get("/bumbum/{bumbum_id}", echo)
                .unwrap()
                .param(ParamSpec::path("bumbum_id", ParamKind::Integer)),
            RouteSpec::get("/bumbum/me", echo).unwrap(),
            RouteSpec::get("/files/{rest:path}", echo)
                .unwrap()
                .param(ParamSpec::path("rest", ParamKind::Str)),
            RouteSpec::get("/files/latest", echo).unwrap(),
            RouteSpec::get("/list/", echo).unwrap(),
            RouteSpec::post("/items/{item_id}", echo)
                .unwrap()
                .param(ParamSpec::path("item_id", ParamKind::Integer)),
        ])
        .unwrap()
    }

    fn matched_template(lookup: Lookup<'_>) -> String {
        match lookup {
            Lookup::Matched { route, .. } => route.template.as_str().to_string(),
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_beats_param_regardless_of_order() {
        let table = table();
        assert_eq!(matched_template(table.lookup(&Method::GET, "/bumbum/me")), "/bumbum/me");
        assert_eq!(matched_template(table.lookup(&Method::GET, "/bumbum/7")), "/bumbum/{bumbum_id}");
    }

    #[test]
    fn test_literal_beats_catch_all() {
        let table = table();
        assert_eq!(matched_template(table.lookup(&Method::GET, "/files/latest")), "/files/latest");
        assert_eq!(matched_template(table.lookup(&Method::GET, "/files/a/b")), "/files/{rest:path}");
    }

    #[test]
    fn test_method_not_allowed() {
        let table = table();
        match table.lookup(&Method::GET, "/items/3") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::POST]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_redirect_and_not_found() {
        let table = table();
        match table.lookup(&Method::GET, "/list") {
            Lookup::Redirect(location) => assert_eq!(location, "/list/"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(table.lookup(&Method::GET, "/nope"), Lookup::NotFound));
    }

    #[test]
    fn test_table_rejects_inconsistent_routes() {
        let missing_param = RouteTable::new(vec![RouteSpec::get("/a/{id}", echo).unwrap()]);
        assert!(matches!(missing_param, Err(RouteTableError::PathParamMismatch { .. })));

        let duplicate = RouteTable::new(vec![
            RouteSpec::get("/a", echo).unwrap(),
            RouteSpec::get("/a", echo).unwrap(),
        ]);
        assert!(matches!(duplicate, Err(RouteTableError::Duplicate { .. })));
    }
}
