//! Endpoint handlers and the route table.
//!
//! # Data Flow
//! ```text
//! BoundArgs (already validated)
//!     → handler fn (pure, synchronous)
//!     → serde_json::Value (response mapping, insertion-ordered)
//! ```
//!
//! # Design Decisions
//! - Handlers never see unvalidated input; binding happens in `binding`
//! - Handlers have no side effects beyond building the response
//! - The route table is plain data: template, method, declared params, fn

pub mod docs;
pub mod items;
pub mod paths;
pub mod queries;

use serde_json::Value;
use thiserror::Error;

use crate::binding::{ArgumentError, Bound, BoundArgs, ParamKind, ParamSpec};
use crate::catalog::{BumBumModel, Picker};
use crate::routing::{RouteSpec, RouteTable, RouteTableError};

/// Signature shared by every endpoint.
pub type Handler = fn(&BoundArgs, &HandlerContext<'_>) -> Result<Value, HandlerError>;

/// Read-only request-independent state a handler may consult.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub picker: &'a Picker,
    pub routes: &'a RouteTable,
}

/// A handler could not build its response. Always a server-side fault:
/// client input problems are caught during binding.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("unrecognized {kind} literal `{value}`")]
    UnknownLiteral { kind: &'static str, value: String },

    #[error("bound body does not deserialize: {0}")]
    Body(#[from] serde_json::Error),

    #[error("catalog `{0}` is empty")]
    EmptyCatalog(&'static str),
}

/// Every endpoint the service exposes, in registration order.
pub fn route_table() -> Result<RouteTable, RouteTableError> {
    RouteTable::new(vec![
        RouteSpec::get("/", paths::root)?.summary("Greeting"),
        // Registered ahead of `/bumbum/{bumbum_id}`; the literal route also
        // wins on specificity.
        RouteSpec::get("/bumbum/me", paths::current_bumbum)?.summary("Current bumbum"),
        RouteSpec::get("/bumbum/{bumbum_id}", paths::bumbum_by_id)?
            .summary("Echo a bumbum id")
            .param(ParamSpec::path("bumbum_id", ParamKind::Integer)),
        RouteSpec::get("/bumbum/models/{model_name}", paths::bumbum_model)?
            .summary("Message for a bumbum model")
            .param(ParamSpec::path("model_name", ParamKind::Enum(BumBumModel::NAMES))),
        RouteSpec::get("/bumbum/archive/{file_path:path}", paths::bumbum_archive)?
            .summary("Archive lookup by file path")
            .param(ParamSpec::path("file_path", ParamKind::Str)),
        RouteSpec::get("/bumbums/", queries::list_bumbums)?
            .summary("Slice of the bumbum list")
            .param(ParamSpec::query("skip", ParamKind::Integer).default_value(Bound::Int(0)))
            .param(ParamSpec::query("limit", ParamKind::Integer).default_value(Bound::Int(10))),
        RouteSpec::get("/bumbums/optional-query", queries::optional_query)?
            .param(ParamSpec::query("q", ParamKind::Str)),
        RouteSpec::get("/bumbums/bool-query", queries::bool_query)?
            .param(ParamSpec::query("short", ParamKind::Bool).default_value(Bound::Bool(false))),
        RouteSpec::get("/bumbums/{bumbum_id}/items/{item_id}", queries::bumbum_item)?
            .param(ParamSpec::path("bumbum_id", ParamKind::Integer))
            .param(ParamSpec::path("item_id", ParamKind::Str))
            .param(ParamSpec::query("q", ParamKind::Str))
            .param(ParamSpec::query("short", ParamKind::Bool).default_value(Bound::Bool(false))),
        RouteSpec::get("/bumbums/required-query", queries::required_query)?
            .param(ParamSpec::query("needy", ParamKind::Str).required()),
        RouteSpec::get("/bumbums/{bumbum_id}/rank/{rank_id}", queries::bumbum_rank)?
            .summary("Formatted rank")
            .param(ParamSpec::path("bumbum_id", ParamKind::Integer))
            .param(ParamSpec::path("rank_id", ParamKind::Str))
            .param(ParamSpec::query("rank_division", ParamKind::Integer).required())
            .param(ParamSpec::query("rank_format", ParamKind::Enum(queries::RankFormat::NAMES)).required())
            .param(ParamSpec::query("description", ParamKind::Str)),
        RouteSpec::post("/items/{item_id}", items::update_item)?
            .summary("Echo an item with its computed total")
            .param(ParamSpec::path("item_id", ParamKind::Integer))
            .param(ParamSpec::body("item", &items::ITEM_SCHEMA))
            .param(ParamSpec::query("q", ParamKind::Str)),
        RouteSpec::get("/specific-query", queries::specific_query)?
            .param(
                ParamSpec::query("q", ParamKind::Str)
                    .min_length(3)
                    .max_length(50)
                    .pattern("^fixedquery$")?,
            ),
        RouteSpec::get("/query-list", queries::query_list)?
            .param(ParamSpec::query("q", ParamKind::StrList)),
        RouteSpec::get("/custom-query-validation", queries::custom_query_validation)?
            .summary("Book title by id, or a random book")
            .param(ParamSpec::query("id", ParamKind::Str).validator(queries::check_valid_id)),
        RouteSpec::get("/paths/{path_id}", paths::titled_path)?
            .param(ParamSpec::path("path_id", ParamKind::Integer).title("The ID of the item to get")),
        RouteSpec::get("/python-magic/{item_id}", paths::path_then_query)?
            .param(ParamSpec::path("item_id", ParamKind::Integer).title("The ID of the item to get"))
            .param(ParamSpec::query("q", ParamKind::Str).required()),
        RouteSpec::get("/path-num-validation/{item_id}", paths::bounded_path)?
            .param(
                ParamSpec::path("item_id", ParamKind::Integer)
                    .title("The ID of the item to get")
                    .gt(1.0)
                    .le(100.0),
            ),
        RouteSpec::get("/docs/routes", docs::route_catalogue)?
            .summary("Describe every registered route"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    use crate::routing::Lookup;

    #[test]
    fn test_route_table_compiles() {
        let table = route_table().unwrap();
        assert_eq!(table.len(), 19);
    }

    #[test]
    fn test_static_route_resolves_before_numeric_id() {
        let table = route_table().unwrap();
        match table.lookup(&Method::GET, "/bumbum/me") {
            Lookup::Matched { route, .. } => assert_eq!(route.template.as_str(), "/bumbum/me"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_only_item_update_reads_a_body() {
        let table = route_table().unwrap();
        let with_body: Vec<_> = table
            .iter()
            .filter(|r| r.expects_body())
            .map(|r| r.template.as_str())
            .collect();
        assert_eq!(with_body, vec!["/items/{item_id}"]);
    }
}
