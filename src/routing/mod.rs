//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, raw path)
//!     → table.rs (route lookup, specificity ordering)
//!     → template.rs (segment matching, percent-decoding, captures)
//!     → Return: Matched route + captures, MethodNotAllowed, Redirect or NotFound
//!
//! Route Compilation (at startup):
//!     RouteSpec[] (handlers::route_table)
//!     → Parse templates
//!     → Check declared path params against templates
//!     → Freeze as immutable RouteTable
//! ```

pub mod table;
pub mod template;

use thiserror::Error;

pub use table::{Lookup, RouteSpec, RouteTable};
pub use template::{PathCaptures, PathTemplate, Segment};

/// Errors raised while compiling the route table.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("invalid path template `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("invalid parameter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("route `{route}` declares path params {declared:?} but its template has {template:?}")]
    PathParamMismatch {
        route: String,
        declared: Vec<String>,
        template: Vec<String>,
    },

    #[error("duplicate route {method} {route}")]
    Duplicate { method: String, route: String },
}
