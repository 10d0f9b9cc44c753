//! BumBum parameter service library.
//!
//! Declarative HTTP parameter binding: every route declares its path,
//! query and body inputs; a generic binder coerces and validates them and
//! reports every violation at once.

// Core subsystems
pub mod binding;
pub mod config;
pub mod http;
pub mod routing;

// Endpoints and their data
pub mod catalog;
pub mod handlers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
