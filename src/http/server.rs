//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single dispatch fallback
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Resolve each request against the route table, bind, invoke
//! - Observability (metrics, correlation IDs)
//! - Serve until the shutdown signal fires

use std::error::Error as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Json, Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::binding::{self, QueryParams};
use crate::catalog::Picker;
use crate::config::ServerConfig;
use crate::handlers::{self, HandlerContext};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{Lookup, PathCaptures, RouteSpec, RouteTable, RouteTableError};

/// Route label for requests that never reached a handler.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Application state injected into the dispatcher.
#[derive(Debug, Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub picker: Arc<Picker>,
    pub max_body_bytes: usize,
}

/// HTTP server for the parameter demo service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, RouteTableError> {
        let state = AppState {
            routes: Arc::new(handlers::route_table()?),
            picker: Arc::new(Picker::new(config.catalog.random_seed)),
            max_body_bytes: config.limits.max_body_bytes,
        };

        tracing::debug!(
            routes = state.routes.len(),
            seeded = state.picker.is_seeded(),
            "Route table compiled"
        );

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolve, bind and invoke. Every request ends here.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let (response, route) = match state.routes.lookup(&method, &path) {
        Lookup::Matched { route, captures } => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = %route.template.as_str(),
                "Route matched"
            );
            let response = invoke(&state, route, captures, query.as_deref(), request.into_body(), &request_id).await;
            (response, route.template.as_str())
        }
        Lookup::MethodNotAllowed(allowed) => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "Method not allowed");
            (response::method_not_allowed(&allowed), UNMATCHED_ROUTE)
        }
        Lookup::Redirect(location) => {
            let location = match &query {
                Some(q) => format!("{location}?{q}"),
                None => location,
            };
            tracing::debug!(request_id = %request_id, path = %path, location = %location, "Redirecting");
            (response::redirect(&location), UNMATCHED_ROUTE)
        }
        Lookup::NotFound => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            (response::not_found(), UNMATCHED_ROUTE)
        }
    };

    let status = response.status().as_u16();
    metrics::record_request(method.as_str(), route, status, started);
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );
    response
}

async fn invoke(
    state: &AppState,
    route: &RouteSpec,
    captures: PathCaptures,
    query: Option<&str>,
    body: Body,
    request_id: &str,
) -> Response {
    let body = if route.expects_body() {
        match axum::body::to_bytes(body, state.max_body_bytes).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                tracing::warn!(request_id = %request_id, %error, "Failed to read request body");
                return body_read_failure(&error);
            }
        }
    } else {
        None
    };

    let query = QueryParams::parse(query);
    let args = match binding::bind(&route.params, &captures, &query, body.as_deref()) {
        Ok(args) => args,
        Err(errors) => {
            tracing::debug!(
                request_id = %request_id,
                route = %route.template.as_str(),
                violations = errors.len(),
                "Validation failed"
            );
            metrics::record_validation_failures(route.template.as_str(), &errors);
            return errors.into_response();
        }
    };

    let ctx = HandlerContext {
        picker: &state.picker,
        routes: &state.routes,
    };
    match (route.handler)(&args, &ctx) {
        Ok(value) => Json(value).into_response(),
        Err(error) => {
            tracing::error!(
                request_id = %request_id,
                route = %route.template.as_str(),
                %error,
                "Handler failed"
            );
            error.into_response()
        }
    }
}

/// 413 when the body went past the size limit, 400 for any other read
/// failure (client hung up, malformed chunking).
fn body_read_failure(error: &axum::Error) -> Response {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return response::payload_too_large();
        }
        source = current.source();
    }
    response::bad_request("There was an error parsing the body")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::http::X_REQUEST_ID;

    fn server() -> HttpServer {
        HttpServer::new(ServerConfig::default()).unwrap()
    }

    async fn send(method: Method, uri: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        server().router().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_request_id() {
        let response = send(Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(json_body(response).await, json!({ "message": "Hello BumBum" }));
    }

    #[tokio::test]
    async fn test_path_int_validation() {
        let response = send(Method::GET, "/bumbum/abc", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["detail"][0]["type"], "int_parsing");
        assert_eq!(body["detail"][0]["loc"], json!(["path", "bumbum_id"]));
        assert_eq!(body["detail"][0]["input"], "abc");
    }

    #[tokio::test]
    async fn test_undecodable_path_segment_is_422() {
        let response = send(Method::GET, "/bumbum/%FF", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["detail"][0]["type"], "int_parsing");
        assert_eq!(body["detail"][0]["input"], "\u{FFFD}");
    }

    #[tokio::test]
    async fn test_body_read_failures() {
        let overflow = axum::body::to_bytes(Body::from("0123456789"), 4).await.unwrap_err();
        let response = body_read_failure(&overflow);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await, json!({ "detail": "Request body too large" }));

        let reset = axum::Error::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ));
        let response = body_read_failure(&reset);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "detail": "There was an error parsing the body" })
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let mut config = ServerConfig::default();
        config.limits.max_body_bytes = 8;
        let request = Request::post("/items/5")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"a","price":10}"#))
            .unwrap();
        let response = HttpServer::new(config).unwrap().router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_round_trip() {
        let response = send(
            Method::POST,
            "/items/5",
            Some(r#"{"name":"a","price":10,"tax":2}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["item_id"], 5);
        assert_eq!(body["price_with_tax"], json!(12.0));
        assert!(body.get("q").is_none());
    }

    #[tokio::test]
    async fn test_missing_body_is_422() {
        let response = send(Method::POST, "/items/5", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["detail"][0]["loc"], json!(["body"]));
        assert_eq!(body["detail"][0]["type"], "missing");
    }

    #[tokio::test]
    async fn test_routing_outcomes() {
        let response = send(Method::GET, "/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "detail": "Not Found" }));

        let response = send(Method::POST, "/", None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");

        let response = send(Method::GET, "/bumbums?skip=1", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/bumbums/?skip=1");
    }

    #[tokio::test]
    async fn test_seeded_picks_repeat_across_servers() {
        let mut config = ServerConfig::default();
        config.catalog.random_seed = Some(11);

        let mut picks = Vec::new();
        for _ in 0..2 {
            let router = HttpServer::new(config.clone()).unwrap().router();
            let request = Request::get("/custom-query-validation").body(Body::empty()).unwrap();
            picks.push(json_body(router.oneshot(request).await.unwrap()).await);
        }
        assert_eq!(picks[0], picks[1]);
    }
}
