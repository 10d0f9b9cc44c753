//! Response construction.
//!
//! # Responsibilities
//! - Map binding failures to 422 with the per-violation detail list
//! - Map handler faults to an opaque 500
//! - Build the routing outcomes that never reach a handler (404, 405, 307)
//! - Report unreadable bodies (413 over the limit, 400 otherwise)
//!
//! # Design Decisions
//! - Every error body is JSON with a top-level `detail` key
//! - Handler fault details are logged, never sent to the client

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::binding::ValidationErrors;
use crate::handlers::HandlerError;

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self.to_body())).into_response()
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}

/// `{"detail": message}` with the given status.
pub fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

pub fn not_found() -> Response {
    detail(StatusCode::NOT_FOUND, "Not Found")
}

pub fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = detail(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// 307 so the client repeats the same method and body.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response(),
        Err(_) => not_found(),
    }
}

pub fn payload_too_large() -> Response {
    detail(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
}

pub fn bad_request(message: &str) -> Response {
    detail(StatusCode::BAD_REQUEST, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{ErrorKind, ValidationError};

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_errors_are_422() {
        let errors = ValidationErrors::from_vec(vec![ValidationError::new(
            vec!["query".into(), "needy".into()],
            ErrorKind::Missing,
            None,
        )])
        .unwrap();

        let response = errors.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["detail"][0]["type"], "missing");
        assert_eq!(body["detail"][0]["loc"], json!(["query", "needy"]));
    }

    #[tokio::test]
    async fn test_handler_fault_is_opaque() {
        let response = HandlerError::EmptyCatalog("books").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "detail": "Internal Server Error" }));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let response = method_not_allowed(&[Method::GET, Method::POST]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = redirect("/bumbums/?skip=1");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/bumbums/?skip=1");
    }
}
