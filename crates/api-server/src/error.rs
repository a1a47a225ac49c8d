//! Error envelope for API responses
//!
//! Handlers return [`ApiError`]; the [`error_envelope`] middleware renders
//! every such failure as
//! `{"error": {"message", "status", "timestamp", "path"}}`.

use axum::{
    body::HttpBody,
    extract::{rejection::JsonRejection, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<tenant_core::Error> for ApiError {
    fn from(err: tenant_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    status: u16,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl ApiError {
    fn render(&self, path: Option<String>) -> Response {
        let body = ErrorEnvelope {
            error: ErrorDetails {
                message: self.message.clone(),
                status: self.status.as_u16(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                path,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.render(None);
        response.extensions_mut().insert(self);
        response
    }
}

/// Attach the request path to error responses and log server failures.
///
/// Bodiless failures produced by the router itself (such as 405 for an
/// unsupported method) are rendered through the same envelope.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let err = match response.extensions().get::<ApiError>() {
        Some(err) => err.clone(),
        None if is_bare_failure(&response) => {
            let status = response.status();
            ApiError::new(status, status.canonical_reason().unwrap_or("Request failed"))
        }
        None => return response,
    };

    if err.status.is_server_error() {
        tracing::error!(status = err.status.as_u16(), %path, "{}", err.message);
    }

    let mut rendered = err.render(Some(path));
    if let Some(allow) = response.headers().get(header::ALLOW) {
        rendered.headers_mut().insert(header::ALLOW, allow.clone());
    }
    rendered
}

fn is_bare_failure(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && response.body().size_hint().exact() == Some(0)
}

/// Fallback for unknown routes
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
