//! Adapter for function-style platforms that hand over a fully buffered
//! `http::Request` and expect an `http::Response` back.

use axum::body::Bytes;
use axum::http::{self, HeaderValue, header};
use std::net::SocketAddr;
use tracing::error;

use crate::review::{RequestBody, ReviewInput, handle_review};
use crate::state::AppState;

const FALLBACK_BODY: &str = r#"{"error":"Internal server error"}"#;

/// Runs one invocation. The platform may attach the caller's socket
/// address as a `SocketAddr` extension; proxy headers are used otherwise.
pub async fn handle(state: &AppState, request: http::Request<Bytes>) -> http::Response<String> {
    let (parts, body) = request.into_parts();
    let remote = parts.extensions.get::<SocketAddr>().copied();

    let input = ReviewInput::new(
        parts.method,
        Some(parts.headers),
        remote,
        RequestBody::from_bytes(&body),
    );
    let outcome = handle_review(state, input).await;

    let mut status = outcome.status();
    let body = serde_json::to_string(&outcome).unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize review outcome");
        status = http::StatusCode::INTERNAL_SERVER_ERROR;
        FALLBACK_BODY.to_string()
    });

    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
