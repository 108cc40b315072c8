use axum::{
    body::Bytes,
    extract::{
        ConnectInfo, State,
        rejection::{BytesRejection, FailedToBufferBody},
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::review::{RequestBody, ReviewInput, handle_review};
use crate::state::AppState;

// Long-running server adapter. The body limit comes from the router's
// DefaultBodyLimit layer.
pub async fn review_handler(
    State(state): State<Arc<AppState>>,
    parts: Parts,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(bytes) => RequestBody::from_bytes(&bytes),
        Err(BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_))) => {
            RequestBody::TooLarge
        }
        Err(rejection) => {
            warn!(error = %rejection, "failed to read request body");
            RequestBody::Unreadable
        }
    };

    let remote = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let input = ReviewInput::new(parts.method, Some(parts.headers), remote, body);
    handle_review(&state, input).await.into_response()
}
