use axum::http::{HeaderMap, Method};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::metrics::{
    BOT_REQUESTS, COMPLETION_LATENCY, RATE_LIMITED, REVIEW_REQUESTS, TRACKED_IDENTITIES,
    UPSTREAM_FAILURES,
};
use crate::models::{RateLimitInfo, ReviewOutcome};
use crate::state::AppState;
use crate::validate::{ValidationError, validate_code};
use crate::{bot, identity};

// Far above what a maximum-length snippet encodes to
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    // not JSON, or the stream broke while reading
    Unreadable,
    // over MAX_BODY_BYTES, so the code cannot fit the length limit either
    TooLarge,
}

impl RequestBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() > MAX_BODY_BYTES {
            return RequestBody::TooLarge;
        }
        serde_json::from_slice(bytes)
            .map(RequestBody::Json)
            .unwrap_or(RequestBody::Unreadable)
    }

    fn code(&self) -> Option<&Value> {
        match self {
            RequestBody::Json(body) => body.get("code"),
            _ => None,
        }
    }
}

// Platform-neutral view of an incoming review request
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub method: Method,
    pub headers: Option<HeaderMap>,
    pub remote_addr: Option<SocketAddr>,
    pub body: RequestBody,
}

impl ReviewInput {
    pub fn new(
        method: Method,
        headers: Option<HeaderMap>,
        remote_addr: Option<SocketAddr>,
        body: RequestBody,
    ) -> Self {
        Self {
            method,
            headers,
            remote_addr,
            body,
        }
    }
}

// Admission control, then a single completion call.
//
// The rate limit slot is taken before validation, so an invalid request
// still counts against the client.
pub async fn handle_review(state: &AppState, input: ReviewInput) -> ReviewOutcome {
    REVIEW_REQUESTS.inc();

    if input.method != Method::POST {
        return ReviewOutcome::method_not_allowed();
    }

    let client_id = identity::resolve(input.headers.as_ref(), input.remote_addr);
    let is_bot = input
        .headers
        .as_ref()
        .is_some_and(|h| bot::is_likely_bot(h, &input.method));
    if is_bot {
        BOT_REQUESTS.inc();
        debug!(client = %client_id, "request classified as automated");
    }

    let quota = state.policy.effective_quota(is_bot);
    let decision = state.limiter.check(&client_id, quota);
    TRACKED_IDENTITIES.set(state.limiter.tracked_identities() as f64);

    if !decision.allowed {
        RATE_LIMITED.inc();
        warn!(client = %client_id, is_bot, quota, "rate limit exceeded");
        return ReviewOutcome::RateLimited {
            error: "Rate limit exceeded".to_string(),
            message: state.policy.rate_limit_message(is_bot),
            reset_time: decision.reset_time,
            is_bot,
        };
    }

    let max_len = state.policy.max_code_length;
    let validated = match input.body {
        RequestBody::TooLarge => Err(ValidationError::TooLong { max: max_len }),
        ref body => validate_code(body.code(), max_len),
    };
    let code = match validated {
        Ok(code) => code,
        Err(err) => return ReviewOutcome::bad_request(err.to_string()),
    };

    let Some(credential) = state.credential.resolve() else {
        error!(
            source = %state.credential.describe(),
            "completion API key is not configured"
        );
        return ReviewOutcome::ServerError {
            error: "Server configuration error".to_string(),
            message: None,
        };
    };

    let start = Instant::now();
    let result = state.completion.complete(code, &credential).await;
    COMPLETION_LATENCY.observe(start.elapsed().as_secs_f64());

    match result {
        Ok(review) => {
            info!(client = %client_id, remaining = decision.remaining, "review generated");
            ReviewOutcome::Reviewed {
                review,
                rate_limit: RateLimitInfo {
                    remaining: decision.remaining,
                    reset_time: decision.reset_time,
                },
            }
        }
        Err(err) => {
            UPSTREAM_FAILURES.inc();
            error!(client = %client_id, error = ?err, "completion request failed");
            ReviewOutcome::ServerError {
                error: "Failed to generate review".to_string(),
                message: Some(err.to_string()),
            }
        }
    }
}
