use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

// Quota metadata returned with a successful review
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub remaining: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub reset_time: DateTime<Utc>,
}

/// Every way a review request can end. Serialized as a plain JSON object,
/// the HTTP status comes from [`ReviewOutcome::status`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ReviewOutcome {
    Reviewed {
        review: String,
        rate_limit: RateLimitInfo,
    },
    ClientError {
        #[serde(skip)]
        status: StatusCode,
        error: String,
    },
    RateLimited {
        error: String,
        message: String,
        #[serde(with = "chrono::serde::ts_milliseconds")]
        reset_time: DateTime<Utc>,
        is_bot: bool,
    },
    ServerError {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ReviewOutcome {
    pub fn method_not_allowed() -> Self {
        ReviewOutcome::ClientError {
            status: StatusCode::METHOD_NOT_ALLOWED,
            error: "Method not allowed".to_string(),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        ReviewOutcome::ClientError {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReviewOutcome::Reviewed { .. } => StatusCode::OK,
            ReviewOutcome::ClientError { status, .. } => *status,
            ReviewOutcome::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ReviewOutcome::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReviewOutcome {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reset() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_123).unwrap()
    }

    #[test]
    fn success_shape() {
        let outcome = ReviewOutcome::Reviewed {
            review: "## Bugs".into(),
            rate_limit: RateLimitInfo {
                remaining: 4,
                reset_time: reset(),
            },
        };
        assert_eq!(outcome.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "review": "## Bugs", "rateLimit": { "remaining": 4, "resetTime": 1_700_000_000_123_i64 } })
        );
    }

    #[test]
    fn rate_limited_shape() {
        let outcome = ReviewOutcome::RateLimited {
            error: "Rate limit exceeded".into(),
            message: "later".into(),
            reset_time: reset(),
            is_bot: true,
        };
        assert_eq!(outcome.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "error": "Rate limit exceeded",
                "message": "later",
                "resetTime": 1_700_000_000_123_i64,
                "isBot": true
            })
        );
    }

    #[test]
    fn client_error_hides_status() {
        let outcome = ReviewOutcome::method_not_allowed();
        assert_eq!(outcome.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "error": "Method not allowed" })
        );
    }

    #[test]
    fn server_error_omits_missing_message() {
        let outcome = ReviewOutcome::ServerError {
            error: "Server configuration error".into(),
            message: None,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "error": "Server configuration error" })
        );
    }
}
