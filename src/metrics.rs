use lazy_static::lazy_static;
use prometheus::{
    Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram,
};

lazy_static! {
    pub static ref REVIEW_REQUESTS: Counter =
        register_counter!("review_requests_total", "Total number of review requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("review_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref BOT_REQUESTS: Counter =
        register_counter!("review_bot_requests_total", "Requests classified as automated").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("review_upstream_failures_total", "Failed completion API calls").unwrap();
    pub static ref COMPLETION_LATENCY: Histogram = register_histogram!(
        "review_completion_latency_seconds",
        "Completion API latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_IDENTITIES: Gauge =
        register_gauge!("review_tracked_identities", "Client identities held by the rate limiter").unwrap();
}
