//! Admission-controlled gateway that sends code to a chat-completion API
//! for review.

pub mod bot;
pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod review;
pub mod state;
pub mod validate;

pub use error::{Error, Result};
pub use handlers::router;
pub use state::AppState;
