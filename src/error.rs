//! Error types for the review gateway

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure talking to the completion provider
    #[error("request to completion API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but reported an error, or returned nothing usable
    #[error("{0}")]
    Api(String),
}
