//! Crate-wide error type.
//!
//! Provider failures (transport, status, provider-reported payloads) are
//! recoverable: the aggregator downgrades them to "no articles from this
//! provider". The remaining variants surface configuration and storage
//! problems to the CLI.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} request failed with status {status}")]
    Status {
        provider: String,
        status: reqwest::StatusCode,
    },

    #[error("{provider} error: {message}")]
    Api { provider: String, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
