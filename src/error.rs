//! Crate-wide error type.
//!
//! Variants hold owned strings rather than source errors so the enum is
//! `Clone`: a single in-flight fetch hands the same outcome to every caller
//! waiting on it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Rate limit reached for {0}")]
    RateLimited(String),

    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("No data for symbol {0}")]
    NoData(String),

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Watchlist not found: {0}")]
    WatchlistNotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Error::Status {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Error::Http(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
