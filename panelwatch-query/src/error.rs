//! Error types for range queries.

use thiserror::Error;

use crate::time_range::TimeRangeError;

/// Errors that can occur while building or running a range query.
///
/// The `Display` output is what the panel shows in its error line.
#[derive(Debug, Error)]
pub enum QueryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The query backend answered with `status: "error"`.
    #[error("{0}")]
    Api(String),

    /// The from/to tokens could not be resolved.
    #[error(transparent)]
    TimeRange(#[from] TimeRangeError),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Timeout
        } else if err.is_connect() {
            QueryError::Connection(err.to_string())
        } else if err.is_decode() {
            QueryError::Parse(err.to_string())
        } else {
            QueryError::Http(err.to_string())
        }
    }
}
