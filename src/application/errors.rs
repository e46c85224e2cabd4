//! Tester errors
//!
//! Two tiers: `ConfigError` aborts the invocation before any network call
//! and surfaces as a usage error; `ClientError` is caught at the check
//! boundary and converted into a FAIL result, so the remaining checks and
//! remaining discovered targets still execute.

use thiserror::Error;

/// Errors that fail the invocation itself
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid agent URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No agent URL given (pass a URL or use --discover)")]
    MissingUrl,

    #[error("Failed to build HTTP client: {0}")]
    ClientInit(String),
}

/// Errors from talking to an agent endpoint
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
