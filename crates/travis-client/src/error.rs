//! Error types for travis-client

use buildscan_core::ProviderError;
use thiserror::Error;

/// Errors that can occur while talking to the Travis API
#[derive(Error, Debug)]
pub enum TravisError {
    /// Request could not be sent or the connection dropped
    #[error("HTTP error: {0}")]
    Http(String),

    /// Travis answered with a status other than success or 404
    #[error("Travis returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body did not match the expected representation
    #[error("cannot decode Travis response: {0}")]
    Decode(String),

    /// Client configuration is unusable
    #[error("invalid Travis configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for TravisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TravisError::Decode(err.to_string())
        } else {
            TravisError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TravisError {
    fn from(err: serde_json::Error) -> Self {
        TravisError::Decode(err.to_string())
    }
}

impl From<TravisError> for ProviderError {
    fn from(err: TravisError) -> Self {
        match err {
            TravisError::Status { status, url } => ProviderError::Status { status, url },
            TravisError::Decode(msg) => ProviderError::Decode(msg),
            TravisError::Http(msg) | TravisError::InvalidConfig(msg) => {
                ProviderError::Transport(msg)
            }
        }
    }
}
