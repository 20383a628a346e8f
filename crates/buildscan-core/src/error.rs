//! Error taxonomy for buildscan.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The input file could not be opened or read.
    #[error("cannot read input file {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scan configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Hard failures reported by a CI provider.
///
/// "Not found" is never an error: providers return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with an unexpected HTTP status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be decoded.
    #[error("cannot decode provider response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_names_path() {
        let err = ScanError::Input {
            path: PathBuf::from("/tmp/missing-builds.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing-builds.txt"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_status_error_display() {
        let err = ProviderError::Status {
            status: 503,
            url: "https://api.travis-ci.com/build/1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/build/1"));
    }

    #[test]
    fn test_decode_error_from_serde() {
        let err: ProviderError = serde_json::from_str::<u64>("not json").unwrap_err().into();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
