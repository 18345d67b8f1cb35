//! Sync error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors talking to the explorer service.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request could not be sent or the response not read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { status: StatusCode, url: String },

    /// The response body did not have the expected shape.
    #[error("Cannot decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured service URL cannot be used as a base.
    #[error("Invalid explorer service URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SyncError {
    /// HTTP status reported by the service, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            Self::Decode { .. } | Self::InvalidUrl { .. } => None,
        }
    }

    /// Check if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => status.is_server_error(),
            Self::Decode { .. } | Self::InvalidUrl { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error() {
        let err = SyncError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: "http://host/all".to_string(),
        };
        assert_eq!(err.to_string(), "http://host/all returned 503 Service Unavailable");
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.is_retryable());

        let not_found = SyncError::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://host/x".to_string(),
        };
        assert!(!not_found.is_retryable());
    }
}
