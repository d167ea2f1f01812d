//! Backend error taxonomy.
//!
//! Every remote interaction (object storage, training, hosting, scoring)
//! classifies its failures into two kinds: transient failures that a retry
//! may resolve, and permanent failures that must be surfaced to the caller.

use thiserror::Error;

/// Result type alias for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// An error returned by a remote backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Retry-eligible failure: connect errors, timeouts, throttling, 5xx.
    #[error("transient backend error: {message}")]
    Transient {
        /// Description of the failure.
        message: String,
    },

    /// Non-retryable failure: rejected requests, auth problems, remote
    /// failure reasons. Retrying will not change the outcome.
    #[error("permanent backend error: {message}")]
    Permanent {
        /// Description of the failure.
        message: String,
    },

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl BackendError {
    /// Create a transient error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into() }
    }

    /// Create a permanent error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent { message: message.into() }
    }

    /// Whether a retry can be expected to help.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Classify a transport-level failure from the HTTP client.
    ///
    /// Connect errors and timeouts are transient; anything else (bad URLs,
    /// request construction problems) is permanent.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Transient { message: format!("network error: {err}") }
        } else {
            Self::Permanent { message: format!("request error: {err}") }
        }
    }

    /// Classify a non-success HTTP status and its body.
    ///
    /// 429 and 5xx are transient; all other statuses are permanent.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Transient { message: format!("HTTP {status}: {body}") }
        } else {
            Self::Permanent { message: format!("HTTP {status}: {body}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::transient("timed out").is_transient());
        assert!(!BackendError::permanent("bad request").is_transient());
        assert!(!BackendError::NotFound("key".to_string()).is_transient());
    }

    #[test]
    fn test_from_status_throttling_is_transient() {
        let err = BackendError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_transient());
    }

    #[test]
    fn test_from_status_server_error_is_transient() {
        let err = BackendError::from_status(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.is_transient());
    }

    #[test]
    fn test_from_status_client_error_is_permanent() {
        let err = BackendError::from_status(reqwest::StatusCode::BAD_REQUEST, "malformed payload");
        assert!(!err.is_transient());
        let msg = format!("{err}");
        assert!(msg.contains("400"));
        assert!(msg.contains("malformed payload"));
    }
}
