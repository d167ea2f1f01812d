//! Shared HTTP response handling for backend clients.

use crate::error::{BackendError, BackendResult};

/// Check an HTTP response status, turning non-success statuses into
/// classified backend errors with the response body as context.
pub async fn ensure_success(response: reqwest::Response) -> BackendResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
    Err(BackendError::from_status(status, &body))
}
