//! Object storage client.
//!
//! Thin put/get wrapper over an S3-style HTTP namespace: objects are
//! addressed as `{base_url}/{bucket}/{key}` under a hierarchical key
//! namespace.

use crate::config::StoreConfig;
use crate::error::{BackendError, BackendResult};
use crate::http::ensure_success;
use reqwest::Client;
use tracing::debug;

/// Client for a remote object store.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    base_url: String,
    bucket: String,
    client: Client,
}

impl ObjectStore {
    /// Create a new store client from configuration.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            client: Client::new(),
        }
    }

    /// The bucket this client writes to.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Full URL for an object key.
    #[must_use]
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, key)
    }

    /// Upload a blob under the given key, overwriting any existing object.
    pub async fn put(&self, key: &str, body: Vec<u8>) -> BackendResult<()> {
        let url = self.object_url(key);
        debug!(key, bytes = body.len(), "uploading object");

        let response = self
            .client
            .put(&url)
            .body(body)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;

        ensure_success(response).await?;
        Ok(())
    }

    /// Download the blob stored under the given key.
    ///
    /// A missing key is reported as `BackendError::NotFound` so callers can
    /// branch on it without string-matching.
    pub async fn get(&self, key: &str) -> BackendResult<Vec<u8>> {
        let url = self.object_url(key);
        debug!(key, "downloading object");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(key.to_string()));
        }

        let response = ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(|e| BackendError::from_transport(&e))?;
        Ok(bytes.to_vec())
    }
}
