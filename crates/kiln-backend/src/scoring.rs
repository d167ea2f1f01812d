//! Scoring-endpoint client.
//!
//! Sends raw sparse-format text to a serving endpoint and parses the
//! returned predictions. The response is comma- or newline-separated
//! numerics, one per input line, in order; a count mismatch is a contract
//! violation and fails the batch.

use crate::error::ScoringError;
use crate::hosting::EndpointHandle;
use async_trait::async_trait;
use kiln_core::config::ScoringConfig;
use kiln_core::error::BackendError;
use kiln_core::http::ensure_success;
use reqwest::Client;
use tracing::debug;

/// Anything that can score a batch of sparse-format records.
///
/// The evaluator depends on this seam rather than on the HTTP client, so
/// tests can drive it with an in-process fake.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score a batch of records, returning one prediction per record in
    /// submission order.
    async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError>;
}

/// HTTP client for a serving endpoint.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    base_url: String,
    endpoint_name: String,
    content_type: String,
    client: Client,
}

impl ScoringClient {
    /// Create a client for one endpoint.
    #[must_use]
    pub fn new(config: &ScoringConfig, endpoint: &EndpointHandle) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoint_name: endpoint.name.clone(),
            content_type: config.content_type.clone(),
            client: Client::new(),
        }
    }

    /// The endpoint this client invokes.
    #[must_use]
    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }
}

/// Parse a prediction response body: comma-separated if any comma is
/// present, otherwise one prediction per line.
fn parse_predictions(text: &str) -> Result<Vec<f32>, ScoringError> {
    let tokens: Vec<&str> =
        if text.contains(',') { text.split(',').collect() } else { text.lines().collect() };

    tokens
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f32>().map_err(|_| ScoringError::InvalidPrediction {
                value: token.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl Scorer for ScoringClient {
    async fn score(&self, records: &[String]) -> Result<Vec<f32>, ScoringError> {
        let url = format!("{}/endpoints/{}/invocations", self.base_url, self.endpoint_name);
        let payload = records.join("\n");
        debug!(endpoint = %self.endpoint_name, records = records.len(), "invoking endpoint");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, self.content_type.as_str())
            .body(payload)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;

        let text = response.text().await.map_err(|e| BackendError::from_transport(&e))?;
        let predictions = parse_predictions(&text)?;

        if predictions.len() != records.len() {
            return Err(ScoringError::CountMismatch {
                expected: records.len(),
                got: predictions.len(),
            });
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated() {
        assert_eq!(parse_predictions("1.0, 2.0, 3.0").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_newline_separated() {
        assert_eq!(parse_predictions("7\n0\n9\n").unwrap(), vec![7.0, 0.0, 9.0]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_predictions("1.0, huh, 3.0").unwrap_err();
        assert!(matches!(err, ScoringError::InvalidPrediction { value } if value == "huh"));
    }

    #[test]
    fn test_parse_ignores_trailing_separator() {
        assert_eq!(parse_predictions("1,2,").unwrap(), vec![1.0, 2.0]);
    }
}
