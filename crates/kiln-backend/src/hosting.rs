//! Hosting service client: model registration and endpoint lifecycle.

use crate::error::HostingError;
use kiln_core::config::HostingConfig;
use kiln_core::error::{BackendError, BackendResult};
use kiln_core::http::ensure_success;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handle to a registered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Remote model name.
    pub name: String,
}

/// Handle to a serving endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointHandle {
    /// Remote endpoint name.
    pub name: String,
}

impl std::fmt::Display for EndpointHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Remote state of a serving endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EndpointStatus {
    Creating,
    InService,
    Failed {
        /// Failure reason reported by the service.
        reason: String,
    },
    Deleting,
}

#[derive(Serialize)]
struct RegisterModelRequest<'a> {
    name: &'a str,
    artifact_location: &'a str,
    image: &'a str,
}

#[derive(Deserialize)]
struct RegisterModelResponse {
    name: String,
}

#[derive(Serialize)]
struct CreateEndpointRequest<'a> {
    name: &'a str,
    model: &'a str,
    instance_type: &'a str,
    initial_instance_count: u32,
}

#[derive(Deserialize)]
struct CreateEndpointResponse {
    name: String,
}

/// Client for the managed hosting service.
#[derive(Debug, Clone)]
pub struct HostingClient {
    base_url: String,
    instance_type: String,
    initial_instance_count: u32,
    poll_interval: Duration,
    client: Client,
}

impl HostingClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &HostingConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            instance_type: config.instance_type.clone(),
            initial_instance_count: config.initial_instance_count,
            poll_interval: Duration::from_secs(5),
            client: Client::new(),
        }
    }

    /// Override the poll interval (tests use a short one).
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Register a trained model artifact under a name.
    pub async fn register_model(
        &self,
        name: &str,
        artifact_location: &str,
        image: &str,
    ) -> BackendResult<ModelHandle> {
        let url = format!("{}/models", self.base_url);
        info!(model = name, artifact_location, "registering model");

        let request = RegisterModelRequest { name, artifact_location, image };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;

        let body: RegisterModelResponse = response
            .json()
            .await
            .map_err(|e| BackendError::permanent(format!("malformed register response: {e}")))?;
        Ok(ModelHandle { name: body.name })
    }

    /// Provision a serving endpoint for a registered model.
    ///
    /// The endpoint name is derived from the model name plus a timestamp
    /// so repeated deployments never collide.
    pub async fn create_endpoint(&self, model: &ModelHandle) -> BackendResult<EndpointHandle> {
        let name = format!("{}-{}", model.name, chrono::Utc::now().format("%Y%m%d%H%M%S"));
        let url = format!("{}/endpoints", self.base_url);
        info!(endpoint = %name, model = %model.name, "creating endpoint");

        let request = CreateEndpointRequest {
            name: &name,
            model: &model.name,
            instance_type: &self.instance_type,
            initial_instance_count: self.initial_instance_count,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;

        let body: CreateEndpointResponse = response
            .json()
            .await
            .map_err(|e| BackendError::permanent(format!("malformed create response: {e}")))?;
        Ok(EndpointHandle { name: body.name })
    }

    /// Fetch the current status of an endpoint.
    pub async fn endpoint_status(&self, endpoint: &EndpointHandle) -> BackendResult<EndpointStatus> {
        let url = format!("{}/endpoints/{}", self.base_url, endpoint.name);
        let response =
            self.client.get(&url).send().await.map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;

        let status: EndpointStatus = response
            .json()
            .await
            .map_err(|e| BackendError::permanent(format!("malformed status response: {e}")))?;
        Ok(status)
    }

    /// Poll until the endpoint is in service.
    pub async fn wait_in_service(&self, endpoint: &EndpointHandle) -> Result<(), HostingError> {
        loop {
            let status = self.endpoint_status(endpoint).await?;
            debug!(endpoint = %endpoint.name, status = ?status, "polled endpoint");

            match status {
                EndpointStatus::InService => {
                    info!(endpoint = %endpoint.name, "endpoint in service");
                    return Ok(());
                }
                EndpointStatus::Failed { reason } => {
                    return Err(HostingError::EndpointFailed {
                        name: endpoint.name.clone(),
                        reason,
                    });
                }
                EndpointStatus::Creating | EndpointStatus::Deleting => {
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Delete an endpoint. Deleting one that is already gone logs a
    /// warning and succeeds.
    pub async fn delete_endpoint(&self, endpoint: &EndpointHandle) -> BackendResult<()> {
        let url = format!("{}/endpoints/{}", self.base_url, endpoint.name);
        let response =
            self.client.delete(&url).send().await.map_err(|e| BackendError::from_transport(&e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            warn!(endpoint = %endpoint.name, "endpoint already deleted");
            return Ok(());
        }

        ensure_success(response).await?;
        info!(endpoint = %endpoint.name, "endpoint deleted");
        Ok(())
    }
}
