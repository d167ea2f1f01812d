//! Training service client: job submission and the terminal-state poll
//! loop.

use crate::error::{JobError, JobResult};
use crate::job::TrainingJobSpec;
use kiln_core::config::TrainingConfig;
use kiln_core::error::BackendError;
use kiln_core::http::ensure_success;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Handle to a submitted training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Remote job name.
    pub job_name: String,
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.job_name)
    }
}

/// Remote state of a training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Running,
    Completed {
        /// Storage location of the model artifact.
        artifact_location: String,
    },
    Failed {
        /// Failure reason reported by the service.
        reason: String,
    },
    Stopped,
}

impl JobStatus {
    /// Whether the job will make no further progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. } | Self::Stopped)
    }
}

/// A job that reached the completed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    /// Remote job name.
    pub job_name: String,
    /// Storage location of the model artifact.
    pub artifact_location: String,
}

#[derive(Deserialize)]
struct SubmitJobResponse {
    job_name: String,
}

/// Client for the managed training service.
#[derive(Debug, Clone)]
pub struct TrainingClient {
    base_url: String,
    poll_interval: Duration,
    client: Client,
}

impl TrainingClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            client: Client::new(),
        }
    }

    /// Override the poll interval (tests use a short one).
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Submit a job for execution.
    pub async fn submit(&self, spec: &TrainingJobSpec) -> JobResult<JobHandle> {
        spec.validate()?;

        let url = format!("{}/training/jobs", self.base_url);
        info!(
            job_name = %spec.job_name,
            instances = spec.resources.instance_count,
            distribution = ?spec.input.distribution,
            "submitting training job"
        );

        let response = self
            .client
            .post(&url)
            .json(spec)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;

        let body: SubmitJobResponse = response
            .json()
            .await
            .map_err(|e| BackendError::permanent(format!("malformed submit response: {e}")))?;
        Ok(JobHandle { job_name: body.job_name })
    }

    /// Fetch the current status of a job.
    pub async fn status(&self, handle: &JobHandle) -> JobResult<JobStatus> {
        let url = format!("{}/training/jobs/{}", self.base_url, handle.job_name);
        let response =
            self.client.get(&url).send().await.map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;

        let status: JobStatus = response
            .json()
            .await
            .map_err(|e| BackendError::permanent(format!("malformed status response: {e}")))?;
        Ok(status)
    }

    /// Ask the service to stop a running job.
    pub async fn stop(&self, handle: &JobHandle) -> JobResult<()> {
        let url = format!("{}/training/jobs/{}/stop", self.base_url, handle.job_name);
        let response =
            self.client.post(&url).send().await.map_err(|e| BackendError::from_transport(&e))?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Poll until the job reaches a terminal state.
    ///
    /// A failed job surfaces the remote failure reason and aborts the
    /// pipeline; the caller never proceeds to hosting with a failed job.
    pub async fn wait(&self, handle: &JobHandle) -> JobResult<CompletedJob> {
        loop {
            let status = self.status(handle).await?;
            debug!(job_name = %handle.job_name, status = ?status, "polled training job");

            match status {
                JobStatus::Completed { artifact_location } => {
                    info!(job_name = %handle.job_name, artifact_location, "training job completed");
                    return Ok(CompletedJob {
                        job_name: handle.job_name.clone(),
                        artifact_location,
                    });
                }
                JobStatus::Failed { reason } => {
                    return Err(JobError::Failed { job_name: handle.job_name.clone(), reason });
                }
                JobStatus::Stopped => {
                    return Err(JobError::Stopped { job_name: handle.job_name.clone() });
                }
                JobStatus::Submitted | JobStatus::Running => {
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
