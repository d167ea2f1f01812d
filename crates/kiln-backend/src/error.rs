use kiln_core::BackendError;
use thiserror::Error;

/// Result type alias for training job operations.
pub type JobResult<T> = std::result::Result<T, JobError>;

/// Errors from the training service.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job descriptor failed local validation.
    #[error("invalid training job spec: {0}")]
    InvalidSpec(String),

    /// The remote job reached the failed state; the remote failure reason
    /// is carried verbatim.
    #[error("training job {job_name} failed: {reason}")]
    Failed {
        /// Name of the failed job.
        job_name: String,
        /// Failure reason reported by the service.
        reason: String,
    },

    /// The remote job was stopped before completion.
    #[error("training job {job_name} was stopped before completion")]
    Stopped {
        /// Name of the stopped job.
        job_name: String,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors from the hosting service.
#[derive(Debug, Error)]
pub enum HostingError {
    /// Endpoint provisioning reached the failed state.
    #[error("endpoint {name} failed to come into service: {reason}")]
    EndpointFailed {
        /// Endpoint name.
        name: String,
        /// Failure reason reported by the service.
        reason: String,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors from the scoring endpoint.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The endpoint returned a different number of predictions than
    /// records submitted. Continuing would misalign every subsequent
    /// index, so this is fatal for the batch.
    #[error("prediction count mismatch: sent {expected} records, received {got} predictions")]
    CountMismatch {
        /// Records submitted.
        expected: usize,
        /// Predictions received.
        got: usize,
    },

    /// A prediction token could not be parsed as a number.
    #[error("invalid prediction value '{value}'")]
    InvalidPrediction {
        /// The offending token.
        value: String,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ScoringError {
    /// Whether a retry can be expected to help.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(err) if err.is_transient())
    }
}
