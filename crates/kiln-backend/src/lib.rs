//! Kiln Backend
//!
//! Clients for the managed services the pipeline drives:
//! - Training job descriptors (`TrainingJobSpec`) and the job submitter
//!   with its terminal-state poll loop (`TrainingClient`)
//! - Model registration and endpoint lifecycle (`HostingClient`)
//! - Scoring-endpoint invocation (`ScoringClient`, `Scorer`)

pub mod error;
pub mod hosting;
pub mod job;
pub mod scoring;
pub mod training;

pub use error::{HostingError, JobError, JobResult, ScoringError};
pub use hosting::{EndpointHandle, EndpointStatus, HostingClient, ModelHandle};
pub use job::{
    AlgorithmSpec, ChannelSpec, DataDistribution, HyperParams, ResourceSpec, StoppingSpec,
    TrainingJobSpec,
};
pub use scoring::{Scorer, ScoringClient};
pub use training::{CompletedJob, JobHandle, JobStatus, TrainingClient};
